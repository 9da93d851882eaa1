// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::rng::HsmRng;
use crate::session::{
    EncryptDirection, Encryption, Session, SessionCipher, SessionHash, SessionScheme,
};
use crate::support::test_utils::{MockChannel, MockChannelBehaviour};
use crate::traits::{DevicePublic, KeyHandle};

#[test]
fn test_default_scheme_shape() {
    let scheme = SessionScheme::default();

    assert_eq!(scheme.hash, SessionHash::Sha256);
    assert_eq!(scheme.cipher, SessionCipher::Aes128Cfb);
    assert_eq!(scheme.tag_len, 16);
    assert_eq!(scheme.direction, EncryptDirection::Response);
}

#[test]
fn test_encrypt_direction_is_explicit_configuration() {
    let scheme = SessionScheme {
        direction: EncryptDirection::CommandAndResponse,
        ..SessionScheme::default()
    };

    let channel = MockChannel::new(MockChannelBehaviour::None);
    let rng = HsmRng::builder()
        .channel(channel)
        .encryption(Encryption::Unbound(scheme))
        .build()
        .expect("Failed to build()");

    let session = rng.session().expect("Missing session");
    assert_eq!(session.scheme().direction, EncryptDirection::CommandAndResponse);
    assert!(session.binding().is_none());
}

#[test]
fn test_bound_session_carries_handle_and_public_key() {
    let handle = KeyHandle(0x8101_0001);
    let public = DevicePublic(vec![1, 2, 3, 4]);

    let channel = MockChannel::new(MockChannelBehaviour::None);
    let rng = HsmRng::builder()
        .channel(channel)
        .encryption(Encryption::Bound {
            handle,
            public: Some(public.clone()),
            scheme: SessionScheme::default(),
        })
        .build()
        .expect("Failed to build()");

    let session = rng.session().expect("Missing session");
    let (bound_handle, bound_public) = session.binding().expect("Missing binding");

    assert_eq!(bound_handle, handle);
    assert_eq!(*bound_public, public);
}

#[test]
fn test_session_caller_nonces_are_unique() {
    let a = Session::derive(None, SessionScheme::default()).expect("Failed to derive() (#0)");
    let b = Session::derive(None, SessionScheme::default()).expect("Failed to derive() (#1)");

    assert_ne!(a.caller_nonce(), b.caller_nonce());
}
