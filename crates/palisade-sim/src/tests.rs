// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for palisade_sim, including the adapter-over-simulator
//! integration the channel exists for.

use std::time::Duration;

use palisade_rand::{
    ConstantBackoff, DeviceChannel, DeviceError, DevicePublic, Encryption, HsmRng, KeyHandle,
    OwnedHsmRng, PathChannel, RandError, SessionScheme,
};
use rsa::RsaPrivateKey;
use rsa::traits::PublicKeyParts;

use crate::channel::SimChannel;

#[test]
fn test_same_seed_same_stream() {
    let mut a = SimChannel::seeded(7);
    let mut b = SimChannel::seeded(7);

    let left = a.get_random(32, None).expect("Failed to get_random(..) (a)");
    let right = b.get_random(32, None).expect("Failed to get_random(..) (b)");

    assert_eq!(left, right);
}

#[test]
fn test_different_seeds_differ() {
    let mut a = SimChannel::seeded(7);
    let mut b = SimChannel::seeded(8);

    let left = a.get_random(32, None).expect("Failed to get_random(..) (a)");
    let right = b.get_random(32, None).expect("Failed to get_random(..) (b)");

    assert_ne!(left, right);
}

#[test]
fn test_oversized_command_is_rejected() {
    let mut channel = SimChannel::seeded(0).with_limit(16);

    let result = channel.get_random(17, None);

    assert!(matches!(result, Err(DeviceError::Code(_))));
}

#[test]
fn test_unknown_handle_read_public_fails() {
    let mut channel = SimChannel::seeded(0);

    let result = channel.read_public(KeyHandle(0xDEAD_BEEF));

    assert!(matches!(result, Err(DeviceError::Code(_))));
}

#[test]
fn test_closed_channel_fails_every_command() {
    let mut channel = SimChannel::seeded(0);
    channel.close().expect("Failed to close()");

    assert!(matches!(
        channel.max_random_bytes(),
        Err(DeviceError::Closed)
    ));
    assert!(matches!(
        channel.get_random(8, None),
        Err(DeviceError::Closed)
    ));
}

#[test]
fn test_adapter_fill_spans_capability_chunks() {
    let rng = HsmRng::new(SimChannel::seeded(7)).expect("Failed to build()");
    assert_eq!(rng.capability_limit(), crate::DEFAULT_LIMIT);

    let mut buf = [0u8; 100];
    let written = rng.fill(&mut buf).expect("Failed to fill(..)");

    assert_eq!(written, 100);

    // Chunking is invisible to the caller: the bytes match the seeded
    // stream drawn in 48/48/4 slices.
    let mut reference = SimChannel::seeded(7);
    let mut expected = Vec::new();
    for count in [48u16, 48, 4] {
        expected.extend(
            reference
                .get_random(count, None)
                .expect("Failed to get_random(..)"),
        );
    }
    assert_eq!(buf.to_vec(), expected);
}

#[test]
fn test_adapter_recovers_from_injected_faults() {
    let mut channel = SimChannel::seeded(7);
    channel.fail_next(2);

    let rng = HsmRng::builder()
        .channel(channel)
        .backoff(ConstantBackoff::new(Duration::ZERO).with_max_retries(5))
        .build()
        .expect("Failed to build()");

    let mut buf = [0u8; 32];
    let written = rng.fill(&mut buf).expect("Failed to fill(..)");

    assert_eq!(written, 32);
}

#[test]
fn test_adapter_bound_session_against_installed_key() {
    let handle = KeyHandle(0x8101_0001);
    let mut channel = SimChannel::seeded(7);
    channel.install_key(handle, DevicePublic(vec![0x30, 0x82, 0x01, 0x0a]));

    let rng = HsmRng::builder()
        .channel(channel)
        .encryption(Encryption::Bound {
            handle,
            public: None,
            scheme: SessionScheme::default(),
        })
        .build()
        .expect("Failed to build()");

    assert!(rng.is_encrypted());

    let mut buf = [0u8; 16];
    rng.fill(&mut buf).expect("Failed to fill(..)");
}

#[test]
fn test_adapter_bound_session_missing_key_fails_construction() {
    let channel = SimChannel::seeded(7);

    let result = HsmRng::builder()
        .channel(channel)
        .encryption(Encryption::Bound {
            handle: KeyHandle(0x8101_0002),
            public: None,
            scheme: SessionScheme::default(),
        })
        .build();

    assert!(matches!(result, Err(RandError::KeyLookup { .. })));
}

#[test]
fn test_owned_adapter_open_fill_shutdown() {
    let rng = OwnedHsmRng::<SimChannel>::open("sim:0").expect("Failed to open(..)");

    let mut buf = [0u8; 64];
    let written = rng.fill(&mut buf).expect("Failed to fill(..)");
    assert_eq!(written, 64);

    rng.shutdown().expect("Failed to shutdown()");
}

// Bridge to the RSA crate's rand_core (0.6) generation traits.
struct KeygenRng<'a>(&'a HsmRng<SimChannel>);

impl rand_core06::RngCore for KeygenRng<'_> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill(dest).expect("Failed to fill(..)");
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core06::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl rand_core06::CryptoRng for KeygenRng<'_> {}

#[test]
fn test_rsa_keygen_from_adapter_entropy() {
    let rng = HsmRng::new(SimChannel::seeded(42)).expect("Failed to build()");

    let key = RsaPrivateKey::new(&mut KeygenRng(&rng), 2048).expect("Failed to generate RSA key");

    // 2048-bit key, 256-byte modulus.
    assert_eq!(key.size(), 256);
    assert_eq!(key.n().to_bytes_be().len(), 256);
}
