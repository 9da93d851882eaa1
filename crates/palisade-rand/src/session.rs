// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Transport-encryption configuration and the derived session value.
//!
//! The adapter does not implement the session wire protocol itself — that
//! lives behind [`DeviceChannel`](crate::DeviceChannel). What it does own
//! is the session's shape: which key (if any) the session is bound to,
//! which scheme protects the exchange, and the caller nonce that makes the
//! session unique. Channel implementations receive the finished
//! [`Session`] with every get-random command.

use zeroize::Zeroize;

use crate::error::RandError;
use crate::traits::{DevicePublic, KeyHandle};

/// Direction(s) of the exchange the session encrypts.
///
/// Historically this was an implicit default buried in the transport; it
/// is deliberately explicit configuration here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptDirection {
    /// Encrypt the device's response only — the random bytes on their way
    /// back to the caller. The common configuration.
    #[default]
    Response,
    /// Encrypt the command parameters only.
    Command,
    /// Encrypt both directions.
    CommandAndResponse,
}

/// Hash function keying the session's HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionHash {
    /// 256-bit digest.
    #[default]
    Sha256,
}

/// Symmetric cipher protecting session payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionCipher {
    /// 128-bit block cipher in a streaming (CFB) mode.
    #[default]
    Aes128Cfb,
}

/// Parameter block describing how a session protects the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionScheme {
    /// Hash function for the HMAC-derived session key.
    pub hash: SessionHash,
    /// Payload cipher.
    pub cipher: SessionCipher,
    /// Integrity/confidentiality parameter size in bytes.
    pub tag_len: usize,
    /// Which direction(s) of the exchange are encrypted.
    pub direction: EncryptDirection,
}

impl Default for SessionScheme {
    /// HMAC-SHA-256 keyed session, AES-128 streaming cipher, 16-byte tag,
    /// response direction only.
    fn default() -> Self {
        Self {
            hash: SessionHash::Sha256,
            cipher: SessionCipher::Aes128Cfb,
            tag_len: 16,
            direction: EncryptDirection::Response,
        }
    }
}

/// Transport-encryption selection at construction time.
#[derive(Debug, Default)]
pub enum Encryption {
    /// Plain exchange, no session.
    #[default]
    None,
    /// Session without an external key binding.
    Unbound(SessionScheme),
    /// Session bound to a device-resident key.
    Bound {
        /// Handle of the binding key.
        handle: KeyHandle,
        /// Its already-fetched public area. When `None`, the adapter reads
        /// it from the device during construction.
        public: Option<DevicePublic>,
        /// Scheme protecting the exchange.
        scheme: SessionScheme,
    },
}

/// A derived transport-encryption session.
///
/// Immutable for the adapter's lifetime; the caller nonce is zeroized on
/// drop.
pub struct Session {
    binding: Option<(KeyHandle, DevicePublic)>,
    scheme: SessionScheme,
    caller_nonce: [u8; 32],
}

impl Session {
    /// Derives a session over `binding` with a fresh caller nonce.
    pub(crate) fn derive(
        binding: Option<(KeyHandle, DevicePublic)>,
        scheme: SessionScheme,
    ) -> Result<Self, RandError> {
        let mut caller_nonce = [0u8; 32];
        getrandom::fill(&mut caller_nonce).map_err(|_| RandError::EntropyNotAvailable)?;

        Ok(Self {
            binding,
            scheme,
            caller_nonce,
        })
    }

    /// The key the session is bound to, if any.
    pub fn binding(&self) -> Option<(KeyHandle, &DevicePublic)> {
        self.binding.as_ref().map(|(handle, public)| (*handle, public))
    }

    /// The scheme protecting the exchange.
    pub fn scheme(&self) -> &SessionScheme {
        &self.scheme
    }

    /// The caller nonce the session was derived with.
    pub fn caller_nonce(&self) -> &[u8; 32] {
        &self.caller_nonce
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.caller_nonce.zeroize();
    }
}
