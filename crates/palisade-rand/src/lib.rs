// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # palisade_rand
//!
//! Streaming random-byte source backed by a hardware security module.
//!
//! A hardware module's get-random command is awkward as a general entropy
//! source: every command is capped by the device's digest size, transient
//! failures are common on busy devices, and a single physical session must
//! never see two commands in flight. [`HsmRng`] absorbs all of that and
//! exposes one operation: fill a buffer with device-sourced random bytes.
//!
//! ## Core Types
//!
//! - [`HsmRng`]: the adapter over a caller-supplied device channel
//! - [`OwnedHsmRng`]: variant that opens its own channel by path and owns
//!   closing it
//! - [`ExponentialBackoff`] / [`ConstantBackoff`]: retry policies
//! - [`Encryption`] / [`SessionScheme`]: transport-encryption configuration
//!
//! ## Traits
//!
//! - [`DeviceChannel`]: the three device operations the adapter consumes
//! - [`PathChannel`]: open-by-path channels for the self-owning variant
//! - [`BackoffPolicy`]: pluggable retry strategy
//!
//! ## Example
//!
//! ```ignore
//! use palisade_rand::HsmRng;
//!
//! // `channel` is any open DeviceChannel implementation.
//! let rng = HsmRng::new(channel)?;
//!
//! let mut seed = [0u8; 32];
//! rng.fill(&mut seed)?;
//! ```
//!
//! ## Guarantees
//!
//! - Fills are all-or-nothing: either the whole buffer is written, or an
//!   error is returned and the buffer must be discarded.
//! - Requests larger than the device's per-command capability are split
//!   into ordered chunks; bytes arrive in the order the device produced
//!   them.
//! - All fills against one adapter are strictly serialized, including the
//!   chunks within a single fill.
//! - Every device failure is retried per the configured policy; only the
//!   final exhaustion error reaches the caller.

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod backoff;
mod error;
mod read;
mod rng;
mod session;
mod support;
mod traits;

pub use backoff::{BackoffPolicy, ConstantBackoff, ExponentialBackoff, retry};
pub use error::{DeviceError, RandError};
pub use rng::{HsmRng, HsmRngBuilder, MAX_FILL, OwnedHsmRng};
pub use session::{EncryptDirection, Encryption, Session, SessionCipher, SessionHash, SessionScheme};
pub use traits::{DeviceChannel, DevicePublic, KeyHandle, PathChannel};

#[cfg(any(test, feature = "test-utils"))]
pub use support::test_utils;
