// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use thiserror::Error;

use crate::traits::KeyHandle;

/// Errors surfaced by a device channel implementation.
///
/// The adapter treats every variant as potentially transient: any of them
/// may come back differently on the next attempt, so all are eligible for
/// retry under the configured [`BackoffPolicy`](crate::BackoffPolicy).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Transport-level I/O failure.
    #[error("device i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The device answered with a non-success response code.
    #[error("device returned response code {0:#06x}")]
    Code(u32),

    /// The device returned fewer bytes than the command requested.
    ///
    /// Raised by the adapter itself; a partial payload is never accepted
    /// as partial success.
    #[error("short response: requested {requested} bytes, device returned {returned}")]
    ShortResponse {
        /// Byte count the command asked for.
        requested: u16,
        /// Byte count the device actually returned.
        returned: usize,
    },

    /// The channel has been closed.
    #[error("device channel is closed")]
    Closed,

    /// Implementation-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by [`HsmRng`](crate::HsmRng) construction and fills.
#[derive(Debug, Error)]
pub enum RandError {
    /// No device channel was supplied at construction.
    #[error("no device channel supplied")]
    NoDevice,

    /// Opening the device by path failed.
    #[error("failed to open device: {0}")]
    Open(#[source] DeviceError),

    /// The capability query at construction failed.
    ///
    /// Construction is aborted; the adapter never guesses a limit for a
    /// device that cannot report one.
    #[error("capability query failed: {0}")]
    Capability(#[source] DeviceError),

    /// Fetching the public key for the supplied encryption handle failed.
    #[error("public key lookup for {handle} failed: {source}")]
    KeyLookup {
        /// Handle whose public area could not be read.
        handle: KeyHandle,
        /// Underlying device error.
        source: DeviceError,
    },

    /// The OS entropy source failed while deriving the session nonce.
    #[error("entropy for session nonce not available")]
    EntropyNotAvailable,

    /// The requested fill length exceeds the protocol's byte-count field.
    ///
    /// Raised before any device contact.
    #[error("requested {requested} bytes, protocol maximum is {max}")]
    RequestTooLarge {
        /// Length of the destination buffer.
        requested: usize,
        /// Largest representable request, [`MAX_FILL`](crate::MAX_FILL).
        max: usize,
    },

    /// A device command kept failing until the retry policy gave up.
    ///
    /// Carries the last error the device produced.
    #[error("device command failed after retries: {0}")]
    Exhausted(#[source] DeviceError),
}
