// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

use crate::error::DeviceError;
use crate::session::Session;

/// Handle of a key object resident on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub u32);

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle {:#010x}", self.0)
    }
}

/// Opaque public area of a device-resident key.
///
/// The adapter never interprets the contents; it only carries them into the
/// session binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePublic(pub Vec<u8>);

/// An open bidirectional channel to the hardware module.
///
/// Implementations own the wire protocol: command framing, response
/// parsing, and — when a [`Session`] is passed — the session encryption of
/// the exchange. The adapter only sees the three operations below and
/// guarantees it never issues two of them concurrently.
///
/// Opening and closing the underlying transport is the implementor's (or
/// its caller's) concern; see [`PathChannel`] for channels the adapter is
/// allowed to close itself.
pub trait DeviceChannel {
    /// Queries the largest number of random bytes the device returns per
    /// get-random command.
    ///
    /// A result of `0` means the device reports no limit; the adapter then
    /// requests each fill as a single command, still bounded by the
    /// protocol's 16-bit byte-count field.
    fn max_random_bytes(&mut self) -> Result<u16, DeviceError>;

    /// Reads the public area of a device-resident key.
    fn read_public(&mut self, handle: KeyHandle) -> Result<DevicePublic, DeviceError>;

    /// Requests exactly `count` random bytes, optionally under an encrypted
    /// session.
    ///
    /// Implementations must return exactly `count` bytes on success; the
    /// adapter rejects any other payload length as a protocol error.
    fn get_random(&mut self, count: u16, session: Option<&Session>)
    -> Result<Vec<u8>, DeviceError>;
}

/// A channel the adapter opens by path — and therefore closes — itself.
///
/// Channels supplied ready-open by the caller are never closed by the
/// adapter; this trait exists only for the self-owning
/// [`OwnedHsmRng`](crate::OwnedHsmRng) variant.
pub trait PathChannel: DeviceChannel + Sized {
    /// Opens a channel to the device at `path`.
    fn open(path: &str) -> Result<Self, DeviceError>;

    /// Closes the channel.
    ///
    /// Every command after a successful close must fail with
    /// [`DeviceError::Closed`].
    fn close(&mut self) -> Result<(), DeviceError>;
}
