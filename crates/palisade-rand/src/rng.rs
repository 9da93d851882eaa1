// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::sync::Mutex;

use crate::backoff::{BackoffPolicy, ExponentialBackoff, retry};
use crate::error::{DeviceError, RandError};
use crate::session::{Encryption, Session};
use crate::traits::{DeviceChannel, PathChannel};

/// Largest fill a single call may request.
///
/// The get-random command carries its byte count in a 16-bit field;
/// anything larger fails fast without contacting the device.
pub const MAX_FILL: usize = u16::MAX as usize;

struct Inner<C> {
    channel: C,
    backoff: Box<dyn BackoffPolicy>,
}

/// Streaming random-byte source backed by a hardware security module.
///
/// Constructed once per device session over an already-open
/// [`DeviceChannel`]. At construction the adapter queries the device's
/// per-command capability limit and, when transport encryption is
/// requested, derives the session; both are immutable afterwards. The
/// channel is never closed by this type — that stays the caller's
/// responsibility (see [`OwnedHsmRng`] for the self-owning variant).
///
/// One mutex guards the channel and the retry policy together, so fills
/// from any number of callers — and the chunks inside a single fill — are
/// strictly serialized against the one physical device session.
pub struct HsmRng<C: DeviceChannel> {
    inner: Mutex<Inner<C>>,
    limit: u16,
    session: Option<Session>,
}

impl<C: DeviceChannel> HsmRng<C> {
    /// Builds an adapter over `channel` with the default configuration:
    /// exponential-backoff retries and no transport encryption.
    pub fn new(channel: C) -> Result<Self, RandError> {
        HsmRngBuilder::new().channel(channel).build()
    }

    /// Starts a builder.
    pub fn builder() -> HsmRngBuilder<C> {
        HsmRngBuilder::new()
    }

    /// The device's cached per-command capability limit.
    ///
    /// `0` means the device reported no limit and fills run as a single
    /// chunk.
    pub fn capability_limit(&self) -> u16 {
        self.limit
    }

    /// The transport-encryption session fills run under, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether fills run under a transport-encryption session.
    pub fn is_encrypted(&self) -> bool {
        self.session.is_some()
    }

    /// Fills `dest` entirely with device-sourced random bytes and returns
    /// the number written, always `dest.len()` on success.
    ///
    /// The request is split into chunks no larger than the capability
    /// limit; each chunk is a retry-wrapped get-random command, and the
    /// results are concatenated in command order. The adapter's lock is
    /// held for the whole call.
    ///
    /// A zero-length `dest` succeeds immediately without touching the
    /// device. On failure nothing has been written to `dest`, but the
    /// caller must still treat its contents as undefined and discard them.
    ///
    /// # Errors
    ///
    /// - [`RandError::RequestTooLarge`] when `dest` exceeds [`MAX_FILL`];
    ///   no device command is issued.
    /// - [`RandError::Exhausted`] when a chunk's command kept failing until
    ///   the retry policy gave up. Remaining chunks are not attempted.
    pub fn fill(&self, dest: &mut [u8]) -> Result<usize, RandError> {
        if dest.is_empty() {
            return Ok(0);
        }
        if dest.len() > MAX_FILL {
            return Err(RandError::RequestTooLarge {
                requested: dest.len(),
                max: MAX_FILL,
            });
        }

        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Inner { channel, backoff } = &mut *guard;

        let limit = match self.limit {
            0 => MAX_FILL,
            limit => limit as usize,
        };
        let session = self.session.as_ref();

        let mut acc = Vec::with_capacity(dest.len());
        let mut remaining = dest.len();
        while remaining > 0 {
            let count = remaining.min(limit) as u16;
            let chunk = retry(backoff.as_mut(), || {
                let bytes = channel.get_random(count, session)?;
                if bytes.len() != count as usize {
                    return Err(DeviceError::ShortResponse {
                        requested: count,
                        returned: bytes.len(),
                    });
                }
                Ok(bytes)
            })
            .map_err(RandError::Exhausted)?;

            acc.extend_from_slice(&chunk);
            remaining -= count as usize;
        }

        dest.copy_from_slice(&acc);
        Ok(dest.len())
    }

    /// Consumes the adapter and returns the underlying channel.
    pub fn into_channel(self) -> C {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .channel
    }
}

/// Builder for [`HsmRng`].
///
/// Everything except the channel is optional: the retry policy defaults to
/// [`ExponentialBackoff::default`] and encryption to [`Encryption::None`].
pub struct HsmRngBuilder<C> {
    channel: Option<C>,
    backoff: Option<Box<dyn BackoffPolicy>>,
    encryption: Encryption,
}

impl<C: DeviceChannel> HsmRngBuilder<C> {
    /// Empty builder.
    pub fn new() -> Self {
        Self {
            channel: None,
            backoff: None,
            encryption: Encryption::None,
        }
    }

    /// The open device channel the adapter will drive.
    pub fn channel(mut self, channel: C) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Retry policy applied to every device command.
    pub fn backoff(mut self, policy: impl BackoffPolicy + 'static) -> Self {
        self.backoff = Some(Box::new(policy));
        self
    }

    /// Transport-encryption selection.
    pub fn encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Finalizes the adapter.
    ///
    /// Queries the device capability limit (once, cached for the adapter's
    /// lifetime), fetches the binding key's public area when a bound
    /// session was requested without one, and derives the session.
    ///
    /// # Errors
    ///
    /// - [`RandError::NoDevice`] when no channel was supplied.
    /// - [`RandError::Capability`] when the capability query fails; the
    ///   failure is fatal, never papered over with a guessed limit.
    /// - [`RandError::KeyLookup`] when the public-key fetch for a bound
    ///   session fails.
    pub fn build(self) -> Result<HsmRng<C>, RandError> {
        let mut channel = self.channel.ok_or(RandError::NoDevice)?;
        let backoff = self
            .backoff
            .unwrap_or_else(|| Box::new(ExponentialBackoff::default()));

        let limit = channel.max_random_bytes().map_err(RandError::Capability)?;

        let session = match self.encryption {
            Encryption::None => None,
            Encryption::Unbound(scheme) => Some(Session::derive(None, scheme)?),
            Encryption::Bound {
                handle,
                public,
                scheme,
            } => {
                let public = match public {
                    Some(public) => public,
                    None => channel
                        .read_public(handle)
                        .map_err(|source| RandError::KeyLookup { handle, source })?,
                };
                Some(Session::derive(Some((handle, public)), scheme)?)
            }
        };

        Ok(HsmRng {
            inner: Mutex::new(Inner { channel, backoff }),
            limit,
            session,
        })
    }
}

impl<C: DeviceChannel> Default for HsmRngBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter variant that opened its own channel by path and owns closing it.
///
/// Dereferences to [`HsmRng`] for everything except [`shutdown`], which
/// only exists here: adapters over caller-supplied channels have no close
/// surface at all.
///
/// [`shutdown`]: OwnedHsmRng::shutdown
pub struct OwnedHsmRng<C: PathChannel> {
    rng: HsmRng<C>,
}

impl<C: PathChannel> OwnedHsmRng<C> {
    /// Opens the device at `path` and builds an adapter over the new
    /// channel with the default configuration.
    pub fn open(path: &str) -> Result<Self, RandError> {
        Self::open_with(path, HsmRngBuilder::new())
    }

    /// Opens the device at `path` and finalizes `builder` over the new
    /// channel. Any channel previously set on `builder` is replaced.
    pub fn open_with(path: &str, builder: HsmRngBuilder<C>) -> Result<Self, RandError> {
        let channel = C::open(path).map_err(RandError::Open)?;
        Ok(Self {
            rng: builder.channel(channel).build()?,
        })
    }

    /// Closes the owned channel, consuming the adapter.
    pub fn shutdown(self) -> Result<(), DeviceError> {
        let mut channel = self.rng.into_channel();
        channel.close()
    }
}

impl<C: PathChannel> std::ops::Deref for OwnedHsmRng<C> {
    type Target = HsmRng<C>;

    fn deref(&self) -> &HsmRng<C> {
        &self.rng
    }
}
