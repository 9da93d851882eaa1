// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::DeviceError;
use crate::session::Session;
use crate::traits::{DeviceChannel, DevicePublic, KeyHandle, PathChannel};

/// Configurable behaviour for [`MockChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockChannelBehaviour {
    /// Normal operation: deterministic pattern bytes.
    None,
    /// Every get-random command fails.
    FailAlways,
    /// The first `n` get-random commands fail, later ones succeed.
    FailFirstN(usize),
    /// The `n`th get-random command fails (1-indexed), all others succeed.
    FailAtNth(usize),
    /// Every get-random command returns an empty payload.
    EmptyResponse,
    /// The capability query fails.
    FailCapabilityQuery,
    /// Public-key reads fail.
    FailReadPublic,
}

/// Shared view into a [`MockChannel`]'s recorded activity.
///
/// Cloneable, so tests keep one after moving the channel into an adapter.
#[derive(Clone, Default)]
pub struct MockProbe {
    get_random: Arc<AtomicUsize>,
    read_public: Arc<AtomicUsize>,
    capability: Arc<AtomicUsize>,
    sessions: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<u16>>>,
    in_flight: Arc<AtomicBool>,
    overlap: Arc<AtomicBool>,
}

impl MockProbe {
    /// Number of get-random commands issued so far.
    pub fn get_random_commands(&self) -> usize {
        self.get_random.load(Ordering::SeqCst)
    }

    /// Number of public-key reads issued so far.
    pub fn read_public_commands(&self) -> usize {
        self.read_public.load(Ordering::SeqCst)
    }

    /// Number of capability queries issued so far.
    pub fn capability_queries(&self) -> usize {
        self.capability.load(Ordering::SeqCst)
    }

    /// Number of get-random commands that carried a session.
    pub fn sessions_seen(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Requested byte count of every get-random command, in issue order.
    pub fn requested_sizes(&self) -> Vec<u16> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether two device commands were ever in flight at the same time.
    pub fn overlap_detected(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }
}

/// In-memory device channel for tests.
///
/// Successful get-random commands return a rolling byte counter
/// (0, 1, 2, …), so a fresh channel's concatenated output is predictable
/// and chunk ordering is observable. Every command is recorded in the
/// channel's [`MockProbe`], and an in-flight flag is held for the duration
/// of each get-random command so tests can assert the adapter never
/// overlaps device access.
pub struct MockChannel {
    behaviour: MockChannelBehaviour,
    limit: u16,
    next_byte: u8,
    command_delay: Duration,
    closed: bool,
    probe: MockProbe,
}

impl MockChannel {
    /// Channel with the given behaviour and a capability limit of 48.
    pub fn new(behaviour: MockChannelBehaviour) -> Self {
        Self {
            behaviour,
            limit: 48,
            next_byte: 0,
            command_delay: Duration::ZERO,
            closed: false,
            probe: MockProbe::default(),
        }
    }

    /// Overrides the reported capability limit (0 = device reports none).
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    /// Makes every get-random command sleep for `delay`, widening the
    /// window the overlap detector watches.
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    /// A probe observing this channel.
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed);
        }
        Ok(())
    }

    fn get_random_inner(
        &mut self,
        count: u16,
        session: Option<&Session>,
        call: usize,
    ) -> Result<Vec<u8>, DeviceError> {
        self.ensure_open()?;

        if session.is_some() {
            self.probe.sessions.fetch_add(1, Ordering::SeqCst);
        }
        self.probe
            .requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(count);

        match self.behaviour {
            MockChannelBehaviour::FailAlways => Err(DeviceError::Code(0x0921)),
            MockChannelBehaviour::FailFirstN(n) if call < n => Err(DeviceError::Code(0x0921)),
            MockChannelBehaviour::FailAtNth(n) if call + 1 == n => Err(DeviceError::Code(0x0921)),
            MockChannelBehaviour::EmptyResponse => Ok(Vec::new()),
            _ => {
                let mut out = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    out.push(self.next_byte);
                    self.next_byte = self.next_byte.wrapping_add(1);
                }
                Ok(out)
            }
        }
    }
}

impl DeviceChannel for MockChannel {
    fn max_random_bytes(&mut self) -> Result<u16, DeviceError> {
        self.ensure_open()?;
        self.probe.capability.fetch_add(1, Ordering::SeqCst);

        if self.behaviour == MockChannelBehaviour::FailCapabilityQuery {
            return Err(DeviceError::Code(0x0100));
        }
        Ok(self.limit)
    }

    fn read_public(&mut self, handle: KeyHandle) -> Result<DevicePublic, DeviceError> {
        self.ensure_open()?;
        self.probe.read_public.fetch_add(1, Ordering::SeqCst);

        if self.behaviour == MockChannelBehaviour::FailReadPublic {
            return Err(DeviceError::Code(0x018b));
        }
        Ok(DevicePublic(handle.0.to_be_bytes().to_vec()))
    }

    fn get_random(
        &mut self,
        count: u16,
        session: Option<&Session>,
    ) -> Result<Vec<u8>, DeviceError> {
        let call = self.probe.get_random.fetch_add(1, Ordering::SeqCst);

        if self.probe.in_flight.swap(true, Ordering::SeqCst) {
            self.probe.overlap.store(true, Ordering::SeqCst);
        }
        if !self.command_delay.is_zero() {
            std::thread::sleep(self.command_delay);
        }

        let result = self.get_random_inner(count, session, call);

        self.probe.in_flight.store(false, Ordering::SeqCst);
        result
    }
}

impl PathChannel for MockChannel {
    fn open(_path: &str) -> Result<Self, DeviceError> {
        Ok(Self::new(MockChannelBehaviour::None))
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
