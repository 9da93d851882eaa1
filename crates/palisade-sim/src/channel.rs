// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use palisade_rand::{
    DeviceChannel, DeviceError, DevicePublic, KeyHandle, PathChannel, Session,
};

/// Default per-command capability: the largest digest size a typical
/// module reports.
pub const DEFAULT_LIMIT: u16 = 48;

/// Deterministic in-process device channel.
///
/// Behaves like a well-mannered hardware module: it reports a per-command
/// capability limit, rejects get-random commands that exceed it, serves
/// the public area of installed resident keys, and fails every command
/// once closed.
pub struct SimChannel {
    rng: StdRng,
    limit: u16,
    keys: HashMap<KeyHandle, DevicePublic>,
    fail_next: usize,
    sessions_seen: usize,
    closed: bool,
}

impl SimChannel {
    /// Channel with an OS-seeded byte stream and the default capability
    /// limit.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            ..Self::seeded(0)
        }
    }

    /// Deterministic channel: the byte stream is a pure function of
    /// `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            limit: DEFAULT_LIMIT,
            keys: HashMap::new(),
            fail_next: 0,
            sessions_seen: 0,
            closed: false,
        }
    }

    /// Overrides the reported capability limit (0 = report no limit).
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    /// Installs a resident key whose public area `read_public` will serve.
    pub fn install_key(&mut self, handle: KeyHandle, public: DevicePublic) {
        self.keys.insert(handle, public);
    }

    /// Makes the next `n` get-random commands fail with a device error.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    /// Number of get-random commands that carried a session.
    pub fn sessions_seen(&self) -> usize {
        self.sessions_seen
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed);
        }
        Ok(())
    }
}

impl Default for SimChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceChannel for SimChannel {
    fn max_random_bytes(&mut self) -> Result<u16, DeviceError> {
        self.ensure_open()?;
        Ok(self.limit)
    }

    fn read_public(&mut self, handle: KeyHandle) -> Result<DevicePublic, DeviceError> {
        self.ensure_open()?;
        self.keys
            .get(&handle)
            .cloned()
            .ok_or(DeviceError::Code(0x018b))
    }

    fn get_random(
        &mut self,
        count: u16,
        session: Option<&Session>,
    ) -> Result<Vec<u8>, DeviceError> {
        self.ensure_open()?;

        if self.limit != 0 && count > self.limit {
            return Err(DeviceError::Code(0x02c4));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(DeviceError::Code(0x0921));
        }

        if session.is_some() {
            self.sessions_seen += 1;
        }

        let mut out = vec![0u8; count as usize];
        self.rng.fill_bytes(&mut out);
        Ok(out)
    }
}

impl PathChannel for SimChannel {
    fn open(_path: &str) -> Result<Self, DeviceError> {
        Ok(Self::new())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
