// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Standard-interface surfaces over [`HsmRng`].
//!
//! [`std::io::Read`] gives streaming byte access (each call clamped to the
//! protocol maximum; the `Read` contract allows partial reads), and the
//! `rand_core` traits let the adapter feed anything in the `rand`
//! ecosystem — asymmetric key generation in particular.

use std::io;

use rand_core::{TryCryptoRng, TryRngCore};

use crate::error::RandError;
use crate::rng::{HsmRng, MAX_FILL};
use crate::traits::DeviceChannel;

impl<C: DeviceChannel> io::Read for &HsmRng<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let take = buf.len().min(MAX_FILL);
        self.fill(&mut buf[..take]).map_err(io::Error::other)
    }
}

impl<C: DeviceChannel> io::Read for HsmRng<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut this = &*self;
        this.read(buf)
    }
}

impl<C: DeviceChannel> TryRngCore for &HsmRng<C> {
    type Error = RandError;

    fn try_next_u32(&mut self) -> Result<u32, RandError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn try_next_u64(&mut self) -> Result<u64, RandError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        // rand_core has no length cap; split oversized destinations here.
        for chunk in dest.chunks_mut(MAX_FILL) {
            self.fill(chunk)?;
        }
        Ok(())
    }
}

impl<C: DeviceChannel> TryCryptoRng for &HsmRng<C> {}

impl<C: DeviceChannel> TryRngCore for HsmRng<C> {
    type Error = RandError;

    fn try_next_u32(&mut self) -> Result<u32, RandError> {
        (&*self).try_next_u32()
    }

    fn try_next_u64(&mut self) -> Result<u64, RandError> {
        (&*self).try_next_u64()
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        (&*self).try_fill_bytes(dest)
    }
}

impl<C: DeviceChannel> TryCryptoRng for HsmRng<C> {}
