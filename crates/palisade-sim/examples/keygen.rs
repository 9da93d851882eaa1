// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Draws device-sourced bytes and generates an RSA key from them.
//!
//! Uses the simulated channel; swap in any `DeviceChannel` implementation
//! to run against real hardware.

use palisade_rand::HsmRng;
use palisade_sim::SimChannel;
use rsa::RsaPrivateKey;
use rsa::traits::PublicKeyParts;

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

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rng = HsmRng::new(SimChannel::new())?;

    let mut random = [0u8; 32];
    rng.fill(&mut random)?;

    print!("Random bytes: ");
    for byte in &random {
        print!("{byte:02x}");
    }
    println!();

    let key = RsaPrivateKey::new(&mut KeygenRng(&rng), 2048)?;
    println!("Generated {}-bit RSA key", key.size() * 8);

    print!("Modulus: ");
    for byte in key.n().to_bytes_be() {
        print!("{byte:02x}");
    }
    println!();

    Ok(())
}
