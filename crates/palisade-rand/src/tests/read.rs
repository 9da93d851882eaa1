// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::io::Read;

use rand_core::TryRngCore;

use crate::rng::{HsmRng, MAX_FILL};
use crate::support::test_utils::{MockChannel, MockChannelBehaviour};

#[test]
fn test_io_read_fills_small_buffers_completely() {
    let channel = MockChannel::new(MockChannelBehaviour::None).with_limit(16);
    let rng = HsmRng::new(channel).expect("Failed to build()");

    let mut buf = [0u8; 100];
    let mut reader = &rng;
    reader
        .read_exact(&mut buf)
        .expect("Failed to read_exact(..)");

    let expected: Vec<u8> = (0u8..100).collect();
    assert_eq!(buf.to_vec(), expected);
}

#[test]
fn test_io_read_clamps_oversized_buffers() {
    let channel = MockChannel::new(MockChannelBehaviour::None).with_limit(0);
    let probe = channel.probe();
    let rng = HsmRng::new(channel).expect("Failed to build()");

    let mut buf = vec![0u8; MAX_FILL + 5000];
    let mut reader = &rng;
    let n = reader.read(&mut buf).expect("Failed to read(..)");

    // Partial read at the protocol maximum, as the Read contract allows.
    assert_eq!(n, MAX_FILL);
    assert_eq!(probe.get_random_commands(), 1);
}

#[test]
fn test_try_fill_bytes_splits_oversized_destinations() {
    let channel = MockChannel::new(MockChannelBehaviour::None).with_limit(0);
    let probe = channel.probe();
    let mut rng = HsmRng::new(channel).expect("Failed to build()");

    let mut buf = vec![0u8; MAX_FILL + 1];
    rng.try_fill_bytes(&mut buf)
        .expect("Failed to try_fill_bytes(..)");

    assert_eq!(probe.get_random_commands(), 2);
}

#[test]
fn test_try_next_u64_draws_from_device() {
    let channel = MockChannel::new(MockChannelBehaviour::None);
    let mut rng = HsmRng::new(channel).expect("Failed to build()");

    // Mock pattern bytes 0..8, little endian.
    let value = rng.try_next_u64().expect("Failed to try_next_u64()");
    assert_eq!(value, u64::from_le_bytes([0, 1, 2, 3, 4, 5, 6, 7]));
}
