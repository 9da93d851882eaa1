// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities: an instrumented in-memory device channel.

mod mock_channel;

pub use mock_channel::{MockChannel, MockChannelBehaviour, MockProbe};
