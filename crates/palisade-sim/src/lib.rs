// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # palisade_sim
//!
//! Deterministic in-process device channel for
//! [`palisade_rand`](palisade_rand).
//!
//! [`SimChannel`] stands in for real hardware wherever tests or demos need
//! a device: it answers the capability query, serves resident-key public
//! areas, and streams pseudo-random bytes from a seeded software generator,
//! so a given seed always yields the same byte stream. Fault injection
//! ([`SimChannel::fail_next`]) makes retry behaviour testable through a
//! real channel type.
//!
//! ## Example
//!
//! ```rust
//! use palisade_rand::HsmRng;
//! use palisade_sim::SimChannel;
//!
//! let rng = HsmRng::new(SimChannel::seeded(7)).expect("Failed to build()");
//!
//! let mut seed = [0u8; 32];
//! rng.fill(&mut seed).expect("Failed to fill(..)");
//! ```

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod channel;

pub use channel::{DEFAULT_LIMIT, SimChannel};
