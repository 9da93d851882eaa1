// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Pluggable retry strategies for device commands.
//!
//! The adapter wraps every get-random command in [`retry`]. Which delays
//! are slept between attempts — and when to give up — is entirely the
//! policy's decision, so callers can pick anything from fail-fast
//! ([`ConstantBackoff::none`]) to retry-forever (the
//! [`ExponentialBackoff`] default).

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::DeviceError;

/// Retry strategy consulted after every failed device command.
pub trait BackoffPolicy: Send {
    /// Delay before the next attempt, or `None` to give up.
    fn next_delay(&mut self) -> Option<Duration>;

    /// Restores the policy to its initial state.
    ///
    /// Called once at the start of every wrapped operation, so one policy
    /// instance serves any number of sequential commands.
    fn reset(&mut self);
}

/// Exponential backoff with randomized jitter.
///
/// Each delay is the current interval scaled by a random factor in
/// `[1 - randomization, 1 + randomization]`; the interval then grows by
/// `multiplier` up to `max_interval`. The policy gives up once
/// `max_elapsed` has passed since the first failure, or never if
/// `max_elapsed` is `None`.
pub struct ExponentialBackoff {
    initial: Duration,
    multiplier: f64,
    randomization: f64,
    max_interval: Duration,
    max_elapsed: Option<Duration>,
    current: Duration,
    started: Option<Instant>,
}

impl ExponentialBackoff {
    /// Policy starting at `initial`, with the default growth parameters.
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            current: initial,
            ..Self::default()
        }
    }

    /// Caps a single delay at `max`.
    pub fn with_max_interval(mut self, max: Duration) -> Self {
        self.max_interval = max;
        self
    }

    /// Gives up once `max` has elapsed since the first failure.
    ///
    /// `None` retries forever.
    pub fn with_max_elapsed(mut self, max: Option<Duration>) -> Self {
        self.max_elapsed = max;
        self
    }
}

impl Default for ExponentialBackoff {
    /// 500 ms initial interval, ×1.5 growth, ±50 % jitter, 60 s interval
    /// cap, give-up after 15 min.
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            multiplier: 1.5,
            randomization: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed: Some(Duration::from_secs(15 * 60)),
            current: Duration::from_millis(500),
            started: None,
        }
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if let Some(max) = self.max_elapsed {
            if started.elapsed() >= max {
                return None;
            }
        }

        let jitter = rand::rng().random_range(1.0 - self.randomization..=1.0 + self.randomization);
        let delay = self.current.mul_f64(jitter);
        self.current = self.current.mul_f64(self.multiplier).min(self.max_interval);

        Some(delay)
    }

    fn reset(&mut self) {
        self.current = self.initial;
        self.started = None;
    }
}

/// Constant-delay backoff with an optional retry cap.
pub struct ConstantBackoff {
    delay: Duration,
    max_retries: Option<usize>,
    used: usize,
}

impl ConstantBackoff {
    /// Retries forever with a fixed `delay` between attempts.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_retries: None,
            used: 0,
        }
    }

    /// Caps the number of retries (the initial attempt is not counted).
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Single-attempt policy: the first failure is final.
    pub fn none() -> Self {
        Self::new(Duration::ZERO).with_max_retries(0)
    }
}

impl BackoffPolicy for ConstantBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        match self.max_retries {
            Some(max) if self.used >= max => None,
            _ => {
                self.used += 1;
                Some(self.delay)
            }
        }
    }

    fn reset(&mut self) {
        self.used = 0;
    }
}

/// Runs `op`, retrying per `policy` until it succeeds or the policy gives
/// up. On give-up the last error `op` produced is returned.
///
/// No error classification happens here: every [`DeviceError`] is treated
/// as potentially transient. Callers that need fail-fast behaviour use
/// [`ConstantBackoff::none`].
pub fn retry<T>(
    policy: &mut dyn BackoffPolicy,
    mut op: impl FnMut() -> Result<T, DeviceError>,
) -> Result<T, DeviceError> {
    policy.reset();
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => match policy.next_delay() {
                Some(delay) => std::thread::sleep(delay),
                None => return Err(err),
            },
        }
    }
}
