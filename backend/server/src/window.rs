//! # Sliding Window
//!
//! Bounded FIFO of the most recent numbers fetched from upstream, plus their average.
//!
//! ## Ingest
//!
//! - Snapshot the current contents as the previous state
//! - Append the whole batch in arrival order
//! - Drop from the front until at most `capacity` remain
//! - Average the survivors, rounded to 2 decimals, `0` when empty
//!
//! A batch at least `capacity` long replaces the window with its own tail.
//!
//! ## Sharing
//!
//! [`WindowAggregator`] is the only handle the server holds. Snapshot and
//! commit happen under one lock so concurrent requests never observe a
//! half-applied batch.
use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use serde::Serialize;
use upstream::Observation;

pub const DEFAULT_WINDOW_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    pub window_prev_state: Vec<Observation>,
    pub window_curr_state: Vec<Observation>,
    pub numbers: Vec<Observation>,
    pub avg: f64,
}

#[derive(Debug)]
pub struct SlidingWindow {
    capacity: usize,
    values: VecDeque<Observation>,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contents(&self) -> Vec<Observation> {
        self.values.iter().cloned().collect()
    }

    pub fn ingest_batch(&mut self, batch: Vec<Observation>) -> WindowReport {
        let window_prev_state = self.contents();

        // only the last `capacity` of the batch can survive
        let skip = batch.len().saturating_sub(self.capacity);
        self.values.extend(batch.iter().skip(skip).cloned());

        while self.values.len() > self.capacity {
            self.values.pop_front();
        }

        WindowReport {
            window_prev_state,
            window_curr_state: self.contents(),
            numbers: batch,
            avg: self.average(),
        }
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let sum: f64 = self.values.iter().map(Observation::value).sum();
        round2(sum / self.values.len() as f64)
    }
}

/// Rounds the exact binary value to 2 decimals, ties away from zero.
///
/// `2.675` is stored as `2.67499999...` and rounds down, exact ties such as
/// `2.625` round up. Scaling by 100 first would round twice.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);

    // value == mantissa * 2^shift exactly
    let (mantissa, shift) = match exponent {
        0 => (fraction, -1074),
        _ => (fraction | (1 << 52), exponent - 1075),
    };

    if shift >= 0 {
        // integral already
        return value;
    }

    let scaled = u128::from(mantissa) * 100;
    let shift = shift.unsigned_abs();
    let hundredths = if shift >= 64 {
        // scaled < 2^60, so below one half
        0
    } else {
        let half = 1u128 << (shift - 1);
        (scaled >> shift) + u128::from(scaled & ((1u128 << shift) - 1) >= half)
    };

    (hundredths as f64 / 100.0).copysign(value)
}

#[derive(Debug)]
pub struct WindowAggregator {
    window: Mutex<SlidingWindow>,
}

impl WindowAggregator {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(capacity)),
        }
    }

    pub fn ingest_batch(&self, batch: Vec<Observation>) -> WindowReport {
        // ingest never panics mid-update, so a poisoned window is still consistent
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ingest_batch(batch)
    }

    pub fn snapshot(&self) -> Vec<Observation> {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contents()
    }
}
