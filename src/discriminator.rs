//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Allocation of process-unique, nonzero 32-bit BFD discriminators.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::Rng;

/// Number of collision retries before giving up (RFC silent on a bound;
/// statistically unreachable below ~10^5 live sessions).
const MAX_ATTEMPTS: usize = 100;

/// Thread-safe allocator for local BFD discriminators.
#[derive(Debug, Default)]
pub struct DiscriminatorAllocator {
    allocated: Mutex<HashSet<u32>>,
}

/// Returned when 100 consecutive attempts all collided with an already
/// allocated value (or rolled zero).
#[derive(Debug, Eq, PartialEq)]
pub struct DiscriminatorExhausted;

impl std::fmt::Display for DiscriminatorExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exhausted discriminator allocation attempts")
    }
}

impl std::error::Error for DiscriminatorExhausted {}

impl DiscriminatorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a nonzero discriminator not currently in use.
    pub fn allocate(&self) -> Result<u32, DiscriminatorExhausted> {
        let mut allocated = self.allocated.lock().unwrap();
        let mut rng = rand::rng();
        for _ in 0..MAX_ATTEMPTS {
            let candidate: u32 = rng.random();
            if candidate != 0 && allocated.insert(candidate) {
                return Ok(candidate);
            }
        }
        Err(DiscriminatorExhausted)
    }

    /// Releases a previously allocated discriminator. Idempotent: releasing
    /// an unknown value is a no-op.
    pub fn release(&self, discriminator: u32) {
        self.allocated.lock().unwrap().remove(&discriminator);
    }

    pub fn len(&self) -> usize {
        self.allocated.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
