// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random document IDs.

use ring::rand::{SecureRandom, SystemRandom};

/// Bytes of randomness per ID (rendered as twice as many hex chars).
const ID_BYTES: usize = 12;

/// Generate a random hex ID for a new document.
pub fn new_id() -> anyhow::Result<String> {
    let mut bytes = [0u8; ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("System RNG unavailable"))?;
    Ok(hex::encode(bytes))
}
