//! crates/eer_core/src/ids.rs
//! Movement identifiers and the generator that mints them.
//!
//! Ids are opaque to every consumer: they only need to be unique within a
//! report. Fresh ids are UUID-v4 strings whose random bytes come from a
//! ChaCha20 stream, so tests can pin the sequence with a seed while production
//! seeds from OS entropy.

use core::fmt;

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Opaque, unique-within-report movement identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(String);

impl MovementId {
    /// Wrap an existing identifier (e.g. one read back from an export).
    #[inline]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovementId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh `MovementId`s.
#[derive(Debug, Clone)]
pub struct MovementIdGen {
    rng: ChaCha20Rng,
}

impl MovementIdGen {
    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self { rng: ChaCha20Rng::from_entropy() }
    }

    /// Deterministic stream: `seed.to_le_bytes()` fills the first 8 bytes of
    /// the ChaCha20 seed, the remaining 24 bytes are zero.
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32) }
    }

    /// Mint the next id (UUID v4 layout, lowercase hyphenated).
    pub fn next_id(&mut self) -> MovementId {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        MovementId(uuid.hyphenated().to_string())
    }
}

impl Default for MovementIdGen {
    fn default() -> Self {
        Self::from_entropy()
    }
}
