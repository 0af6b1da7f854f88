//! Deterministic RNG hierarchy for synthetic data.
//!
//! A master seed expands into one sub-seed per series identifier via BLAKE3, so
//! a synthetic room's values depend only on `(master_seed, identifier)` and not on
//! the order in which rooms are generated.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn sub_seed(&self, identifier: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(identifier.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, identifier: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(identifier))
    }
}
