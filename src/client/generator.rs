//! Random identifiers and field values for test resources
//!
//! One generator is seeded per run and owned by the action client. Values
//! handed out are remembered so identifiers and string values never repeat
//! within the process, no matter how quickly they are requested.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (exclusive) for the numeric suffix of generated identifiers
const ID_RANGE: u32 = 100_000_000;

/// Upper bound (exclusive) for the numeric suffix of generated strings
const STRING_RANGE: u32 = 1_000_000;

/// Upper bound (exclusive) for generated integer field values
const INTEGER_RANGE: i64 = 100;

/// Seeded value source for a validation run
pub struct Generator {
    rng: StdRng,
    issued: HashSet<String>,
}

impl Generator {
    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// Identifier for a resource that has not been used before in this run.
    pub fn next_id(&mut self) -> String {
        self.unique("test-id", ID_RANGE)
    }

    /// Value for a string property, distinct from every earlier one.
    pub fn next_string(&mut self) -> String {
        self.unique("test-string", STRING_RANGE)
    }

    pub fn next_integer(&mut self) -> i64 {
        self.rng.gen_range(0..INTEGER_RANGE)
    }

    pub fn next_number(&mut self) -> f64 {
        let cents: i64 = self.rng.gen_range(0..INTEGER_RANGE * 100);
        cents as f64 / 100.0
    }

    fn unique(&mut self, prefix: &str, range: u32) -> String {
        loop {
            let candidate = format!("{}-{}", prefix, self.rng.gen_range(0..range));
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
