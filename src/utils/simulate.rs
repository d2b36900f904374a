//! Simulated sequences for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BASES: &[u8; 4] = b"ACGT";

pub fn test_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniformly random nucleotide sequence
pub fn random_sequence(rng: &mut StdRng, length: usize) -> Vec<u8> {
    (0..length).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// Copy of `sequence` with `percent`% of its positions substituted.
///
/// Each substitution picks a random position and replaces its base with a
/// different one, so the length never changes.
pub fn mutate_percent(rng: &mut StdRng, sequence: &[u8], percent: usize) -> Vec<u8> {
    let mut mutated = sequence.to_vec();
    let count = sequence.len() * percent / 100;
    for _ in 0..count {
        let position = rng.gen_range(0..mutated.len());
        let current = mutated[position];
        let replacement = loop {
            let base = BASES[rng.gen_range(0..4)];
            if base != current {
                break base;
            }
        };
        mutated[position] = replacement;
    }
    mutated
}
