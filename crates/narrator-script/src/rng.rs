//! Seeded RNG for reproducible voice assignment.
//!
//! Random voice assignment takes any `rand::Rng`. Callers build one here from
//! an explicit seed, or from [`seed_from_source_hash`] so a script always
//! draws the same voices.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives a seed from a script's source hash, so the same script text always
/// gets the same random assignment.
pub fn seed_from_source_hash(source_hash: &str) -> u32 {
    let hash = blake3::hash(source_hash.as_bytes());
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
