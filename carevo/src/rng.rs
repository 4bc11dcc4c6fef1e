use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source owned by a population and threaded
/// through every strategy. A fixed seed reproduces a
/// whole run.
pub type EvolutionRng = StdRng;

/// Returns a generator seeded with `seed`, or
/// from system entropy if none is given.
pub(crate) fn seeded(seed: Option<u64>) -> EvolutionRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Returns `true` with probability `chance`.
///
/// A chance of 0 never succeeds, and
/// a chance of 1 always does.
pub(crate) fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}
