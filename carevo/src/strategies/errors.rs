use carevo_nn::genomics::GenomeError;

use thiserror::Error;

/// An error type indicating that a strategy
/// could not transform its input population.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// Selection was given no agents.
    #[error("selection on an empty agent list")]
    NoAgents,
    /// The fitness values do not define a
    /// probability distribution (e.g. all zero).
    #[error("fitness sum {0} does not define a selection distribution")]
    DegenerateFitness(f32),
    /// An agent's fitness is negative, infinite or NaN
    /// where the strategy cannot make use of it.
    #[error("agent {index} has unusable fitness {fitness}")]
    InvalidFitness { index: usize, fitness: f32 },
    /// Crossover pairs individuals, so it
    /// needs an even population.
    #[error("crossover requires an even population, got {0}")]
    OddPopulation(usize),
    /// A genome operation failed.
    #[error(transparent)]
    Genome(#[from] GenomeError),
}
