use crate::strategies::StrategyError;

use carevo_nn::genomics::WeightDistribution;

use thiserror::Error;

/// An error type indicating an unusable
/// population configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("population size must be even and at least 2, got {0}")]
    PopulationSize(usize),
    #[error("generation limit must be at least 1")]
    NoGenerations,
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: usize,
        max: usize,
    },
    #[error("maximum sensor count {0} leaves no room for the speed input")]
    SensorCountOverflow(usize),
    #[error("networks need at least one hidden neuron")]
    NoHiddenNeurons,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f32 },
    #[error("{name} distribution is ill-defined: {distribution:?}")]
    InvalidDistribution {
        name: &'static str,
        distribution: WeightDistribution,
    },
}

/// An error type indicating a failed generation
/// transition. The population is left unchanged
/// whenever one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    #[error("population has not been initialized")]
    Uninitialized,
    #[error("expected {expected} scored agents, got {found}")]
    AgentCountMismatch { expected: usize, found: usize },
    /// A strategy returned a population of the wrong size.
    #[error("strategies produced {found} networks instead of {expected}")]
    PopulationSizeChanged { expected: usize, found: usize },
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}
