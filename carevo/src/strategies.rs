//! The three transformations applied to a population
//! on every generation, in order: selection, crossover
//! and mutation.
//!
//! Each stage is a trait so that the [`Population`]
//! can hold any implementation behind a `Box`. All of
//! them receive the population's random source, which
//! is what makes a seeded run reproducible.
//!
//! [`Population`]: crate::Population
mod crossover;
mod elitism;
mod errors;
mod mutation;
mod selection;

pub use crossover::UniformCrossover;
pub use elitism::Elitism;
pub use errors::StrategyError;
pub use mutation::StandardMutation;
pub use selection::{RankBased, RouletteWheel};

use carevo_nn::networks::Network;

use rand::RngCore;

use std::sync::Arc;

/// A network paired with the fitness it
/// achieved during one generation's evaluation.
///
/// The network is shared with the population
/// that produced it, so scoring a generation
/// never copies weights.
#[derive(Clone, Debug)]
pub struct ScoredAgent {
    pub network: Arc<Network>,
    pub fitness: f32,
}

impl ScoredAgent {
    /// Pairs `network` with its `fitness`.
    pub fn new(network: Arc<Network>, fitness: f32) -> ScoredAgent {
        ScoredAgent { network, fitness }
    }
}

/// Chooses parents for the next generation.
pub trait SelectionStrategy: Send {
    /// Returns as many independent network copies as
    /// there are `agents`, drawn according to fitness.
    fn select(
        &mut self,
        agents: &[ScoredAgent],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError>;
}

/// Recombines selected parents into offspring.
pub trait CrossoverStrategy: Send {
    /// Consumes `parents` and returns the
    /// same number of offspring.
    fn crossover(
        &mut self,
        parents: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError>;
}

/// Perturbs offspring.
pub trait MutationStrategy: Send {
    /// Consumes `offspring` and returns the
    /// same number of mutated networks.
    fn mutate(
        &mut self,
        offspring: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError>;
}

impl<S: SelectionStrategy + ?Sized> SelectionStrategy for Box<S> {
    fn select(
        &mut self,
        agents: &[ScoredAgent],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        (**self).select(agents, rng)
    }
}

impl<S: CrossoverStrategy + ?Sized> CrossoverStrategy for Box<S> {
    fn crossover(
        &mut self,
        parents: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        (**self).crossover(parents, rng)
    }
}

impl<S: MutationStrategy + ?Sized> MutationStrategy for Box<S> {
    fn mutate(
        &mut self,
        offspring: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        (**self).mutate(offspring, rng)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ScoredAgent;

    use carevo_nn::genomics::{ActivationType, WeightDistribution};
    use carevo_nn::networks::{Network, NetworkParameters, OUTPUT_COUNT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use std::sync::Arc;

    pub fn parameters(input_count: usize, hidden_count: usize) -> NetworkParameters {
        NetworkParameters {
            input_count,
            hidden_count,
            output_count: OUTPUT_COUNT,
            hidden_activation: ActivationType::Tanh,
            output_activation: ActivationType::Tanh,
        }
    }

    pub fn network(input_count: usize, hidden_count: usize, seed: u64) -> Network {
        Network::random(
            &parameters(input_count, hidden_count),
            &WeightDistribution::Uniform {
                low: -1.0,
                high: 1.0,
            },
            &mut StdRng::seed_from_u64(seed),
        )
    }

    /// Agents over distinct random 3-4 networks,
    /// one per fitness value.
    pub fn agents(fitnesses: &[f32]) -> Vec<ScoredAgent> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &fitness)| ScoredAgent::new(Arc::new(network(3, 4, i as u64)), fitness))
            .collect()
    }

    /// Position of `network` among `agents`, if any.
    pub fn position(agents: &[ScoredAgent], network: &Network) -> Option<usize> {
        agents.iter().position(|a| *a.network == *network)
    }
}
