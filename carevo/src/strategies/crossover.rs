use super::{CrossoverStrategy, StrategyError};
use crate::rng::roll;

use carevo_nn::genomics::{Genome, Layer};
use carevo_nn::networks::Network;

use rand::seq::SliceRandom;
use rand::RngCore;

/// Gene-wise uniform crossover.
///
/// Parents are shuffled into random pairs, and each pair
/// yields two offspring. Every gene the parents share is
/// swapped between the offspring with probability `rate`.
///
/// Parents of differing topologies share the genes of their
/// overlapping region: the leading hidden neurons' bias and
/// leading input weights, and the output neurons' bias and
/// leading hidden weights. Genes outside that region stay
/// with their original owner, so each offspring keeps its
/// parent's topology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformCrossover {
    rate: f32,
}

impl UniformCrossover {
    /// Creates a crossover swapping each
    /// shared gene with probability `rate`.
    pub fn new(rate: f32) -> UniformCrossover {
        UniformCrossover { rate }
    }

    /// Returns the per-gene swap probability.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Produces two offspring from a pair of parents. The
    /// first offspring has the topology and activation
    /// functions of `first`, the second those of `second`.
    pub fn cross_pair(
        &self,
        first: &Network,
        second: &Network,
        rng: &mut dyn RngCore,
    ) -> (Network, Network) {
        let mut first_genome = first.to_genome();
        let mut second_genome = second.to_genome();

        let shared_inputs = first.input_count().min(second.input_count());
        let shared_hidden = first.hidden_count().min(second.hidden_count());

        // Both layers' records start with the bias.
        self.swap_genes(
            &mut first_genome,
            &mut second_genome,
            Layer::Hidden,
            shared_inputs + 1,
            rng,
        );
        self.swap_genes(
            &mut first_genome,
            &mut second_genome,
            Layer::Output,
            shared_hidden + 1,
            rng,
        );

        (
            Network::from_genome(&first_genome, first.activations()),
            Network::from_genome(&second_genome, second.activations()),
        )
    }

    fn swap_genes(
        &self,
        first: &mut Genome,
        second: &mut Genome,
        layer: Layer,
        shared_genes: usize,
        rng: &mut dyn RngCore,
    ) {
        for (a, b) in first.neurons_mut(layer).zip(second.neurons_mut(layer)) {
            for (x, y) in a[..shared_genes].iter_mut().zip(&mut b[..shared_genes]) {
                if roll(rng, self.rate) {
                    std::mem::swap(x, y);
                }
            }
        }
    }
}

impl CrossoverStrategy for UniformCrossover {
    fn crossover(
        &mut self,
        parents: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        if parents.len() % 2 != 0 {
            return Err(StrategyError::OddPopulation(parents.len()));
        }
        let mut order: Vec<usize> = (0..parents.len()).collect();
        order.shuffle(rng);

        let mut offspring = Vec::with_capacity(parents.len());
        for pair in order.chunks_exact(2) {
            let (a, b) = self.cross_pair(&parents[pair[0]], &parents[pair[1]], rng);
            offspring.push(a);
            offspring.push(b);
        }
        Ok(offspring)
    }
}
