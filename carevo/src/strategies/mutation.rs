use super::{MutationStrategy, StrategyError};
use crate::rng::roll;
use crate::TopologyBounds;

use carevo_nn::genomics::{Genome, GenomeError, Layer, WeightDistribution};
use carevo_nn::networks::Network;

use rand::distributions::Distribution;
use rand::{Rng, RngCore};

/// Per-neuron noise mutation, with optional
/// resampling of a network's topology.
///
/// When topology evolution is enabled, each offspring first
/// gets two independent chances (each with probability `rate`)
/// to draw a new input count and a new hidden count within
/// the configured bounds. Fresh genes are drawn from the
/// initialization distribution.
///
/// Then, for every hidden and output neuron, with probability
/// `rate` a value drawn from the noise distribution is added
/// to each of the neuron's genes (bias included).
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMutation {
    rate: f32,
    noise: WeightDistribution,
    init: WeightDistribution,
    topology: Option<TopologyBounds>,
}

impl StandardMutation {
    /// Creates a weights-only mutation.
    pub fn new(rate: f32, noise: WeightDistribution, init: WeightDistribution) -> StandardMutation {
        StandardMutation {
            rate,
            noise,
            init,
            topology: None,
        }
    }

    /// Enables topology resampling within `bounds`.
    pub fn with_topology_evolution(self, bounds: TopologyBounds) -> StandardMutation {
        StandardMutation {
            topology: Some(bounds),
            ..self
        }
    }

    /// Returns the per-neuron (and per-resize)
    /// mutation probability.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Returns a mutated copy of `network`,
    /// keeping its activation functions.
    ///
    /// # Errors
    /// Returns an error if the topology bounds would leave
    /// the network without inputs or hidden neurons.
    pub fn mutate_network(
        &self,
        network: &Network,
        rng: &mut dyn RngCore,
    ) -> Result<Network, StrategyError> {
        let mut genome = network.to_genome();
        if let Some(bounds) = &self.topology {
            self.mutate_topology(&mut genome, bounds, rng)?;
        }
        for layer in [Layer::Hidden, Layer::Output] {
            for record in genome.neurons_mut(layer) {
                if roll(rng, self.rate) {
                    for gene in record.iter_mut() {
                        *gene += self.noise.sample(rng);
                    }
                }
            }
        }
        Ok(Network::from_genome(&genome, network.activations()))
    }

    fn mutate_topology(
        &self,
        genome: &mut Genome,
        bounds: &TopologyBounds,
        rng: &mut dyn RngCore,
    ) -> Result<(), GenomeError> {
        if roll(rng, self.rate) {
            let input_count = rng.gen_range(bounds.input_counts());
            genome.resize_inputs(input_count, &self.init, rng)?;
        }
        if roll(rng, self.rate) {
            let hidden_count = rng.gen_range(bounds.hidden_counts());
            genome.resize_hidden(hidden_count, &self.init, rng)?;
        }
        Ok(())
    }
}

impl MutationStrategy for StandardMutation {
    fn mutate(
        &mut self,
        offspring: Vec<Network>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        offspring
            .iter()
            .map(|network| self.mutate_network(network, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::network;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genes(network: &Network) -> Vec<f32> {
        let genome = network.to_genome();
        let mut genes = genome.neurons(Layer::Hidden).concat();
        genes.extend(genome.neurons(Layer::Output).concat());
        genes
    }

    fn bounds(sensors: (usize, usize), hidden: (usize, usize)) -> TopologyBounds {
        TopologyBounds {
            min_sensor_count: sensors.0,
            max_sensor_count: sensors.1,
            min_hidden_count: hidden.0,
            max_hidden_count: hidden.1,
        }
    }

    #[test]
    fn zero_rate_is_identity() {
        let mut mutation = StandardMutation::new(
            0.0,
            WeightDistribution::Normal {
                mean: 0.0,
                std_dev: 1.0,
            },
            WeightDistribution::Constant(0.0),
        )
        .with_topology_evolution(bounds((1, 8), (1, 8)));
        let offspring: Vec<Network> = (0..4).map(|i| network(3, 4, i)).collect();
        let mutated = mutation
            .mutate(offspring.clone(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(mutated, offspring);
    }

    #[test]
    fn full_rate_changes_every_gene() {
        let mut mutation = StandardMutation::new(
            1.0,
            WeightDistribution::Uniform {
                low: 0.5,
                high: 1.0,
            },
            WeightDistribution::Constant(0.0),
        );
        let offspring: Vec<Network> = (0..4).map(|i| network(3, 4, i)).collect();
        let mutated = mutation
            .mutate(offspring.clone(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        for (before, after) in offspring.iter().zip(&mutated) {
            assert_eq!(before.topology_id(), after.topology_id());
            assert_eq!(before.activations(), after.activations());
            for (x, y) in genes(before).iter().zip(genes(after)) {
                assert!(y - x >= 0.5 - 1e-5 && y - x <= 1.0 + 1e-5);
            }
        }
    }

    #[test]
    fn topology_resize_keeps_leading_genes() {
        let mutation = StandardMutation::new(
            1.0,
            WeightDistribution::Constant(0.0),
            WeightDistribution::Constant(9.0),
        )
        // Four sensors plus speed: five inputs.
        .with_topology_evolution(bounds((4, 4), (4, 4)));
        let parent = network(3, 4, 7);
        let child = mutation
            .mutate_network(&parent, &mut StdRng::seed_from_u64(0))
            .unwrap();

        assert_eq!(child.input_count(), 5);
        assert_eq!(child.hidden_count(), 4);
        let (before, after) = (parent.to_genome(), child.to_genome());
        for (old, new) in before
            .neurons(Layer::Hidden)
            .iter()
            .zip(after.neurons(Layer::Hidden))
        {
            assert_eq!(new.len(), 6);
            assert_eq!(new[..4], old[..]);
            assert_eq!(new[4..], [9.0, 9.0]);
        }
        assert_eq!(before.neurons(Layer::Output), after.neurons(Layer::Output));
    }

    #[test]
    fn resampled_topologies_stay_in_bounds() {
        let mut mutation = StandardMutation::new(
            1.0,
            WeightDistribution::Constant(0.0),
            WeightDistribution::centered_uniform(2.0),
        )
        .with_topology_evolution(bounds((2, 6), (1, 5)));
        let offspring: Vec<Network> = (0..20).map(|i| network(3, 4, i)).collect();
        let mutated = mutation
            .mutate(offspring, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(mutated.len(), 20);
        for network in &mutated {
            assert!((3..=7).contains(&network.input_count()));
            assert!((1..=5).contains(&network.hidden_count()));
            assert!(network.evaluate(&vec![0.1; network.input_count()]).is_ok());
        }
    }

    #[test]
    fn empty_offspring() {
        let mut mutation = StandardMutation::new(
            0.5,
            WeightDistribution::Constant(0.1),
            WeightDistribution::Constant(0.0),
        );
        assert_eq!(
            mutation.mutate(vec![], &mut StdRng::seed_from_u64(0)),
            Ok(vec![])
        );
    }
}
