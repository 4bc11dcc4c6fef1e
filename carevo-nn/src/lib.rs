//! # carevo-NN
//! The genotype and phenotype halves of the [`carevo`](../carevo) engine.
//!
//! Provides a [`Genome`] type, a linear array-of-neurons encoding of a network's
//! weights and biases whose topology may differ between individuals, and a
//! [`Network`] type, the two-layer feed-forward network realized from a genome.
//! Networks convert to and from genomes losslessly, which is what lets
//! crossover and mutation work on variable-width records while evaluation works
//! on dense matrices.
//!
//! [`Genome`]: crate::genomics::Genome
//! [`Network`]: crate::networks::Network
//!
//! # Example usage: a random controller and its chromosome
//! ```
//! use carevo_nn::{
//!     genomics::{ActivationType, WeightDistribution},
//!     networks::{Network, NetworkParameters, OUTPUT_COUNT},
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let parameters = NetworkParameters {
//!     input_count: 4,
//!     hidden_count: 3,
//!     output_count: OUTPUT_COUNT,
//!     hidden_activation: ActivationType::Tanh,
//!     output_activation: ActivationType::Tanh,
//! };
//! let init = WeightDistribution::Normal { mean: 0.0, std_dev: 1.0 };
//! let network = Network::random(&parameters, &init, &mut rng);
//!
//! // Speed reading followed by three sensor distances.
//! let controls = network.evaluate(&[0.5, 0.1, 0.9, 0.4]).unwrap();
//! assert_eq!(controls.len(), 2);
//!
//! let genome = network.to_genome();
//! assert_eq!(genome.hidden_count(), 3);
//! assert_eq!(Network::from_genome(&genome, network.activations()), network);
//! ```

pub mod genomics;
pub mod networks;
