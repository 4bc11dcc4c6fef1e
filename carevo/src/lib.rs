//! A generational genetic algorithm for evolving small
//! feed-forward controller networks, such as the driving
//! agents of a racing simulation.
//!
//! Every generation, the caller evaluates the population's
//! networks and reports one fitness per network. The population
//! then applies its selection, crossover and mutation strategies
//! to produce the next generation. Both the weights and, optionally,
//! the topology (input and hidden neuron counts) of the networks
//! are evolved. Networks and their genomes are supplied by the
//! [`carevo-nn`](../carevo_nn) crate.
//!
//! Populations own a seedable random source, so a
//! configuration with a fixed seed reproduces a run exactly.
//!
//! # Example usage: evolving a controller that drives straight at full throttle
//! ```
//! use carevo::{Population, PopulationConfig};
//!
//! let config = PopulationConfig {
//!     size: 10,
//!     max_generations: 5,
//!     seed: Some(7),
//!     ..PopulationConfig::default()
//! };
//! let mut population = Population::new(config).unwrap();
//! population.initialize();
//!
//! while !population.is_generation_limit_reached() {
//!     let agents = population.score_with(|network| {
//!         let inputs = vec![0.5; network.input_count()];
//!         let controls = network.evaluate(&inputs).unwrap();
//!         // Steering and throttle are both in [-1, 1].
//!         2.0 - controls[0].abs() + (1.0 + controls[1]) / 2.0
//!     });
//!     population.advance_generation(&agents).unwrap();
//! }
//!
//! assert_eq!(population.generation(), 5);
//! assert_eq!(population.networks().len(), 10);
//! ```

mod populations;
mod rng;
pub mod strategies;

pub use carevo_nn::{genomics, networks};
pub use populations::*;
pub use rng::EvolutionRng;
pub use strategies::ScoredAgent;
