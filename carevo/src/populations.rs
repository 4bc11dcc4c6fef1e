//! A Population is a fixed-size collection of networks
//! evolved generation by generation, using fitness
//! scores computed by the caller as the source of
//! selective pressure.
mod config;
mod errors;
pub mod logging;

pub use config::{
    CrossoverConfig, CrossoverMethod, MutationConfig, MutationMethod, PopulationConfig,
    SelectionConfig, SelectionMethod, TopologyBounds,
};
pub use errors::{ConfigError, EvolutionError};
use logging::{StatsRecorder, AVG_FITNESS, MAX_FITNESS, MIN_FITNESS, TOPOLOGY_TRENDS};

use crate::rng::{self, EvolutionRng};
use crate::strategies::{
    CrossoverStrategy, Elitism, MutationStrategy, RankBased, RouletteWheel, ScoredAgent,
    SelectionStrategy, StandardMutation, UniformCrossover,
};

use carevo_nn::networks::{Network, NetworkParameters, TopologyId, OUTPUT_COUNT};

use log::{debug, info};
use rand::Rng;

use std::collections::BTreeMap;
use std::sync::Arc;

enum Phase {
    Uninitialized,
    Active(Vec<Arc<Network>>),
}

/// A population of controller networks.
///
/// A population starts out uninitialized; [`initialize`]
/// samples its first generation. From then on, each call to
/// [`advance_generation`] replaces the whole generation with
/// offspring produced by the selection, crossover and
/// mutation strategies, in that order.
///
/// [`initialize`]: Population::initialize
/// [`advance_generation`]: Population::advance_generation
pub struct Population {
    config: PopulationConfig,
    selection: Box<dyn SelectionStrategy>,
    crossover: Box<dyn CrossoverStrategy>,
    mutation: Box<dyn MutationStrategy>,
    recorder: Option<Box<dyn StatsRecorder>>,
    rng: EvolutionRng,
    phase: Phase,
    generation: usize,
}

impl Population {
    /// Creates an uninitialized population, building
    /// its strategies from the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use carevo::{Population, PopulationConfig, SelectionMethod};
    ///
    /// let mut config = PopulationConfig::default();
    /// config.selection.method = SelectionMethod::RankBased;
    ///
    /// let population = Population::new(config).unwrap();
    /// assert!(!population.is_initialized());
    ///
    /// let config = PopulationConfig {
    ///     size: 3,
    ///     ..PopulationConfig::default()
    /// };
    /// assert!(Population::new(config).is_err());
    /// ```
    pub fn new(config: PopulationConfig) -> Result<Population, ConfigError> {
        let selection = build_selection(&config);
        let crossover = build_crossover(&config);
        let mutation = build_mutation(&config);
        Population::with_strategies(config, selection, crossover, mutation)
    }

    /// Creates an uninitialized population that
    /// uses the given strategies.
    ///
    /// The strategy settings of `config` are ignored;
    /// everything else still applies.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_strategies(
        config: PopulationConfig,
        selection: Box<dyn SelectionStrategy>,
        crossover: Box<dyn CrossoverStrategy>,
        mutation: Box<dyn MutationStrategy>,
    ) -> Result<Population, ConfigError> {
        config.validate()?;
        Ok(Population {
            rng: rng::seeded(config.seed),
            config,
            selection,
            crossover,
            mutation,
            recorder: None,
            phase: Phase::Uninitialized,
            generation: 0,
        })
    }

    /// Sets the recorder that receives per-generation
    /// statistics, replacing any previous one.
    ///
    /// # Examples
    /// ```
    /// use carevo::logging::{EvolutionLogger, MAX_FITNESS};
    /// use carevo::{Population, PopulationConfig};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let config = PopulationConfig {
    ///     size: 4,
    ///     seed: Some(1),
    ///     ..PopulationConfig::default()
    /// };
    /// let mut population = Population::new(config).unwrap();
    /// let logger = Arc::new(Mutex::new(EvolutionLogger::new()));
    /// population.set_recorder(Box::new(Arc::clone(&logger)));
    ///
    /// population.initialize();
    /// let agents = population.score_with(|_| 2.0);
    /// population.advance_generation(&agents).unwrap();
    ///
    /// assert_eq!(logger.lock().unwrap().series(MAX_FITNESS), Some(&[2.0][..]));
    /// ```
    pub fn set_recorder(&mut self, recorder: Box<dyn StatsRecorder>) {
        self.recorder = Some(recorder);
    }

    /// Samples a fresh generation and resets the generation
    /// counter. May be called again to restart evolution.
    ///
    /// With topology evolution enabled, each network's input
    /// and hidden counts are drawn uniformly from the configured
    /// bounds. Otherwise every network has the minimum counts.
    pub fn initialize(&mut self) {
        let config = &self.config;
        let rng = &mut self.rng;
        let bounds = &config.topology;

        let networks: Vec<Arc<Network>> = (0..config.size)
            .map(|_| {
                let (input_count, hidden_count) = if config.evolve_topology {
                    (
                        rng.gen_range(bounds.input_counts()),
                        rng.gen_range(bounds.hidden_counts()),
                    )
                } else {
                    (*bounds.input_counts().start(), bounds.min_hidden_count)
                };
                let parameters = NetworkParameters {
                    input_count,
                    hidden_count,
                    output_count: OUTPUT_COUNT,
                    hidden_activation: config.hidden_activation,
                    output_activation: config.output_activation,
                };
                Arc::new(Network::random(&parameters, &config.weight_init, rng))
            })
            .collect();

        info!(
            "initialized {} networks (seed {:?}, inputs {:?}, hidden {:?})",
            networks.len(),
            config.seed,
            bounds.input_counts(),
            bounds.hidden_counts(),
        );
        self.phase = Phase::Active(networks);
        self.generation = 0;
    }

    /// Scores every network of the current generation
    /// with `evaluator`, in population order.
    ///
    /// Returns an empty list if the population
    /// is uninitialized.
    pub fn score_with<E>(&self, mut evaluator: E) -> Vec<ScoredAgent>
    where
        E: FnMut(&Network) -> f32,
    {
        self.networks()
            .iter()
            .map(|network| {
                let fitness = evaluator(network.as_ref());
                ScoredAgent::new(Arc::clone(network), fitness)
            })
            .collect()
    }

    /// Replaces the current generation with the offspring of
    /// `agents`, and increments the generation counter.
    ///
    /// `agents` must hold exactly one entry per member of
    /// the population, though not necessarily the current
    /// generation's networks.
    ///
    /// # Errors
    /// Returns an error if the population is uninitialized,
    /// if the agent count differs from the population size,
    /// or if a strategy fails. In all cases the population
    /// and its generation counter are left unchanged. State
    /// kept inside a strategy that already ran, such as the
    /// [`Elitism`] record, is not rolled back.
    pub fn advance_generation(&mut self, agents: &[ScoredAgent]) -> Result<(), EvolutionError> {
        if !self.is_initialized() {
            return Err(EvolutionError::Uninitialized);
        }
        let expected = self.config.size;
        if agents.len() != expected {
            return Err(EvolutionError::AgentCountMismatch {
                expected,
                found: agents.len(),
            });
        }

        let parents = self.selection.select(agents, &mut self.rng)?;
        let offspring = self.crossover.crossover(parents, &mut self.rng)?;
        let mutated = self.mutation.mutate(offspring, &mut self.rng)?;
        if mutated.len() != expected {
            return Err(EvolutionError::PopulationSizeChanged {
                expected,
                found: mutated.len(),
            });
        }

        self.record_statistics(agents);
        self.phase = Phase::Active(mutated.into_iter().map(Arc::new).collect());
        self.generation += 1;
        Ok(())
    }

    fn record_statistics(&mut self, agents: &[ScoredAgent]) {
        let (mut max, mut min, mut sum) = (f32::MIN, f32::MAX, 0.0);
        for agent in agents {
            max = agent.fitness.max(max);
            min = agent.fitness.min(min);
            sum += agent.fitness;
        }
        let mean = sum / agents.len() as f32;
        debug!(
            "generation {}: max fitness {}, mean fitness {}",
            self.generation, max, mean
        );

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(MAX_FITNESS, max);
            recorder.record(MIN_FITNESS, min);
            recorder.record(AVG_FITNESS, mean);

            let mut topologies: BTreeMap<TopologyId, usize> = BTreeMap::new();
            for agent in agents {
                *topologies.entry(agent.network.topology_id()).or_insert(0) += 1;
            }
            for (topology, count) in topologies {
                recorder.record(&format!("{}/{}", TOPOLOGY_TRENDS, topology), count as f32);
            }
        }
    }

    /// Returns whether the configured number
    /// of generations has been reached.
    pub fn is_generation_limit_reached(&self) -> bool {
        self.generation >= self.config.max_generations
    }

    /// Sets the generation counter back to 0
    /// without touching the population.
    pub fn reset_generation_counter(&mut self) {
        self.generation = 0;
    }

    /// Returns the number of generation transitions since
    /// initialization or the last counter reset.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's configuration.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Returns whether the population has been initialized.
    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    /// Returns the current generation's networks,
    /// or nothing if uninitialized.
    pub fn networks(&self) -> &[Arc<Network>] {
        match &self.phase {
            Phase::Uninitialized => &[],
            Phase::Active(networks) => networks,
        }
    }
}

fn build_selection(config: &PopulationConfig) -> Box<dyn SelectionStrategy> {
    let selection: Box<dyn SelectionStrategy> = match config.selection.method {
        SelectionMethod::RouletteWheel => Box::new(RouletteWheel),
        SelectionMethod::RankBased => Box::new(RankBased),
    };
    if config.selection.keep_best {
        Box::new(Elitism::new(selection))
    } else {
        selection
    }
}

fn build_crossover(config: &PopulationConfig) -> Box<dyn CrossoverStrategy> {
    match config.crossover.method {
        CrossoverMethod::Uniform => Box::new(UniformCrossover::new(config.crossover.rate)),
    }
}

fn build_mutation(config: &PopulationConfig) -> Box<dyn MutationStrategy> {
    match config.mutation.method {
        MutationMethod::Standard => {
            let mutation = StandardMutation::new(
                config.mutation.rate,
                config.mutation.noise,
                config.weight_init,
            );
            if config.evolve_topology {
                Box::new(mutation.with_topology_evolution(config.topology.clone()))
            } else {
                Box::new(mutation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::EvolutionLogger;
    use crate::strategies::StrategyError;

    use proptest::prelude::*;
    use rand::RngCore;

    use std::sync::Mutex;

    fn config(size: usize) -> PopulationConfig {
        PopulationConfig {
            size,
            max_generations: 3,
            seed: Some(5),
            ..PopulationConfig::default()
        }
    }

    fn initialized(config: PopulationConfig) -> Population {
        let mut population = Population::new(config).unwrap();
        population.initialize();
        population
    }

    /// Fails every call.
    struct Failing;

    impl MutationStrategy for Failing {
        fn mutate(
            &mut self,
            _offspring: Vec<Network>,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<Network>, StrategyError> {
            Err(StrategyError::NoAgents)
        }
    }

    /// Drops one network.
    struct Shrinking;

    impl MutationStrategy for Shrinking {
        fn mutate(
            &mut self,
            mut offspring: Vec<Network>,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<Network>, StrategyError> {
            offspring.pop();
            Ok(offspring)
        }
    }

    #[test]
    fn initialize_samples_configured_topology() {
        let population = initialized(config(6));
        assert!(population.is_initialized());
        assert_eq!(population.generation(), 0);
        assert_eq!(population.networks().len(), 6);
        for network in population.networks() {
            assert_eq!(network.input_count(), 6);
            assert_eq!(network.hidden_count(), 4);
            assert_eq!(network.output_count(), OUTPUT_COUNT);
        }
    }

    #[test]
    fn initialize_with_topology_evolution_stays_in_bounds() {
        let mut config = config(40);
        config.evolve_topology = true;
        config.topology = TopologyBounds {
            min_sensor_count: 2,
            max_sensor_count: 7,
            min_hidden_count: 1,
            max_hidden_count: 6,
        };
        let population = initialized(config);
        for network in population.networks() {
            assert!((3..=8).contains(&network.input_count()));
            assert!((1..=6).contains(&network.hidden_count()));
        }
    }

    #[test]
    fn oversized_sensor_bounds_are_rejected_at_setup() {
        let mut config = config(4);
        config.evolve_topology = true;
        config.topology.max_sensor_count = usize::MAX;
        assert!(matches!(
            Population::new(config),
            Err(ConfigError::SensorCountOverflow(_))
        ));
    }

    #[test]
    fn uninitialized_population_refuses_to_advance() {
        let mut population = Population::new(config(4)).unwrap();
        assert!(population.networks().is_empty());
        assert!(population.score_with(|_| 1.0).is_empty());
        assert_eq!(
            population.advance_generation(&[]),
            Err(EvolutionError::Uninitialized)
        );
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn agent_count_must_match() {
        let mut population = initialized(config(4));
        let mut agents = population.score_with(|_| 1.0);
        agents.pop();
        assert_eq!(
            population.advance_generation(&agents),
            Err(EvolutionError::AgentCountMismatch {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn failed_transition_leaves_population_unchanged() {
        let mut population = initialized(config(4));
        let before: Vec<Network> =
            population.networks().iter().map(|n| Network::clone(n)).collect();

        let agents = population.score_with(|_| 0.0);
        assert!(matches!(
            population.advance_generation(&agents),
            Err(EvolutionError::Strategy(StrategyError::DegenerateFitness(_)))
        ));
        let after: Vec<Network> = population.networks().iter().map(|n| Network::clone(n)).collect();
        assert_eq!(before, after);
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn strategy_failures_are_reported() {
        let config = config(4);
        let mut population = Population::with_strategies(
            config,
            Box::new(RouletteWheel),
            Box::new(UniformCrossover::new(0.5)),
            Box::new(Failing),
        )
        .unwrap();
        population.initialize();
        let agents = population.score_with(|_| 1.0);
        assert_eq!(
            population.advance_generation(&agents),
            Err(EvolutionError::Strategy(StrategyError::NoAgents))
        );

        let mut population = Population::with_strategies(
            PopulationConfig {
                seed: Some(5),
                size: 4,
                ..PopulationConfig::default()
            },
            Box::new(RouletteWheel),
            Box::new(UniformCrossover::new(0.5)),
            Box::new(Shrinking),
        )
        .unwrap();
        population.initialize();
        let agents = population.score_with(|_| 1.0);
        assert_eq!(
            population.advance_generation(&agents),
            Err(EvolutionError::PopulationSizeChanged {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(population.networks().len(), 4);
    }

    #[test]
    fn generation_limit_and_reset() {
        let mut population = initialized(config(4));
        while !population.is_generation_limit_reached() {
            let agents = population.score_with(|n| 1.0 + n.hidden_count() as f32);
            population.advance_generation(&agents).unwrap();
        }
        assert_eq!(population.generation(), 3);

        population.reset_generation_counter();
        assert_eq!(population.generation(), 0);
        assert!(!population.is_generation_limit_reached());
        assert_eq!(population.networks().len(), 4);

        population.initialize();
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut config = config(6);
            config.evolve_topology = true;
            config.topology.max_sensor_count = 8;
            config.topology.max_hidden_count = 6;
            let mut population = initialized(config);
            for _ in 0..3 {
                let agents = population.score_with(|n| {
                    let out = n.evaluate(&vec![0.5; n.input_count()]).unwrap();
                    2.0 + out[0]
                });
                population.advance_generation(&agents).unwrap();
            }
            population
                .networks()
                .iter()
                .map(|n| Network::clone(n))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn recorder_receives_statistics() {
        let logger = Arc::new(Mutex::new(EvolutionLogger::new()));
        let mut population = initialized(config(4));
        population.set_recorder(Box::new(Arc::clone(&logger)));

        let fitnesses = [1.0, 2.0, 3.0, 6.0];
        let agents: Vec<ScoredAgent> = population
            .networks()
            .iter()
            .zip(fitnesses)
            .map(|(n, f)| ScoredAgent::new(Arc::clone(n), f))
            .collect();
        population.advance_generation(&agents).unwrap();

        let logger = logger.lock().unwrap();
        assert_eq!(logger.series(MAX_FITNESS), Some(&[6.0][..]));
        assert_eq!(logger.series(MIN_FITNESS), Some(&[1.0][..]));
        assert_eq!(logger.series(AVG_FITNESS), Some(&[3.0][..]));
        assert_eq!(logger.latest("topology-trends/6-4"), Some(4.0));
    }

    #[test]
    fn elitism_keeps_best_network() {
        let mut config = config(6);
        config.mutation.rate = 0.0;
        config.crossover.rate = 0.0;
        let mut population = initialized(config);

        // With crossover and mutation disabled, selected
        // copies of the standout network pass through unchanged.
        let champion = Network::clone(&population.networks()[0]);
        for _ in 0..5 {
            let agents = population.score_with(|n| if *n == champion { 10.0 } else { 0.1 });
            population.advance_generation(&agents).unwrap();
            assert!(population.networks().iter().any(|n| **n == champion));
        }
    }

    proptest! {
        #[test]
        fn population_size_is_preserved(
            half in 1usize..8,
            seed in any::<u64>(),
            evolve in any::<bool>(),
        ) {
            let mut config = config(half * 2);
            config.seed = Some(seed);
            config.evolve_topology = evolve;
            config.topology.max_sensor_count = 7;
            config.topology.max_hidden_count = 6;
            config.mutation.rate = 0.5;
            let mut population = initialized(config);
            for _ in 0..3 {
                let agents = population.score_with(|n| 1.0 + n.input_count() as f32);
                population.advance_generation(&agents).unwrap();
                prop_assert_eq!(population.networks().len(), half * 2);
            }
        }
    }
}
