use super::errors::ConfigError;

use carevo_nn::genomics::{ActivationType, WeightDistribution};
use carevo_nn::networks::SPEED_INPUT_COUNT;

use serde::{Deserialize, Serialize};

use std::ops::RangeInclusive;

/// Configuration data for population generation
/// and evolution.
///
/// Missing fields take their value from
/// [`PopulationConfig::default`] when deserializing.
///
/// # Note
/// All quantities expressing probabilities must be in
/// the range [0.0, 1.0]; [`validate`] rejects any
/// configuration where they are not.
///
/// [`validate`]: PopulationConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of networks per generation. Must be
    /// even, since crossover works on pairs.
    pub size: usize,
    /// Number of generations after which the
    /// generation limit is considered reached.
    pub max_generations: usize,
    /// Seed of the population's random source.
    /// Drawn from system entropy if absent.
    pub seed: Option<u64>,
    /// Distribution of initial weights and biases,
    /// and of genes added by topology growth.
    pub weight_init: WeightDistribution,
    /// Admissible sensor and hidden-neuron counts.
    pub topology: TopologyBounds,
    /// Whether mutation may resample
    /// input and hidden counts.
    pub evolve_topology: bool,
    /// Activation function of hidden neurons.
    pub hidden_activation: ActivationType,
    /// Activation function of output neurons.
    pub output_activation: ActivationType,
    pub selection: SelectionConfig,
    pub crossover: CrossoverConfig,
    pub mutation: MutationConfig,
}

/// Bounds on network topology.
///
/// Each network also has one speed input on top of
/// its sensor inputs, so its input count lies in
/// `min_sensor_count + 1 ..= max_sensor_count + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyBounds {
    pub min_sensor_count: usize,
    pub max_sensor_count: usize,
    pub min_hidden_count: usize,
    pub max_hidden_count: usize,
}

impl TopologyBounds {
    /// Admissible network input counts.
    pub fn input_counts(&self) -> RangeInclusive<usize> {
        self.min_sensor_count + SPEED_INPUT_COUNT..=self.max_sensor_count + SPEED_INPUT_COUNT
    }

    /// Admissible hidden neuron counts.
    pub fn hidden_counts(&self) -> RangeInclusive<usize> {
        self.min_hidden_count..=self.max_hidden_count
    }
}

/// Available parent selection methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    RouletteWheel,
    RankBased,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub method: SelectionMethod,
    /// Wrap the selection method in an elitism decorator
    /// that preserves the best network ever seen.
    pub keep_best: bool,
}

/// Available crossover methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverMethod {
    Uniform,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossoverConfig {
    pub method: CrossoverMethod,
    /// Chance of swapping each shared gene.
    pub rate: f32,
}

/// Available mutation methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationMethod {
    Standard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    pub method: MutationMethod,
    /// Chance of perturbing each neuron, and of
    /// resampling each topology dimension.
    pub rate: f32,
    /// Distribution of the perturbation
    /// added to each gene.
    pub noise: WeightDistribution,
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: 50,
            max_generations: 100,
            seed: None,
            weight_init: WeightDistribution::Normal {
                mean: 0.0,
                std_dev: 0.5,
            },
            topology: TopologyBounds {
                min_sensor_count: 5,
                max_sensor_count: 5,
                min_hidden_count: 4,
                max_hidden_count: 4,
            },
            evolve_topology: false,
            hidden_activation: ActivationType::Tanh,
            output_activation: ActivationType::Tanh,
            selection: SelectionConfig {
                method: SelectionMethod::RouletteWheel,
                keep_best: true,
            },
            crossover: CrossoverConfig {
                method: CrossoverMethod::Uniform,
                rate: 0.5,
            },
            mutation: MutationConfig {
                method: MutationMethod::Standard,
                rate: 0.1,
                noise: WeightDistribution::centered_uniform(0.4),
            },
        }
    }
}

impl PopulationConfig {
    /// Checks that the configuration describes a runnable
    /// evolution, returning the first problem found.
    ///
    /// # Examples
    /// ```
    /// use carevo::{ConfigError, PopulationConfig};
    ///
    /// assert!(PopulationConfig::default().validate().is_ok());
    ///
    /// let odd = PopulationConfig {
    ///     size: 7,
    ///     ..PopulationConfig::default()
    /// };
    /// assert_eq!(odd.validate(), Err(ConfigError::PopulationSize(7)));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < 2 || self.size % 2 != 0 {
            return Err(ConfigError::PopulationSize(self.size));
        }
        if self.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }

        let t = &self.topology;
        check_range("sensor count", t.min_sensor_count, t.max_sensor_count)?;
        check_range("hidden count", t.min_hidden_count, t.max_hidden_count)?;
        if t.max_sensor_count.checked_add(SPEED_INPUT_COUNT).is_none() {
            return Err(ConfigError::SensorCountOverflow(t.max_sensor_count));
        }
        if t.min_hidden_count == 0 {
            return Err(ConfigError::NoHiddenNeurons);
        }

        check_rate("crossover rate", self.crossover.rate)?;
        check_rate("mutation rate", self.mutation.rate)?;
        check_distribution("weight initialization", &self.weight_init)?;
        check_distribution("mutation noise", &self.mutation.noise)?;
        Ok(())
    }
}

fn check_range(name: &'static str, min: usize, max: usize) -> Result<(), ConfigError> {
    if min > max {
        Err(ConfigError::InvertedRange { name, min, max })
    } else {
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { name, value })
    }
}

fn check_distribution(
    name: &'static str,
    distribution: &WeightDistribution,
) -> Result<(), ConfigError> {
    if distribution.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDistribution {
            name,
            distribution: *distribution,
        })
    }
}
