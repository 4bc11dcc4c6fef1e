use rand::distributions::Distribution;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// A continuous distribution from which weights,
/// biases and weight perturbations are drawn.
///
/// Suports Serde so that it can be written directly
/// into configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum WeightDistribution {
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f32, std_dev: f32 },
    /// Uniform over `[low, high)`.
    Uniform { low: f32, high: f32 },
    /// Always yields the same value.
    Constant(f32),
}

impl WeightDistribution {
    /// Returns a uniform distribution of total width `range`
    /// centered on zero, i.e. over `[-range/2, range/2)`.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::WeightDistribution;
    ///
    /// assert_eq!(
    ///     WeightDistribution::centered_uniform(1.0),
    ///     WeightDistribution::Uniform { low: -0.5, high: 0.5 },
    /// );
    /// ```
    pub fn centered_uniform(range: f32) -> WeightDistribution {
        WeightDistribution::Uniform {
            low: -range / 2.0,
            high: range / 2.0,
        }
    }

    /// Returns whether the distribution's parameters
    /// describe a well-defined distribution.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::WeightDistribution;
    ///
    /// assert!(WeightDistribution::Normal { mean: 0.0, std_dev: 1.0 }.is_valid());
    /// assert!(!WeightDistribution::Normal { mean: 0.0, std_dev: -1.0 }.is_valid());
    /// assert!(!WeightDistribution::Uniform { low: 1.0, high: 0.0 }.is_valid());
    /// assert!(!WeightDistribution::Constant(f32::NAN).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Normal { mean, std_dev } => {
                mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0
            }
            Self::Uniform { low, high } => low.is_finite() && high.is_finite() && low <= high,
            Self::Constant(value) => value.is_finite(),
        }
    }
}

impl Distribution<f32> for WeightDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match *self {
            Self::Normal { mean, std_dev } => {
                let z: f32 = StandardNormal.sample(rng);
                mean + std_dev * z
            }
            Self::Uniform { low, high } => low + (high - low) * rng.gen::<f32>(),
            Self::Constant(value) => value,
        }
    }
}
