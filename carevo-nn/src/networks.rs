//! A Network is the phenotype of a Genome: a two-layer
//! feed-forward network with dense, independently-sized
//! weight matrices. Hidden neurons apply one activation
//! function, output neurons another; both are configuration
//! shared by a whole run rather than evolvable state.
//!
//! Networks are immutable once built. Evaluation is a pure
//! function of the network and its inputs, so a population
//! can be evaluated concurrently from any number of threads.
mod errors;

pub use errors::NetworkError;

use crate::genomics::{ActivationType, Genome, Layer, BIAS_INDEX};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::iter;

/// Number of outputs of a controller network:
/// steering followed by throttle/brake.
pub const OUTPUT_COUNT: usize = 2;

/// Number of inputs reserved for the normalized
/// speed reading, ahead of the sensor readings.
pub const SPEED_INPUT_COUNT: usize = 1;

/// The activation functions of a network's two layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Activations {
    pub hidden: ActivationType,
    pub output: ActivationType,
}

/// Shape and activation functions of a network
/// to be randomly generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    pub input_count: usize,
    pub hidden_count: usize,
    pub output_count: usize,
    pub hidden_activation: ActivationType,
    pub output_activation: ActivationType,
}

impl NetworkParameters {
    /// Returns the activation functions of both layers.
    pub fn activations(&self) -> Activations {
        Activations {
            hidden: self.hidden_activation,
            output: self.output_activation,
        }
    }
}

/// A key identifying a network's topology,
/// displayed as `inputs-hidden` (e.g. `5-4`).
/// Only used for aggregate reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopologyId {
    pub input_count: usize,
    pub hidden_count: usize,
}

impl fmt::Display for TopologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.input_count, self.hidden_count)
    }
}

/// A fully-connected feed-forward network
/// with a single hidden layer.
///
/// Cloning produces a deep copy: no two networks
/// ever share weight storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    hidden_weights: Array2<f32>,
    hidden_biases: Array1<f32>,
    output_weights: Array2<f32>,
    output_biases: Array1<f32>,
    activations: Activations,
}

impl Network {
    /// Generates a network with every weight and bias
    /// independently drawn from `init`.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::{
    ///     genomics::{ActivationType, WeightDistribution},
    ///     networks::{Network, NetworkParameters},
    /// };
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let parameters = NetworkParameters {
    ///     input_count: 5,
    ///     hidden_count: 4,
    ///     output_count: 2,
    ///     hidden_activation: ActivationType::ReLU,
    ///     output_activation: ActivationType::Tanh,
    /// };
    /// let init = WeightDistribution::Uniform { low: -1.0, high: 1.0 };
    /// let network = Network::random(&parameters, &init, &mut StdRng::seed_from_u64(0));
    ///
    /// assert_eq!(network.input_count(), 5);
    /// assert_eq!(network.hidden_count(), 4);
    /// assert_eq!(network.output_count(), 2);
    /// assert_eq!(network.topology_id().to_string(), "5-4");
    /// ```
    pub fn random<D, R>(parameters: &NetworkParameters, init: &D, rng: &mut R) -> Network
    where
        D: Distribution<f32> + ?Sized,
        R: Rng + ?Sized,
    {
        let NetworkParameters {
            input_count,
            hidden_count,
            output_count,
            ..
        } = *parameters;
        let mut sample = || init.sample(rng);
        let hidden_weights = Array2::from_shape_simple_fn((hidden_count, input_count), &mut sample);
        let hidden_biases = Array1::from_shape_simple_fn(hidden_count, &mut sample);
        let output_weights =
            Array2::from_shape_simple_fn((output_count, hidden_count), &mut sample);
        let output_biases = Array1::from_shape_simple_fn(output_count, &mut sample);

        Network {
            hidden_weights,
            hidden_biases,
            output_weights,
            output_biases,
            activations: parameters.activations(),
        }
    }

    /// Realizes the network encoded by `genome`. Row `i` of a
    /// layer's weight matrix is record `i` without its bias;
    /// entry `i` of the bias vector is the record's bias.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::{
    ///     genomics::{ActivationType, Genome},
    ///     networks::{Activations, Network},
    /// };
    ///
    /// let genome = Genome::new(
    ///     2,
    ///     vec![vec![0.5, 1.0, 2.0]],
    ///     vec![vec![0.0, 1.0], vec![-1.0, 3.0]],
    /// )
    /// .unwrap();
    /// let activations = Activations {
    ///     hidden: ActivationType::Identity,
    ///     output: ActivationType::Identity,
    /// };
    /// let network = Network::from_genome(&genome, activations);
    ///
    /// // hidden = 0.5 + 1·1 + 2·1 = 3.5
    /// assert_eq!(network.evaluate(&[1.0, 1.0]).unwrap(), vec![3.5, -1.0 + 3.0 * 3.5]);
    /// ```
    pub fn from_genome(genome: &Genome, activations: Activations) -> Network {
        let (hidden_weights, hidden_biases) =
            Self::layer_from_records(genome.neurons(Layer::Hidden), genome.input_count());
        let (output_weights, output_biases) =
            Self::layer_from_records(genome.neurons(Layer::Output), genome.hidden_count());

        Network {
            hidden_weights,
            hidden_biases,
            output_weights,
            output_biases,
            activations,
        }
    }

    fn layer_from_records(records: &[Vec<f32>], width: usize) -> (Array2<f32>, Array1<f32>) {
        let weights = Array2::from_shape_fn((records.len(), width), |(i, j)| {
            records[i][BIAS_INDEX + 1 + j]
        });
        let biases = records.iter().map(|r| r[BIAS_INDEX]).collect::<Array1<f32>>();
        (weights, biases)
    }

    /// Exports the network's weights and biases as a genome.
    /// Inverse of [`Network::from_genome`].
    pub fn to_genome(&self) -> Genome {
        Genome::from_records_unchecked(
            self.input_count(),
            Self::records_from_layer(&self.hidden_weights, &self.hidden_biases),
            Self::records_from_layer(&self.output_weights, &self.output_biases),
        )
    }

    fn records_from_layer(weights: &Array2<f32>, biases: &Array1<f32>) -> Vec<Vec<f32>> {
        weights
            .axis_iter(Axis(0))
            .zip(biases)
            .map(|(row, bias)| iter::once(*bias).chain(row.iter().copied()).collect())
            .collect()
    }

    /// Feeds `inputs` forward through both layers and
    /// returns the output layer's activations.
    ///
    /// # Errors
    /// Returns [`NetworkError::DimensionMismatch`] if the
    /// length of `inputs` differs from the input count.
    /// Inputs are never truncated or padded.
    pub fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.input_count() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.input_count(),
                found: inputs.len(),
            });
        }
        let inputs = ArrayView1::from(inputs);

        let mut hidden = self.hidden_weights.dot(&inputs) + &self.hidden_biases;
        let hidden_activation = self.activations.hidden;
        hidden.mapv_inplace(|x| hidden_activation.apply(x));

        let mut output = self.output_weights.dot(&hidden) + &self.output_biases;
        let output_activation = self.activations.output;
        output.mapv_inplace(|x| output_activation.apply(x));

        Ok(output.to_vec())
    }

    /// Returns the number of inputs.
    pub fn input_count(&self) -> usize {
        self.hidden_weights.ncols()
    }

    /// Returns the number of hidden neurons.
    pub fn hidden_count(&self) -> usize {
        self.hidden_weights.nrows()
    }

    /// Returns the number of outputs.
    pub fn output_count(&self) -> usize {
        self.output_weights.nrows()
    }

    /// Returns the network's activation functions.
    pub fn activations(&self) -> Activations {
        self.activations
    }

    /// Returns the network's topology key.
    pub fn topology_id(&self) -> TopologyId {
        TopologyId {
            input_count: self.input_count(),
            hidden_count: self.hidden_count(),
        }
    }

    /// Hidden weights, `hidden_count × input_count`.
    pub fn hidden_weights(&self) -> ArrayView2<'_, f32> {
        self.hidden_weights.view()
    }

    pub fn hidden_biases(&self) -> ArrayView1<'_, f32> {
        self.hidden_biases.view()
    }

    /// Output weights, `output_count × hidden_count`.
    pub fn output_weights(&self) -> ArrayView2<'_, f32> {
        self.output_weights.view()
    }

    pub fn output_biases(&self) -> ArrayView1<'_, f32> {
        self.output_biases.view()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network {} ({:?} -> {:?})",
            self.topology_id(),
            self.activations.hidden,
            self.activations.output
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::WeightDistribution;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    const TANH: Activations = Activations {
        hidden: ActivationType::Tanh,
        output: ActivationType::Tanh,
    };

    fn parameters(input_count: usize, hidden_count: usize) -> NetworkParameters {
        NetworkParameters {
            input_count,
            hidden_count,
            output_count: OUTPUT_COUNT,
            hidden_activation: ActivationType::Tanh,
            output_activation: ActivationType::Tanh,
        }
    }

    fn random_network(input_count: usize, hidden_count: usize, seed: u64) -> Network {
        Network::random(
            &parameters(input_count, hidden_count),
            &WeightDistribution::Normal {
                mean: 0.0,
                std_dev: 1.0,
            },
            &mut StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn evaluate_shape() {
        let network = random_network(4, 3, 0);
        assert_eq!(network.evaluate(&[0.1, 0.2, 0.3, 0.4]).unwrap().len(), 2);
        assert_eq!(
            network.evaluate(&[0.1, 0.2, 0.3]),
            Err(NetworkError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn evaluate_known_values() {
        let genome = Genome::new(
            2,
            vec![vec![0.0, 1.0, -1.0], vec![1.0, 0.5, 0.5]],
            vec![vec![0.0, 1.0, 1.0], vec![0.5, -1.0, 0.0]],
        )
        .unwrap();
        let network = Network::from_genome(
            &genome,
            Activations {
                hidden: ActivationType::ReLU,
                output: ActivationType::Identity,
            },
        );
        // hidden = relu([2 - 1, 1 + 1 + 0.5]) = [1, 2.5]
        let output = network.evaluate(&[2.0, 1.0]).unwrap();
        assert_eq!(output, vec![3.5, -0.5]);
    }

    #[test]
    fn evaluate_applies_output_activation() {
        let network = random_network(3, 5, 9);
        for output in network.evaluate(&[10.0, -10.0, 10.0]).unwrap() {
            assert!((-1.0..=1.0).contains(&output));
        }
    }

    #[test]
    fn genome_layout() {
        let network = random_network(3, 2, 4);
        let genome = network.to_genome();

        assert_eq!(genome.input_count(), 3);
        assert_eq!(genome.hidden_count(), 2);
        assert_eq!(genome.output_count(), OUTPUT_COUNT);
        for (i, record) in genome.neurons(Layer::Hidden).iter().enumerate() {
            assert_eq!(record[BIAS_INDEX], network.hidden_biases()[i]);
            assert_eq!(&record[1..], network.hidden_weights().row(i).to_vec().as_slice());
        }
        for (i, record) in genome.neurons(Layer::Output).iter().enumerate() {
            assert_eq!(record.len(), 3);
            assert_eq!(record[BIAS_INDEX], network.output_biases()[i]);
        }
    }

    #[test]
    fn clone_is_independent() {
        let network = random_network(3, 3, 5);
        let mut genome = network.clone().to_genome();
        genome.neuron_mut(Layer::Hidden, 0).unwrap()[1] += 1.0;
        let altered = Network::from_genome(&genome, network.activations());

        assert_ne!(altered, network);
        assert_eq!(network, random_network(3, 3, 5));
    }

    #[test]
    fn keeps_activations_on_import() {
        let network = random_network(2, 2, 1);
        let activations = Activations {
            hidden: ActivationType::Sigmoid,
            output: ActivationType::Identity,
        };
        let imported = Network::from_genome(&network.to_genome(), activations);
        assert_eq!(imported.activations(), activations);
        assert_eq!(imported.hidden_weights(), network.hidden_weights());
    }

    proptest! {
        #[test]
        fn genome_round_trip(input_count in 1usize..10, hidden_count in 1usize..10, seed: u64) {
            let network = random_network(input_count, hidden_count, seed);
            let imported = Network::from_genome(&network.to_genome(), TANH);
            prop_assert_eq!(imported, network);
        }
    }
}
