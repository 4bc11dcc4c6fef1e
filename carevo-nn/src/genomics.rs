//! Genomes are the focus of evolution in carevo.
//! They are a linear encoding of a two-layer network:
//! one record per neuron, each holding the neuron's bias
//! followed by its incoming weights. Records can be
//! swapped gene-by-gene during crossover, and padded or
//! truncated during topology mutation, without caring
//! about the dense matrix layout of the phenotype.

mod activation;
mod distribution;
mod errors;

pub use activation::ActivationType;
pub use distribution::WeightDistribution;
pub use errors::GenomeError;

use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Index of the bias within a neuron record.
/// Incoming weights follow it.
pub const BIAS_INDEX: usize = 0;

/// One of the two layers encoded in a genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Neurons fed by the network inputs.
    Hidden,
    /// Neurons fed by the hidden layer.
    Output,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => write!(f, "hidden"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// A chromosome: the hidden and output neuron records
/// of a network, plus its declared input and hidden counts.
///
/// Every hidden record has `input_count + 1` genes and every
/// output record has `hidden_count + 1` genes. The invariant is
/// checked on construction and deserialization, and preserved
/// by every mutating method.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "GenomeRecords")]
pub struct Genome {
    input_count: usize,
    hidden_count: usize,
    hidden_neurons: Vec<Vec<f32>>,
    output_neurons: Vec<Vec<f32>>,
}

/// Unchecked mirror of [`Genome`] used during deserialization.
#[derive(Deserialize)]
struct GenomeRecords {
    input_count: usize,
    hidden_count: usize,
    hidden_neurons: Vec<Vec<f32>>,
    output_neurons: Vec<Vec<f32>>,
}

impl TryFrom<GenomeRecords> for Genome {
    type Error = GenomeError;

    fn try_from(records: GenomeRecords) -> Result<Genome, GenomeError> {
        if records.hidden_count != records.hidden_neurons.len() {
            return Err(GenomeError::HiddenCountMismatch {
                declared: records.hidden_count,
                found: records.hidden_neurons.len(),
            });
        }
        Genome::new(
            records.input_count,
            records.hidden_neurons,
            records.output_neurons,
        )
    }
}

impl Genome {
    /// Creates a genome from its neuron records.
    /// The hidden neuron count is the number of
    /// hidden records.
    ///
    /// # Errors
    /// Returns an error if either layer is empty, if
    /// `input_count` is 0, or if any record's length
    /// disagrees with the width implied by the layer below.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::{Genome, Layer};
    ///
    /// // 2 inputs, 1 hidden neuron, 2 outputs.
    /// let genome = Genome::new(
    ///     2,
    ///     vec![vec![0.1, 0.5, -0.5]],
    ///     vec![vec![0.0, 1.0], vec![0.2, -1.0]],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(genome.hidden_count(), 1);
    /// assert_eq!(genome.neurons(Layer::Output)[1], vec![0.2, -1.0]);
    ///
    /// // A hidden record missing a weight is rejected.
    /// assert!(Genome::new(2, vec![vec![0.1, 0.5]], vec![vec![0.0, 1.0]]).is_err());
    /// ```
    pub fn new(
        input_count: usize,
        hidden_neurons: Vec<Vec<f32>>,
        output_neurons: Vec<Vec<f32>>,
    ) -> Result<Genome, GenomeError> {
        if input_count == 0 {
            return Err(GenomeError::NoInputs);
        }
        if hidden_neurons.is_empty() {
            return Err(GenomeError::EmptyLayer(Layer::Hidden));
        }
        if output_neurons.is_empty() {
            return Err(GenomeError::EmptyLayer(Layer::Output));
        }
        let hidden_count = hidden_neurons.len();
        Self::check_widths(Layer::Hidden, &hidden_neurons, input_count + 1)?;
        Self::check_widths(Layer::Output, &output_neurons, hidden_count + 1)?;

        Ok(Genome {
            input_count,
            hidden_count,
            hidden_neurons,
            output_neurons,
        })
    }

    /// Builds a genome whose records are known
    /// to be consistent, e.g. exported from a network.
    pub(crate) fn from_records_unchecked(
        input_count: usize,
        hidden_neurons: Vec<Vec<f32>>,
        output_neurons: Vec<Vec<f32>>,
    ) -> Genome {
        debug_assert!(
            Self::check_widths(Layer::Hidden, &hidden_neurons, input_count + 1).is_ok()
        );
        debug_assert!(
            Self::check_widths(Layer::Output, &output_neurons, hidden_neurons.len() + 1).is_ok()
        );
        Genome {
            input_count,
            hidden_count: hidden_neurons.len(),
            hidden_neurons,
            output_neurons,
        }
    }

    fn check_widths(
        layer: Layer,
        records: &[Vec<f32>],
        expected: usize,
    ) -> Result<(), GenomeError> {
        match records.iter().position(|r| r.len() != expected) {
            Some(index) => Err(GenomeError::RecordWidth {
                layer,
                index,
                expected,
                found: records[index].len(),
            }),
            None => Ok(()),
        }
    }

    /// Returns the number of network inputs.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the number of hidden neurons.
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Returns the number of output neurons.
    pub fn output_count(&self) -> usize {
        self.output_neurons.len()
    }

    /// Returns the neuron records of a layer.
    pub fn neurons(&self, layer: Layer) -> &[Vec<f32>] {
        match layer {
            Layer::Hidden => &self.hidden_neurons,
            Layer::Output => &self.output_neurons,
        }
    }

    /// Returns a mutable view of one neuron record,
    /// or `None` if `index` is out of range. The record's
    /// length cannot be changed through the view.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::{Genome, Layer, BIAS_INDEX};
    ///
    /// let mut genome = Genome::new(1, vec![vec![0.0, 1.0]], vec![vec![0.0, 1.0]]).unwrap();
    /// genome.neuron_mut(Layer::Hidden, 0).unwrap()[BIAS_INDEX] = 3.0;
    ///
    /// assert_eq!(genome.neurons(Layer::Hidden)[0], vec![3.0, 1.0]);
    /// assert!(genome.neuron_mut(Layer::Output, 1).is_none());
    /// ```
    pub fn neuron_mut(&mut self, layer: Layer, index: usize) -> Option<&mut [f32]> {
        self.layer_mut(layer).get_mut(index).map(Vec::as_mut_slice)
    }

    /// Iterates over mutable views of every record of a layer.
    pub fn neurons_mut(&mut self, layer: Layer) -> impl Iterator<Item = &mut [f32]> {
        self.layer_mut(layer).iter_mut().map(Vec::as_mut_slice)
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Vec<f32>> {
        match layer {
            Layer::Hidden => &mut self.hidden_neurons,
            Layer::Output => &mut self.output_neurons,
        }
    }

    /// Changes the number of network inputs, resizing every
    /// hidden record. Shrinking truncates the trailing weights;
    /// growing appends weights drawn from `init`.
    ///
    /// # Errors
    /// Returns an error if `input_count` is 0.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::{Genome, Layer, WeightDistribution};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut genome = Genome::new(1, vec![vec![0.5, 1.0]], vec![vec![0.0, 1.0]]).unwrap();
    /// let mut rng = StdRng::seed_from_u64(0);
    /// genome
    ///     .resize_inputs(3, &WeightDistribution::Constant(9.0), &mut rng)
    ///     .unwrap();
    ///
    /// assert_eq!(genome.input_count(), 3);
    /// assert_eq!(genome.neurons(Layer::Hidden)[0], vec![0.5, 1.0, 9.0, 9.0]);
    /// ```
    pub fn resize_inputs<D, R>(
        &mut self,
        input_count: usize,
        init: &D,
        rng: &mut R,
    ) -> Result<(), GenomeError>
    where
        D: Distribution<f32> + ?Sized,
        R: Rng + ?Sized,
    {
        if input_count == 0 {
            return Err(GenomeError::NoInputs);
        }
        for record in &mut self.hidden_neurons {
            refit(record, input_count + 1, init, rng);
        }
        self.input_count = input_count;
        Ok(())
    }

    /// Changes the number of hidden neurons. Surplus records are
    /// removed from uniformly sampled positions; missing records
    /// are appended with every gene drawn from `init`. Output
    /// records are then truncated or padded (again from `init`)
    /// to the new hidden width.
    ///
    /// # Errors
    /// Returns an error if `hidden_count` is 0, as the
    /// last hidden neuron can never be removed.
    pub fn resize_hidden<D, R>(
        &mut self,
        hidden_count: usize,
        init: &D,
        rng: &mut R,
    ) -> Result<(), GenomeError>
    where
        D: Distribution<f32> + ?Sized,
        R: Rng + ?Sized,
    {
        if hidden_count == 0 {
            return Err(GenomeError::NoHiddenNeurons);
        }
        while self.hidden_neurons.len() > hidden_count {
            let index = rng.gen_range(0..self.hidden_neurons.len());
            self.hidden_neurons.remove(index);
        }
        while self.hidden_neurons.len() < hidden_count {
            let record = (0..=self.input_count).map(|_| init.sample(rng)).collect();
            self.hidden_neurons.push(record);
        }
        for record in &mut self.output_neurons {
            refit(record, hidden_count + 1, init, rng);
        }
        self.hidden_count = hidden_count;
        Ok(())
    }
}

/// Truncates `record` to `width`, or pads it with draws from `init`.
fn refit<D, R>(record: &mut Vec<f32>, width: usize, init: &D, rng: &mut R)
where
    D: Distribution<f32> + ?Sized,
    R: Rng + ?Sized,
{
    if record.len() > width {
        record.truncate(width);
    } else {
        let missing = width - record.len();
        record.extend((0..missing).map(|_| init.sample(rng)));
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Genome {{ inputs: {}, hidden: {}, outputs: {} }}",
            self.input_count,
            self.hidden_count,
            self.output_neurons.len()
        )?;
        for (layer, records) in [
            (Layer::Hidden, &self.hidden_neurons),
            (Layer::Output, &self.output_neurons),
        ] {
            for (i, record) in records.iter().enumerate() {
                writeln!(f, "\t{} {}: {:?}", layer, i, record)?;
            }
        }
        Ok(())
    }
}
