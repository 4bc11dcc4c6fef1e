use super::Layer;

use thiserror::Error;

/// An error type indicating that a set of neuron
/// records does not describe a dimensionally
/// consistent network, or that a resize would
/// leave it without inputs or hidden neurons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// The layer has no neuron records at all.
    #[error("{0} layer has no neuron records")]
    EmptyLayer(Layer),
    /// A record's length disagrees with the width
    /// implied by the layer feeding it.
    #[error("{layer} neuron {index} has {found} genes, expected {expected}")]
    RecordWidth {
        layer: Layer,
        index: usize,
        expected: usize,
        found: usize,
    },
    /// The declared hidden count disagrees with
    /// the number of hidden records.
    #[error("genome declares {declared} hidden neurons but holds {found} records")]
    HiddenCountMismatch { declared: usize, found: usize },
    /// The genome would have no inputs.
    #[error("genome must have at least one input")]
    NoInputs,
    /// The genome would have no hidden neurons.
    #[error("genome must have at least one hidden neuron")]
    NoHiddenNeurons,
}
