use serde::{Deserialize, Serialize};

/// An ActivationType represents the function
/// applied element-wise to a layer's weighted sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationType {
    // tanh(x)
    Tanh,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // 1 / (1 + exp(-x))
    Sigmoid,
    // x
    Identity,
}

impl ActivationType {
    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use carevo_nn::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::ReLU.apply(-3.0), 0.0);
    /// assert_eq!(ActivationType::Identity.apply(-3.0), -3.0);
    /// assert_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Tanh => x.tanh(),
            Self::ReLU => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Identity => x,
        }
    }
}
