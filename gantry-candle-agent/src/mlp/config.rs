use crate::{Activation, Initializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub in_dim: usize,
    pub hidden_sizes: Vec<usize>,
    pub out_dim: usize,
    pub hidden_nonlinearity: Option<Activation>,
    pub hidden_w_init: Initializer,
    pub hidden_b_init: Initializer,
    pub output_nonlinearity: Option<Activation>,
    pub output_w_init: Initializer,
    pub output_b_init: Initializer,
    pub layer_normalization: bool,
}

impl MlpConfig {
    /// Creates configuration of an MLP with ReLU hidden layers, a linear output
    /// layer, Xavier-uniform weights and zero biases.
    pub fn new(in_dim: usize, hidden_sizes: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            hidden_sizes,
            out_dim,
            hidden_nonlinearity: Some(Activation::Relu),
            hidden_w_init: Initializer::XavierUniform,
            hidden_b_init: Initializer::Zeros,
            output_nonlinearity: None,
            output_w_init: Initializer::XavierUniform,
            output_b_init: Initializer::Zeros,
            layer_normalization: false,
        }
    }
}
