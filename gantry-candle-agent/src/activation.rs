use candle_core::{Result, Tensor};
use candle_nn::{ops, Module};
use serde::{Deserialize, Serialize};

/// Activation functions of hidden and output layers.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// Rectified linear unit.
    Relu,

    /// Hyperbolic tangent.
    Tanh,

    /// Logistic sigmoid.
    Sigmoid,

    /// Exponential linear unit with the given alpha.
    Elu(f64),

    /// Gaussian error linear unit (tanh approximation).
    Gelu,

    /// Sigmoid linear unit.
    Silu,

    /// Leaky ReLU with the given negative slope.
    LeakyRelu(f64),
}

impl Module for Activation {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            Self::Relu => xs.relu(),
            Self::Tanh => xs.tanh(),
            Self::Sigmoid => ops::sigmoid(xs),
            Self::Elu(alpha) => xs.elu(*alpha),
            Self::Gelu => xs.gelu(),
            Self::Silu => xs.silu(),
            Self::LeakyRelu(slope) => ops::leaky_relu(xs, *slope),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_activation() -> Result<()> {
        let xs = Tensor::new(&[-2f32, 0.0, 3.0], &Device::Cpu)?;

        let ys: Vec<f32> = Activation::Relu.forward(&xs)?.to_vec1()?;
        assert_eq!(ys, vec![0.0, 0.0, 3.0]);

        let ys: Vec<f32> = Activation::LeakyRelu(0.5).forward(&xs)?.to_vec1()?;
        assert_eq!(ys, vec![-1.0, 0.0, 3.0]);

        let ys: Vec<f32> = Activation::Sigmoid.forward(&xs)?.to_vec1()?;
        assert!((ys[1] - 0.5).abs() < 1e-6);

        Ok(())
    }
}
