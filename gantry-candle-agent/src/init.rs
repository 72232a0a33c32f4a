use candle_nn::Init;
use serde::{Deserialize, Serialize};

/// Initializers of weights and biases.
///
/// Fan-in and fan-out are those of the weight of the layer, also when the
/// initializer is applied to its bias.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Initializer {
    /// Glorot uniform, `U(-a, a)` with `a = sqrt(6 / (fan_in + fan_out))`.
    XavierUniform,

    /// Glorot normal, `N(0, 2 / (fan_in + fan_out))`.
    XavierNormal,

    /// He uniform for ReLU, `U(-a, a)` with `a = sqrt(6 / fan_in)`.
    KaimingUniform,

    /// All zeros.
    Zeros,

    /// A constant.
    Constant(f64),

    /// Normal distribution.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        stdev: f64,
    },

    /// Uniform distribution on `[lo, up)`.
    Uniform {
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        up: f64,
    },
}

impl Initializer {
    /// Returns the candle initializer for a layer with the given fans.
    pub fn init(&self, fan_in: usize, fan_out: usize) -> Init {
        let (fan_in, fan_out) = (fan_in as f64, fan_out as f64);

        match self {
            Self::XavierUniform => {
                let a = (6.0 / (fan_in + fan_out)).sqrt();
                Init::Uniform { lo: -a, up: a }
            }
            Self::XavierNormal => Init::Randn {
                mean: 0.0,
                stdev: (2.0 / (fan_in + fan_out)).sqrt(),
            },
            Self::KaimingUniform => {
                let a = (6.0 / fan_in).sqrt();
                Init::Uniform { lo: -a, up: a }
            }
            Self::Zeros => Init::Const(0.0),
            Self::Constant(v) => Init::Const(*v),
            Self::Normal { mean, stdev } => Init::Randn {
                mean: *mean,
                stdev: *stdev,
            },
            Self::Uniform { lo, up } => Init::Uniform { lo: *lo, up: *up },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_xavier_uniform_bound() {
        match Initializer::XavierUniform.init(2, 4) {
            Init::Uniform { lo, up } => {
                assert!((up - 1.0).abs() < 1e-12);
                assert_eq!(lo, -up);
            }
            init => panic!("unexpected initializer {:?}", init),
        }
    }
}
