//! Stochastic policies implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`CategoricalCnnPolicy`](policy::CategoricalCnnPolicy) combines a convolutional
//! feature extractor ([`Cnn`](cnn::Cnn)) with a dense head ([`Mlp`](mlp::Mlp))
//! and returns a [`Categorical`](distribution::Categorical) distribution over
//! discrete actions.
mod activation;
pub mod cnn;
pub mod discrete_cnn;
pub mod distribution;
mod init;
pub mod mlp;
pub mod model;
pub mod policy;
mod util;
pub use activation::Activation;
pub use init::Initializer;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
