//! Configuration of [`CategoricalCnnPolicy`](super::CategoricalCnnPolicy).
use crate::{cnn::PaddingMode, discrete_cnn::DiscreteCnnConfig, Activation, Device, Initializer};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`CategoricalCnnPolicy`](super::CategoricalCnnPolicy).
///
/// The input shape, the output dimension and the image flag of the model are
/// taken from the environment specification when the policy is built.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CategoricalCnnPolicyConfig {
    pub name: String,
    pub model_config: DiscreteCnnConfig,
    pub device: Option<Device>,
    /// Seed of the random number generator used in [`Policy::sample`].
    ///
    /// [`Policy::sample`]: gantry_core::Policy::sample
    pub seed: u64,
}

impl Default for CategoricalCnnPolicyConfig {
    fn default() -> Self {
        Self {
            name: "CategoricalCnnPolicy".to_string(),
            model_config: DiscreteCnnConfig::default(),
            device: None,
            seed: 42,
        }
    }
}

impl CategoricalCnnPolicyConfig {
    /// Creates a configuration with the given convolutional layers.
    ///
    /// `kernel_sizes[i]` and `hidden_channels[i]` are the kernel size and the number
    /// of output channels of the `i`-th convolutional layer.
    pub fn new(kernel_sizes: Vec<usize>, hidden_channels: Vec<usize>) -> Self {
        Self {
            model_config: DiscreteCnnConfig::new(kernel_sizes, hidden_channels),
            ..Default::default()
        }
    }

    /// Sets the name of the policy.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the configuration of the model.
    pub fn model_config(mut self, v: DiscreteCnnConfig) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the strides of the convolutional layers.
    pub fn strides(mut self, v: Vec<usize>) -> Self {
        self.model_config = self.model_config.strides(v);
        self
    }

    /// Sets the sizes of the hidden dense layers.
    pub fn hidden_sizes(mut self, v: Vec<usize>) -> Self {
        self.model_config = self.model_config.hidden_sizes(v);
        self
    }

    /// Sets the nonlinearities of the convolutional and the hidden dense layers.
    pub fn hidden_nonlinearity(mut self, cnn: Option<Activation>, mlp: Option<Activation>) -> Self {
        self.model_config = self
            .model_config
            .cnn_hidden_nonlinearity(cnn)
            .mlp_hidden_nonlinearity(mlp);
        self
    }

    /// Sets the weight and bias initializers of the hidden layers.
    pub fn hidden_init(mut self, w_init: Initializer, b_init: Initializer) -> Self {
        self.model_config = self.model_config.hidden_w_init(w_init).hidden_b_init(b_init);
        self
    }

    /// Sets the paddings and the padding mode of the convolutional layers.
    pub fn paddings(mut self, v: Vec<usize>, mode: PaddingMode) -> Self {
        self.model_config = self.model_config.paddings(v, mode);
        self
    }

    /// Enables max pooling.
    pub fn max_pool(mut self, pool_shape: Vec<usize>, pool_stride: Vec<usize>) -> Self {
        self.model_config = self.model_config.max_pool(pool_shape, pool_stride);
        self
    }

    /// Sets the nonlinearity and the initializers of the output layer.
    pub fn output_layer(
        mut self,
        nonlinearity: Option<Activation>,
        w_init: Initializer,
        b_init: Initializer,
    ) -> Self {
        self.model_config = self
            .model_config
            .output_nonlinearity(nonlinearity)
            .output_w_init(w_init)
            .output_b_init(b_init);
        self
    }

    /// Enables or disables layer normalization.
    pub fn layer_normalization(mut self, v: bool) -> Self {
        self.model_config = self.model_config.layer_normalization(v);
        self
    }

    /// Loads [`CategoricalCnnPolicyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of CategoricalCnnPolicy from {:?}", path_);
        Ok(b)
    }

    /// Saves [`CategoricalCnnPolicyConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of CategoricalCnnPolicy into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = CategoricalCnnPolicyConfig::new(vec![8, 4], vec![16, 32])
            .strides(vec![4, 2])
            .hidden_sizes(vec![64])
            .paddings(vec![1], PaddingMode::Reflect)
            .max_pool(vec![2], vec![2])
            .output_layer(
                Some(Activation::LeakyRelu(0.01)),
                Initializer::Normal {
                    mean: 0.0,
                    stdev: 0.01,
                },
                Initializer::Constant(0.1),
            )
            .layer_normalization(true)
            .device(Device::Cpu);

        let dir = TempDir::new("categorical_cnn_policy_config")?;
        let path = dir.path().join("policy.yaml");
        config.save(&path)?;
        let config_ = CategoricalCnnPolicyConfig::load(&path)?;
        assert_eq!(config_, config);

        Ok(())
    }
}
