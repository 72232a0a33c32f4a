use crate::{
    cnn::{CnnConfig, PaddingMode},
    mlp::MlpConfig,
    Activation, Initializer,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
/// Configuration of [`DiscreteCnn`](super::DiscreteCnn).
///
/// The fields are passed to [`CnnConfig`] and [`MlpConfig`] as they are.
/// `hidden_w_init` and `hidden_b_init` apply to both the convolutional and the
/// hidden dense layers; `layer_normalization` to both stages as well.
pub struct DiscreteCnnConfig {
    pub input_shape: Vec<usize>,
    pub output_dim: usize,
    pub kernel_sizes: Vec<usize>,
    pub hidden_channels: Vec<usize>,
    pub strides: Vec<usize>,
    pub hidden_sizes: Vec<usize>,
    pub cnn_hidden_nonlinearity: Option<Activation>,
    pub mlp_hidden_nonlinearity: Option<Activation>,
    pub hidden_w_init: Initializer,
    pub hidden_b_init: Initializer,
    pub paddings: Vec<usize>,
    pub padding_mode: PaddingMode,
    pub max_pool: bool,
    pub pool_shape: Vec<usize>,
    pub pool_stride: Vec<usize>,
    pub output_nonlinearity: Option<Activation>,
    pub output_w_init: Initializer,
    pub output_b_init: Initializer,
    pub layer_normalization: bool,
    pub is_image: bool,
}

impl Default for DiscreteCnnConfig {
    fn default() -> Self {
        Self {
            input_shape: vec![],
            output_dim: 0,
            kernel_sizes: vec![],
            hidden_channels: vec![],
            strides: vec![1],
            hidden_sizes: vec![32, 32],
            cnn_hidden_nonlinearity: Some(Activation::Relu),
            mlp_hidden_nonlinearity: Some(Activation::Relu),
            hidden_w_init: Initializer::XavierUniform,
            hidden_b_init: Initializer::Zeros,
            paddings: vec![0],
            padding_mode: PaddingMode::Zeros,
            max_pool: false,
            pool_shape: vec![2],
            pool_stride: vec![1],
            output_nonlinearity: None,
            output_w_init: Initializer::XavierUniform,
            output_b_init: Initializer::Zeros,
            layer_normalization: false,
            is_image: false,
        }
    }
}

impl DiscreteCnnConfig {
    /// Creates a configuration with the given convolutional layers and default
    /// values for the other fields.
    pub fn new(kernel_sizes: Vec<usize>, hidden_channels: Vec<usize>) -> Self {
        Self {
            kernel_sizes,
            hidden_channels,
            ..Default::default()
        }
    }

    /// Sets the input shape.
    pub fn input_shape(mut self, v: Vec<usize>) -> Self {
        self.input_shape = v;
        self
    }

    /// Sets the output dimension.
    pub fn output_dim(mut self, v: usize) -> Self {
        self.output_dim = v;
        self
    }

    /// Sets the strides of the convolutional layers.
    pub fn strides(mut self, v: Vec<usize>) -> Self {
        self.strides = v;
        self
    }

    /// Sets the sizes of the hidden dense layers.
    pub fn hidden_sizes(mut self, v: Vec<usize>) -> Self {
        self.hidden_sizes = v;
        self
    }

    /// Sets the nonlinearity of the convolutional layers.
    pub fn cnn_hidden_nonlinearity(mut self, v: Option<Activation>) -> Self {
        self.cnn_hidden_nonlinearity = v;
        self
    }

    /// Sets the nonlinearity of the hidden dense layers.
    pub fn mlp_hidden_nonlinearity(mut self, v: Option<Activation>) -> Self {
        self.mlp_hidden_nonlinearity = v;
        self
    }

    /// Sets the weight initializer of the hidden layers.
    pub fn hidden_w_init(mut self, v: Initializer) -> Self {
        self.hidden_w_init = v;
        self
    }

    /// Sets the bias initializer of the hidden layers.
    pub fn hidden_b_init(mut self, v: Initializer) -> Self {
        self.hidden_b_init = v;
        self
    }

    /// Sets the paddings and the padding mode of the convolutional layers.
    pub fn paddings(mut self, v: Vec<usize>, mode: PaddingMode) -> Self {
        self.paddings = v;
        self.padding_mode = mode;
        self
    }

    /// Enables max pooling with the given windows and strides.
    pub fn max_pool(mut self, pool_shape: Vec<usize>, pool_stride: Vec<usize>) -> Self {
        self.max_pool = true;
        self.pool_shape = pool_shape;
        self.pool_stride = pool_stride;
        self
    }

    /// Sets the nonlinearity of the output layer.
    pub fn output_nonlinearity(mut self, v: Option<Activation>) -> Self {
        self.output_nonlinearity = v;
        self
    }

    /// Sets the weight initializer of the output layer.
    pub fn output_w_init(mut self, v: Initializer) -> Self {
        self.output_w_init = v;
        self
    }

    /// Sets the bias initializer of the output layer.
    pub fn output_b_init(mut self, v: Initializer) -> Self {
        self.output_b_init = v;
        self
    }

    /// Enables or disables layer normalization.
    pub fn layer_normalization(mut self, v: bool) -> Self {
        self.layer_normalization = v;
        self
    }

    /// Sets if inputs are images with pixel values in `[0, 255]`.
    pub fn is_image(mut self, v: bool) -> Self {
        self.is_image = v;
        self
    }

    /// Configuration of the convolutional feature extractor.
    pub fn cnn_config(&self) -> CnnConfig {
        CnnConfig {
            input_shape: self.input_shape.clone(),
            kernel_sizes: self.kernel_sizes.clone(),
            hidden_channels: self.hidden_channels.clone(),
            strides: self.strides.clone(),
            paddings: self.paddings.clone(),
            padding_mode: self.padding_mode,
            hidden_nonlinearity: self.cnn_hidden_nonlinearity,
            hidden_w_init: self.hidden_w_init.clone(),
            hidden_b_init: self.hidden_b_init.clone(),
            max_pool: self.max_pool,
            pool_shape: self.pool_shape.clone(),
            pool_stride: self.pool_stride.clone(),
            layer_normalization: self.layer_normalization,
            is_image: self.is_image,
        }
    }

    /// Configuration of the dense head taking `in_dim` features.
    pub fn mlp_config(&self, in_dim: usize) -> MlpConfig {
        MlpConfig {
            in_dim,
            hidden_sizes: self.hidden_sizes.clone(),
            out_dim: self.output_dim,
            hidden_nonlinearity: self.mlp_hidden_nonlinearity,
            hidden_w_init: self.hidden_w_init.clone(),
            hidden_b_init: self.hidden_b_init.clone(),
            output_nonlinearity: self.output_nonlinearity,
            output_w_init: self.output_w_init.clone(),
            output_b_init: self.output_b_init.clone(),
            layer_normalization: self.layer_normalization,
        }
    }
}
