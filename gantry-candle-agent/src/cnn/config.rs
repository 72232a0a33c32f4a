use crate::{Activation, Initializer};
use anyhow::Result;
use gantry_core::error::GantryError;
use serde::{Deserialize, Serialize};

/// How the input of a convolution is padded.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum PaddingMode {
    /// Pads with zeros.
    Zeros,

    /// Mirrors the input without repeating the edge.
    Reflect,

    /// Repeats the edge value.
    Replicate,

    /// Wraps around.
    Circular,
}

impl Default for PaddingMode {
    fn default() -> Self {
        Self::Zeros
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
///
/// `strides`, `paddings`, `pool_shape` and `pool_stride` hold one entry per
/// convolutional layer. A single entry is used for every layer.
pub struct CnnConfig {
    /// Shape of an input, `(C, H, W)` or `(H, W)` for a single channel.
    pub input_shape: Vec<usize>,
    pub kernel_sizes: Vec<usize>,
    pub hidden_channels: Vec<usize>,
    pub strides: Vec<usize>,
    pub paddings: Vec<usize>,
    pub padding_mode: PaddingMode,
    pub hidden_nonlinearity: Option<Activation>,
    pub hidden_w_init: Initializer,
    pub hidden_b_init: Initializer,
    pub max_pool: bool,
    pub pool_shape: Vec<usize>,
    pub pool_stride: Vec<usize>,
    pub layer_normalization: bool,
    /// If `true`, inputs are divided by 255.
    pub is_image: bool,
}

/// Resolved hyperparameters of a single convolutional layer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConvLayerPlan {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: usize,
    /// Pooling window and stride.
    pub pool: Option<(usize, usize)>,
    /// Height and width after the convolution (before pooling).
    pub conv_hw: (usize, usize),
    /// Height and width of the output of the layer.
    pub out_hw: (usize, usize),
}

fn invalid(msg: String) -> anyhow::Error {
    GantryError::InvalidConfig(msg).into()
}

/// Expands a per-layer list, broadcasting a single entry.
fn per_layer(name: &str, v: &[usize], n_layers: usize) -> Result<Vec<usize>> {
    match v.len() {
        1 => Ok(vec![v[0]; n_layers]),
        n if n == n_layers => Ok(v.to_vec()),
        n => Err(invalid(format!(
            "{} has {} entries for {} convolutional layers",
            name, n, n_layers
        ))),
    }
}

impl CnnConfig {
    /// Returns `(C, H, W)` of an input.
    pub(crate) fn input_chw(&self) -> Result<(usize, usize, usize)> {
        match self.input_shape[..] {
            [c, h, w] => Ok((c, h, w)),
            [h, w] => Ok((1, h, w)),
            _ => Err(invalid(format!(
                "input shape {:?} is not (C, H, W) or (H, W)",
                self.input_shape
            ))),
        }
    }

    /// Resolves and validates the hyperparameters of each layer.
    pub(crate) fn plan(&self) -> Result<Vec<ConvLayerPlan>> {
        let n_layers = self.kernel_sizes.len();
        if n_layers == 0 {
            return Err(invalid("no convolutional layer".to_string()));
        }
        if self.hidden_channels.len() != n_layers {
            return Err(invalid(format!(
                "{} kernel sizes but {} hidden channels",
                n_layers,
                self.hidden_channels.len()
            )));
        }
        let strides = per_layer("strides", &self.strides, n_layers)?;
        let paddings = per_layer("paddings", &self.paddings, n_layers)?;
        let (pool_shape, pool_stride) = match self.max_pool {
            true => (
                per_layer("pool_shape", &self.pool_shape, n_layers)?,
                per_layer("pool_stride", &self.pool_stride, n_layers)?,
            ),
            false => (vec![0; n_layers], vec![0; n_layers]),
        };

        let (mut c, mut h, mut w) = self.input_chw()?;
        let mut layers = Vec::with_capacity(n_layers);

        for i in 0..n_layers {
            let (k, s, p) = (self.kernel_sizes[i], strides[i], paddings[i]);
            if k == 0 || s == 0 {
                return Err(invalid(format!("layer {}: zero kernel size or stride", i)));
            }
            let limit = match self.padding_mode {
                PaddingMode::Reflect => h.min(w).saturating_sub(1),
                PaddingMode::Circular => h.min(w),
                PaddingMode::Zeros | PaddingMode::Replicate => usize::MAX,
            };
            if p > limit {
                return Err(invalid(format!(
                    "layer {}: padding {} is too wide for {:?} mode on a {}x{} input",
                    i, p, self.padding_mode, h, w
                )));
            }
            let conv_hw = (conv_out(h, k, s, p, i)?, conv_out(w, k, s, p, i)?);
            let (pool, out_hw) = match self.max_pool {
                true => {
                    let (pk, ps) = (pool_shape[i], pool_stride[i]);
                    let out_hw = (pool_out(conv_hw.0, pk, ps, i)?, pool_out(conv_hw.1, pk, ps, i)?);
                    (Some((pk, ps)), out_hw)
                }
                false => (None, conv_hw),
            };

            layers.push(ConvLayerPlan {
                in_channels: c,
                out_channels: self.hidden_channels[i],
                kernel_size: k,
                stride: s,
                padding: p,
                pool,
                conv_hw,
                out_hw,
            });

            c = self.hidden_channels[i];
            (h, w) = out_hw;
        }

        Ok(layers)
    }

    /// Dimension of the flattened output.
    pub fn out_dim(&self) -> Result<usize> {
        let plan = self.plan()?;
        let last = &plan[plan.len() - 1];
        Ok(last.out_channels * last.out_hw.0 * last.out_hw.1)
    }
}

fn conv_out(x: usize, k: usize, s: usize, p: usize, i: usize) -> Result<usize> {
    let padded = x + 2 * p;
    if padded < k {
        return Err(invalid(format!(
            "layer {}: kernel size {} exceeds padded input size {}",
            i, k, padded
        )));
    }
    Ok((padded - k) / s + 1)
}

fn pool_out(x: usize, k: usize, s: usize, i: usize) -> Result<usize> {
    if k == 0 || s == 0 || x < k {
        return Err(invalid(format!(
            "layer {}: pooling window {} with stride {} does not fit input size {}",
            i, k, s, x
        )));
    }
    Ok((x - k) / s + 1)
}
