use super::{config::ConvLayerPlan, CnnConfig, PaddingMode};
use crate::{
    model::SubModel1,
    util::{conv2d, layer_norm},
    Activation,
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv2d, LayerNorm, Module, VarBuilder};

struct ConvLayer {
    plan: ConvLayerPlan,
    conv: Conv2d,
    norm: Option<LayerNorm>,
}

/// Convolutional feature extractor.
///
/// Each layer applies padding, convolution, optional layer normalization over
/// `(C, H, W)`, the hidden nonlinearity and optional max pooling. The output is
/// flattened to `(N, out_dim)`.
pub struct Cnn {
    input_chw: (usize, usize, usize),
    padding_mode: PaddingMode,
    hidden_nonlinearity: Option<Activation>,
    is_image: bool,
    out_dim: usize,
    device: Device,
    layers: Vec<ConvLayer>,
}

impl Cnn {
    /// Dimension of the flattened output.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    fn pad(&self, xs: Tensor, p: usize) -> candle_core::Result<Tensor> {
        if p == 0 {
            return Ok(xs);
        }
        match self.padding_mode {
            PaddingMode::Zeros => xs.pad_with_zeros(2, p, p)?.pad_with_zeros(3, p, p),
            PaddingMode::Replicate => xs.pad_with_same(2, p, p)?.pad_with_same(3, p, p),
            PaddingMode::Reflect => reflect_pad(&reflect_pad(&xs, 2, p)?, 3, p),
            PaddingMode::Circular => circular_pad(&circular_pad(&xs, 2, p)?, 3, p),
        }
    }
}

/// Pads dimension `dim` by mirroring without repeating the edge; requires `p < size`.
pub(crate) fn reflect_pad(xs: &Tensor, dim: usize, p: usize) -> candle_core::Result<Tensor> {
    let n = xs.dim(dim)?;
    let ixs = (1..=p)
        .rev()
        .chain(0..n)
        .chain((n - 1 - p..n - 1).rev())
        .map(|i| i as u32)
        .collect::<Vec<_>>();
    let ixs = Tensor::new(ixs.as_slice(), xs.device())?;
    xs.index_select(&ixs, dim)
}

/// Pads dimension `dim` by wrapping around; requires `p <= size`.
pub(crate) fn circular_pad(xs: &Tensor, dim: usize, p: usize) -> candle_core::Result<Tensor> {
    let n = xs.dim(dim)?;
    let head = xs.narrow(dim, n - p, p)?;
    let tail = xs.narrow(dim, 0, p)?;
    Tensor::cat(&[&head, xs, &tail], dim)
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let (c, h, w) = self.input_chw;
        let n = xs.dim(0)?;
        let mut xs = xs
            .to_device(&self.device)?
            .to_dtype(DType::F32)?
            .reshape((n, c, h, w))?;
        if self.is_image {
            xs = (xs / 255.0)?;
        }

        for layer in self.layers.iter() {
            xs = self.pad(xs, layer.plan.padding)?;
            xs = layer.conv.forward(&xs)?;
            if let Some(norm) = &layer.norm {
                let dims = xs.dims4()?;
                xs = norm.forward(&xs.flatten_from(1)?)?.reshape(dims)?;
            }
            if let Some(act) = &self.hidden_nonlinearity {
                xs = act.forward(&xs)?;
            }
            if let Some((k, s)) = layer.plan.pool {
                xs = xs.max_pool2d_with_stride(k, s)?;
            }
        }

        Ok(xs.flatten_from(1)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let plan = config.plan()?;
        let out_dim = config.out_dim()?;
        let device = vb.device().clone();
        let layers = plan
            .into_iter()
            .enumerate()
            .map(|(i, plan)| -> Result<ConvLayer> {
                let conv = conv2d(
                    plan.in_channels,
                    plan.out_channels,
                    plan.kernel_size,
                    plan.stride,
                    &config.hidden_w_init,
                    &config.hidden_b_init,
                    vb.pp(format!("c{}", i)),
                )?;
                let norm = match config.layer_normalization {
                    true => {
                        let (h, w) = plan.conv_hw;
                        Some(layer_norm(
                            plan.out_channels * h * w,
                            vb.pp(format!("norm{}", i)),
                        )?)
                    }
                    false => None,
                };
                Ok(ConvLayer { plan, conv, norm })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            input_chw: config.input_chw()?,
            padding_mode: config.padding_mode,
            hidden_nonlinearity: config.hidden_nonlinearity,
            is_image: config.is_image,
            out_dim,
            device,
            layers,
        })
    }
}
