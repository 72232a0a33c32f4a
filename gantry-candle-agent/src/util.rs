//! Layer constructors with explicit initializers.
use crate::Initializer;
use candle_core::Result;
use candle_nn::{conv::Conv2dConfig, Conv2d, LayerNorm, Linear, VarBuilder};

/// Linear layer whose weight and bias are initialized with the given initializers.
pub(crate) fn linear(
    in_dim: usize,
    out_dim: usize,
    w_init: &Initializer,
    b_init: &Initializer,
    vb: VarBuilder,
) -> Result<Linear> {
    let w = vb.get_with_hints((out_dim, in_dim), "weight", w_init.init(in_dim, out_dim))?;
    let b = vb.get_with_hints(out_dim, "bias", b_init.init(in_dim, out_dim))?;
    Ok(Linear::new(w, Some(b)))
}

/// 2D convolution with a square kernel and no padding.
///
/// Padding is applied by the caller, as candle only pads with zeros.
pub(crate) fn conv2d(
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    w_init: &Initializer,
    b_init: &Initializer,
    vb: VarBuilder,
) -> Result<Conv2d> {
    let fan_in = in_channels * kernel_size * kernel_size;
    let fan_out = out_channels * kernel_size * kernel_size;
    let w = vb.get_with_hints(
        (out_channels, in_channels, kernel_size, kernel_size),
        "weight",
        w_init.init(fan_in, fan_out),
    )?;
    let b = vb.get_with_hints(out_channels, "bias", b_init.init(fan_in, fan_out))?;
    let config = Conv2dConfig {
        stride,
        ..Default::default()
    };
    Ok(Conv2d::new(w, Some(b), config))
}

/// Layer normalization over the last dimension of size `dim`.
pub(crate) fn layer_norm(dim: usize, vb: VarBuilder) -> Result<LayerNorm> {
    candle_nn::layer_norm(dim, 1e-5, vb)
}
