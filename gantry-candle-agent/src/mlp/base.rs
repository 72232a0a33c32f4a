use super::MlpConfig;
use crate::{
    model::SubModel1,
    util::{layer_norm, linear},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{LayerNorm, Linear, Module, VarBuilder};

/// Multilayer perceptron.
///
/// Hidden layers are `linear -> layer norm (optional) -> nonlinearity`.
/// The output layer is `linear -> output nonlinearity (optional)`.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    hidden: Vec<(Linear, Option<LayerNorm>)>,
    output: Linear,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let mut xs = xs.to_device(&self.device)?.to_dtype(DType::F32)?;

        for (layer, norm) in self.hidden.iter() {
            xs = layer.forward(&xs)?;
            if let Some(norm) = norm {
                xs = norm.forward(&xs)?;
            }
            if let Some(act) = &self.config.hidden_nonlinearity {
                xs = act.forward(&xs)?;
            }
        }

        let xs = self.output.forward(&xs)?;
        match &self.config.output_nonlinearity {
            Some(act) => Ok(act.forward(&xs)?),
            None => Ok(xs),
        }
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let mut in_dim = config.in_dim;
        let mut hidden = Vec::with_capacity(config.hidden_sizes.len());

        for (i, &out_dim) in config.hidden_sizes.iter().enumerate() {
            let layer = linear(
                in_dim,
                out_dim,
                &config.hidden_w_init,
                &config.hidden_b_init,
                vb.pp(format!("ln{}", i)),
            )?;
            let norm = match config.layer_normalization {
                true => Some(layer_norm(out_dim, vb.pp(format!("norm{}", i)))?),
                false => None,
            };
            hidden.push((layer, norm));
            in_dim = out_dim;
        }

        let output = linear(
            in_dim,
            config.out_dim,
            &config.output_w_init,
            &config.output_b_init,
            vb.pp("out"),
        )?;

        Ok(Self {
            config,
            device,
            hidden,
            output,
        })
    }
}
