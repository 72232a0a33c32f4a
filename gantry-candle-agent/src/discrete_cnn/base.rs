use super::DiscreteCnnConfig;
use crate::{cnn::Cnn, mlp::Mlp, model::SubModel1};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use log::trace;

/// A [`Cnn`] followed by an [`Mlp`], mapping images to one score per discrete value.
pub struct DiscreteCnn {
    cnn: Cnn,
    mlp: Mlp,
    output_dim: usize,
}

impl DiscreteCnn {
    /// Number of outputs.
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Dimension of the features passed from the convolutional layers to the dense head.
    pub fn feature_dim(&self) -> usize {
        self.cnn.out_dim()
    }
}

impl SubModel1 for DiscreteCnn {
    type Config = DiscreteCnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let features = self.cnn.forward(xs)?;
        trace!("features: {:?}", features.dims());
        self.mlp.forward(&features)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let cnn = Cnn::build(vb.pp("cnn"), config.cnn_config())?;
        let mlp = Mlp::build(vb.pp("mlp"), config.mlp_config(cnn.out_dim()))?;

        Ok(Self {
            cnn,
            mlp,
            output_dim: config.output_dim,
        })
    }
}
