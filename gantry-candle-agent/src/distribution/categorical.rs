use super::Distribution;
use anyhow::{bail, Result};
use candle_core::{DType, Tensor, D};
use candle_nn::ops::log_softmax;
use rand::{
    distributions::{Distribution as _, WeightedIndex},
    Rng,
};

/// Categorical distributions parametrized by logits of shape `(batch_size, n_categories)`.
///
/// Logits are normalized at construction, so [`Categorical::logits`] returns
/// log-probabilities.
#[derive(Clone, Debug)]
pub struct Categorical {
    logits: Tensor,
}

impl Categorical {
    /// Creates distributions from unnormalized logits.
    ///
    /// A 1-dimensional tensor is regarded as a batch of a single distribution.
    pub fn from_logits(logits: Tensor) -> Result<Self> {
        let logits = match logits.rank() {
            1 => logits.unsqueeze(0)?,
            2 => logits,
            r => bail!("logits must be of rank 1 or 2, got rank {}", r),
        };
        let logits = log_softmax(&logits.to_dtype(DType::F32)?, D::Minus1)?;
        Ok(Self { logits })
    }

    /// Normalized logits, i.e., log-probabilities.
    pub fn logits(&self) -> &Tensor {
        &self.logits
    }

    /// Probabilities.
    pub fn probs(&self) -> Result<Tensor> {
        Ok(self.logits.exp()?)
    }

    /// Number of categories, the size of the support.
    pub fn n_categories(&self) -> usize {
        self.logits.dims()[1]
    }

    /// Number of distributions in the batch.
    pub fn batch_size(&self) -> usize {
        self.logits.dims()[0]
    }
}

impl Distribution for Categorical {
    /// Returns the sampled categories as a `u32` tensor of shape `(batch_size,)`.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Tensor> {
        let probs: Vec<Vec<f32>> = self.probs()?.to_vec2()?;
        let samples = probs
            .iter()
            .map(|p| -> Result<u32> { Ok(WeightedIndex::new(p)?.sample(&mut *rng) as u32) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Tensor::from_vec(
            samples,
            (self.batch_size(),),
            self.logits.device(),
        )?)
    }

    fn log_prob(&self, value: &Tensor) -> Result<Tensor> {
        let ixs = value
            .to_device(self.logits.device())?
            .to_dtype(DType::U32)?
            .reshape((self.batch_size(), 1))?;
        Ok(self.logits.gather(&ixs, 1)?.squeeze(1)?)
    }

    fn entropy(&self) -> Result<Tensor> {
        Ok((self.logits.exp()? * &self.logits)?.sum(D::Minus1)?.neg()?)
    }

    fn mode(&self) -> Result<Tensor> {
        Ok(self.logits.argmax(D::Minus1)?)
    }
}
