//! Probability distributions over actions.
mod categorical;
use anyhow::Result;
use candle_core::Tensor;
pub use categorical::Categorical;
use rand::Rng;

/// A batch of distributions, one per observation.
pub trait Distribution {
    /// Draws one sample per distribution in the batch.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Tensor>;

    /// Log-probabilities of `value`, one element per distribution in the batch.
    fn log_prob(&self, value: &Tensor) -> Result<Tensor>;

    /// Entropy of each distribution in the batch.
    fn entropy(&self) -> Result<Tensor>;

    /// The most probable value of each distribution in the batch.
    fn mode(&self) -> Result<Tensor>;
}
