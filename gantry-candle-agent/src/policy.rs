//! Stochastic policies.
mod categorical_cnn;
mod config;
use crate::distribution::Distribution;
use anyhow::Result;
use candle_core::Tensor;
pub use categorical_cnn::CategoricalCnnPolicy;
pub use config::CategoricalCnnPolicyConfig;
use gantry_core::{record::Record, EnvSpec};
use rand::Rng;

/// A policy returning a distribution over actions for a batch of observations.
pub trait StochasticPolicy {
    /// Distribution over actions.
    type Dist: Distribution;

    /// Computes the action distributions for a batch of observations.
    ///
    /// Returns the distributions and additional information of the forward pass.
    fn forward(&self, observations: &Tensor) -> Result<(Self::Dist, Record)>;

    /// Specification of the environment the policy acts on.
    fn env_spec(&self) -> &EnvSpec;

    /// Name of the policy.
    fn name(&self) -> &str;

    /// Samples actions for a batch of observations.
    fn get_actions<R: Rng + ?Sized>(
        &self,
        observations: &Tensor,
        rng: &mut R,
    ) -> Result<(Tensor, Record)> {
        let (dist, info) = self.forward(observations)?;
        Ok((dist.sample(rng)?, info))
    }

    /// Samples an action for a single observation.
    fn get_action<R: Rng + ?Sized>(
        &self,
        observation: &Tensor,
        rng: &mut R,
    ) -> Result<(Tensor, Record)> {
        let (acts, info) = self.get_actions(&observation.unsqueeze(0)?, rng)?;
        Ok((acts.squeeze(0)?, info))
    }
}
