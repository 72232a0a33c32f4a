use super::{CategoricalCnnPolicyConfig, StochasticPolicy};
use crate::{
    discrete_cnn::DiscreteCnn,
    distribution::{Categorical, Distribution},
    model::SubModel1,
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use gantry_core::{error::GantryError, record::Record, Env, EnvSpec, Policy, Space};
use log::{info, trace};
use rand::{rngs::SmallRng, SeedableRng};
use std::path::Path;

const POLICY_TYPE: &str = "CategoricalCnnPolicy";

/// A policy with a CNN and an MLP, sampling actions from a categorical distribution.
///
/// It only works with a non-empty [`Space::Discrete`] action space, and does not support
/// [`Space::Dict`] observation spaces. If the observation space is
/// [`Space::Image`], inputs are scaled by `1 / 255`.
///
/// The policy owns the [`VarMap`] of the model, which is trained by an external
/// algorithm through [`CategoricalCnnPolicy::varmap`].
pub struct CategoricalCnnPolicy {
    env_spec: EnvSpec,
    name: String,
    obs_shape: Vec<usize>,
    action_dim: usize,
    is_image: bool,
    module: DiscreteCnn,
    varmap: VarMap,
    device: Device,
    rng: SmallRng,
}

/// Checks the spaces of the environment before anything is built.
fn check_spaces(env_spec: &EnvSpec) -> Result<(), GantryError> {
    match env_spec.action_space {
        Space::Discrete { n } if n > 0 => {}
        Space::Discrete { .. } => {
            return Err(GantryError::UnsupportedActionSpace {
                policy: POLICY_TYPE.to_string(),
                expected: "non-empty Discrete".to_string(),
                got: "empty Discrete".to_string(),
            });
        }
        _ => {
            return Err(GantryError::UnsupportedActionSpace {
                policy: POLICY_TYPE.to_string(),
                expected: "Discrete".to_string(),
                got: env_spec.action_space.kind().to_string(),
            });
        }
    }
    if env_spec.observation_space.is_dict() {
        return Err(GantryError::UnsupportedObservationSpace {
            policy: POLICY_TYPE.to_string(),
            got: env_spec.observation_space.kind().to_string(),
        });
    }
    Ok(())
}

impl CategoricalCnnPolicy {
    /// Builds the policy for an environment.
    ///
    /// Fails with [`GantryError::UnsupportedActionSpace`] or
    /// [`GantryError::UnsupportedObservationSpace`] before any parameter is created.
    pub fn build(env_spec: &EnvSpec, config: CategoricalCnnPolicyConfig) -> Result<Self> {
        check_spaces(env_spec)?;

        let obs_shape = env_spec.observation_space.shape();
        let action_dim = env_spec.action_space.flat_dim();
        let is_image = env_spec.observation_space.is_image();
        let device: Device = config.device.unwrap_or_default().try_into()?;

        let model_config = config
            .model_config
            .input_shape(obs_shape.clone())
            .output_dim(action_dim)
            .is_image(is_image);
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let module = DiscreteCnn::build(vb.pp("policy"), model_config)?;

        info!(
            "Build {} {:?}, obs_shape = {:?}, action_dim = {}, feature_dim = {}",
            POLICY_TYPE,
            config.name,
            obs_shape,
            action_dim,
            module.feature_dim()
        );

        Ok(Self {
            env_spec: env_spec.clone(),
            name: config.name,
            obs_shape,
            action_dim,
            is_image,
            module,
            varmap,
            device,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// Shape of an observation.
    pub fn obs_shape(&self) -> &[usize] {
        &self.obs_shape
    }

    /// Number of actions.
    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Returns `true` if observations are images.
    pub fn is_image(&self) -> bool {
        self.is_image
    }

    /// The model.
    pub fn module(&self) -> &DiscreteCnn {
        &self.module
    }

    /// Parameters of the model.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters of the model in safetensors format.
    pub fn save_params(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(path.as_ref())?;
        info!("Save {} parameters into {:?}", self.name, path.as_ref());
        Ok(())
    }

    /// Loads the parameters of the model saved with [`CategoricalCnnPolicy::save_params`].
    pub fn load_params(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.load(path.as_ref())?;
        info!("Load {} parameters from {:?}", self.name, path.as_ref());
        Ok(())
    }

    /// Gives a batch axis to a single observation, otherwise reshapes the batch to
    /// `(batch_size,) + obs_shape`.
    fn batch(&self, observations: &Tensor) -> Result<Tensor> {
        if observations.dims() == self.obs_shape.as_slice() {
            return Ok(observations.unsqueeze(0)?);
        }
        let mut shape = vec![observations.dim(0)?];
        shape.extend_from_slice(&self.obs_shape);
        Ok(observations.reshape(shape)?)
    }
}

impl StochasticPolicy for CategoricalCnnPolicy {
    type Dist = Categorical;

    fn forward(&self, observations: &Tensor) -> Result<(Categorical, Record)> {
        let observations = self.batch(observations)?;
        trace!("observations: {:?}", observations.dims());
        let logits = self.module.forward(&observations)?;
        Ok((Categorical::from_logits(logits)?, Record::empty()))
    }

    fn env_spec(&self) -> &EnvSpec {
        &self.env_spec
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<E> Policy<E> for CategoricalCnnPolicy
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs: Tensor = obs.clone().into();
        let (dist, _) = self.forward(&obs.to_device(&self.device)?)?;
        Ok(dist.sample(&mut self.rng)?.into())
    }
}
