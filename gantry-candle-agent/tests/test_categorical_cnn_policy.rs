use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use gantry_candle_agent::{
    cnn::PaddingMode,
    policy::{CategoricalCnnPolicy, CategoricalCnnPolicyConfig, StochasticPolicy},
    Activation, Initializer,
};
use gantry_core::{
    error::GantryError,
    record::Record,
    wrappers::EpisodicLife,
    Act, DefaultEvaluator, Env, EnvSpec, Evaluator, Lives, Obs, Space, Step,
};
use rand::{rngs::SmallRng, SeedableRng};
use std::collections::BTreeMap;
use tempdir::TempDir;

const N_ACTIONS: usize = 4;

#[derive(Clone, Debug)]
struct FrameObs(Tensor);

impl Obs for FrameObs {}

impl From<FrameObs> for Tensor {
    fn from(obs: FrameObs) -> Tensor {
        obs.0
    }
}

#[derive(Clone, Debug)]
struct PadAct(u32);

impl Act for PadAct {}

impl From<Tensor> for PadAct {
    fn from(t: Tensor) -> Self {
        Self(t.flatten_all().unwrap().to_vec1::<u32>().unwrap()[0])
    }
}

#[derive(Clone)]
struct LifeCounterConfig {
    initial_lives: usize,
    frames_per_life: usize,
}

/// Loses a life every `frames_per_life` frames, whatever the action is.
struct LifeCounterEnv {
    config: LifeCounterConfig,
    spec: EnvSpec,
    t: usize,
    lives: usize,
}

impl LifeCounterEnv {
    fn frame(&self) -> Result<FrameObs> {
        let t = Tensor::full((self.t % 256) as f32, (1, 8, 8), &Device::Cpu)?;
        Ok(FrameObs(t))
    }
}

impl Env for LifeCounterEnv {
    type Config = LifeCounterConfig;
    type Obs = FrameObs;
    type Act = PadAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            spec: EnvSpec::new(
                Space::Image {
                    shape: vec![1, 8, 8],
                },
                Space::Discrete { n: N_ACTIONS },
            ),
            t: 0,
            lives: config.initial_lives,
        })
    }

    fn spec(&self) -> &EnvSpec {
        &self.spec
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        assert!((a.0 as usize) < N_ACTIONS);
        self.t += 1;
        self.lives = self
            .config
            .initial_lives
            .saturating_sub(self.t / self.config.frames_per_life);
        let step = Step::new(self.frame()?, a.clone(), 1.0, self.lives == 0, false, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        self.lives = self.config.initial_lives;
        self.frame()
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

impl Lives for LifeCounterEnv {
    fn lives(&self) -> usize {
        self.lives
    }

    fn noop_act(&self) -> Self::Act {
        PadAct(0)
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn env_config() -> LifeCounterConfig {
    LifeCounterConfig {
        initial_lives: 3,
        frames_per_life: 3,
    }
}

fn image_spec() -> EnvSpec {
    EnvSpec::new(
        Space::Image {
            shape: vec![1, 8, 8],
        },
        Space::Discrete { n: N_ACTIONS },
    )
}

fn policy_config() -> CategoricalCnnPolicyConfig {
    CategoricalCnnPolicyConfig::new(vec![3, 3], vec![4, 8])
        .strides(vec![1, 2])
        .hidden_sizes(vec![16])
}

fn gantry_error(err: &anyhow::Error) -> Option<&GantryError> {
    err.downcast_ref::<GantryError>()
}

#[test]
fn test_rejects_non_discrete_action_space() {
    init_logger();
    let spec = EnvSpec::new(
        Space::Image {
            shape: vec![1, 8, 8],
        },
        Space::Box {
            shape: vec![2],
            low: -1.0,
            high: 1.0,
        },
    );

    let err = CategoricalCnnPolicy::build(&spec, policy_config())
        .err()
        .expect("build should fail");
    assert!(matches!(
        gantry_error(&err),
        Some(GantryError::UnsupportedActionSpace { .. })
    ));
}

#[test]
fn test_rejects_empty_action_space() {
    init_logger();
    let spec = EnvSpec::new(
        Space::Image {
            shape: vec![1, 8, 8],
        },
        Space::Discrete { n: 0 },
    );

    let err = CategoricalCnnPolicy::build(&spec, policy_config())
        .err()
        .expect("build should fail");
    assert!(matches!(
        gantry_error(&err),
        Some(GantryError::UnsupportedActionSpace { .. })
    ));
}

#[test]
fn test_rejects_dict_observation_space() {
    init_logger();
    let spaces = BTreeMap::from([(
        "screen".to_string(),
        Space::Image {
            shape: vec![1, 8, 8],
        },
    )]);
    let spec = EnvSpec::new(Space::Dict { spaces }, Space::Discrete { n: N_ACTIONS });

    let err = CategoricalCnnPolicy::build(&spec, policy_config())
        .err()
        .expect("build should fail");
    assert!(matches!(
        gantry_error(&err),
        Some(GantryError::UnsupportedObservationSpace { .. })
    ));
}

#[test]
fn test_forward_reshapes_flat_batch() -> Result<()> {
    init_logger();
    let policy = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;
    assert!(policy.is_image());
    assert_eq!(policy.obs_shape(), &[1, 8, 8]);
    assert_eq!(policy.action_dim(), N_ACTIONS);

    let obs = Tensor::rand(0f32, 255., (5, 64), &Device::Cpu)?;
    let (dist, info) = policy.forward(&obs)?;
    assert_eq!(dist.batch_size(), 5);
    assert_eq!(dist.n_categories(), N_ACTIONS);
    assert!(info.is_empty());

    let probs: Vec<Vec<f32>> = dist.probs()?.to_vec2()?;
    for p in probs.iter() {
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    Ok(())
}

#[test]
fn test_forward_single_observation() -> Result<()> {
    init_logger();
    let policy = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;

    let obs = Tensor::zeros((1, 8, 8), DType::F32, &Device::Cpu)?;
    let (dist, _) = policy.forward(&obs)?;
    assert_eq!(dist.batch_size(), 1);
    assert_eq!(dist.n_categories(), N_ACTIONS);

    let mut rng = SmallRng::seed_from_u64(42);
    let (act, _) = policy.get_action(&obs, &mut rng)?;
    assert_eq!(act.rank(), 0);
    assert!((act.to_scalar::<u32>()? as usize) < N_ACTIONS);

    let obs = Tensor::zeros((6, 1, 8, 8), DType::F32, &Device::Cpu)?;
    let (acts, _) = policy.get_actions(&obs, &mut rng)?;
    assert_eq!(acts.dims(), &[6]);

    Ok(())
}

#[test]
fn test_forward_rejects_wrong_size() -> Result<()> {
    init_logger();
    let policy = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;

    let obs = Tensor::zeros((3, 63), DType::F32, &Device::Cpu)?;
    assert!(policy.forward(&obs).is_err());

    Ok(())
}

#[test]
fn test_model_configuration_is_passed_through() -> Result<()> {
    init_logger();
    let config = policy_config()
        .paddings(vec![1], PaddingMode::Reflect)
        .max_pool(vec![2], vec![1])
        .hidden_nonlinearity(Some(Activation::Tanh), Some(Activation::Elu(1.0)))
        .hidden_init(Initializer::KaimingUniform, Initializer::Constant(0.01))
        .output_layer(None, Initializer::Zeros, Initializer::Zeros)
        .layer_normalization(true)
        .name("breakout_policy");
    let policy = CategoricalCnnPolicy::build(&image_spec(), config)?;
    assert_eq!(policy.name(), "breakout_policy");

    // 8 -> pad 10 -> conv 8 -> pool 7 -> pad 9 -> conv(stride 2) 4 -> pool 3
    assert_eq!(policy.module().feature_dim(), 8 * 3 * 3);
    {
        let data = policy.varmap().data().lock().unwrap();
        assert!(data.contains_key("policy.cnn.norm1.weight"));
        assert!(data.contains_key("policy.mlp.norm0.bias"));
        assert!(data.contains_key("policy.mlp.out.weight"));
    }

    // A zero output layer gives uniform probabilities.
    let obs = Tensor::rand(0f32, 255., (2, 1, 8, 8), &Device::Cpu)?;
    let (dist, _) = policy.forward(&obs)?;
    let probs: Vec<Vec<f32>> = dist.probs()?.to_vec2()?;
    for p in probs.iter().flatten() {
        assert!((p - 0.25).abs() < 1e-6);
    }

    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<()> {
    init_logger();
    let policy1 = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;
    let mut policy2 = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;

    let dir = TempDir::new("categorical_cnn_policy")?;
    let path = dir.path().join("policy.safetensors");
    policy1.save_params(&path)?;
    policy2.load_params(&path)?;

    let obs = Tensor::rand(0f32, 255., (3, 1, 8, 8), &Device::Cpu)?;
    let lp1 = policy1.forward(&obs)?.0.logits().clone();
    let lp2 = policy2.forward(&obs)?.0.logits().clone();
    let diff: f32 = (lp1 - lp2)?.abs()?.sum_all()?.to_scalar()?;
    assert!(diff < 1e-6);

    Ok(())
}

#[test]
fn test_evaluate_with_episodic_life() -> Result<()> {
    init_logger();
    let env = EpisodicLife::<LifeCounterEnv>::build(&env_config(), 0)?;
    let mut policy = CategoricalCnnPolicy::build(env.spec(), policy_config())?;
    let mut evaluator = DefaultEvaluator::from_env(env, 3)?;

    // Episodes end at each life loss: 3 frames, then a no-op frame followed by
    // 2 frames for each of the remaining lives.
    let record = evaluator.evaluate(&mut policy)?;
    let r = record.get_scalar("Episode return")?;
    assert!((r - 7.0 / 3.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_evaluate_without_wrapper() -> Result<()> {
    init_logger();
    let mut policy = CategoricalCnnPolicy::build(&image_spec(), policy_config())?;
    let mut evaluator = DefaultEvaluator::<LifeCounterEnv>::new(&env_config(), 0, 1)?;

    let record = evaluator.evaluate(&mut policy)?;
    assert_eq!(record.get_scalar("Episode return")?, 9.0);

    Ok(())
}
