//! Evaluate [`Policy`].
use crate::{error::GantryError, record::Record, Env, Policy};
use anyhow::Result;
use log::info;

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Evaluates `policy` and returns the result as a [`Record`].
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>;
}

/// Runs a fixed number of episodes and reports the average return.
///
/// An episode ends when the environment reports termination or truncation, or
/// after [`EnvSpec::max_episode_length`] steps if the limit is set.
/// The returned [`Record`] has the key `"Episode return"`.
///
/// [`EnvSpec::max_episode_length`]: crate::EnvSpec::max_episode_length
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut r_total = 0f32;
        let max_episode_length = self.env.spec().max_episode_length;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut t = 0;

            loop {
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                t += 1;
                if step.is_done() || max_episode_length.is_some_and(|n| t >= n) {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        let r_mean = r_total / self.n_episodes as f32;
        info!("Evaluated {} episodes, average return {}", self.n_episodes, r_mean);
        Ok(Record::from_scalar("Episode return", r_mean))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Builds the environment from `config` and `seed`.
    ///
    /// Fails if `n_episodes` is zero.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Self::from_env(E::build(config, seed)?, n_episodes)
    }

    /// Evaluates on an environment that has already been built.
    ///
    /// Fails if `n_episodes` is zero.
    pub fn from_env(env: E, n_episodes: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(GantryError::InvalidConfig(
                "n_episodes of DefaultEvaluator must be positive".to_string(),
            )
            .into());
        }
        Ok(Self { n_episodes, env })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Act, EnvSpec, Obs, Space, Step};

    #[derive(Clone, Debug)]
    struct Counter(usize);

    impl Obs for Counter {}

    #[derive(Clone, Debug)]
    struct Stay;

    impl Act for Stay {}

    /// Terminates after `ix + 1` steps from `reset_with_index(ix)`.
    struct CountdownEnv {
        spec: EnvSpec,
        remaining: usize,
    }

    impl Env for CountdownEnv {
        type Config = ();
        type Obs = Counter;
        type Act = Stay;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self {
                spec: EnvSpec::new(Space::Discrete { n: 1 }, Space::Discrete { n: 1 }),
                remaining: 0,
            })
        }

        fn spec(&self) -> &EnvSpec {
            &self.spec
        }

        fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
            self.remaining -= 1;
            let obs = Counter(self.remaining);
            let step = Step::new(obs, a.clone(), 2.0, self.remaining == 0, false, ());
            Ok((step, Record::empty()))
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.reset_with_index(0)
        }

        fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
            self.remaining = ix + 1;
            Ok(Counter(self.remaining))
        }
    }

    struct StayPolicy {
        n_samples: usize,
    }

    /// Never terminates; the length limit of its spec comes from the config.
    struct EndlessEnv {
        spec: EnvSpec,
        t: usize,
    }

    impl Env for EndlessEnv {
        type Config = usize;
        type Obs = Counter;
        type Act = Stay;
        type Info = ();

        fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self {
                spec: EnvSpec::new(Space::Discrete { n: 1 }, Space::Discrete { n: 1 })
                    .max_episode_length(*config),
                t: 0,
            })
        }

        fn spec(&self) -> &EnvSpec {
            &self.spec
        }

        fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
            self.t += 1;
            if self.t > 1000 {
                anyhow::bail!("episode did not stop at the length limit");
            }
            let step = Step::new(Counter(self.t), a.clone(), 1.0, false, false, ());
            Ok((step, Record::empty()))
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.t = 0;
            Ok(Counter(0))
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
            self.reset()
        }
    }

    impl<E: Env<Obs = Counter, Act = Stay>> Policy<E> for StayPolicy {
        fn sample(&mut self, _obs: &E::Obs) -> Result<E::Act> {
            self.n_samples += 1;
            Ok(Stay)
        }
    }

    #[test]
    fn test_default_evaluator() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut evaluator = DefaultEvaluator::<CountdownEnv>::new(&(), 0, 4)?;
        let mut policy = StayPolicy { n_samples: 0 };

        // Episodes last 1, 2, 3 and 4 steps with reward 2 each.
        let record = evaluator.evaluate(&mut policy)?;
        assert_eq!(policy.n_samples, 10);
        assert_eq!(record.get_scalar("Episode return")?, 5.0);

        Ok(())
    }

    #[test]
    fn test_max_episode_length() -> Result<()> {
        let mut evaluator = DefaultEvaluator::<EndlessEnv>::new(&5, 0, 2)?;
        let mut policy = StayPolicy { n_samples: 0 };

        let record = evaluator.evaluate(&mut policy)?;
        assert_eq!(policy.n_samples, 10);
        assert_eq!(record.get_scalar("Episode return")?, 5.0);

        Ok(())
    }

    #[test]
    fn test_zero_episodes_rejected() -> Result<()> {
        let err = DefaultEvaluator::<CountdownEnv>::new(&(), 0, 0)
            .err()
            .expect("zero episodes should be rejected");
        assert!(matches!(
            err.downcast_ref::<GantryError>(),
            Some(GantryError::InvalidConfig(_))
        ));

        let env = CountdownEnv::build(&(), 0)?;
        assert!(DefaultEvaluator::from_env(env, 0).is_err());

        Ok(())
    }
}
