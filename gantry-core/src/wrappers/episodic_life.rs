//! Episodic life wrapper.
use crate::{record::Record, Env, EnvSpec, Lives, Step};
use anyhow::Result;
use log::debug;

/// Ends an episode when a life is lost, but resets the wrapped environment only
/// when all lives are lost.
///
/// On a life loss that leaves at least one life, [`Env::step`] reports
/// `is_terminated == true` even if the wrapped environment does not. The following
/// [`Env::reset`] then performs a single no-op step instead of a real reset, so the
/// game continues from where the life was lost. When the last life is lost, the
/// termination flag of the wrapped environment is passed through as is.
///
/// The technique is from the DQN paper and the `EpisodicLifeEnv` of
/// [`atari_wrappers.py`](https://github.com/openai/baselines/blob/master/baselines/common/atari_wrappers.py).
pub struct EpisodicLife<E: Lives> {
    env: E,

    // Lives observed at the last step or reset.
    lives: usize,

    // True if the last step ended the episode because of a life loss.
    was_fake_done: bool,
}

impl<E: Lives> EpisodicLife<E> {
    /// Wraps an environment.
    pub fn new(env: E) -> Self {
        Self {
            env,
            lives: 0,
            was_fake_done: false,
        }
    }

    /// Returns `true` if the last step ended the episode because a life was lost
    /// while the game was not over.
    pub fn was_fake_done(&self) -> bool {
        self.was_fake_done
    }

    /// Returns the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Returns the wrapped environment as a mutable reference.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Unwraps the environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    /// Advances from a lost life with a no-op step, returning its observation.
    fn noop_step(&mut self) -> Result<E::Obs> {
        debug!("Life lost, no-op step instead of reset (lives = {})", self.lives);
        let act = self.env.noop_act();
        let (step, _) = self.env.step(&act)?;
        Ok(step.obs)
    }
}

impl<E: Lives> Env for EpisodicLife<E> {
    type Config = E::Config;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(Self::new(E::build(config, seed)?))
    }

    fn spec(&self) -> &EnvSpec {
        self.env.spec()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        let (step, record) = self.env.step(a)?;
        let lives = self.env.lives();
        let mut is_terminated = step.is_terminated;

        if lives < self.lives && lives > 0 {
            debug!("Life lost ({} -> {}), end of episode", self.lives, lives);
            is_terminated = true;
            self.was_fake_done = true;
        } else {
            self.was_fake_done = false;
        }
        self.lives = lives;

        let step = Step {
            act: step.act,
            obs: step.obs,
            reward: step.reward,
            is_terminated,
            is_truncated: step.is_truncated,
            info: step.info,
            init_obs: step.init_obs,
        };

        Ok((step, record))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let obs = match self.was_fake_done {
            false => self.env.reset()?,
            true => self.noop_step()?,
        };
        self.lives = self.env.lives();
        Ok(obs)
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        let obs = match self.was_fake_done {
            false => self.env.reset_with_index(ix)?,
            true => self.noop_step()?,
        };
        self.lives = self.env.lives();
        Ok(obs)
    }
}

impl<E: Lives> Lives for EpisodicLife<E> {
    fn lives(&self) -> usize {
        self.env.lives()
    }

    fn noop_act(&self) -> Self::Act {
        self.env.noop_act()
    }
}
