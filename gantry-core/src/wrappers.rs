//! Environment wrappers.
//!
//! A wrapper owns another [`Env`](crate::Env), implements [`Env`](crate::Env)
//! itself and overrides only the operations whose behavior it changes.
mod episodic_life;
pub use episodic_life::EpisodicLife;
