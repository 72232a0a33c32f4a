#![warn(missing_docs)]
//! Core abstractions of Gantry, a library for reinforcement learning.
//!
//! The crate defines the environment interface ([`Env`], [`Step`]), the
//! [`Policy`] interface, observation/action spaces ([`Space`], [`EnvSpec`]),
//! a key-value [`Record`](record::Record) and environment wrappers such as
//! [`EpisodicLife`](wrappers::EpisodicLife).
pub mod error;
pub mod record;
pub mod wrappers;

mod base;
pub use base::{Act, Env, Info, Lives, Obs, Policy, Step};

mod space;
pub use space::{EnvSpec, Space};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
