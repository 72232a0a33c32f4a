//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::{Env, Lives};
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
pub trait Obs: Clone + Debug {}

/// An action of an environment.
pub trait Act: Clone + Debug {}
