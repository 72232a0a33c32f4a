//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum GantryError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The action space is not supported by a policy.
    #[error("{policy} only works with {expected} action space, got {got}")]
    UnsupportedActionSpace {
        /// Name of the policy type.
        policy: String,
        /// Supported kind of action space.
        expected: String,
        /// Kind of the given action space.
        got: String,
    },

    /// The observation space is not supported by a policy.
    #[error("{policy} does not support {got} observation space")]
    UnsupportedObservationSpace {
        /// Name of the policy type.
        policy: String,
        /// Kind of the given observation space.
        got: String,
    },

    /// Invalid configuration of a model.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
