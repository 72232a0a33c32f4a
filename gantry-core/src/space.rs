//! Observation and action spaces.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of valid observations or actions.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Space {
    /// `{0, 1, ..., n - 1}`.
    Discrete {
        /// The number of elements.
        n: usize,
    },

    /// A box in `R^d` with element-wise bounds shared by all elements.
    Box {
        /// Shape of an element.
        shape: Vec<usize>,
        /// Lower bound.
        low: f32,
        /// Upper bound.
        high: f32,
    },

    /// Images with pixel values in `[0, 255]`, laid out as `(C, H, W)`.
    Image {
        /// Shape of an image.
        shape: Vec<usize>,
    },

    /// A dictionary of named subspaces.
    Dict {
        /// Subspaces.
        spaces: BTreeMap<String, Space>,
    },
}

impl Space {
    /// Shape of an element of the space.
    ///
    /// Elements of a discrete space are scalars and have the empty shape. The shape of a
    /// dictionary space is that of its flattened elements.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Discrete { .. } => vec![],
            Self::Box { shape, .. } | Self::Image { shape } => shape.clone(),
            Self::Dict { .. } => vec![self.flat_dim()],
        }
    }

    /// Dimension of a flattened element.
    ///
    /// For a discrete space this is the number of elements, i.e., the length of
    /// the one-hot representation.
    pub fn flat_dim(&self) -> usize {
        match self {
            Self::Discrete { n } => *n,
            Self::Box { shape, .. } | Self::Image { shape } => shape.iter().product(),
            Self::Dict { spaces } => spaces.values().map(|s| s.flat_dim()).sum(),
        }
    }

    /// Returns `true` for [`Space::Discrete`].
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete { .. })
    }

    /// Returns `true` for [`Space::Image`].
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Returns `true` for [`Space::Dict`].
    pub fn is_dict(&self) -> bool {
        matches!(self, Self::Dict { .. })
    }

    /// Name of the kind of the space, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discrete { .. } => "Discrete",
            Self::Box { .. } => "Box",
            Self::Image { .. } => "Image",
            Self::Dict { .. } => "Dict",
        }
    }
}

/// Specification of an environment.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EnvSpec {
    /// Observation space.
    pub observation_space: Space,

    /// Action space.
    pub action_space: Space,

    /// Maximum number of steps in an episode, if limited.
    pub max_episode_length: Option<usize>,
}

impl EnvSpec {
    /// Creates a specification without an episode length limit.
    pub fn new(observation_space: Space, action_space: Space) -> Self {
        Self {
            observation_space,
            action_space,
            max_episode_length: None,
        }
    }

    /// Sets the maximum episode length.
    pub fn max_episode_length(mut self, v: usize) -> Self {
        self.max_episode_length = Some(v);
        self
    }
}
