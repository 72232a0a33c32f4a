//! Convolutional network with a dense head for discrete outputs.
mod base;
mod config;
pub use base::DiscreteCnn;
pub use config::DiscreteCnnConfig;
