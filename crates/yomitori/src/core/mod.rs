//! Core plumbing shared by the consensus and engine modules.
//!
//! - [`config`] - configuration loading and discovery

pub mod config;

pub use config::ConsensusConfig;
