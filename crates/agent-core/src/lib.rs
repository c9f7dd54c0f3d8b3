//! Provider-agnostic conversation and model types for rootbound.

pub mod conversation;
pub mod error;
pub mod provider;
pub mod providers;
pub mod types;
