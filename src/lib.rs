//! rootbound - a command-line agent confined to one working directory.
//!
//! A remote model proposes tool calls; this crate validates and executes
//! them inside a single [`WorkingRoot`](core::WorkingRoot) and feeds the
//! results back until the model answers or the round budget runs out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────┐
//! │     CLI     │─────▶│    Config    │
//! └──────┬──────┘      └──────────────┘
//!        │
//! ┌──────┴──────┐      ┌──────────────┐      ┌─────────────┐
//! │    Agent    │─────▶│  Dispatcher  │─────▶│  Tool set   │
//! └──────┬──────┘      └──────────────┘      └──────┬──────┘
//!        │                                          │
//! ┌──────┴──────┐                           ┌───────┴─────┐
//! │ LlmProvider │                           │ WorkingRoot │
//! └─────────────┘                           └─────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod core;

pub use config::Config;
pub use core::agent::{Agent, Dispatcher, Outcome};
