//! Core agent logic: path containment, tools and the conversation loop.

pub mod agent;
mod error;
pub mod sandbox;

pub use agent::{Agent, Outcome};
pub use error::{Error, Result};
pub use sandbox::{ContainmentError, WorkingRoot};
