//! LLM provider implementations.

mod unified;

pub use unified::{Backend, ProviderSettings, UnifiedProvider};
