//! Configuration management for rootbound.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::core::WorkingRoot;
use crate::core::agent::{
    Agent, Backend, DEFAULT_MAX_ROUNDS, Dispatcher, LlmProvider, ProviderSettings, ScriptRunner,
    UnifiedProvider,
};

/// Provider API type.
///
/// Determines which backend the unified provider talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderApiType {
    /// Google Gemini API
    #[default]
    Google,
    /// Anthropic Messages API
    Anthropic,
    /// `OpenAI` Chat Completions API (also used by compatible providers)
    OpenAi,
    /// Groq API
    Groq,
    /// Mistral API
    Mistral,
    /// Local Ollama server
    Ollama,
}

impl ProviderApiType {
    const fn backend(self) -> Backend {
        match self {
            Self::Google => Backend::Google,
            Self::Anthropic => Backend::Anthropic,
            Self::OpenAi => Backend::OpenAi,
            Self::Groq => Backend::Groq,
            Self::Mistral => Backend::Mistral,
            Self::Ollama => Backend::Ollama,
        }
    }
}

/// Individual provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "type", default)]
    pub api_type: ProviderApiType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent configuration.
    pub agent: AgentConfig,

    /// Sandbox configuration.
    pub sandbox: SandboxConfig,
}

impl Config {
    /// Load configuration from the default paths.
    ///
    /// Loads global config first, then merges project-local config if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let global = Self::config_path().ok();
        let project = Self::project_config_path().ok();
        Self::load_from(global.as_deref(), project.as_deref())
    }

    /// Load configuration from explicit paths; missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_from(global: Option<&Path>, project: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match global {
            Some(path) if path.exists() => Self::read(path)?,
            _ => Self::default(),
        };

        if let Some(path) = project.filter(|p| p.exists()) {
            config.merge(Self::read(path)?);
        }

        Ok(config)
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Get the project-local configuration file path.
    ///
    /// Looks for `.rootbound/config.toml` in the current directory.
    pub fn project_config_path() -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(".rootbound").join("config.toml"))
    }

    /// Merge another config into this one (project overrides global).
    ///
    /// Values equal to the built-in defaults count as unset, so a project
    /// file cannot put a globally overridden value back to its default.
    fn merge(&mut self, other: Self) {
        let agent_defaults = AgentConfig::default();
        if other.agent.provider != agent_defaults.provider {
            self.agent.provider = other.agent.provider;
        }
        if other.agent.model != agent_defaults.model {
            self.agent.model = other.agent.model;
        }
        if other.agent.max_tokens != agent_defaults.max_tokens {
            self.agent.max_tokens = other.agent.max_tokens;
        }
        if other.agent.max_rounds != agent_defaults.max_rounds {
            self.agent.max_rounds = other.agent.max_rounds;
        }
        if other.agent.request_timeout_secs != agent_defaults.request_timeout_secs {
            self.agent.request_timeout_secs = other.agent.request_timeout_secs;
        }
        if other.agent.system_prompt.is_some() {
            self.agent.system_prompt = other.agent.system_prompt;
        }
        for (name, provider) in other.agent.providers {
            if agent_defaults.providers.get(&name) != Some(&provider) {
                self.agent.providers.insert(name, provider);
            }
        }

        let sandbox_defaults = SandboxConfig::default();
        if other.sandbox.root != sandbox_defaults.root {
            self.sandbox.root = other.sandbox.root;
        }
        if other.sandbox.script_timeout_secs != sandbox_defaults.script_timeout_secs {
            self.sandbox.script_timeout_secs = other.sandbox.script_timeout_secs;
        }
        if other.sandbox.interpreters != sandbox_defaults.interpreters {
            self.sandbox.interpreters = other.sandbox.interpreters;
        }
    }

    /// Get the configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the config directory path (`~/.config/rootbound/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config_home).join("rootbound"));
        }

        if cfg!(target_os = "macos") {
            if let Ok(home) = std::env::var("HOME") {
                return Ok(PathBuf::from(home).join(".config").join("rootbound"));
            }
        }

        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;

        Ok(base.config_dir().join("rootbound"))
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build an agent for one session from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the working root is invalid, the provider is
    /// unknown, or its API key is missing.
    pub fn build_agent(&self) -> anyhow::Result<Agent> {
        let dispatcher = self.sandbox.dispatcher()?;
        let provider = self.agent.create_provider()?;

        let agent = Agent::new(
            provider,
            dispatcher,
            self.agent.model.clone(),
            self.agent.max_tokens,
        )
        .with_max_rounds(self.agent.max_rounds);

        Ok(match &self.agent.system_prompt {
            Some(prompt) => agent.with_system_prompt(prompt.clone()),
            None => agent,
        })
    }
}

/// Agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Active provider name (key in providers table).
    pub provider: String,

    /// Model to use.
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: u32,

    /// Maximum model rounds per session.
    pub max_rounds: u32,

    /// Timeout for a single model query.
    pub request_timeout_secs: u64,

    /// Replaces the built-in system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Provider definitions.
    #[serde(default = "AgentConfig::default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

impl AgentConfig {
    /// Get the default provider configurations.
    fn default_providers() -> HashMap<String, ProviderConfig> {
        let mut providers = HashMap::new();

        providers.insert(
            "google".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::Google,
                base_url: None,
                api_key_env: Some("GEMINI_API_KEY".to_string()),
            },
        );

        providers.insert(
            "anthropic".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::Anthropic,
                base_url: None,
                api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
            },
        );

        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::OpenAi,
                base_url: None,
                api_key_env: Some("OPENAI_API_KEY".to_string()),
            },
        );

        providers.insert(
            "groq".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::Groq,
                base_url: None,
                api_key_env: Some("GROQ_API_KEY".to_string()),
            },
        );

        providers.insert(
            "mistral".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::Mistral,
                base_url: None,
                api_key_env: Some("MISTRAL_API_KEY".to_string()),
            },
        );

        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                api_type: ProviderApiType::Ollama,
                base_url: Some("http://localhost:11434".to_string()),
                api_key_env: None,
            },
        );

        providers
    }

    fn resolve_api_key(config: &ProviderConfig) -> Option<String> {
        let env_name = config.api_key_env.as_ref()?;
        std::env::var(env_name).ok().filter(|key| !key.is_empty())
    }

    /// Create the configured LLM provider.
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or required API key is missing.
    pub fn create_provider(&self) -> anyhow::Result<Box<dyn LlmProvider>> {
        let name = &self.provider;
        let config = self.providers.get(name).ok_or_else(|| {
            anyhow::anyhow!("unknown provider '{name}', check [agent.providers] config")
        })?;

        let backend = config.api_type.backend();
        let api_key = Self::resolve_api_key(config);

        if backend.requires_api_key() && api_key.is_none() {
            let hint = config.api_key_env.as_deref().map_or_else(
                || "Set api_key_env for this provider in config.toml.".to_string(),
                |env| format!("Set {env} in the environment or in a .env file."),
            );
            anyhow::bail!("No API key configured for provider '{name}'.\n\n{hint}");
        }

        let provider = UnifiedProvider::new(
            backend,
            ProviderSettings {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                timeout_secs: self.request_timeout_secs,
                api_key,
                base_url: config.base_url.clone(),
            },
        )?;

        Ok(Box::new(provider))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: "gemini-2.0-flash-001".to_string(),
            max_tokens: 8192,
            max_rounds: DEFAULT_MAX_ROUNDS,
            request_timeout_secs: 120,
            system_prompt: None,
            providers: Self::default_providers(),
        }
    }
}

/// Sandbox configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Working root; relative paths resolve against the current directory.
    pub root: PathBuf,

    /// Time budget for one script run.
    pub script_timeout_secs: u64,

    /// Script extension to interpreter command.
    pub interpreters: BTreeMap<String, String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            script_timeout_secs: 30,
            interpreters: ScriptRunner::default_interpreters(),
        }
    }
}

impl SandboxConfig {
    /// Open the working root and build a dispatcher bound to it.
    ///
    /// # Errors
    ///
    /// Returns error if the root is not an existing directory.
    pub fn dispatcher(&self) -> anyhow::Result<Dispatcher> {
        let root = WorkingRoot::new(&self.root)
            .with_context(|| format!("invalid sandbox root {}", self.root.display()))?;

        tracing::info!(root = %root.path().display(), "sandbox root");

        let scripts = ScriptRunner::new(
            Duration::from_secs(self.script_timeout_secs),
            self.interpreters.clone(),
        );

        Ok(Dispatcher::new(root, scripts))
    }
}
