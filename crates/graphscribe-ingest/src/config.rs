//! Configuration for graphscribe.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`GRAPHSCRIBE__` prefix, `__` separator)
//! 2. `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`, `OPENAI_API_KEY`, `OPENAI_BASE_URL`
//! 3. Config file (`graphscribe.toml` by default)
//! 4. Defaults

use serde::Deserialize;

use graphscribe_graph::GraphConfig;

use crate::error::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[neo4j]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Upper bound on pooled Bolt connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// `[llm]` section: an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Some local providers need none.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    4
}

fn default_fetch_size() -> usize {
    256
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.neo4j.uri.clone(),
            user: self.neo4j.user.clone(),
            password: self.neo4j.password.clone(),
            max_connections: self.neo4j.max_connections,
            fetch_size: self.neo4j.fetch_size,
        }
    }
}

/// Load configuration from the file named by `file_prefix` and the environment.
pub fn load(file_prefix: &str) -> Result<AppConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(plain_env_source()?)
        .add_source(
            config::Environment::with_prefix("GRAPHSCRIBE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    from_config(cfg)
}

/// The unprefixed variables, layered between the config file and the
/// `GRAPHSCRIBE__` variables.
fn plain_env_source() -> Result<config::Config> {
    let cfg = config::Config::builder()
        .set_override_option("neo4j.uri", env_var("NEO4J_URI"))?
        .set_override_option("neo4j.user", env_var("NEO4J_USER"))?
        .set_override_option("neo4j.password", env_var("NEO4J_PASSWORD"))?
        .set_override_option("llm.api_key", env_var("OPENAI_API_KEY"))?
        .set_override_option("llm.base_url", env_var("OPENAI_BASE_URL"))?
        .build()?;
    Ok(cfg)
}

/// Deserialize a built [`config::Config`] into [`AppConfig`].
pub fn from_config(cfg: config::Config) -> Result<AppConfig> {
    let app: AppConfig = cfg.try_deserialize()?;
    tracing::debug!(
        uri = %app.neo4j.uri,
        model = %app.llm.model,
        "Configuration loaded"
    );
    Ok(app)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
