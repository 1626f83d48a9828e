use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub llm: LlmConfig,
    pub graph: GraphSettings,
    pub rate_limit: RateLimitConfig,
    pub s3: S3Settings,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openrouter_api_key: String,
    #[serde(default)]
    pub aws_access_key_id: String,
    #[serde(default)]
    pub aws_secret_access_key: String,
    #[serde(default)]
    pub twitter_consumer_key: String,
    #[serde(default)]
    pub twitter_consumer_secret: String,
    #[serde(default)]
    pub twitter_bearer_token: String,
    #[serde(default)]
    pub firecrawl_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public URL of the web app, sent as OpenRouter attribution
    #[serde(default)]
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
    /// Keep everything in process memory instead of MongoDB
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    #[serde(default)]
    pub fallback_models: Vec<String>,
    /// Model of the tweet writer tool; the chat model when unset
    #[serde(default)]
    pub writer_model: Option<String>,
    pub enhance_model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    pub fn chat(&self) -> contentport_types::LLMConfig {
        self.with_model(&self.model)
    }

    pub fn writer(&self) -> contentport_types::LLMConfig {
        self.with_model(self.writer_model.as_deref().unwrap_or(&self.model))
    }

    fn with_model(&self, model: &str) -> contentport_types::LLMConfig {
        let mut config = contentport_types::LLMConfig::new(model)
            .with_fallbacks(self.fallback_models.clone());
        config.temperature = self.temperature;
        config.max_tokens = self.max_tokens;
        config
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphSettings {
    pub max_steps: usize,
    pub timeout_secs: u64,
}

impl From<&GraphSettings> for contentport_types::GraphConfig {
    fn from(settings: &GraphSettings) -> Self {
        Self::new()
            .with_max_steps(settings.max_steps)
            .with_timeout(Duration::from_secs(settings.timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Chat requests are only limited when enabled
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn required_secret(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .map_err(|_| ConfigError::Message(format!("{} environment variable is required", name)))
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (ENV defaults to "dev")
    /// 3. CONTENTPORT_-prefixed environment variables, `__` between levels
    ///    (e.g. CONTENTPORT_SERVER__PORT=8080)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CONTENTPORT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets never live in TOML
        if !cfg.mongodb.in_memory {
            cfg.mongodb_uri = required_secret("MONGODB_URI")?;
        }
        cfg.openrouter_api_key = required_secret("OPENROUTER_API_KEY")?;
        cfg.aws_access_key_id = required_secret("AWS_ACCESS_KEY_ID")?;
        cfg.aws_secret_access_key = required_secret("AWS_SECRET_ACCESS_KEY")?;
        cfg.twitter_consumer_key = required_secret("TWITTER_CONSUMER_KEY")?;
        cfg.twitter_consumer_secret = required_secret("TWITTER_CONSUMER_SECRET")?;
        cfg.twitter_bearer_token = required_secret("TWITTER_BEARER_TOKEN")?;
        cfg.firecrawl_api_key = required_secret("FIRECRAWL_API_KEY")?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [mongodb]
        database = "contentport_test"

        [llm]
        model = "openai/gpt-4.1"
        fallback_models = ["openai/gpt-4o"]
        enhance_model = "meta-llama/llama-3.2-3b-instruct:free"

        [graph]
        max_steps = 3
        timeout_secs = 300

        [rate_limit]
        enabled = false

        [s3]
        bucket = "contentport-uploads"
        region = "us-east-1"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mongodb.database, "contentport_test");
        assert!(!config.mongodb.in_memory);
        assert!(!config.rate_limit.enabled);
        assert!(config.s3.endpoint.is_none());
        assert!(config.mongodb_uri.is_empty());
    }

    #[test]
    fn test_writer_model_falls_back_to_chat_model() {
        let mut config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.llm.writer().model, "openai/gpt-4.1");
        assert_eq!(config.llm.chat().fallback_models, vec!["openai/gpt-4o"]);

        config.llm.writer_model = Some("anthropic/claude-sonnet-4".into());
        assert_eq!(config.llm.writer().model, "anthropic/claude-sonnet-4");
    }

    #[test]
    fn test_graph_settings_conversion() {
        let config: Config = toml::from_str(TOML).unwrap();
        let graph: contentport_types::GraphConfig = (&config.graph).into();
        assert_eq!(graph.max_steps, 3);
        assert_eq!(graph.execution_timeout, Duration::from_secs(300));
    }
}
