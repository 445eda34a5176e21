use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub cache_url: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from `TODOS_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_environment(config::Environment::with_prefix("TODOS"))
    }

    pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}

fn default_limit() -> usize {
    todo_core::DEFAULT_LIMIT
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}
