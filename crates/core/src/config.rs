use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Explicit catalog file. When unset, the region picks a file inside
    /// `data_dir`.
    pub path: Option<PathBuf>,
    pub data_dir: PathBuf,
    /// GLOBAL, EU, or AU; regional files fall back to GLOBAL when missing.
    pub region: String,
    /// Interval of the wholesale snapshot refresh.
    pub refresh_secs: u64,
    pub shopify_base_url: Option<String>,
    pub shopify_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Master switch for narrative generation.
    pub enabled: bool,
    /// Default when the request carries no `rationale` override.
    pub rationale_default: bool,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub region: Option<String>,
    pub log_level: Option<String>,
    pub llm_enabled: Option<bool>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                path: None,
                data_dir: PathBuf::from("data"),
                region: "GLOBAL".to_string(),
                refresh_secs: 300,
                shopify_base_url: None,
                shopify_token: None,
            },
            llm: LlmConfig {
                enabled: true,
                rationale_default: true,
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 30,
                max_retries: 3,
                max_tokens: 1000,
                temperature: 0.2,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            engine: EngineConfig::default(),
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("stickfit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
            }
            if let Some(data_dir) = catalog.data_dir {
                self.catalog.data_dir = data_dir;
            }
            if let Some(region) = catalog.region {
                self.catalog.region = region;
            }
            if let Some(refresh_secs) = catalog.refresh_secs {
                self.catalog.refresh_secs = refresh_secs;
            }
            if let Some(shopify_base_url) = catalog.shopify_base_url {
                self.catalog.shopify_base_url = Some(shopify_base_url);
            }
            if let Some(shopify_token_value) = catalog.shopify_token {
                self.catalog.shopify_token = Some(secret_value(shopify_token_value));
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(enabled) = llm.enabled {
                self.llm.enabled = enabled;
            }
            if let Some(rationale_default) = llm.rationale_default {
                self.llm.rationale_default = rationale_default;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(engine) = patch.engine {
            self.engine = engine;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STICKFIT_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("STICKFIT_CATALOG_DIR") {
            self.catalog.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("STICKFIT_REGION") {
            self.catalog.region = value;
        }
        if let Some(value) = read_env("STICKFIT_CATALOG_REFRESH_SECS") {
            self.catalog.refresh_secs = parse_u64("STICKFIT_CATALOG_REFRESH_SECS", &value)?;
        }
        if let Some(value) = read_env("STICKFIT_SHOPIFY_BASE_URL") {
            self.catalog.shopify_base_url = Some(value);
        }
        if let Some(value) = read_env("STICKFIT_SHOPIFY_TOKEN") {
            self.catalog.shopify_token = Some(secret_value(value));
        }

        if let Some(value) = read_env("STICKFIT_LLM_ENABLED") {
            self.llm.enabled = parse_bool("STICKFIT_LLM_ENABLED", &value)?;
        }
        if let Some(value) = read_env("STICKFIT_LLM_RATIONALE_DEFAULT") {
            self.llm.rationale_default = parse_bool("STICKFIT_LLM_RATIONALE_DEFAULT", &value)?;
        }
        // OPENAI_API_KEY is honored for drop-in compatibility with the
        // upstream deployment environment.
        let api_key = read_env("STICKFIT_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("STICKFIT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("STICKFIT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("STICKFIT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("STICKFIT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("STICKFIT_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("STICKFIT_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("STICKFIT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STICKFIT_SERVER_PORT") {
            self.server.port = parse_u16("STICKFIT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("STICKFIT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("STICKFIT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("STICKFIT_LOGGING_LEVEL").or_else(|| read_env("STICKFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STICKFIT_LOGGING_FORMAT").or_else(|| read_env("STICKFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(region) = overrides.region {
            self.catalog.region = region;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_enabled) = overrides.llm_enabled {
            self.llm.enabled = llm_enabled;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        self.engine.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("stickfit.toml"), PathBuf::from("config/stickfit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.region.trim().is_empty() {
        return Err(ConfigError::Validation("catalog.region must not be empty".to_string()));
    }

    if catalog.refresh_secs == 0 {
        return Err(ConfigError::Validation(
            "catalog.refresh_secs must be greater than zero".to_string(),
        ));
    }

    if let Some(base_url) = &catalog.shopify_base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "catalog.shopify_base_url must start with http:// or https://".to_string(),
            ));
        }
        if catalog.shopify_token.is_none() {
            return Err(ConfigError::Validation(
                "catalog.shopify_base_url is set but catalog.shopify_token is missing".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation("llm.timeout_secs must be in range 1..=300".to_string()));
    }

    if llm.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("llm.base_url must not be empty".to_string()));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation("llm.temperature must be in range 0..=2".to_string()));
    }

    // A missing key with the feature enabled is allowed: narrative
    // generation degrades to the deterministic template at runtime.
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => other.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    engine: Option<EngineConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    region: Option<String>,
    refresh_secs: Option<u64>,
    shopify_base_url: Option<String>,
    shopify_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    enabled: Option<bool>,
    rationale_default: Option<bool>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
