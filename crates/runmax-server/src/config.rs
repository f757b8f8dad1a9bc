use anyhow::Context;
use runmax_egress::TextGenerationConfig;
use runmax_ingress::UploadConfig;
use runmax_storage::{StorageBackend, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StoreConfig,

    #[serde(default)]
    pub uploads: UploadConfig,

    #[serde(default)]
    pub summary: TextGenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level or `RUST_LOG`-style directives, e.g. `info,tower_http=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StoreConfig::default(),
            uploads: UploadConfig::default(),
            summary: TextGenerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML; an empty document means all defaults
            if contents.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&contents)
                    .with_context(|| format!("Invalid YAML in {}", path.display()))?
            }
        };

        Ok(config)
    }

    /// Check the merged configuration before anything is built from it
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("Invalid storage configuration")?;
        self.summary
            .validate()
            .context("Invalid summary configuration")?;

        if self.uploads.allowed_extensions.is_empty() {
            anyhow::bail!("Invalid upload configuration: allowed_extensions must not be empty");
        }

        Ok(())
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Server settings; RUNMAX_PORT wins over the platform-provided PORT
        for name in ["PORT", "RUNMAX_PORT"] {
            if let Some(port) = parse_env::<u16>(name) {
                self.port = port;
            }
        }

        if let Some(val) = env_var("RUNMAX_HOST") {
            self.host = val;
        }

        // Storage settings
        if let Some(backend) = parse_env::<StorageBackend>("RUNMAX_STORAGE_BACKEND") {
            self.storage.backend = backend;
        }

        if let Some(val) = env_var("RUNMAX_RESULTS_FILE") {
            self.storage.results_file = PathBuf::from(val);
        }

        if let Some(max_records) = parse_env::<usize>("RUNMAX_MAX_RECORDS") {
            self.storage.max_records = max_records;
        }

        // Upload settings
        if let Some(val) = env_var("RUNMAX_UPLOAD_DIR") {
            self.uploads.directory = PathBuf::from(val);
        }

        // Summary settings
        if let Some(val) = env_var("RUNMAX_SUMMARY_ENDPOINT") {
            self.summary.endpoint = Some(val);
        }

        if let Some(val) = env_var("RUNMAX_SUMMARY_API_KEY") {
            self.summary.api_key = Some(val);
        }

        if let Some(secs) = parse_env::<u64>("RUNMAX_SUMMARY_TIMEOUT_SECS") {
            self.summary.timeout_secs = secs;
        }

        // Logging settings
        if let Some(val) = env_var("RUNMAX_LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

/// Non-empty value of an environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parsed value of an environment variable; unparsable values are reported and ignored
fn parse_env<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let val = env_var(name)?;
    match val.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            // Tracing is not installed yet when the config is merged
            eprintln!("Warning: Invalid {} '{}' ({}), ignoring", name, val, e);
            None
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}
