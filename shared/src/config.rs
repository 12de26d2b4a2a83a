use anyhow::Context;
use dotenv::dotenv;
use std::path::PathBuf;

pub const DEFAULT_MAX_CODE_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub strategies_path: PathBuf,
    pub presets_path: PathBuf,
    pub api_bind_addr: String,
    /// Largest strategy source the API accepts, in bytes
    pub max_code_bytes: usize,
    pub log_format: Option<String>,
    pub app_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategies_path: PathBuf::from("./strategies"),
            presets_path: PathBuf::from("./strategies_presets"),
            api_bind_addr: "0.0.0.0:9999".to_string(),
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
            log_format: None,
            app_env: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        let defaults = Config::default();

        let max_code_bytes = match std::env::var("MAX_CODE_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_CODE_BYTES must be a byte count, got '{}'", raw))?,
            Err(_) => defaults.max_code_bytes,
        };

        Ok(Config {
            strategies_path: std::env::var("STRATEGIES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.strategies_path),
            presets_path: std::env::var("STRATEGIES_PRESETS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.presets_path),
            api_bind_addr: std::env::var("API_BIND_ADDR").unwrap_or(defaults.api_bind_addr),
            max_code_bytes,
            log_format: std::env::var("LOG_FORMAT").ok(),
            app_env: std::env::var("APP_ENV").unwrap_or(defaults.app_env),
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.app_env.as_str(), "production" | "prod")
    }

    /// Structured JSON logs, either requested explicitly or implied by production.
    pub fn json_logs(&self) -> bool {
        match self.log_format.as_deref() {
            Some(format) => format.eq_ignore_ascii_case("json"),
            None => self.is_production(),
        }
    }
}
