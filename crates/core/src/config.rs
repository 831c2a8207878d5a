use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub catalog: CatalogConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub source: FeedSource,
    pub url: String,
    pub path: PathBuf,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub reload_on_every_access: bool,
    pub extra_latency_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Http,
    File,
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
    pub feed_source: Option<FeedSource>,
    pub feed_url: Option<String>,
    pub feed_path: Option<PathBuf>,
    pub reload_on_every_access: Option<bool>,
    pub extra_latency_ms: Option<u64>,
    pub log_level: Option<String>,
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
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                source: FeedSource::File,
                url: String::new(),
                path: PathBuf::from("data/products.json"),
                api_key: None,
                timeout_secs: 10,
            },
            catalog: CatalogConfig { reload_on_every_access: false, extra_latency_ms: 0 },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3550 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for FeedSource {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Validation(format!(
                "unsupported feed source `{other}` (expected http|file)"
            ))),
        }
    }
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
    /// Precedence, lowest to highest: built-in defaults, `shelf.toml` patch,
    /// `SHELF_*` environment overrides, programmatic overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shelf.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(feed) = patch.feed {
            if let Some(source) = feed.source {
                self.feed.source = source;
            }
            if let Some(url) = feed.url {
                self.feed.url = url;
            }
            if let Some(path) = feed.path {
                self.feed.path = path;
            }
            if let Some(api_key) = feed.api_key {
                self.feed.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = feed.timeout_secs {
                self.feed.timeout_secs = timeout_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(reload_on_every_access) = catalog.reload_on_every_access {
                self.catalog.reload_on_every_access = reload_on_every_access;
            }
            if let Some(extra_latency_ms) = catalog.extra_latency_ms {
                self.catalog.extra_latency_ms = extra_latency_ms;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
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
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHELF_FEED_SOURCE") {
            self.feed.source = value.parse()?;
        }
        if let Some(value) = read_env("SHELF_FEED_URL") {
            self.feed.url = value;
        }
        if let Some(value) = read_env("SHELF_FEED_PATH") {
            self.feed.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("SHELF_FEED_API_KEY") {
            self.feed.api_key = Some(value.into());
        }
        if let Some(value) = read_env("SHELF_FEED_TIMEOUT_SECS") {
            self.feed.timeout_secs = parse_u64("SHELF_FEED_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SHELF_CATALOG_RELOAD_ON_EVERY_ACCESS") {
            self.catalog.reload_on_every_access =
                parse_bool("SHELF_CATALOG_RELOAD_ON_EVERY_ACCESS", &value)?;
        }
        if let Some(value) = read_env("SHELF_CATALOG_EXTRA_LATENCY_MS") {
            self.catalog.extra_latency_ms = parse_u64("SHELF_CATALOG_EXTRA_LATENCY_MS", &value)?;
        }

        if let Some(value) = read_env("SHELF_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SHELF_SERVER_PORT") {
            self.server.port = parse_u16("SHELF_SERVER_PORT", &value)?;
        }

        let log_level = read_env("SHELF_LOGGING_LEVEL").or_else(|| read_env("SHELF_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("SHELF_LOGGING_FORMAT").or_else(|| read_env("SHELF_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(feed_source) = overrides.feed_source {
            self.feed.source = feed_source;
        }
        if let Some(feed_url) = overrides.feed_url {
            self.feed.url = feed_url;
        }
        if let Some(feed_path) = overrides.feed_path {
            self.feed.path = feed_path;
        }
        if let Some(reload_on_every_access) = overrides.reload_on_every_access {
            self.catalog.reload_on_every_access = reload_on_every_access;
        }
        if let Some(extra_latency_ms) = overrides.extra_latency_ms {
            self.catalog.extra_latency_ms = extra_latency_ms;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_feed(&self.feed)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shelf.toml"), PathBuf::from("config/shelf.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_feed(feed: &FeedConfig) -> Result<(), ConfigError> {
    match feed.source {
        FeedSource::Http => {
            let url = feed.url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(
                    "feed.url must start with http:// or https:// for the http feed source"
                        .to_string(),
                ));
            }
        }
        FeedSource::File => {
            if feed.path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "feed.path is required for the file feed source".to_string(),
                ));
            }
        }
    }

    if feed.timeout_secs == 0 || feed.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "feed.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
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

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    feed: Option<FeedPatch>,
    catalog: Option<CatalogPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedPatch {
    source: Option<FeedSource>,
    url: Option<String>,
    path: Option<PathBuf>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    reload_on_every_access: Option<bool>,
    extra_latency_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, FeedSource, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_serve_the_bundled_file_feed() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.feed.source == FeedSource::File, "default feed source should be file")?;
        ensure(
            config.feed.path == PathBuf::from("data/products.json"),
            "default feed path should be the bundled catalog",
        )?;
        ensure(!config.catalog.reload_on_every_access, "reload should default to off")?;
        ensure(config.catalog.extra_latency_ms == 0, "extra latency should default to zero")?;
        ensure(config.server.port == 3550, "default port should be 3550")?;
        Ok(())
    }

    #[test]
    fn file_patch_overrides_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("shelf.toml");
        fs::write(
            &path,
            r#"
[feed]
source = "http"
url = "https://feed.example.com/products"
timeout_secs = 5

[catalog]
reload_on_every_access = true
extra_latency_ms = 250

[logging]
level = "debug"
format = "json"
"#,
        )
        .map_err(|err| err.to_string())?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.feed.source == FeedSource::Http, "feed source should come from file")?;
        ensure(
            config.feed.url == "https://feed.example.com/products",
            "feed url should come from file",
        )?;
        ensure(config.catalog.reload_on_every_access, "reload flag should come from file")?;
        ensure(config.catalog.extra_latency_ms == 250, "latency should come from file")?;
        ensure(
            matches!(config.logging.format, LogFormat::Json),
            "log format should come from file",
        )?;
        Ok(())
    }

    #[test]
    fn env_overrides_win_over_the_file_patch() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELF_CATALOG_RELOAD_ON_EVERY_ACCESS", "true");
        env::set_var("SHELF_CATALOG_EXTRA_LATENCY_MS", "40");
        env::set_var("SHELF_LOG_LEVEL", "warn");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shelf.toml");
            fs::write(
                &path,
                r#"
[catalog]
reload_on_every_access = false
extra_latency_ms = 0
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.catalog.reload_on_every_access, "env reload flag should win")?;
            ensure(config.catalog.extra_latency_ms == 40, "env latency should win")?;
            ensure(config.logging.level == "warn", "log level alias should be honored")?;
            Ok(())
        })();

        clear_vars(&[
            "SHELF_CATALOG_RELOAD_ON_EVERY_ACCESS",
            "SHELF_CATALOG_EXTRA_LATENCY_MS",
            "SHELF_LOG_LEVEL",
        ]);
        result
    }

    #[test]
    fn programmatic_overrides_win_over_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELF_FEED_PATH", "/from-env/products.json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    feed_path: Some(PathBuf::from("/from-override/products.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.feed.path == PathBuf::from("/from-override/products.json"),
                "override feed path should win over env",
            )?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            Ok(())
        })();

        clear_vars(&["SHELF_FEED_PATH"]);
        result
    }

    #[test]
    fn http_source_requires_a_well_formed_url() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                feed_source: Some(FeedSource::Http),
                feed_url: Some("feed.example.com".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure".to_string()),
            Err(error) => error,
        };

        let mentions_url = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("feed.url")
        );
        ensure(mentions_url, "validation failure should mention feed.url")
    }

    #[test]
    fn malformed_env_values_are_rejected_with_the_variable_name() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELF_SERVER_PORT", "not-a-port");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            let named = matches!(
                error,
                ConfigError::InvalidEnvOverride { ref key, .. } if key == "SHELF_SERVER_PORT"
            );
            ensure(named, "error should carry the offending variable name")
        })();

        clear_vars(&["SHELF_SERVER_PORT"]);
        result
    }

    #[test]
    fn missing_required_config_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let missing = PathBuf::from("/definitely/not/here/shelf.toml");
        let error = match AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing-file failure".to_string()),
            Err(error) => error,
        };

        ensure(
            matches!(error, ConfigError::MissingConfigFile(path) if path == missing),
            "error should name the missing file",
        )
    }

    #[test]
    fn feed_api_key_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELF_FEED_API_KEY", "feed-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("feed-secret-value"),
                "debug output should not contain the feed api key",
            )
        })();

        clear_vars(&["SHELF_FEED_API_KEY"]);
        result
    }
}
