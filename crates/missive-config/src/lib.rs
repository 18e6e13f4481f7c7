use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use missive_core::domain::CountryCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "missive";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_SEND_DELAY_MS: u64 = 2_000;
pub const MAX_SEND_DELAY_MS: u64 = 10 * 60 * 1_000;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_country_code: CountryCode,
    pub send: SendConfig,
    pub channel: ChannelConfig,
}

#[derive(Debug, Clone)]
pub struct SendConfig {
    pub delay_ms: u64,
}

impl SendConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub backend: ChannelBackend,
    pub webhook: Option<WebhookConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelBackend {
    Stdout,
    Link,
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub token_env: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_country_code: CountryCode::default(),
            send: SendConfig {
                delay_ms: DEFAULT_SEND_DELAY_MS,
            },
            channel: ChannelConfig {
                backend: ChannelBackend::Stdout,
                webhook: None,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid default_country_code value: {0}")]
    InvalidCountryCode(String),
    #[error("invalid send.delay_ms value: {0}")]
    InvalidSendDelay(u64),
    #[error("invalid channel.webhook.{field}: {message}")]
    InvalidWebhookField {
        field: &'static str,
        message: String,
    },
    #[error("channel backend webhook requires a [channel.webhook] section")]
    MissingWebhookConfig,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_country_code: Option<String>,
    send: Option<SendFile>,
    channel: Option<ChannelFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SendFile {
    delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelFile {
    backend: Option<ChannelBackend>,
    webhook: Option<WebhookFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WebhookFile {
    url: Option<String>,
    token_env: Option<String>,
    timeout_seconds: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(raw) = parsed.default_country_code {
        config.default_country_code =
            CountryCode::new(&raw).map_err(|_| ConfigError::InvalidCountryCode(raw.clone()))?;
    }

    if let Some(send) = parsed.send {
        if let Some(delay_ms) = send.delay_ms {
            if delay_ms > MAX_SEND_DELAY_MS {
                return Err(ConfigError::InvalidSendDelay(delay_ms));
            }
            config.send.delay_ms = delay_ms;
        }
    }

    if let Some(channel) = parsed.channel {
        if let Some(webhook) = channel.webhook {
            config.channel.webhook = Some(merge_webhook(webhook)?);
        }
        if let Some(backend) = channel.backend {
            config.channel.backend = backend;
        }
    }

    if config.channel.backend == ChannelBackend::Webhook && config.channel.webhook.is_none() {
        return Err(ConfigError::MissingWebhookConfig);
    }

    Ok(config)
}

fn merge_webhook(file: WebhookFile) -> Result<WebhookConfig> {
    let raw_url = file
        .url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::InvalidWebhookField {
            field: "url",
            message: "missing value".to_string(),
        })?;
    let url = Url::parse(raw_url).map_err(|err| ConfigError::InvalidWebhookField {
        field: "url",
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidWebhookField {
            field: "url",
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }

    let token_env = match file.token_env {
        Some(name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::InvalidWebhookField {
                    field: "token_env",
                    message: "must not be empty".to_string(),
                });
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let timeout_seconds = file
        .timeout_seconds
        .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECONDS);
    if timeout_seconds == 0 {
        return Err(ConfigError::InvalidWebhookField {
            field: "timeout_seconds",
            message: "must be positive".to_string(),
        });
    }

    Ok(WebhookConfig {
        url,
        token_env,
        timeout_seconds,
    })
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, ChannelBackend, ChannelFile, ConfigError, ConfigFile,
        SendFile, WebhookFile, DEFAULT_SEND_DELAY_MS,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn empty_file() -> ConfigFile {
        ConfigFile {
            default_country_code: None,
            send: None,
            channel: None,
        }
    }

    #[test]
    fn merge_config_defaults() {
        let merged = merge_config(empty_file()).expect("merge");
        assert_eq!(merged.default_country_code.as_str(), "91");
        assert_eq!(merged.send.delay_ms, DEFAULT_SEND_DELAY_MS);
        assert_eq!(merged.channel.backend, ChannelBackend::Stdout);
        assert!(merged.channel.webhook.is_none());
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            default_country_code: Some("+1".to_string()),
            send: Some(SendFile { delay_ms: Some(0) }),
            channel: Some(ChannelFile {
                backend: Some(ChannelBackend::Webhook),
                webhook: Some(WebhookFile {
                    url: Some("https://hooks.example.com/send".to_string()),
                    token_env: Some("MISSIVE_TOKEN".to_string()),
                    timeout_seconds: None,
                }),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.default_country_code.as_str(), "1");
        assert_eq!(merged.send.delay_ms, 0);
        assert_eq!(merged.channel.backend, ChannelBackend::Webhook);
        let webhook = merged.channel.webhook.expect("webhook");
        assert_eq!(webhook.url.as_str(), "https://hooks.example.com/send");
        assert_eq!(webhook.token_env.as_deref(), Some("MISSIVE_TOKEN"));
        assert_eq!(webhook.timeout_seconds, 30);
    }

    #[test]
    fn merge_config_rejects_bad_country_code() {
        let mut parsed = empty_file();
        parsed.default_country_code = Some("India".to_string());
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCountryCode(code) if code == "India"));
    }

    #[test]
    fn merge_config_requires_webhook_section_for_webhook_backend() {
        let mut parsed = empty_file();
        parsed.channel = Some(ChannelFile {
            backend: Some(ChannelBackend::Webhook),
            webhook: None,
        });
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhookConfig));
    }

    #[test]
    fn merge_config_rejects_non_http_webhook() {
        let mut parsed = empty_file();
        parsed.channel = Some(ChannelFile {
            backend: None,
            webhook: Some(WebhookFile {
                url: Some("ftp://example.com/".to_string()),
                token_env: None,
                timeout_seconds: None,
            }),
        });
        let err = merge_config(parsed).unwrap_err();
        assert!(err.to_string().contains("channel.webhook.url"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_missing_optional_file_is_none() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        assert!(load_at_path(&missing, false).expect("load").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "default_country_code = \"44\"\n[send]\ndelay_ms = 500\n[channel]\nbackend = \"link\"\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.default_country_code.as_str(), "44");
        assert_eq!(config.send.delay_ms, 500);
        assert_eq!(config.channel.backend, ChannelBackend::Link);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "country = \"44\"\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&path, perms).expect("chmod");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
