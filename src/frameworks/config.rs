use serde::Deserialize;
use std::{env, fmt, fs, time::Duration};
use url::Url;

const DEFAULT_HTTP_PORT: u16 = 3003;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_VIEW_IDLE_SECS: u64 = 30 * 60;

// Optional TOML file named by this variable supplies defaults; env wins.
const CONFIG_PATH_VAR: &str = "CHIP_LEDGER_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    port: Option<u16>,
    request_timeout_ms: Option<u64>,
    login_path: Option<String>,
    view_idle_secs: Option<u64>,
}

// Runtime settings for the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub http_port: u16,
    pub request_timeout: Duration,
    pub login_path: String,
    pub view_idle_timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidUrl(url::ParseError),
    InvalidNumber(&'static str),
    File { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::InvalidUrl(err) => write!(f, "SUPABASE_URL is not a valid url: {err}"),
            ConfigError::InvalidNumber(key) => write!(f, "{key} must be a number"),
            ConfigError::File { path, message } => {
                write!(f, "failed to read config file {path}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => load_file(&path)?,
            Err(_) => FileConfig::default(),
        };
        Self::resolve(file, |key| env::var(key).ok())
    }

    fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // NEXT_PUBLIC_* names are what the web frontend deployment sets.
        let supabase_url = lookup("SUPABASE_URL")
            .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_URL"))
            .or(file.supabase_url)
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_anon_key = lookup("SUPABASE_ANON_KEY")
            .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
            .or(file.supabase_anon_key)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let http_port = match lookup("CHIP_LEDGER_PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("CHIP_LEDGER_PORT"))?,
            None => file.port.unwrap_or(DEFAULT_HTTP_PORT),
        };
        let timeout_ms = match lookup("SUPABASE_TIMEOUT_MS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("SUPABASE_TIMEOUT_MS"))?,
            None => file.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        };
        let view_idle_secs = match lookup("CHIP_LEDGER_VIEW_IDLE_SECS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("CHIP_LEDGER_VIEW_IDLE_SECS"))?,
            None => file.view_idle_secs.unwrap_or(DEFAULT_VIEW_IDLE_SECS),
        };

        Ok(Self {
            supabase_url: Url::parse(&supabase_url).map_err(ConfigError::InvalidUrl)?,
            supabase_anon_key,
            http_port,
            request_timeout: Duration::from_millis(timeout_ms),
            login_path: lookup("LOGIN_PATH")
                .or(file.login_path)
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            view_idle_timeout: Duration::from_secs(view_idle_secs),
        })
    }
}

fn load_file(path: &str) -> Result<FileConfig, ConfigError> {
    let file_error = |message: String| ConfigError::File {
        path: path.to_string(),
        message,
    };
    let raw = fs::read_to_string(path).map_err(|err| file_error(err.to_string()))?;
    toml::from_str(&raw).map_err(|err| file_error(err.to_string()))
}
