//! Configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `AUTH_TOKEN` | `valid_token` |
//! | `LOG_LEVEL` | `info` (`RUST_LOG` wins when set) |
//! | `LOG_FORMAT` | `pretty` (or `json`) |
//! | `LOG_DIR` | unset: no file sink |
//! | `LOG_FILE_PREFIX` | `userbase.log` |

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_AUTH_TOKEN: &str = "valid_token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse {key}: {details}")]
    Parse { key: String, details: String },
}

/// Types that can be read from the process environment.
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Returns the variable's value, or `default` when it is unset or not UTF-8.
pub fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default).parse().map_err(|e: T::Err| ConfigError::Parse {
        key: key.to_owned(),
        details: e.to_string(),
    })
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// The bearer token the authentication layer accepts.
    pub auth_token: String,
    pub log: LogConfig,
}

impl Config {
    /// The socket address to listen on.
    pub fn address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Parse { key: "HOST".to_owned(), details: e.to_string() }
        })
    }
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string()),
            port: parse_env("PORT", "8080")?,
            auth_token: env_or_default("AUTH_TOKEN", DEFAULT_AUTH_TOKEN),
            log: LogConfig::from_env()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            auth_token: DEFAULT_AUTH_TOKEN.to_owned(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`, expected `pretty` or `json`")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Format of the stdout layer. The file sink is always JSON.
    pub format: LogFormat,
    /// Directory for the daily-rotated log file. `None` disables the file sink.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl FromEnv for LogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            level: env_or_default("LOG_LEVEL", "info"),
            format: parse_env("LOG_FORMAT", "pretty")?,
            directory: std::env::var_os("LOG_DIR").map(PathBuf::from),
            file_prefix: env_or_default("LOG_FILE_PREFIX", "userbase.log"),
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "userbase.log".to_owned(),
        }
    }
}
