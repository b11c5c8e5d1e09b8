use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use chrono::Duration;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAGIC_LINK_TTL_MINUTES: i64 = 30;
const DEFAULT_INVITATION_TTL_HOURS: i64 = 72;
const DEFAULT_CHECK_IN_STALE_MINUTES: i64 = 15;

/// Transactional email provider settings. Email is logged instead of sent when absent.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// One SMS provider endpoint. Providers are tried in the order configured.
#[derive(Debug, Clone)]
pub struct SmsProviderConfig {
    pub name: &'static str,
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Public base URL used to build magic links.
    pub app_url: String,
    pub bind_addr: SocketAddr,

    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,

    pub magic_link_ttl: Duration,
    pub invitation_ttl: Duration,
    pub check_in_stale_after: Duration,

    pub session_secure: bool,

    pub email: Option<EmailConfig>,
    pub sms_providers: Vec<SmsProviderConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let email = match (
            optional("EMAIL_API_URL"),
            optional("EMAIL_API_KEY"),
            optional("EMAIL_FROM"),
        ) {
            (Some(api_url), Some(api_key), Some(from)) => Some(EmailConfig {
                api_url,
                api_key,
                from,
            }),
            _ => None,
        };

        let mut sms_providers = Vec::new();
        for (name, url_var, key_var) in [
            ("primary", "SMS_PRIMARY_URL", "SMS_PRIMARY_KEY"),
            ("fallback", "SMS_FALLBACK_URL", "SMS_FALLBACK_KEY"),
        ] {
            if let (Some(url), Some(api_key)) = (optional(url_var), optional(key_var)) {
                sms_providers.push(SmsProviderConfig { name, url, api_key });
            }
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            app_url: required("APP_URL")?.trim_end_matches('/').to_string(),
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(DEFAULT_BIND_ADDR))?,
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            magic_link_ttl: Duration::minutes(parse_or(
                "MAGIC_LINK_TTL_MINUTES",
                DEFAULT_MAGIC_LINK_TTL_MINUTES,
            )?),
            invitation_ttl: Duration::hours(parse_or(
                "INVITATION_TTL_HOURS",
                DEFAULT_INVITATION_TTL_HOURS,
            )?),
            check_in_stale_after: Duration::minutes(parse_or(
                "CHECK_IN_STALE_MINUTES",
                DEFAULT_CHECK_IN_STALE_MINUTES,
            )?),
            session_secure: parse_or("SESSION_SECURE", false)?,
            email,
            sms_providers,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with delivery disabled and uploads in the system temp directory.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            app_url: "http://localhost:8080".to_string(),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            magic_link_ttl: Duration::minutes(DEFAULT_MAGIC_LINK_TTL_MINUTES),
            invitation_ttl: Duration::hours(DEFAULT_INVITATION_TTL_HOURS),
            check_in_stale_after: Duration::minutes(DEFAULT_CHECK_IN_STALE_MINUTES),
            session_secure: false,
            email: None,
            sms_providers: Vec::new(),
        }
    }
}
