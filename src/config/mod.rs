//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{CliArgs, Command, MailOverrides, ServeArgs, ServeOverrides, StoreArgs, StoreOverride};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "poshpoule";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_STORE_PATH: &str = "db/data.json";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub catalog: CatalogSettings,
    pub mail: MailSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    /// `None` when notification mail is switched off.
    pub smtp: Option<SmtpSettings>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub notify_to: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("notify_to", &self.notify_to)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("POSHPOULE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Init(args)) | Some(Command::Check(args)) => {
            raw.apply_store_override(&args.store)
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }
    raw.apply_mail_overrides(&cli.mail);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    catalog: RawCatalogSettings,
    mail: RawMailSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(ttl) = overrides.catalog_cache_ttl_seconds {
            self.catalog.cache_ttl_seconds = Some(ttl);
        }
        self.apply_store_override(&overrides.store);
    }

    fn apply_store_override(&mut self, overrides: &StoreOverride) {
        if let Some(path) = overrides.store_path.as_ref() {
            self.store.path = Some(path.clone());
        }
    }

    fn apply_mail_overrides(&mut self, overrides: &MailOverrides) {
        if let Some(enabled) = overrides.enabled {
            self.mail.enabled = Some(enabled);
        }
        if let Some(host) = overrides.smtp_host.as_ref() {
            self.mail.smtp_host = Some(host.clone());
        }
        if let Some(port) = overrides.smtp_port {
            self.mail.smtp_port = Some(port);
        }
        if let Some(user) = overrides.smtp_user.as_ref() {
            self.mail.smtp_user = Some(user.clone());
        }
        if let Some(pass) = overrides.smtp_pass.as_ref() {
            self.mail.smtp_pass = Some(pass.clone());
        }
        if let Some(from) = overrides.from.as_ref() {
            self.mail.from = Some(from.clone());
        }
        if let Some(to) = overrides.notify_to.as_ref() {
            self.mail.notify_to = Some(to.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            store,
            catalog,
            mail,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            store: build_store_settings(store)?,
            catalog: build_catalog_settings(catalog)?,
            mail: build_mail_settings(mail)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let path = store
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid("store.path", "path must not be empty"));
    }
    Ok(StoreSettings { path })
}

fn build_catalog_settings(catalog: RawCatalogSettings) -> Result<CatalogSettings, LoadError> {
    let ttl_seconds = catalog
        .cache_ttl_seconds
        .unwrap_or(DEFAULT_CATALOG_CACHE_TTL_SECS);
    Ok(CatalogSettings {
        cache_ttl: Duration::from_secs(ttl_seconds),
    })
}

fn build_mail_settings(mail: RawMailSettings) -> Result<MailSettings, LoadError> {
    let timeout_seconds = mail.timeout_seconds.unwrap_or(DEFAULT_MAIL_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "mail.timeout_seconds",
            "must be greater than zero",
        ));
    }
    let timeout = Duration::from_secs(timeout_seconds);

    let host = non_blank(mail.smtp_host);
    // Supplying a relay host is enough to switch mail on unless it is explicitly disabled.
    let enabled = mail.enabled.unwrap_or(host.is_some());
    if !enabled {
        return Ok(MailSettings {
            smtp: None,
            timeout,
        });
    }

    let host = host.ok_or_else(|| required("mail.smtp_host"))?;
    let port = mail.smtp_port.ok_or_else(|| required("mail.smtp_port"))?;
    if port == 0 {
        return Err(LoadError::invalid(
            "mail.smtp_port",
            "port must be greater than zero",
        ));
    }
    let username = non_blank(mail.smtp_user).ok_or_else(|| required("mail.smtp_user"))?;
    let password = non_blank(mail.smtp_pass).ok_or_else(|| required("mail.smtp_pass"))?;
    let from = non_blank(mail.from).unwrap_or_else(|| username.clone());
    let notify_to = non_blank(mail.notify_to).unwrap_or_else(|| username.clone());

    Ok(MailSettings {
        smtp: Some(SmtpSettings {
            host,
            port,
            username,
            password,
            from,
            notify_to,
        }),
        timeout,
    })
}

fn required(key: &'static str) -> LoadError {
    LoadError::invalid(key, "required when mail is enabled")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCatalogSettings {
    cache_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMailSettings {
    enabled: Option<bool>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    from: Option<String>,
    notify_to: Option<String>,
    timeout_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests;
