use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the PoshPOULE binary.
#[derive(Debug, Parser)]
#[command(name = "poshpoule", version, about = "PoshPOULE storefront data service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "POSHPOULE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub mail: MailOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Create an empty data file if none exists.
    Init(StoreArgs),
    /// Load the data file and report collection sizes.
    Check(StoreArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreArgs {
    #[command(flatten)]
    pub store: StoreOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreOverride {
    /// Override the path of the JSON data file.
    #[arg(long = "store-path", value_name = "PATH")]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub store: StoreOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override how long the product list snapshot stays fresh.
    #[arg(long = "catalog-cache-ttl-seconds", value_name = "SECONDS")]
    pub catalog_cache_ttl_seconds: Option<u64>,
}

/// Mail settings are accepted before or after the subcommand and fall back to the
/// conventional SMTP environment variables.
#[derive(Debug, Args, Default, Clone)]
pub struct MailOverrides {
    /// Force notification mail on or off.
    #[arg(
        long = "mail-enabled",
        value_name = "BOOL",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub enabled: Option<bool>,

    /// SMTP relay host.
    #[arg(long = "smtp-host", env = "SMTP_HOST", value_name = "HOST", global = true)]
    pub smtp_host: Option<String>,

    /// SMTP relay port; 465 selects implicit TLS.
    #[arg(long = "smtp-port", env = "SMTP_PORT", value_name = "PORT", global = true)]
    pub smtp_port: Option<u16>,

    /// SMTP user name.
    #[arg(long = "smtp-user", env = "SMTP_USER", value_name = "USER", global = true)]
    pub smtp_user: Option<String>,

    /// SMTP password.
    #[arg(
        long = "smtp-pass",
        env = "SMTP_PASS",
        value_name = "PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub smtp_pass: Option<String>,

    /// Sender address; defaults to the SMTP user.
    #[arg(long = "mail-from", env = "ORDER_EMAIL_FROM", value_name = "ADDRESS", global = true)]
    pub from: Option<String>,

    /// Recipient of order and contact notifications.
    #[arg(
        long = "mail-notify-to",
        env = "ORDER_NOTIFICATIONS_EMAIL",
        value_name = "ADDRESS",
        global = true
    )]
    pub notify_to: Option<String>,
}
