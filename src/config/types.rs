//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_LISTEN_ADDR, DEFAULT_PROXY_ATTEMPTS, DEFAULT_REGISTRY_PATH,
    HTTP_TIMEOUT_SECS, PROXY_DELAY_MAX_MS, PROXY_DELAY_MIN_MS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line interface.
///
/// # Examples
///
/// ```bash
/// # Serve the API on the default address
/// api_hub serve
///
/// # Serve with a custom registry and database
/// api_hub serve --registry ./apis.json --db-path ./hub.db --listen 0.0.0.0:8080
///
/// # Create an account and print its API key
/// api_hub issue-key --email someone@example.com
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "api_hub",
    about = "API-key gated capability gateway with a resilient site prober."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands understood by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),
    /// Create an account and print its API key
    IssueKey(IssueKeyArgs),
}

/// Server configuration.
///
/// Usable from the CLI (`api_hub serve ...`) or constructed programmatically:
///
/// ```no_run
/// use api_hub::ServeConfig;
/// use std::path::PathBuf;
///
/// let config = ServeConfig {
///     registry: PathBuf::from("apis.json"),
///     proxy_attempts: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "API_HUB_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Database path (SQLite file)
    #[arg(long, env = "API_HUB_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Capability registry (JSON object: name -> required parameters)
    #[arg(long, env = "API_HUB_REGISTRY", default_value = DEFAULT_REGISTRY_PATH)]
    pub registry: PathBuf,

    /// Per-request timeout for probe fetches, in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Proxy attempts after a blocked direct fetch
    #[arg(long, default_value_t = DEFAULT_PROXY_ATTEMPTS)]
    pub proxy_attempts: usize,

    /// Minimum pause between proxy attempts, in milliseconds
    #[arg(long, default_value_t = PROXY_DELAY_MIN_MS)]
    pub proxy_delay_min_ms: u64,

    /// Maximum pause between proxy attempts, in milliseconds
    #[arg(long, default_value_t = PROXY_DELAY_MAX_MS)]
    pub proxy_delay_max_ms: u64,

    /// Skip WHOIS/RDAP lookups in probe results
    #[arg(long)]
    pub skip_whois: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8000))),
            db_path: PathBuf::from(DB_PATH),
            registry: PathBuf::from(DEFAULT_REGISTRY_PATH),
            timeout_seconds: HTTP_TIMEOUT_SECS,
            proxy_attempts: DEFAULT_PROXY_ATTEMPTS,
            proxy_delay_min_ms: PROXY_DELAY_MIN_MS,
            proxy_delay_max_ms: PROXY_DELAY_MAX_MS,
            skip_whois: false,
        }
    }
}

/// Arguments for `issue-key`.
#[derive(Debug, Clone, Args)]
pub struct IssueKeyArgs {
    /// Account email (must be unique)
    #[arg(long)]
    pub email: String,

    /// Database path (SQLite file)
    #[arg(long, env = "API_HUB_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_serve_config_default() {
        let config = ServeConfig::default();
        assert_eq!(config.listen.to_string(), "127.0.0.1:8000");
        assert_eq!(config.db_path, PathBuf::from("./api_hub.db"));
        assert_eq!(config.registry, PathBuf::from("assets/apis.json"));
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.proxy_attempts, 10);
        assert!(config.proxy_delay_min_ms <= config.proxy_delay_max_ms);
        assert!(!config.skip_whois);
    }

    #[test]
    fn test_cli_parses_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "api_hub",
            "--log-level",
            "debug",
            "serve",
            "--listen",
            "0.0.0.0:9000",
            "--proxy-attempts",
            "3",
            "--skip-whois",
        ])
        .expect("serve arguments should parse");

        assert!(matches!(cli.log_level, LogLevel::Debug));
        match cli.command {
            Command::Serve(config) => {
                assert_eq!(config.listen.port(), 9000);
                assert_eq!(config.proxy_attempts, 3);
                assert!(config.skip_whois);
            }
            Command::IssueKey(_) => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_cli_issue_key_requires_email() {
        assert!(Cli::try_parse_from(["api_hub", "issue-key"]).is_err());

        let cli = Cli::try_parse_from(["api_hub", "issue-key", "--email", "a@example.com"])
            .expect("issue-key should parse");
        match cli.command {
            Command::IssueKey(args) => assert_eq!(args.email, "a@example.com"),
            Command::Serve(_) => panic!("expected issue-key subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_log_format() {
        let result = Cli::try_parse_from(["api_hub", "--log-format", "xml", "serve"]);
        assert!(result.is_err());
    }
}
