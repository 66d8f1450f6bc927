//! Logger initialization.
//!
//! Log lines are tagged with the service component that emitted them
//! (`dispatch`, `probe`, `chat`, ...), taken from the record target. Records
//! from dependencies are tagged `dep` and held to the levels in
//! [`DEPENDENCY_LEVELS`].

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};
use serde_json::json;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Ceilings for chatty dependencies; the CLI level never raises them.
const DEPENDENCY_LEVELS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("sqlx", LevelFilter::Info),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("axum", LevelFilter::Info),
    ("tower_http", LevelFilter::Info),
    // Truncated UDP answers are retried over TCP
    ("hickory_proto", LevelFilter::Error),
    ("whois_service", LevelFilter::Warn),
];

const CRATE_TARGET: &str = "api_hub";

/// Service component a record target belongs to.
///
/// `api_hub::probe::fetch` is `probe`, the crate root (and the binary) is
/// `server`, anything outside the crate is `dep`.
fn component_of(target: &str) -> &str {
    match target.strip_prefix(CRATE_TARGET) {
        Some("") => "server",
        Some(rest) => match rest.strip_prefix("::") {
            Some(path) => path.split("::").next().unwrap_or("server"),
            // Another crate that merely shares the prefix
            None => "dep",
        },
        None => "dep",
    }
}

fn json_line(ts: i64, level: Level, target: &str, msg: &str) -> String {
    json!({
        "ts": ts,
        "level": level.as_str(),
        "component": component_of(target),
        "target": target,
        "msg": msg,
    })
    .to_string()
}

fn level_marker(level: Level) -> (ColoredString, &'static str) {
    let name = level.to_string();
    match level {
        Level::Error => (name.red(), "❌"),
        Level::Warn => (name.yellow(), "⚠️"),
        Level::Info => (name.green(), "✔️"),
        Level::Debug => (name.blue(), "🔍"),
        Level::Trace => (name.purple(), "🔬"),
    }
}

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then overrides it for this crate and as
/// the global default. JSON lines carry `ts`, `level`, `component`, `target`
/// and `msg`.
///
/// ```bash
/// RUST_LOG=api_hub::probe=trace api_hub serve
/// api_hub --log-level debug --log-format json serve
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already
/// installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, ceiling) in DEPENDENCY_LEVELS {
        builder.filter_module(module, (*ceiling).min(level));
    }
    builder.filter_module(CRATE_TARGET, level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let (colored_level, emoji) = level_marker(record.level());
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    emoji,
                    component_of(record.target()).cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)
}
