//! Beacon - system proxy rule detection and selection.
//!
//! Command-line front end for the Beacon subsystem:
//! - `resolve` runs one system proxy resolution cycle and persists the result
//! - `rule` answers "which proxy applies to this URI" from the active rules
//! - `show` prints the persisted rule strings
//! - `use-system` toggles promotion of detected rules to the active set

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use serde_json::json;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beacon_proxy::{
    EnvProxyLookup, RuleSelector, SystemProxyResolver, PROXY_RULES_KEY, SYSTEM_PROXY_RULES_KEY,
    USE_SYSTEM_PROXY_KEY,
};
use beacon_storage::Database;

/// Beacon - system proxy rule detection and selection
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
struct Args {
    /// Settings database path (defaults to the platform data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the host's proxy configuration and persist the detected rules
    Resolve,

    /// Print the proxy rule that applies to a request URI
    Rule {
        /// Request URI, e.g. https://chat.example.com
        uri: String,
    },

    /// Print the active and system-detected rule strings
    Show,

    /// Toggle whether detected rules become the active rule set
    UseSystem {
        /// "on" or "off"
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected \"on\" or \"off\", got \"{other}\"")),
    }
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "beacon", "beacon").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with file rotation and console output.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("beacon={log_level},warn")));

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("beacon")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

fn open_database(args: &Args) -> anyhow::Result<Database> {
    match &args.db {
        Some(path) => Database::with_path(path).context("failed to open settings database"),
        None => Database::new().context("failed to open settings database"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args);

    let db = open_database(&args)?;

    match args.command {
        Command::Resolve => {
            let resolver = SystemProxyResolver::new(db.clone(), EnvProxyLookup::new());
            resolver
                .resolve_system_proxy()
                .await
                .context("system proxy resolution failed")?;

            let detected: String = db.get_setting_or(SYSTEM_PROXY_RULES_KEY, String::new())?;
            if detected.is_empty() {
                println!("no system proxy detected");
            } else {
                println!("{detected}");
            }
        }

        Command::Rule { uri } => {
            let selector = RuleSelector::new(db);
            match selector.proxy_for(&uri) {
                Some(rule) => println!("{}", rule.endpoint()),
                None => println!("direct"),
            }
        }

        Command::Show => {
            let active: String = db.get_setting_or(PROXY_RULES_KEY, String::new())?;
            let system: String = db.get_setting_or(SYSTEM_PROXY_RULES_KEY, String::new())?;
            let use_system: bool = db.get_setting_or(USE_SYSTEM_PROXY_KEY, false)?;

            println!("active rules:   {}", if active.is_empty() { "(none)" } else { &active });
            println!("system rules:   {}", if system.is_empty() { "(none)" } else { &system });
            println!("use system:     {}", if use_system { "on" } else { "off" });
        }

        Command::UseSystem { enabled } => {
            db.set_setting(USE_SYSTEM_PROXY_KEY, &json!(enabled))?;
            println!("useSystemProxy set to {}", if enabled { "on" } else { "off" });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_off_parsing() {
        assert_eq!(parse_on_off("on"), Ok(true));
        assert_eq!(parse_on_off("off"), Ok(false));
        assert!(parse_on_off("maybe").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let args = Args::parse_from(["beacon", "rule", "https://chat.example.com"]);
        assert!(matches!(args.command, Command::Rule { .. }));

        let args = Args::parse_from(["beacon", "--debug", "resolve"]);
        assert!(args.debug);
        assert!(matches!(args.command, Command::Resolve));

        let args = Args::parse_from(["beacon", "use-system", "on"]);
        assert!(matches!(args.command, Command::UseSystem { enabled: true }));
    }
}
