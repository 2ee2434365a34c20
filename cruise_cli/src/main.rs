mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use cruise_config::Config;
use cruise_core::error::CruiseError;
use eyre::{Result, WrapErr};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            ticks,
            script,
            stats,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                }
            }
            let args = run::RunArgs {
                ticks,
                script: script.as_deref(),
                stats,
                json: cli.json,
            };
            run::run_loop(&cfg, &args, shutdown)?;
        }
        Commands::SelfCheck => run::self_check(&cfg, cli.json)?,
    }
    Ok(())
}

/// Read, parse and validate the TOML config. Every failure is a `CruiseError::Config`.
fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| config_error(format!("read {}: {e}", path.display())))?;
    let cfg: Config = toml::from_str(&text)
        .map_err(|e| config_error(format!("parse {}: {e}", path.display())))?;
    cfg.validate()
        .map_err(|e| config_error(format!("invalid configuration: {e:#}")))?;
    Ok(cfg)
}

fn config_error(msg: String) -> eyre::Report {
    eyre::Report::new(CruiseError::Config(msg))
}

/// Console layer on stderr (pretty or JSON), plus an optional JSON-lines file sink.
///
/// Filter precedence: RUST_LOG, then --log-level, then `[logging] level`, then info.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &cruise_config::Logging,
) -> Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let console = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
