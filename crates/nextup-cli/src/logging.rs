use anyhow::{anyhow, Result};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for a verbosity count. `RUST_LOG` wins unless quiet.
fn directive(verbose_level: u8, quiet: bool) -> &'static str {
    match (quiet, verbose_level) {
        (true, _) => "error",
        (false, 0) => "info",
        // -v: debug, minus connection-pool chatter
        (false, 1) => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,rustls=warn",
        (false, _) => "trace",
    }
}

fn env_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    let directive = directive(verbose_level, quiet);
    if quiet {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// JSON lines when `RUST_LOG_JSON=true`, or by default when stdout is not a
/// terminal (containers, pipes).
fn json_output() -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal())
}

/// Directory and rotation prefix for a log path: `logs/nextup.log` rotates as
/// `logs/nextup.<date>`.
fn rotation_target(log_path: &Path) -> Result<(PathBuf, String)> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename: {}", log_path.display()))?;
    let prefix = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name);
    Ok((dir, prefix.to_string()))
}

pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let registry = Registry::default().with(env_filter(verbose_level, quiet));
    let json = json_output();

    let Some(log_path) = log_file else {
        if json {
            registry
                .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        }
        return Ok(());
    };

    let (dir, prefix) = rotation_target(&log_path)?;
    std::fs::create_dir_all(&dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);

    if json {
        registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender),
            )
            .init();
    }
    Ok(())
}
