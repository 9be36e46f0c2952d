use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Filter directives for the given flags. `RUST_LOG` wins unless `--quiet`.
fn build_filter(verbose_level: u8, quiet: bool, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let directives = match verbose_level {
        0 => default_level,
        // -v: debug, minus reqwest/hyper connection chatter
        1 => "debug,hyper=warn,reqwest::connect=warn,rustls=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Install the global subscriber.
///
/// Logs go to stderr, or to a daily-rotated file when `log_file` is set
/// (`plexarr.log` rotates to `plexarr.2026-01-17` and so on). Output is
/// JSON when stdout is not a terminal, overridable with `RUST_LOG_JSON`.
pub fn init_logging(verbose_level: u8, quiet: bool, default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, default_level);

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let log_dir = log_path
            .parent()
            .ok_or_else(|| eyre!("Log file path has no parent directory"))?;
        std::fs::create_dir_all(log_dir)?;

        let log_filename = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| eyre!("Invalid log filename: {}", log_path.display()))?;
        let log_prefix = log_filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(log_filename);

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);
            registry.with(json_layer).try_init()?;
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);
            registry.with(fmt_layer).try_init()?;
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}
