//! File-based logging for the TUI. The terminal belongs to ratatui, so
//! diagnostics go to `<config_dir>/insights/insights.log` instead.

use tracing_subscriber::EnvFilter;

/// Set up file logging. Default: INFO level, `RUST_LOG` override.
/// If setup fails, prints a warning to stderr and continues without logging.
pub fn init() {
    if let Err(e) = init_inner() {
        eprintln!("Warning: failed to set up file logging: {e}");
    }
}

fn init_inner() -> anyhow::Result<()> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
    let log_dir = config_dir.join("insights");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("insights.log"))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_ansi(false)
        .init();

    Ok(())
}
