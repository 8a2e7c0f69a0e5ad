mod bootstrap;

use anyhow::{Context, Result};
use aoi_core::settings::Settings;
use aoi_data::analysis::run;
use clap::Parser;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("aoi-annotate v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings
        .resolve()
        .context("Failed to resolve configuration")?;

    tracing::info!(
        "Input: {}, output: {}, marker type: {}, color: {}",
        config.input_path.display(),
        config.output_path.display(),
        config.marker_type,
        config.color
    );

    let meta = run(&config)
        .with_context(|| format!("Failed to annotate {}", config.input_path.display()))?;

    tracing::info!(
        "Done: {} rows in {:.2}s, {} intervals in {:.2}s",
        meta.rows_loaded,
        meta.load_time_seconds,
        meta.intervals_emitted,
        meta.extract_time_seconds
    );

    Ok(())
}
