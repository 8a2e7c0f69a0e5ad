use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto a tracing filter directive.
///
/// Unrecognised names are passed through so full `EnvFilter` directives
/// (e.g. `aoi_data=debug`) keep working.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Progress lines go to stdout through the fmt layer. Falls back to `"info"`
/// if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_maps_cli_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
    }

    #[test]
    fn test_level_directive_is_case_insensitive() {
        assert_eq!(level_directive("warning"), "warn");
    }

    #[test]
    fn test_level_directive_passes_through_directives() {
        assert_eq!(level_directive("aoi_data=trace"), "aoi_data=trace");
    }

    #[test]
    fn test_setup_logging_twice_is_an_error_not_a_panic() {
        let _ = setup_logging("INFO");
        assert!(setup_logging("INFO").is_err());
    }
}
