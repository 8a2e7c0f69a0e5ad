//! Main annotation pipeline.
//!
//! Loads the sensor export, partitions it, extracts intervals for every
//! (respondent, stimulus, gaze column) triple and returns an
//! [`AnnotationResult`] ready for the writer.

use std::time::Instant;

use aoi_core::error::Result;
use aoi_core::models::{Interval, SensorTable};
use aoi_core::settings::AnnotationConfig;
use chrono::Utc;
use tracing::{info, warn};

use crate::extractor::{ColumnOutcome, IntervalExtractor};
use crate::partition::Partitioner;
use crate::reader::load_sensor_table;
use crate::writer::write_annotations;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the intervals.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AnnotationMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Export the rows were read from, if any.
    pub input_path: Option<String>,
    /// Data rows loaded, event rows included.
    pub rows_loaded: usize,
    /// Event rows excluded from every partition.
    pub event_rows_dropped: usize,
    pub respondents: usize,
    /// Number of (respondent, stimulus) partitions.
    pub stimuli: usize,
    /// Number of (respondent, stimulus, column) triples scanned.
    pub columns_processed: usize,
    pub intervals_emitted: usize,
    /// Zero-length candidates that were dropped.
    pub intervals_discarded: usize,
    /// Wall-clock seconds spent reading the export.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent partitioning and extracting.
    pub extract_time_seconds: f64,
}

/// The complete output of [`annotate`].
#[derive(Debug, Clone)]
pub struct AnnotationResult {
    /// Intervals in respondent → stimulus → column order.
    pub intervals: Vec<Interval>,
    pub metadata: AnnotationMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load `config.input_path` and extract every interval.
pub fn annotate(config: &AnnotationConfig) -> Result<AnnotationResult> {
    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let table = load_sensor_table(config)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Partition and extract ─────────────────────────────────────────
    let mut result = annotate_table(&table, config);
    result.metadata.input_path = Some(config.input_path.display().to_string());
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Partition an already-loaded table and extract every interval.
pub fn annotate_table(table: &SensorTable, config: &AnnotationConfig) -> AnnotationResult {
    let extract_start = Instant::now();
    let extractor = IntervalExtractor::new(config);

    let mut intervals: Vec<Interval> = Vec::new();
    let mut totals = ColumnOutcome::default();
    let mut stimuli = 0usize;
    let mut columns_processed = 0usize;

    let respondents = Partitioner::by_respondent(&table.rows);
    for respondent in &respondents {
        info!("Starting annotations for {}", respondent.respondent);

        for stimulus in Partitioner::by_stimulus(respondent) {
            stimuli += 1;
            let columns: Vec<_> = table.columns_for_stimulus(stimulus.stimulus).collect();
            if columns.is_empty() {
                warn!(
                    "No gaze columns for stimulus {} (respondent {})",
                    stimulus.stimulus, respondent.respondent
                );
            }

            columns_processed += columns.len();
            totals.merge(extractor.extract_partition(&stimulus, columns, &mut intervals));
            info!("Done with {}", stimulus.stimulus);
        }
        info!("Done with {}", respondent.respondent);
    }

    let metadata = AnnotationMetadata {
        generated_at: Utc::now().to_rfc3339(),
        input_path: None,
        rows_loaded: table.rows.len(),
        event_rows_dropped: table.rows.iter().filter(|row| row.is_event).count(),
        respondents: respondents.len(),
        stimuli,
        columns_processed,
        intervals_emitted: totals.emitted,
        intervals_discarded: totals.discarded,
        load_time_seconds: 0.0,
        extract_time_seconds: extract_start.elapsed().as_secs_f64(),
    };

    AnnotationResult {
        intervals,
        metadata,
    }
}

/// Full run: annotate `config.input_path` and write `config.output_path`.
pub fn run(config: &AnnotationConfig) -> Result<AnnotationMetadata> {
    let result = annotate(config)?;

    // ── Step 3: Write ─────────────────────────────────────────────────────────
    write_annotations(
        &config.output_path,
        &result.intervals,
        config.delimiter_byte(),
    )?;

    let meta = &result.metadata;
    info!(
        "Wrote {} annotations ({} respondents, {} stimuli, {} columns, {} zero-length dropped) to {}",
        meta.intervals_emitted,
        meta.respondents,
        meta.stimuli,
        meta.columns_processed,
        meta.intervals_discarded,
        config.output_path.display()
    );
    Ok(result.metadata)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
