//! Interval extraction for AOI gaze columns.
//!
//! Each gaze column of a (respondent, stimulus) partition is scanned on its
//! own. Every run of equal values becomes one candidate interval that starts
//! at the run's first timestamp and ends where the next run starts. The last
//! run always closes at the partition's final timestamp, whatever the column
//! held there. Candidates with `start == end` are dropped.

use aoi_core::models::{GazeColumn, GazeValue, Interval, Millis};
use aoi_core::settings::AnnotationConfig;
use tracing::{debug, info, warn};

use crate::partition::StimulusPartition;

// ── Change detection ──────────────────────────────────────────────────────────

/// Indices where a new run of values begins. Index 0 is always included for
/// a non-empty slice.
pub fn change_points<T: PartialEq>(values: &[T]) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(
            values
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0] != pair[1])
                .map(|(i, _)| i + 1),
        )
        .collect()
}

/// Candidate `(start, end)` spans for the runs starting at `points`.
///
/// `timestamps` is the whole partition; the final span ends at its last
/// element.
pub fn candidate_spans(points: &[usize], timestamps: &[Millis]) -> Vec<(Millis, Millis)> {
    let Some(&partition_end) = timestamps.last() else {
        return Vec::new();
    };
    points
        .iter()
        .enumerate()
        .map(|(j, &c)| {
            let start = timestamps[c];
            let end = points
                .get(j + 1)
                .map(|&next| timestamps[next])
                .unwrap_or(partition_end);
            (start, end)
        })
        .collect()
}

// ── ColumnOutcome ─────────────────────────────────────────────────────────────

/// Counts for one extracted column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOutcome {
    pub emitted: usize,
    /// Zero-length (or reversed) candidates that were dropped.
    pub discarded: usize,
}

impl ColumnOutcome {
    pub fn merge(&mut self, other: ColumnOutcome) {
        self.emitted += other.emitted;
        self.discarded += other.discarded;
    }
}

// ── IntervalExtractor ─────────────────────────────────────────────────────────

/// Turns gaze columns into [`Interval`]s stamped with the configured
/// marker type, comment and color.
pub struct IntervalExtractor<'c> {
    config: &'c AnnotationConfig,
}

impl<'c> IntervalExtractor<'c> {
    pub fn new(config: &'c AnnotationConfig) -> Self {
        Self { config }
    }

    /// Append the intervals of one column to `out`, in time order.
    pub fn extract_column(
        &self,
        partition: &StimulusPartition<'_>,
        column: &GazeColumn,
        out: &mut Vec<Interval>,
    ) -> ColumnOutcome {
        let values: Vec<&GazeValue> = partition
            .rows
            .iter()
            .map(|row| row.gaze_value(column))
            .collect();
        let timestamps: Vec<Millis> = partition.rows.iter().map(|row| row.timestamp).collect();

        let points = change_points(&values);
        let mut outcome = ColumnOutcome::default();

        for (start, end) in candidate_spans(&points, &timestamps) {
            if start == end {
                outcome.discarded += 1;
                continue;
            }
            if start > end {
                warn!(
                    "Timestamps run backwards in {} / {} ({} > {}); dropping interval for {}",
                    partition.respondent, partition.stimulus, start, end, column.name
                );
                outcome.discarded += 1;
                continue;
            }
            out.push(self.make_interval(partition, column, start, end));
            outcome.emitted += 1;
        }

        debug!(
            "{}: {} change points, {} intervals, {} discarded",
            column.name,
            points.len(),
            outcome.emitted,
            outcome.discarded
        );
        outcome
    }

    /// Extract every column in `columns`, in the given order.
    pub fn extract_partition<'a>(
        &self,
        partition: &StimulusPartition<'_>,
        columns: impl IntoIterator<Item = &'a GazeColumn>,
        out: &mut Vec<Interval>,
    ) -> ColumnOutcome {
        let mut total = ColumnOutcome::default();
        for column in columns {
            total.merge(self.extract_column(partition, column, out));
            info!("Done with {}", column.name);
        }
        total
    }

    fn make_interval(
        &self,
        partition: &StimulusPartition<'_>,
        column: &GazeColumn,
        start: Millis,
        end: Millis,
    ) -> Interval {
        Interval {
            respondent: partition.respondent.to_string(),
            stimulus: partition.stimulus.to_string(),
            marker_type: self.config.marker_type.clone(),
            marker_name: column.name.clone(),
            start,
            end,
            comment: self.config.comment.clone(),
            color: self.config.color.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
