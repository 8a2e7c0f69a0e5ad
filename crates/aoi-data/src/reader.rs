//! Sensor export loading.
//!
//! Merged iMotions exports open with a metadata block whose length depends on
//! the number of respondents. The data header is the record whose first field
//! is `"Row"`; it is located in a first pass and the file is re-parsed from
//! there in a second.

use std::fs::File;
use std::path::Path;

use aoi_core::error::{AnnotateError, Result};
use aoi_core::models::{GazeColumn, GazeValue, Millis, SampleRow, SensorTable};
use aoi_core::settings::AnnotationConfig;
use csv::StringRecord;
use tracing::{debug, warn};

/// First-column literal that marks the data header record.
pub const HEADER_SENTINEL: &str = "Row";

pub const RESPONDENT_COLUMN: &str = "Respondent";
pub const STIMULUS_COLUMN: &str = "SourceStimuliName";
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const EVENT_SOURCE_COLUMN: &str = "EventSource";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `config.input_path` into a [`SensorTable`].
pub fn load_sensor_table(config: &AnnotationConfig) -> Result<SensorTable> {
    load_sensor_table_from(&config.input_path, config)
}

/// Load an explicit export path using the parsing options in `config`.
pub fn load_sensor_table_from(path: &Path, config: &AnnotationConfig) -> Result<SensorTable> {
    let offset = find_header_offset(path, config)?;
    debug!(
        "Data header of {} found after {} metadata records",
        path.display(),
        offset
    );

    let mut reader = open_reader(path, config)?;
    let mut records = reader.records().skip(offset);

    let header = match records.next() {
        Some(record) => record?,
        // The first pass saw the sentinel, so the file changed underneath us.
        None => {
            return Err(AnnotateError::SentinelNotFound {
                path: path.to_path_buf(),
                sentinel: HEADER_SENTINEL.to_string(),
            })
        }
    };
    let layout = ColumnLayout::from_header(&header)?;
    debug!(
        "Found {} gaze columns in {}",
        layout.gaze_columns.len(),
        path.display()
    );
    if layout.gaze_columns.is_empty() {
        warn!(
            "No '<AOI> gazed at on <Stimulus>' columns in {}; was the export merged with separate AOI columns per stimulus?",
            path.display()
        );
    }

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record?;
        rows.push(layout.parse_row(&record, i + 1, config)?);
    }

    debug!("Loaded {} data rows from {}", rows.len(), path.display());

    Ok(SensorTable {
        gaze_columns: layout.gaze_columns,
        rows,
    })
}

/// Pass 1: the 0-based record index of the data header.
///
/// Fails with [`AnnotateError::SentinelNotFound`] rather than guessing.
pub fn find_header_offset(path: &Path, config: &AnnotationConfig) -> Result<usize> {
    let mut reader = open_reader(path, config)?;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.get(0).map(strip_bom) == Some(HEADER_SENTINEL) {
            return Ok(index);
        }
    }
    Err(AnnotateError::SentinelNotFound {
        path: path.to_path_buf(),
        sentinel: HEADER_SENTINEL.to_string(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Headerless, ragged-tolerant reader; both passes must see identical records.
///
/// Fields are not trimmed: header text is the marker name and must survive
/// verbatim.
fn open_reader(path: &Path, config: &AnnotationConfig) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| AnnotateError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter_byte())
        .from_reader(file))
}

fn strip_bom(field: &str) -> &str {
    field.trim_start_matches('\u{feff}')
}

/// Field positions resolved once from the data header.
struct ColumnLayout {
    respondent: usize,
    stimulus: usize,
    timestamp: usize,
    event_source: usize,
    /// Field position of each gaze column, parallel to `gaze_columns`.
    gaze_positions: Vec<usize>,
    gaze_columns: Vec<GazeColumn>,
}

impl ColumnLayout {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = header.iter().map(strip_bom).collect();
        let position = |name: &str| {
            names
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| AnnotateError::MissingColumn(name.to_string()))
        };

        let mut gaze_positions = Vec::new();
        let mut gaze_columns = Vec::new();
        for (pos, name) in names.iter().enumerate() {
            if let Some(column) = GazeColumn::parse(name, gaze_columns.len()) {
                gaze_positions.push(pos);
                gaze_columns.push(column);
            }
        }

        Ok(Self {
            respondent: position(RESPONDENT_COLUMN)?,
            stimulus: position(STIMULUS_COLUMN)?,
            timestamp: position(TIMESTAMP_COLUMN)?,
            event_source: position(EVENT_SOURCE_COLUMN)?,
            gaze_positions,
            gaze_columns,
        })
    }

    /// Convert one data record. `row` is 1-based, counted from the first
    /// record after the data header.
    fn parse_row(
        &self,
        record: &StringRecord,
        row: usize,
        config: &AnnotationConfig,
    ) -> Result<SampleRow> {
        let cell = |pos: usize| record.get(pos).filter(|c| !config.is_null(c));

        let respondent = cell(self.respondent).ok_or_else(|| AnnotateError::MissingValue {
            row,
            column: RESPONDENT_COLUMN.to_string(),
        })?;

        let is_event = cell(self.event_source).is_some();

        let stimulus = match cell(self.stimulus) {
            Some(s) => s.to_string(),
            None if is_event => String::new(),
            None => {
                return Err(AnnotateError::MissingValue {
                    row,
                    column: STIMULUS_COLUMN.to_string(),
                })
            }
        };

        let raw_ts = record.get(self.timestamp).unwrap_or("");
        let timestamp = Millis::parse(raw_ts).ok_or_else(|| AnnotateError::InvalidTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let gaze = self
            .gaze_positions
            .iter()
            .map(|&pos| GazeValue::from_cell(cell(pos)))
            .collect();

        Ok(SampleRow {
            respondent: respondent.to_string(),
            stimulus,
            timestamp,
            is_event,
            gaze,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
