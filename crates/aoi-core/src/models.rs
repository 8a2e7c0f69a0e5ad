use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Infix that marks a per-stimulus AOI column in a merged sensor export.
pub const GAZED_AT_ON: &str = " gazed at on ";

// ── Millis ─────────────────────────────────────────────────────────────────────

/// A sensor timestamp in milliseconds since the start of the recording.
///
/// Displayed (and serialized) without a trailing `.0` when integral, so the
/// annotation file carries the same text the export did.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Millis(pub f64);

impl Millis {
    /// Parse a `Timestamp` cell. Returns `None` for empty, non-numeric or
    /// non-finite text.
    pub fn parse(s: &str) -> Option<Self> {
        let value: f64 = s.trim().parse().ok()?;
        value.is_finite().then_some(Self(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Millis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── GazeValue ──────────────────────────────────────────────────────────────────

/// The categorical state of one AOI column at one sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GazeValue {
    /// The sample landed on the AOI; carries the exported label verbatim.
    Gazed(String),
    /// The cell was null.
    NotGazed,
}

impl GazeValue {
    /// Build from an already null-checked cell.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(label) => GazeValue::Gazed(label.to_string()),
            None => GazeValue::NotGazed,
        }
    }
}

// ── GazeColumn ─────────────────────────────────────────────────────────────────

fn gaze_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.* gazed at on .+$").expect("regex is valid"))
}

/// An `<AOI> gazed at on <Stimulus>` column of the sensor export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazeColumn {
    /// Full header text; doubles as the annotation marker name.
    pub name: String,
    /// Position of this column in every [`SampleRow::gaze`] vector.
    pub index: usize,
}

impl GazeColumn {
    /// Recognise a gaze column header. Returns `None` for any other column.
    pub fn parse(header: &str, index: usize) -> Option<Self> {
        gaze_header_re().is_match(header).then(|| Self {
            name: header.to_string(),
            index,
        })
    }

    /// Whether the column is scoped to `stimulus`.
    ///
    /// Plain substring match on `" gazed at on {stimulus}"`, so a `Slide10`
    /// column also matches stimulus `Slide1`.
    pub fn belongs_to(&self, stimulus: &str) -> bool {
        self.name.contains(&format!("{}{}", GAZED_AT_ON, stimulus))
    }
}

// ── SampleRow / SensorTable ────────────────────────────────────────────────────

/// One timestamped observation from the sensor export.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub respondent: String,
    /// Empty only on event rows.
    pub stimulus: String,
    pub timestamp: Millis,
    /// `true` when `EventSource` is populated (slide changes and the like).
    pub is_event: bool,
    /// One value per [`SensorTable::gaze_columns`] entry, same order.
    pub gaze: Vec<GazeValue>,
}

static NOT_GAZED: GazeValue = GazeValue::NotGazed;

impl SampleRow {
    /// Value of `column` at this sample.
    pub fn gaze_value(&self, column: &GazeColumn) -> &GazeValue {
        self.gaze.get(column.index).unwrap_or(&NOT_GAZED)
    }
}

/// The fully parsed data block of a sensor export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorTable {
    /// Gaze columns in header order.
    pub gaze_columns: Vec<GazeColumn>,
    /// Data rows in file order.
    pub rows: Vec<SampleRow>,
}

impl SensorTable {
    /// Gaze columns scoped to `stimulus`, in header order.
    pub fn columns_for_stimulus<'a>(
        &'a self,
        stimulus: &'a str,
    ) -> impl Iterator<Item = &'a GazeColumn> + 'a {
        self.gaze_columns
            .iter()
            .filter(move |column| column.belongs_to(stimulus))
    }
}

// ── Interval ───────────────────────────────────────────────────────────────────

/// One row of the annotations file: a span during which an AOI column held a
/// single state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    #[serde(rename = "Respondent Name")]
    pub respondent: String,
    #[serde(rename = "Stimulus Name")]
    pub stimulus: String,
    #[serde(rename = "Marker Type")]
    pub marker_type: String,
    #[serde(rename = "Marker Name")]
    pub marker_name: String,
    #[serde(rename = "Start Time (ms)")]
    pub start: Millis,
    #[serde(rename = "End Time (ms)")]
    pub end: Millis,
    #[serde(rename = "Comment")]
    pub comment: String,
    #[serde(rename = "Color")]
    pub color: String,
}

/// Header of the annotations file, in column order.
pub const ANNOTATION_HEADER: [&str; 8] = [
    "Respondent Name",
    "Stimulus Name",
    "Marker Type",
    "Marker Name",
    "Start Time (ms)",
    "End Time (ms)",
    "Comment",
    "Color",
];
