use clap::Parser;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{AnnotateError, Result};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build iMotions AOI annotations from a merged raw sensor data export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "aoi-annotate",
    about = "Build iMotions AOI annotations from a merged raw sensor data export",
    version
)]
pub struct Settings {
    /// JSON configuration file (defaults to <config dir>/aoi-annotate/config.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Merged sensor data export to read
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Annotations CSV to write
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Marker type written on every annotation
    #[arg(long)]
    pub marker_type: Option<String>,

    /// Comment written on every annotation
    #[arg(long)]
    pub comment: Option<String>,

    /// Marker color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,

    /// Field delimiter for both input and output
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

impl Settings {
    /// Layer built-in defaults, the configuration file and command-line flags
    /// (flags win) into a validated [`AnnotationConfig`].
    pub fn resolve(&self) -> Result<AnnotationConfig> {
        self.resolve_with_default_path(AnnotationConfig::default_path().as_deref())
    }

    /// Same as [`resolve`](Self::resolve) with an explicit fallback config
    /// path, so tests can point it at a temporary directory.
    pub fn resolve_with_default_path(&self, default_path: Option<&Path>) -> Result<AnnotationConfig> {
        let mut config = match (&self.config, default_path) {
            (Some(path), _) => AnnotationConfig::load_from(path)?,
            (None, Some(path)) if path.exists() => AnnotationConfig::load_from(path)?,
            _ => AnnotationConfig::default(),
        };

        if let Some(v) = &self.input {
            config.input_path = v.clone();
        }
        if let Some(v) = &self.output {
            config.output_path = v.clone();
        }
        if let Some(v) = &self.marker_type {
            config.marker_type = v.clone();
        }
        if let Some(v) = &self.comment {
            config.comment = v.clone();
        }
        if let Some(v) = &self.color {
            config.color = v.clone();
        }
        if let Some(v) = self.delimiter {
            config.delimiter = v;
        }

        config.validate()?;
        Ok(config)
    }
}

// ── AnnotationConfig ───────────────────────────────────────────────────────────

/// Everything a run needs besides the data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Merged raw sensor data export.
    pub input_path: PathBuf,
    /// Annotations file to produce.
    pub output_path: PathBuf,
    pub marker_type: String,
    pub comment: String,
    /// `#RRGGBB`.
    pub color: String,
    /// Field delimiter, shared by input and output.
    pub delimiter: char,
    /// Cell texts treated as null in addition to the empty string.
    pub null_markers: Vec<String>,
}

/// Null spellings recognised by common CSV tooling. The empty string is
/// always null and is not listed.
pub const DEFAULT_NULL_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("regex is valid"))
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("ExportMerge.csv"),
            output_path: PathBuf::from("iMotionsAnnotations.csv"),
            marker_type: "Respondent Annotation".to_string(),
            comment: String::new(),
            color: "#FF0000".to_string(),
            delimiter: ',',
            null_markers: DEFAULT_NULL_MARKERS.into_iter().map(String::from).collect(),
        }
    }
}

impl AnnotationConfig {
    /// `<config dir>/aoi-annotate/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aoi-annotate").join("config.json"))
    }

    /// Load a JSON configuration file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnnotateError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values that would produce an unreadable annotations file.
    pub fn validate(&self) -> Result<()> {
        if !color_re().is_match(&self.color) {
            return Err(AnnotateError::Config(format!(
                "color must be #RRGGBB, got {:?}",
                self.color
            )));
        }
        if self.marker_type.trim().is_empty() {
            return Err(AnnotateError::Config("marker_type must not be empty".to_string()));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(AnnotateError::Config(format!(
                "delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// The delimiter as the byte the CSV reader and writer expect.
    pub fn delimiter_byte(&self) -> u8 {
        // `validate` guarantees ASCII; fall back to a comma otherwise.
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Whether a cell counts as null. Matching is exact; no trimming.
    pub fn is_null(&self, cell: &str) -> bool {
        cell.is_empty() || self.null_markers.iter().any(|m| m == cell)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
