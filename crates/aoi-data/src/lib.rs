//! Data layer for the AOI annotation tool.
//!
//! Responsible for reading merged sensor exports, partitioning samples by
//! respondent and stimulus, extracting per-AOI gaze intervals and writing the
//! annotations file.

pub mod analysis;
pub mod extractor;
pub mod partition;
pub mod reader;
pub mod writer;

pub use aoi_core as core;
