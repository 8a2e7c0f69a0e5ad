//! Shared types for the AOI annotation tool: the sensor-export data model,
//! the error type and run configuration.

pub mod error;
pub mod models;
pub mod settings;

pub use error::{AnnotateError, Result};
