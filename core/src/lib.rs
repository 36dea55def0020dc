//! Core planning, statistics and export logic for magnetometer field surveys.
//!
//! The modules take flat lists of readings, grid cells and field notes supplied by
//! the caller, derive coverage and statistics from them, and encode the whole survey
//! into GIS-friendly formats. Nothing here holds state between calls.

pub mod analysis;
pub mod export;
pub mod math;
pub mod model;
pub mod prelude;
pub mod telemetry;

pub use prelude::{SurveyConfig, SurveyError, SurveyResult};
