pub mod geo;
pub mod stats;

pub use geo::{BoundingBox, KM_PER_DEGREE};
pub use stats::StatsHelper;
