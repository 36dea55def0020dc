pub mod grid;
pub mod note;
pub mod project;
pub mod reading;

pub use grid::{CellStatus, GeoPoint, GridCell};
pub use note::FieldNote;
pub use project::SurveyProject;
pub use reading::MagneticReading;
