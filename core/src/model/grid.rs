use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Collection progress of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl CellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellStatus::NotStarted => "not_started",
            CellStatus::InProgress => "in_progress",
            CellStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One square of the survey grid.
///
/// `row` and `col` are the authoritative position; [`GridCell::id`] is only a
/// display string derived from them. `bounds` lists the polygon vertices without
/// repeating the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub center: GeoPoint,
    pub bounds: Vec<GeoPoint>,
    #[serde(default)]
    pub status: CellStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub point_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GridCell {
    pub fn new(row: u32, col: u32, center: GeoPoint, bounds: Vec<GeoPoint>) -> Self {
        Self {
            row,
            col,
            center,
            bounds,
            status: CellStatus::NotStarted,
            started_at: None,
            completed_at: None,
            point_count: 0,
            notes: None,
        }
    }

    pub fn id(&self) -> String {
        format!("{}_{}", self.row, self.col)
    }

    /// Returns a copy moved to `status`, stamping the transition time.
    pub fn with_status(&self, status: CellStatus, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.status = status;
        match status {
            CellStatus::NotStarted => {
                next.started_at = None;
                next.completed_at = None;
            }
            CellStatus::InProgress => {
                next.started_at.get_or_insert(at);
                next.completed_at = None;
            }
            CellStatus::Completed => {
                next.started_at.get_or_insert(at);
                next.completed_at = Some(at);
            }
        }
        next
    }

    pub fn with_point_count(&self, point_count: u32) -> Self {
        Self {
            point_count,
            ..self.clone()
        }
    }

    /// Half-open bounding-box test against the cell polygon.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let Some((min, max)) = self.extent() else {
            return false;
        };
        latitude >= min.latitude
            && latitude < max.latitude
            && longitude >= min.longitude
            && longitude < max.longitude
    }

    /// Polygon vertices with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<GeoPoint> {
        let mut ring = self.bounds.clone();
        if let Some(first) = self.bounds.first() {
            ring.push(*first);
        }
        ring
    }

    fn extent(&self) -> Option<(GeoPoint, GeoPoint)> {
        let first = self.bounds.first()?;
        let init = (*first, *first);
        Some(self.bounds.iter().fold(init, |(min, max), p| {
            (
                GeoPoint::new(min.latitude.min(p.latitude), min.longitude.min(p.longitude)),
                GeoPoint::new(max.latitude.max(p.latitude), max.longitude.max(p.longitude)),
            )
        }))
    }
}
