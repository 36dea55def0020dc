use crate::model::{CellStatus, GeoPoint, GridCell, MagneticReading};
use crate::telemetry::log::LogManager;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-status cell counts plus the completed percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CoverageSummary {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub coverage_percent: f64,
}

/// Builds survey grids and derives traversal order and coverage from them.
pub struct GridPlanner {
    logger: LogManager,
}

impl GridPlanner {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("magcore::grid"),
        }
    }

    /// Lays out `rows * cols` square cells of side `spacing` degrees centered on `center`.
    ///
    /// Cells are returned row-major. Row 0 is the southernmost row and column 0 the
    /// westernmost; each polygon runs counter-clockwise from its south-west corner.
    pub fn create_regular_grid(
        &self,
        center: GeoPoint,
        spacing: f64,
        rows: u32,
        cols: u32,
    ) -> Vec<GridCell> {
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            self.logger
                .warn(&format!("refusing to build grid with spacing {}", spacing));
            return Vec::new();
        }

        let half = spacing / 2.0;
        let row_extent = (rows - 1) as f64 / 2.0;
        let col_extent = (cols - 1) as f64 / 2.0;
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);

        for row in 0..rows {
            for col in 0..cols {
                let cell_center = GeoPoint::new(
                    center.latitude + (row as f64 - row_extent) * spacing,
                    center.longitude + (col as f64 - col_extent) * spacing,
                );
                let (lat, lon) = (cell_center.latitude, cell_center.longitude);
                let bounds = vec![
                    GeoPoint::new(lat - half, lon - half),
                    GeoPoint::new(lat - half, lon + half),
                    GeoPoint::new(lat + half, lon + half),
                    GeoPoint::new(lat + half, lon - half),
                ];
                cells.push(GridCell::new(row, col, cell_center, bounds));
            }
        }

        self.logger.record(&format!(
            "Grid {}x{} built with spacing {}",
            rows, cols, spacing
        ));
        cells
    }

    /// Reorders cells into a boustrophedon walk: even row groups west to east,
    /// odd row groups east to west.
    pub fn optimize_survey_path(&self, cells: &[GridCell]) -> Vec<GridCell> {
        let mut rows: BTreeMap<u32, Vec<&GridCell>> = BTreeMap::new();
        for cell in cells {
            rows.entry(cell.row).or_default().push(cell);
        }

        let mut path = Vec::with_capacity(cells.len());
        for (position, (_, mut group)) in rows.into_iter().enumerate() {
            group.sort_by_key(|cell| cell.col);
            if position % 2 == 1 {
                group.reverse();
            }
            path.extend(group.into_iter().cloned());
        }
        path
    }

    /// Percentage of cells marked completed; 0 for an empty grid.
    pub fn calculate_grid_coverage(&self, cells: &[GridCell]) -> f64 {
        if cells.is_empty() {
            return 0.0;
        }
        let completed = cells
            .iter()
            .filter(|c| c.status == CellStatus::Completed)
            .count();
        completed as f64 * 100.0 / cells.len() as f64
    }

    pub fn coverage_summary(&self, cells: &[GridCell]) -> CoverageSummary {
        let mut summary = CoverageSummary {
            total: cells.len(),
            coverage_percent: self.calculate_grid_coverage(cells),
            ..Default::default()
        };
        for cell in cells {
            match cell.status {
                CellStatus::NotStarted => summary.not_started += 1,
                CellStatus::InProgress => summary.in_progress += 1,
                CellStatus::Completed => summary.completed += 1,
            }
        }
        summary
    }

    /// Index of the first cell whose polygon contains the point.
    pub fn locate(&self, cells: &[GridCell], latitude: f64, longitude: f64) -> Option<usize> {
        cells.iter().position(|c| c.contains(latitude, longitude))
    }

    /// Returns updated copies of `cells` with point counts incremented for every
    /// reading inside them. Untouched cells that receive points move to `InProgress`.
    pub fn assign_readings(
        &self,
        cells: &[GridCell],
        readings: &[MagneticReading],
    ) -> Vec<GridCell> {
        let mut counts = vec![0u32; cells.len()];
        let mut first_seen = vec![None; cells.len()];
        let mut outside = 0usize;

        for reading in readings {
            match self.locate(cells, reading.latitude, reading.longitude) {
                Some(idx) => {
                    counts[idx] += 1;
                    let seen = first_seen[idx].get_or_insert(reading.timestamp);
                    if reading.timestamp < *seen {
                        *seen = reading.timestamp;
                    }
                }
                None => outside += 1,
            }
        }

        if outside > 0 {
            self.logger
                .trace(&format!("{} readings fell outside the grid", outside));
        }

        cells
            .iter()
            .zip(counts)
            .zip(first_seen)
            .map(|((cell, added), seen)| {
                let updated = cell.with_point_count(cell.point_count + added);
                match seen {
                    Some(at) if updated.status == CellStatus::NotStarted => {
                        updated.with_status(CellStatus::InProgress, at)
                    }
                    _ => updated,
                }
            })
            .collect()
    }
}

impl Default for GridPlanner {
    fn default() -> Self {
        Self::new()
    }
}
