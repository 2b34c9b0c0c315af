//! Stage grid configuration and cell mapping

use serde::{Deserialize, Serialize};

use super::geometry::{Offset, Point, Size};

/// Grid layout drawn over a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridType {
    NoGrid,
    #[default]
    Square,
    HexV,
    HexH,
    Isometric,
}

/// Which grid points are valid snap targets.
///
/// Modes are hierarchical: every mode includes the targets of the one before
/// it. `Half`, `Quarter` and `Micro` snap to a lattice of ½, ¼ and ⅛ of a cell,
/// which contains the corners, edge midpoints and centres of each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapMode {
    Free,
    Full,
    Half,
    Quarter,
    Micro,
}

impl SnapMode {
    fn divisions(self) -> Option<f64> {
        match self {
            SnapMode::Free | SnapMode::Full => None,
            SnapMode::Half => Some(2.0),
            SnapMode::Quarter => Some(4.0),
            SnapMode::Micro => Some(8.0),
        }
    }
}

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: i64,
    pub row: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    #[serde(rename = "type")]
    pub grid_type: GridType,
    pub cell_size: Size,
    pub offset: Offset,
    pub scale: f64,
    pub snap: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            grid_type: GridType::Square,
            cell_size: Size::new(50.0, 50.0),
            offset: Offset::default(),
            scale: 1.0,
            snap: true,
        }
    }
}

impl Grid {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.cell_size.is_positive() {
            errors.push("Grid cell size must be positive".to_string());
        }
        if self.scale <= 0.0 {
            errors.push("Grid scale must be positive".to_string());
        }
        errors
    }

    /// Map a world point to the cell containing it
    pub fn cell_at(&self, point: Point) -> Cell {
        let w = self.cell_size.width;
        let h = self.cell_size.height;
        Cell {
            col: ((point.x - self.offset.left) / w).floor() as i64,
            row: ((point.y - self.offset.top) / h).floor() as i64,
        }
    }

    /// Centre of a cell in world coordinates
    pub fn cell_center(&self, cell: Cell) -> Point {
        let w = self.cell_size.width;
        let h = self.cell_size.height;
        Point::new(
            self.offset.left + cell.col as f64 * w + w / 2.0,
            self.offset.top + cell.row as f64 * h + h / 2.0,
        )
    }

    /// Snap a point to the nearest valid target for the given mode.
    ///
    /// Only square grids support sub-cell lattices; other layouts snap to the
    /// centre of the bounding cell for every mode except `Free`.
    pub fn snap(&self, point: Point, mode: SnapMode) -> Point {
        if self.grid_type == GridType::NoGrid || mode == SnapMode::Free {
            return point;
        }
        let divisions = match (self.grid_type, mode.divisions()) {
            (GridType::Square, Some(d)) => d,
            _ => return self.cell_center(self.cell_at(point)),
        };
        let step_x = self.cell_size.width / divisions;
        let step_y = self.cell_size.height / divisions;
        Point::new(
            self.offset.left + ((point.x - self.offset.left) / step_x).round() * step_x,
            self.offset.top + ((point.y - self.offset.top) / step_y).round() * step_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::default()
    }

    #[test]
    fn test_cell_at_honours_offset() {
        let mut grid = grid();
        grid.offset = Offset { left: 10.0, top: 20.0 };

        assert_eq!(grid.cell_at(Point::new(10.0, 20.0)), Cell { col: 0, row: 0 });
        assert_eq!(grid.cell_at(Point::new(59.9, 69.9)), Cell { col: 0, row: 0 });
        assert_eq!(grid.cell_at(Point::new(60.0, 70.0)), Cell { col: 1, row: 1 });
        assert_eq!(grid.cell_at(Point::new(9.0, 19.0)), Cell { col: -1, row: -1 });
    }

    #[test]
    fn test_snap_modes_on_square_grid() {
        let grid = grid();
        let p = Point::new(12.0, 37.0);

        assert_eq!(grid.snap(p, SnapMode::Free), p);
        assert_eq!(grid.snap(p, SnapMode::Full), Point::new(25.0, 25.0));
        assert_eq!(grid.snap(p, SnapMode::Half), Point::new(0.0, 25.0));
        assert_eq!(grid.snap(p, SnapMode::Quarter), Point::new(12.5, 37.5));
        assert_eq!(grid.snap(p, SnapMode::Micro), Point::new(12.5, 37.5));
    }

    #[test]
    fn test_no_grid_never_snaps() {
        let mut grid = grid();
        grid.grid_type = GridType::NoGrid;
        let p = Point::new(12.0, 37.0);
        assert_eq!(grid.snap(p, SnapMode::Full), p);
    }

    #[test]
    fn test_hex_grid_snaps_to_cell_centre() {
        let mut grid = grid();
        grid.grid_type = GridType::HexH;
        assert_eq!(
            grid.snap(Point::new(12.0, 37.0), SnapMode::Quarter),
            Point::new(25.0, 25.0)
        );
    }

    #[test]
    fn test_validate_rejects_degenerate_cells() {
        let mut grid = grid();
        grid.cell_size = Size::new(0.0, 50.0);
        assert_eq!(grid.validate().len(), 1);
    }
}
