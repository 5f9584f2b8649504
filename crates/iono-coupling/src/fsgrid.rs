// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — External Grid Descriptor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometry of the external structured simulation grid.
//!
//! The coupling layer only needs point-to-cell lookup; the grid's cell
//! data itself travels as `ndarray::Array3` fields owned by the caller.

use iono_mesh::geometry::Vec3;
use iono_mesh::grid::CellId;
use iono_types::error::{IonoError, IonoResult};

/// Uniform Cartesian grid: origin corner, per-axis spacing, cell counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FsGridGeometry {
    pub origin: Vec3,
    pub spacing: Vec3,
    pub cells: [usize; 3],
}

impl FsGridGeometry {
    pub fn new(origin: Vec3, spacing: Vec3, cells: [usize; 3]) -> IonoResult<Self> {
        if spacing.iter().any(|&d| !d.is_finite() || d <= 0.0) {
            return Err(IonoError::InvalidInput(format!(
                "grid spacing must be finite > 0, got {spacing:?}"
            )));
        }
        if cells.iter().any(|&n| n == 0) {
            return Err(IonoError::InvalidInput(format!(
                "grid must have at least one cell per axis, got {cells:?}"
            )));
        }
        Ok(FsGridGeometry {
            origin,
            spacing,
            cells,
        })
    }

    /// Cube-shaped grid centred on the origin, `cells_per_axis` cells
    /// spanning `[-half_extent, half_extent]` on every axis.
    pub fn centered_cube(half_extent: f64, cells_per_axis: usize) -> IonoResult<Self> {
        let d = 2.0 * half_extent / cells_per_axis as f64;
        Self::new(
            [-half_extent, -half_extent, -half_extent],
            [d, d, d],
            [cells_per_axis; 3],
        )
    }

    /// Cell containing `x`, or `None` outside the grid box.
    pub fn cell_of(&self, x: &Vec3) -> Option<CellId> {
        let mut id = [0i32; 3];
        for axis in 0..3 {
            let f = (x[axis] - self.origin[axis]) / self.spacing[axis];
            if f < 0.0 || f >= self.cells[axis] as f64 {
                return None;
            }
            id[axis] = f as i32;
        }
        Some(id)
    }

    /// Centre point of a cell.
    pub fn cell_center(&self, cell: &CellId) -> Vec3 {
        let mut c = [0.0; 3];
        for axis in 0..3 {
            c[axis] = self.origin[axis] + (cell[axis] as f64 + 0.5) * self.spacing[axis];
        }
        c
    }
}

// ═══════════════════════════════ tests ═══════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lookup_inside_and_outside() {
        let grid = FsGridGeometry::centered_cube(10.0, 20).unwrap();
        assert_eq!(grid.cell_of(&[-10.0, -10.0, -10.0]), Some([0, 0, 0]));
        assert_eq!(grid.cell_of(&[0.5, 0.5, 0.5]), Some([10, 10, 10]));
        assert_eq!(grid.cell_of(&[10.1, 0.0, 0.0]), None);
        assert_eq!(grid.cell_of(&[0.0, 0.0, -10.5]), None);
    }

    #[test]
    fn test_cell_center_round_trip() {
        let grid = FsGridGeometry::centered_cube(8.0, 16).unwrap();
        let cell = [3, 9, 15];
        let center = grid.cell_center(&cell);
        assert_eq!(grid.cell_of(&center), Some(cell));
    }

    #[test]
    fn test_degenerate_grids_rejected() {
        assert!(FsGridGeometry::new([0.0; 3], [1.0, 0.0, 1.0], [4; 3]).is_err());
        assert!(FsGridGeometry::new([0.0; 3], [1.0; 3], [4, 0, 4]).is_err());
    }
}
