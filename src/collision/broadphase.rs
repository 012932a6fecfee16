use glam::Vec2;

use crate::core::{ball::BallId, types::Bounds};

/// Uniform grid spatial partitioning used by the broad-phase.
///
/// Cells are at least one ball diameter wide, so any overlapping pair lives in
/// the same or adjacent cells. The grid stores ball ids only and is rebuilt
/// from scratch every tick.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<BallId>>,
}

impl SpatialGrid {
    pub fn new(bounds: Bounds, cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            bounds.width.max(bounds.height).max(1.0)
        };
        let cols = ((bounds.width / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Column/row of the cell containing `position`, clamped onto the grid.
    pub fn cell_of(&self, position: Vec2) -> (usize, usize) {
        let clamp_axis = |value: f32, len: usize| -> usize {
            let cell = (value / self.cell_size).floor();
            if cell.is_nan() || cell < 0.0 {
                0
            } else {
                (cell as usize).min(len - 1)
            }
        };
        (
            clamp_axis(position.x, self.cols),
            clamp_axis(position.y, self.rows),
        )
    }

    /// Empties every cell, keeping allocations for the next rebuild.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn insert(&mut self, id: BallId, position: Vec2) {
        let (col, row) = self.cell_of(position);
        self.cells[row * self.cols + col].push(id);
    }

    /// Clears the grid and inserts every `(id, position)` pair.
    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (BallId, Vec2)>,
    {
        self.clear();
        for (id, position) in entries {
            self.insert(id, position);
        }
    }

    /// Appends every id in the 3x3 block around `position`'s cell except `id` itself.
    pub fn query_neighbors(&self, id: BallId, position: Vec2, out: &mut Vec<BallId>) {
        let (col, row) = self.cell_of(position);
        let col_range = col.saturating_sub(1)..=(col + 1).min(self.cols - 1);
        let row_range = row.saturating_sub(1)..=(row + 1).min(self.rows - 1);

        for r in row_range {
            for c in col_range.clone() {
                out.extend(
                    self.cells[r * self.cols + c]
                        .iter()
                        .copied()
                        .filter(|other| *other != id),
                );
            }
        }
    }

    pub fn cell_population(&self, col: usize, row: usize) -> usize {
        self.cells
            .get(row * self.cols + col)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }
}
