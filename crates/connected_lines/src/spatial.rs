//! Uniform-grid spatial index over sampled points.
//!
//! Points are bucketed into square cells of side `cell_size`; a query returns every index
//! in the 3×3 block of cells around the queried position. With `cell_size` at least the
//! link radius this finds every partner within the radius.
use glam::Vec2;

/// Flat grid of cells holding point indices.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialIndex {
    /// Builds the index for points inside a `extent.x × extent.y` region.
    ///
    /// Positions outside the grid (for example from jitter) are clamped into the nearest
    /// border cell, so every point lands in exactly one cell.
    pub fn build<I>(positions: I, extent: Vec2, cell_size: f32) -> Self
    where
        I: IntoIterator<Item = Vec2>,
    {
        debug_assert!(cell_size > 0.0, "cell_size must be > 0");
        let dim = |len: f32| -> usize {
            if len.is_finite() && len > 0.0 {
                (len / cell_size).ceil() as usize
            } else {
                0
            }
        };
        let cols = dim(extent.x);
        let rows = dim(extent.y);
        let mut index = Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };
        if index.cells.is_empty() {
            return index;
        }
        for (i, p) in positions.into_iter().enumerate() {
            let (cx, cy) = index.cell_of(p);
            let slot = index.cell_index(cx, cy);
            index.cells[slot].push(i);
        }
        index
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions as `(cols, rows)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Total number of indexed points.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    #[inline]
    fn cell_index(&self, cx: usize, cy: usize) -> usize {
        cy * self.cols + cx
    }

    #[inline]
    fn raw_cell(&self, p: Vec2) -> (isize, isize) {
        (
            (p.x / self.cell_size).floor() as isize,
            (p.y / self.cell_size).floor() as isize,
        )
    }

    /// Cell holding `p`, clamped to the grid. Meaningless on an empty grid.
    #[inline]
    pub fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let (cx, cy) = self.raw_cell(p);
        (
            cx.clamp(0, self.cols.saturating_sub(1) as isize) as usize,
            cy.clamp(0, self.rows.saturating_sub(1) as isize) as usize,
        )
    }

    /// Indices stored in cell `(cx, cy)`, empty when out of range.
    pub fn cell(&self, cx: usize, cy: usize) -> &[usize] {
        if cx >= self.cols || cy >= self.rows {
            return &[];
        }
        &self.cells[self.cell_index(cx, cy)]
    }

    /// Appends the indices in the 3×3 neighbourhood of `p` to `out`.
    ///
    /// The neighbourhood is centred on `p`'s unclamped cell; cells outside the grid are
    /// skipped. Cells are visited row by row, indices in insertion order.
    pub fn neighbors_into(&self, p: Vec2, out: &mut Vec<usize>) {
        let (cx, cy) = self.raw_cell(p);
        for oy in -1..=1 {
            let gy = cy + oy;
            if gy < 0 || gy >= self.rows as isize {
                continue;
            }
            for ox in -1..=1 {
                let gx = cx + ox;
                if gx < 0 || gx >= self.cols as isize {
                    continue;
                }
                out.extend_from_slice(&self.cells[self.cell_index(gx as usize, gy as usize)]);
            }
        }
    }

    /// Indices in the 3×3 neighbourhood of `p`.
    pub fn neighbors(&self, p: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        self.neighbors_into(p, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_round_up() {
        let index = SpatialIndex::build(std::iter::empty(), Vec2::new(100.0, 40.0), 38.0);
        assert_eq!(index.dims(), (3, 2));
        assert!(index.is_empty());
    }

    #[test]
    fn every_point_lands_in_exactly_one_cell() {
        let positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(9.9, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(-0.7, 5.0),
            Vec2::new(30.4, 19.9),
        ];
        let index = SpatialIndex::build(positions.iter().copied(), Vec2::new(30.0, 20.0), 10.0);
        assert_eq!(index.len(), positions.len());
        assert_eq!(index.cell(0, 0), &[0, 1, 3]);
        assert_eq!(index.cell(1, 1), &[2]);
        // Jitter past the right edge clamps into the last column.
        assert_eq!(index.cell(2, 1), &[4]);
    }

    #[test]
    fn neighbors_cover_three_by_three_block() {
        let positions = vec![
            Vec2::new(5.0, 5.0),
            Vec2::new(15.0, 15.0),
            Vec2::new(25.0, 25.0),
            Vec2::new(35.0, 35.0),
        ];
        let index = SpatialIndex::build(positions.iter().copied(), Vec2::new(40.0, 40.0), 10.0);
        assert_eq!(index.neighbors(Vec2::new(15.0, 15.0)), vec![0, 1, 2]);
        assert_eq!(index.neighbors(Vec2::new(5.0, 5.0)), vec![0, 1]);
        assert_eq!(index.neighbors(Vec2::new(35.0, 35.0)), vec![2, 3]);
    }

    #[test]
    fn queries_off_the_grid_see_border_cells() {
        let positions = vec![Vec2::new(1.0, 1.0)];
        let index = SpatialIndex::build(positions, Vec2::new(20.0, 20.0), 10.0);
        assert_eq!(index.neighbors(Vec2::new(-0.5, -0.5)), vec![0]);
        assert!(index.neighbors(Vec2::new(-15.0, 1.0)).is_empty());
    }

    #[test]
    fn empty_extent_builds_empty_index() {
        let index = SpatialIndex::build(vec![Vec2::ZERO], Vec2::new(0.0, 10.0), 8.0);
        assert_eq!(index.dims(), (0, 2));
        assert!(index.is_empty());
        assert!(index.neighbors(Vec2::ZERO).is_empty());
        assert!(index.cell(0, 0).is_empty());
    }
}
