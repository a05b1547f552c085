// src/history/mod.rs
//! Ring-buffered spectrum history and the frequency tracker that keeps it aligned.

mod tracker;

pub use tracker::{FrequencyState, FrequencyTracker, ResetReason, TrackerAction, Tuning};

use crate::error::{Error, Result};

/// Sentinel dB value for "no data": never-written, cleared or vacated cells.
pub const FLOOR_DB: f32 = -140.0;

/// Number of rows kept when the host does not ask for something else.
pub const DEFAULT_DEPTH: usize = 120;

/// Fixed-depth circular store of spectrum rows.
///
/// Rows live in one flat allocation of `depth * bins` cells. `head` is the
/// physical row the next push writes to, so the newest row sits just
/// behind it.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Number of rows retained (time axis)
    depth: usize,
    /// Cells per row (frequency axis)
    bins: usize,
    /// Physical index of the next row to write
    head: usize,
    /// Row-major cell storage
    cells: Vec<f32>,
}

impl HistoryBuffer {
    /// Allocate a floor-filled history. A depth of zero is raised to one.
    pub fn new(depth: usize, bins: usize) -> Result<Self> {
        let depth = depth.max(1);
        let cells = allocate(depth, bins)?;
        Ok(Self {
            depth,
            bins,
            head: 0,
            cells,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Fill every cell with [`FLOOR_DB`] and rewind `head`.
    pub fn reset(&mut self) {
        self.cells.fill(FLOOR_DB);
        self.head = 0;
    }

    /// Reallocate for a new bin count. Previous contents are discarded.
    pub fn resize(&mut self, new_bins: usize) -> Result<()> {
        // Allocate first so a failure leaves the old history intact.
        self.cells = allocate(self.depth, new_bins)?;
        self.bins = new_bins;
        self.reset();
        Ok(())
    }

    /// Copy `samples` into the row at `head` and advance.
    ///
    /// Short input leaves the tail of the row at the floor value; extra
    /// samples are ignored.
    pub fn push_row(&mut self, samples: &[f32]) {
        self.push_row_with(|row| {
            let n = row.len().min(samples.len());
            row[..n].copy_from_slice(&samples[..n]);
            row[n..].fill(FLOOR_DB);
        });
    }

    /// Let `fill` write the row at `head` in place, then advance.
    pub fn push_row_with<F>(&mut self, fill: F)
    where
        F: FnOnce(&mut [f32]),
    {
        let start = self.head * self.bins;
        fill(&mut self.cells[start..start + self.bins]);
        self.head = (self.head + 1) % self.depth;
    }

    /// Physical row index holding the row `age` pushes older than the newest.
    ///
    /// `age` must be below `depth`.
    pub fn row_at_age(&self, age: usize) -> usize {
        debug_assert!(age < self.depth, "age {age} out of range for depth {}", self.depth);
        (self.head + self.depth - (age % self.depth) - 1) % self.depth
    }

    /// Cells of a physical row.
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.bins;
        &self.cells[start..start + self.bins]
    }

    /// Cells of the row at logical `age` (0 = newest).
    pub fn row_by_age(&self, age: usize) -> &[f32] {
        self.row(self.row_at_age(age))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        // An empty store yields no rows even when `bins` is zero.
        self.cells.chunks_exact_mut(self.bins.max(1))
    }

    /// Shift every row horizontally by `bins` cells.
    ///
    /// Positive values move content toward higher indices. Vacated cells
    /// take the floor value; a shift of a full row or more clears it.
    pub fn rotate(&mut self, bins: i64) {
        if bins == 0 {
            return;
        }
        for row in self.rows_mut() {
            shift_row(row, bins);
        }
    }

    /// Whole backing store, row-major, physical order.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }
}

fn allocate(depth: usize, bins: usize) -> Result<Vec<f32>> {
    let len = depth.saturating_mul(bins);
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|source| Error::Allocation {
            depth,
            bins,
            source,
        })?;
    cells.resize(len, FLOOR_DB);
    Ok(cells)
}

fn shift_row(row: &mut [f32], bins: i64) {
    let len = row.len();
    let shift = usize::try_from(bins.unsigned_abs()).unwrap_or(usize::MAX);
    if shift >= len {
        row.fill(FLOOR_DB);
        return;
    }

    if bins > 0 {
        row.copy_within(0..len - shift, shift);
        row[..shift].fill(FLOOR_DB);
    } else {
        row.copy_within(shift.., 0);
        row[len - shift..].fill(FLOOR_DB);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(depth: usize, bins: usize) -> HistoryBuffer {
        let mut history = HistoryBuffer::new(depth, bins).unwrap();
        for r in 0..depth {
            let row: Vec<f32> = (0..bins).map(|b| (r * bins + b) as f32).collect();
            history.push_row(&row);
        }
        history
    }

    #[test]
    fn new_history_is_floor_filled() {
        let history = HistoryBuffer::new(8, 16).unwrap();
        assert_eq!(history.cells().len(), 8 * 16);
        assert!(history.cells().iter().all(|&v| v == FLOOR_DB));
        assert_eq!(history.head(), 0);
    }

    #[test]
    fn reset_clears_cells_and_head() {
        let mut history = filled(5, 6);
        history.push_row(&[1.0; 6]);
        assert_ne!(history.head(), 0);

        history.reset();
        assert_eq!(history.head(), 0);
        assert!(history.cells().iter().all(|&v| v == FLOOR_DB));
    }

    #[test]
    fn resize_discards_contents() {
        let mut history = filled(4, 4);
        history.resize(7).unwrap();
        assert_eq!(history.bins(), 7);
        assert_eq!(history.cells().len(), 28);
        assert!(history.cells().iter().all(|&v| v == FLOOR_DB));
        assert_eq!(history.head(), 0);
    }

    #[test]
    fn row_at_age_stays_in_range() {
        let mut history = HistoryBuffer::new(6, 3).unwrap();
        for push in 0..20 {
            for age in 0..history.depth() {
                assert!(history.row_at_age(age) < history.depth());
            }
            // The oldest row is the one `head` points at.
            assert_eq!(history.row_at_age(history.depth() - 1), history.head());
            history.push_row(&[push as f32; 3]);
        }
    }

    #[test]
    fn ages_follow_push_order() {
        let mut history = HistoryBuffer::new(4, 4).unwrap();
        let r0 = [1.0, 2.0, 3.0, 4.0];
        let r1 = [5.0, 6.0, 7.0, 8.0];
        let r2 = [9.0, 10.0, 11.0, 12.0];
        history.push_row(&r0);
        history.push_row(&r1);
        history.push_row(&r2);

        assert_eq!(history.head(), 3);
        assert_eq!(history.row_by_age(0), &r2);
        assert_eq!(history.row_by_age(1), &r1);
        assert_eq!(history.row_by_age(2), &r0);
        assert_eq!(history.row_by_age(3), &[FLOOR_DB; 4]);
    }

    #[test]
    fn head_wraps_around_depth() {
        let mut history = HistoryBuffer::new(3, 2).unwrap();
        for v in 0..4 {
            history.push_row(&[v as f32; 2]);
        }
        assert_eq!(history.head(), 1);
        assert_eq!(history.row_by_age(0), &[3.0, 3.0]);
        assert_eq!(history.row_by_age(2), &[1.0, 1.0]);
    }

    #[test]
    fn short_rows_are_floor_padded() {
        let mut history = HistoryBuffer::new(2, 4).unwrap();
        history.push_row(&[1.0, 2.0]);
        assert_eq!(history.row_by_age(0), &[1.0, 2.0, FLOOR_DB, FLOOR_DB]);
    }

    #[test]
    fn rotation_moves_cells_and_clears_edge() {
        for k in [-3_i64, -1, 1, 2, 5] {
            let before = filled(3, 8);
            let mut after = before.clone();
            after.rotate(k);

            let shift = k.unsigned_abs() as usize;
            for r in 0..3 {
                let old = before.row(r);
                let new = after.row(r);
                let floors = new.iter().filter(|&&v| v == FLOOR_DB).count();
                assert_eq!(floors, shift, "row {r} shift {k}");
                for (i, &v) in new.iter().enumerate() {
                    let src = i as i64 - k;
                    if (0..8).contains(&src) {
                        assert_eq!(v, old[src as usize]);
                    } else {
                        assert_eq!(v, FLOOR_DB);
                    }
                }
            }
        }
    }

    #[test]
    fn rotation_beyond_row_clears_it() {
        let mut history = filled(2, 5);
        history.rotate(-9);
        assert!(history.cells().iter().all(|&v| v == FLOOR_DB));

        let mut history = filled(2, 5);
        history.rotate(i64::MIN);
        assert!(history.cells().iter().all(|&v| v == FLOOR_DB));
    }

    #[test]
    fn zero_bins_is_harmless() {
        let mut history = HistoryBuffer::new(3, 0).unwrap();
        history.push_row(&[]);
        history.rotate(4);
        assert_eq!(history.rows_mut().count(), 0);
        assert_eq!(history.head(), 1);
    }
}
