use crate::universe::{saturate, Universe};
use rand::Rng;
use std::ops::Range;
use tracing::trace;

/// Cells inserted by [`Universe::stimulate`] at full energy.
pub const MAX_CELLS_PER_STIMULUS: usize = 50;

impl Universe {
    /// Sets `count` random cells in the `width × height` rectangle centred on
    /// the origin. Cells may be drawn more than once.
    pub fn seed_random<R>(&mut self, width: u32, height: u32, count: usize, rng: &mut R) -> &mut Self
    where
        R: Rng + ?Sized,
    {
        if width == 0 || height == 0 {
            return self;
        }
        let (dx, dy) = (i64::from(width / 2), i64::from(height / 2));
        for _ in 0..count {
            let x = rng.random_range(0..i64::from(width)) - dx;
            let y = rng.random_range(0..i64::from(height)) - dy;
            self.set_cell(x, y, true);
        }
        self
    }

    /// Inserts live cells in proportion to `energy`, from none at `0` to
    /// [`MAX_CELLS_PER_STIMULUS`] at `255`.
    ///
    /// Each cell lands on a random row of `rows`, anywhere across the width of
    /// the current root. Returns the number of insertions.
    pub fn stimulate<R>(&mut self, energy: u8, rows: Range<i64>, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        if rows.is_empty() {
            return 0;
        }
        let count = energy as usize * MAX_CELLS_PER_STIMULUS / u8::MAX as usize;
        let half = 1i128 << (self.level() - 1);
        let (left, right) = (saturate(-half), saturate(half - 1));
        for _ in 0..count {
            let x = rng.random_range(left..=right);
            let y = rng.random_range(rows.clone());
            self.set_cell(x, y, true);
        }
        trace!(energy, count, "stimulated");
        count
    }
}
