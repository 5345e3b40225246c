use crate::{
    node::{NodeId, NodeKind, Quadrant},
    pattern::Bounds,
    universe::{saturate, Universe},
};

impl Universe {
    /// Every live cell, each exactly once, in no particular order.
    ///
    /// Cells outside the range of `i64` are skipped.
    pub fn live_cells(&self) -> Vec<(i64, i64)> {
        self.live_cells_in(self.root_bounds())
    }

    /// Every live cell inside `bounds` (inclusive).
    pub fn live_cells_in(&self, bounds: Bounds) -> Vec<(i64, i64)> {
        let mut cells = Vec::with_capacity(self.population().min(1 << 20) as usize);
        self.for_living_cells(bounds, |x, y| cells.push((x, y)));
        cells
    }

    /// Calls `f` on every live cell inside `bounds` (inclusive).
    pub fn for_living_cells<F>(&self, bounds: Bounds, mut f: F)
    where
        F: FnMut(i64, i64),
    {
        let half = 1i128 << (self.level() - 1);
        self.for_living_cells_rec(self.root, (-half, -half), &bounds, &mut f)
    }

    /// The square covered by the root.
    pub(crate) fn root_bounds(&self) -> Bounds {
        let half = 1i128 << (self.level() - 1);
        Bounds {
            xmin: saturate(-half),
            ymin: saturate(-half),
            xmax: saturate(half - 1),
            ymax: saturate(half - 1),
        }
    }

    /// `corner` is the north-west corner of the node.
    fn for_living_cells_rec<F>(&self, id: NodeId, corner: (i128, i128), bounds: &Bounds, f: &mut F)
    where
        F: FnMut(i64, i64),
    {
        let data = &self[id];
        let half = 1i128 << (data.level - 1);
        let mask = Self::interest_mask(corner, half, bounds) & self.populated_mask(id);
        for quadrant in Quadrant::ALL {
            if mask & quadrant.bit() == 0 {
                continue;
            }
            let (dx, dy) = quadrant.corner_offset(half);
            let corner = (corner.0 + dx, corner.1 + dy);
            match data.kind {
                // Inside `bounds`, so within the range of `i64`.
                NodeKind::Leaf(_) => f(corner.0 as i64, corner.1 as i64),
                NodeKind::Quad { .. } => {
                    self.for_living_cells_rec(data.child(quadrant), corner, bounds, f)
                }
            }
        }
    }

    /// Quadrants of a node that intersect `bounds`. The node's north-west
    /// corner is `corner` and its quadrants have side `half`.
    fn interest_mask(corner: (i128, i128), half: i128, bounds: &Bounds) -> u8 {
        Quadrant::ALL
            .iter()
            .filter(|quadrant| {
                let (dx, dy) = quadrant.corner_offset(half);
                let (left, top) = (corner.0 + dx, corner.1 + dy);
                left <= i128::from(bounds.xmax)
                    && left + half > i128::from(bounds.xmin)
                    && top <= i128::from(bounds.ymax)
                    && top + half > i128::from(bounds.ymin)
            })
            .fold(0, |mask, quadrant| mask | quadrant.bit())
    }

    /// Quadrants of a node that hold at least one live cell.
    fn populated_mask(&self, id: NodeId) -> u8 {
        let data = &self[id];
        match data.kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Quad { .. } => Quadrant::ALL
                .iter()
                .filter(|&&quadrant| self[data.child(quadrant)].population != 0)
                .fold(0, |mask, quadrant| mask | quadrant.bit()),
        }
    }
}
