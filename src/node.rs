use std::cell::OnceCell;

/// The id of a node, i.e., its key in the node store.
#[derive(Hash, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug)]
pub(crate) struct NodeId(pub(crate) u32);

/// A leaf, i.e., a 2x2 grid, represented by the lowest four bits of a `u8`.
///
/// `nw = 8`, `ne = 4`, `sw = 2`, `se = 1`.
pub(crate) type Leaf = u8;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Quadrant {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Quadrant {
    pub(crate) const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// The quadrant containing `(x, y)`, in coordinates centred on the node.
    pub(crate) fn of(x: i128, y: i128) -> Self {
        match (x.is_negative(), y.is_negative()) {
            (true, true) => Quadrant::Nw,
            (false, true) => Quadrant::Ne,
            (true, false) => Quadrant::Sw,
            (false, false) => Quadrant::Se,
        }
    }

    /// Offset of the top-left corner of this quadrant from the top-left
    /// corner of its parent, for a parent of side `2 * half`.
    pub(crate) const fn corner_offset(self, half: i128) -> (i128, i128) {
        match self {
            Quadrant::Nw => (0, 0),
            Quadrant::Ne => (half, 0),
            Quadrant::Sw => (0, half),
            Quadrant::Se => (half, half),
        }
    }

    /// Bit of this quadrant in a leaf, and in a quadrant interest mask.
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Quadrant::Nw => 0b1000,
            Quadrant::Ne => 0b0100,
            Quadrant::Sw => 0b0010,
            Quadrant::Se => 0b0001,
        }
    }
}

/// Contents of a node: either four bits, or four children of equal level.
#[derive(Hash, Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum NodeKind {
    Leaf(Leaf),
    Quad {
        nw: NodeId,
        ne: NodeId,
        sw: NodeId,
        se: NodeId,
    },
}

/// Children, cached results, and other data.
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    /// A node with level `n` represents a square grid with size `2.pow(n)`.
    /// Leaves have level 1.
    pub(crate) level: u8,
    pub(crate) population: u64,
    pub(crate) kind: NodeKind,
    /// The centre of the node after `2.pow(level - 2)` generations.
    pub(crate) cache: OnceCell<NodeId>,
    /// The centre of the node after one generation.
    pub(crate) cache_one: OnceCell<NodeId>,
    /// The centre of the node after the universe's configured step.
    pub(crate) cache_step: Option<NodeId>,
}

impl NodeData {
    pub(crate) fn new(level: u8, population: u64, kind: NodeKind) -> Self {
        NodeData {
            level,
            population,
            kind,
            cache: OnceCell::new(),
            cache_one: OnceCell::new(),
            cache_step: None,
        }
    }

    pub(crate) fn child(&self, quadrant: Quadrant) -> NodeId {
        match (self.kind, quadrant) {
            (NodeKind::Quad { nw, .. }, Quadrant::Nw) => nw,
            (NodeKind::Quad { ne, .. }, Quadrant::Ne) => ne,
            (NodeKind::Quad { sw, .. }, Quadrant::Sw) => sw,
            (NodeKind::Quad { se, .. }, Quadrant::Se) => se,
            (NodeKind::Leaf(_), _) => unreachable!("A leaf has no child nodes."),
        }
    }

    pub(crate) fn nw(&self) -> NodeId {
        self.child(Quadrant::Nw)
    }

    pub(crate) fn ne(&self) -> NodeId {
        self.child(Quadrant::Ne)
    }

    pub(crate) fn sw(&self) -> NodeId {
        self.child(Quadrant::Sw)
    }

    pub(crate) fn se(&self) -> NodeId {
        self.child(Quadrant::Se)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_of() {
        assert_eq!(Quadrant::of(-1, -1), Quadrant::Nw);
        assert_eq!(Quadrant::of(0, -5), Quadrant::Ne);
        assert_eq!(Quadrant::of(-3, 0), Quadrant::Sw);
        assert_eq!(Quadrant::of(0, 0), Quadrant::Se);
    }
}
