use crate::{
    node::{Leaf, NodeData, NodeId, NodeKind, Quadrant},
    pattern::Bounds,
    rewind::RewindLog,
    rule::Rule,
    store::{NodeStore, DEFAULT_CAPACITY_LOG2},
};
use std::ops::Index;
use tracing::{debug, trace};

/// The root never covers less than `2.pow(MIN_LEVEL)` cells on a side.
pub const MIN_LEVEL: u8 = 3;

/// Clamps a coordinate to the range of `i64`.
pub(crate) fn saturate(coordinate: i128) -> i64 {
    coordinate.clamp(i64::MIN.into(), i64::MAX.into()) as i64
}

/// An unbounded two-state cellular automaton, stored as a canonical quadtree.
///
/// The root is centred on the origin: a root of level `n` covers the cells
/// with `-2.pow(n - 1) <= x, y < 2.pow(n - 1)`. `y` grows southwards.
#[derive(Clone, Debug)]
pub struct Universe {
    pub(crate) rule: Rule,
    pub(crate) generation: u64,
    /// The actual step is `2.pow(step)`.
    pub(crate) step: u8,
    pub(crate) store: NodeStore,
    /// Cached empty nodes, indexed by `level - 1`.
    empty_nodes: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) history: RewindLog,
}

impl Index<NodeId> for Universe {
    type Output = NodeData;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.store[id]
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe::new(Rule::default())
    }
}

#[derive(Copy, Clone, Debug)]
enum Edge {
    West,
    East,
    North,
    South,
}

impl Edge {
    /// The quadrants touching this edge, then the opposite ones.
    const fn quadrants(self) -> ([Quadrant; 2], [Quadrant; 2]) {
        match self {
            Edge::West => ([Quadrant::Nw, Quadrant::Sw], [Quadrant::Ne, Quadrant::Se]),
            Edge::East => ([Quadrant::Ne, Quadrant::Se], [Quadrant::Nw, Quadrant::Sw]),
            Edge::North => ([Quadrant::Nw, Quadrant::Ne], [Quadrant::Sw, Quadrant::Se]),
            Edge::South => ([Quadrant::Sw, Quadrant::Se], [Quadrant::Nw, Quadrant::Ne]),
        }
    }

    /// Direction of this edge along its axis.
    const fn sign(self) -> i128 {
        match self {
            Edge::West | Edge::North => -1,
            Edge::East | Edge::South => 1,
        }
    }
}

impl Universe {
    pub fn new(rule: Rule) -> Self {
        Self::with_capacity(rule, DEFAULT_CAPACITY_LOG2)
    }

    /// Creates an empty universe whose node table starts with
    /// `2.pow(capacity_log2)` slots.
    pub fn with_capacity(rule: Rule, capacity_log2: u32) -> Self {
        let mut store = NodeStore::with_capacity(capacity_log2);
        let empty_leaf = store.find_leaf(0);
        let mut universe = Universe {
            rule,
            generation: 0,
            step: 0,
            store,
            empty_nodes: vec![empty_leaf],
            root: empty_leaf,
            history: RewindLog::default(),
        };
        universe.root = universe.empty_node(MIN_LEVEL);
        universe
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Replaces the rule. Every memoized result is dropped.
    pub fn set_rule(&mut self, rule: Rule) -> &mut Self {
        if rule != self.rule {
            debug!(from = %self.rule, to = %rule, "changing rule");
            self.store.clear_cache(true);
            self.rule = rule;
        }
        self
    }

    pub fn population(&self) -> u64 {
        self[self.root].population
    }

    pub fn level(&self) -> u8 {
        self[self.root].level
    }

    pub fn get_cell(&self, x: i64, y: i64) -> bool {
        Self::contains(self.level(), x, y) && self.get_cell_rec(self.root, x.into(), y.into())
    }

    pub fn set_cell(&mut self, x: i64, y: i64, state: bool) -> &mut Self {
        while !Self::contains(self.level(), x, y) {
            self.expand_root();
        }
        self.root = self.set_cell_rec(self.root, x.into(), y.into(), state);
        self
    }

    pub fn get_step(&self) -> u8 {
        self.step
    }

    /// Sets the number of generations advanced by [`Universe::step`] to `2.pow(step)`.
    pub fn set_step(&mut self, step: u8) -> &mut Self {
        debug_assert!(step < 64, "Cannot step 2.pow({}) generations.", step);
        if step != self.step {
            self.store.clear_cache(false);
            self.step = step;
        }
        self
    }

    pub fn get_generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) -> &mut Self {
        self.generation = generation;
        self
    }

    /// Number of distinct nodes created so far.
    pub fn node_count(&self) -> usize {
        self.store.len()
    }

    /// Empties the universe and its history. Nodes and their caches are kept.
    pub fn clear(&mut self) {
        self.root = self.empty_node(MIN_LEVEL);
        self.generation = 0;
        self.history.clear();
    }

    /// The smallest rectangle containing every live cell, saturated at the
    /// limits of `i64`.
    pub fn bound(&self) -> Option<Bounds> {
        match (
            self.edge(self.root, Edge::West),
            self.edge(self.root, Edge::East),
            self.edge(self.root, Edge::North),
            self.edge(self.root, Edge::South),
        ) {
            (Some(xmin), Some(xmax), Some(ymin), Some(ymax)) => Some(Bounds {
                xmin: saturate(xmin),
                ymin: saturate(ymin),
                xmax: saturate(xmax),
                ymax: saturate(ymax),
            }),
            (None, None, None, None) => None,
            _ => unreachable!(),
        }
    }

    /// Wraps the root in a node of twice the size, padded with empty nodes.
    /// The live cells keep their coordinates.
    pub fn expand_root(&mut self) {
        let root = &self[self.root];
        let (nw, ne, sw, se) = (root.nw(), root.ne(), root.sw(), root.se());
        let level = root.level;
        let empty = self.empty_node(level - 1);
        let nw = self.find_node(empty, empty, empty, nw);
        let ne = self.find_node(empty, empty, ne, empty);
        let sw = self.find_node(empty, sw, empty, empty);
        let se = self.find_node(se, empty, empty, empty);
        self.root = self.find_node(nw, ne, sw, se);
        trace!(level = level + 1, "expanded root");
    }

    pub(crate) fn find_leaf(&mut self, leaf: Leaf) -> NodeId {
        self.store.find_leaf(leaf)
    }

    pub(crate) fn find_node(&mut self, nw: NodeId, ne: NodeId, sw: NodeId, se: NodeId) -> NodeId {
        self.store.find_node(nw, ne, sw, se)
    }

    pub(crate) fn leaf(&self, id: NodeId) -> Leaf {
        match self[id].kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Quad { .. } => unreachable!("Expected a leaf."),
        }
    }

    pub(crate) fn empty_node(&mut self, level: u8) -> NodeId {
        debug_assert!(level >= 1, "Level of a node must be >= 1");
        while self.empty_nodes.len() < level as usize {
            let last = self.empty_nodes[self.empty_nodes.len() - 1];
            let new = self.find_node(last, last, last, last);
            self.empty_nodes.push(new);
        }
        self.empty_nodes[level as usize - 1]
    }

    /// Whether some live cell lies outside the central square of a quarter of
    /// the root's width. If so, the root must grow before it can be evolved.
    pub(crate) fn should_expand(&self) -> bool {
        let root = &self[self.root];
        Quadrant::ALL.iter().any(|&quadrant| {
            let child = &self[root.child(quadrant)];
            let towards_centre = match quadrant {
                Quadrant::Nw => Quadrant::Se,
                Quadrant::Ne => Quadrant::Sw,
                Quadrant::Sw => Quadrant::Ne,
                Quadrant::Se => Quadrant::Nw,
            };
            let inner = child.child(towards_centre);
            child.population != self.quadrant_population(inner, towards_centre)
        })
    }

    fn quadrant_population(&self, id: NodeId, quadrant: Quadrant) -> u64 {
        let data = &self[id];
        match data.kind {
            NodeKind::Leaf(leaf) => (leaf & quadrant.bit()).count_ones() as u64,
            NodeKind::Quad { .. } => self[data.child(quadrant)].population,
        }
    }

    fn contains(level: u8, x: i64, y: i64) -> bool {
        let half = 1i128 << (level - 1);
        (-half..half).contains(&(x as i128)) && (-half..half).contains(&(y as i128))
    }

    fn get_cell_rec(&self, id: NodeId, x: i128, y: i128) -> bool {
        let data = &self[id];
        if data.population == 0 {
            return false;
        }
        let quadrant = Quadrant::of(x, y);
        match data.kind {
            NodeKind::Leaf(leaf) => leaf & quadrant.bit() != 0,
            NodeKind::Quad { .. } => {
                let offset = 1i128 << (data.level - 2);
                let (x, y) = Self::into_quadrant(quadrant, offset, x, y);
                self.get_cell_rec(data.child(quadrant), x, y)
            }
        }
    }

    fn set_cell_rec(&mut self, id: NodeId, x: i128, y: i128, state: bool) -> NodeId {
        let data = &self[id];
        let quadrant = Quadrant::of(x, y);
        match data.kind {
            NodeKind::Leaf(leaf) => {
                if state {
                    self.find_leaf(leaf | quadrant.bit())
                } else {
                    self.find_leaf(leaf & !quadrant.bit())
                }
            }
            NodeKind::Quad {
                mut nw,
                mut ne,
                mut sw,
                mut se,
            } => {
                let offset = 1i128 << (data.level - 2);
                let (x, y) = Self::into_quadrant(quadrant, offset, x, y);
                match quadrant {
                    Quadrant::Nw => nw = self.set_cell_rec(nw, x, y, state),
                    Quadrant::Ne => ne = self.set_cell_rec(ne, x, y, state),
                    Quadrant::Sw => sw = self.set_cell_rec(sw, x, y, state),
                    Quadrant::Se => se = self.set_cell_rec(se, x, y, state),
                }
                self.find_node(nw, ne, sw, se)
            }
        }
    }

    /// Converts coordinates centred on a node into coordinates centred on
    /// one of its quadrants, whose side is `2 * offset`.
    fn into_quadrant(quadrant: Quadrant, offset: i128, x: i128, y: i128) -> (i128, i128) {
        match quadrant {
            Quadrant::Nw => (x + offset, y + offset),
            Quadrant::Ne => (x - offset, y + offset),
            Quadrant::Sw => (x + offset, y - offset),
            Quadrant::Se => (x - offset, y - offset),
        }
    }

    /// The outermost live coordinate in the direction of `edge`, in
    /// coordinates centred on the node.
    fn edge(&self, id: NodeId, edge: Edge) -> Option<i128> {
        let data = &self[id];
        if data.population == 0 {
            return None;
        }
        let (near, far) = edge.quadrants();
        let sign = edge.sign();
        match data.kind {
            NodeKind::Leaf(leaf) => {
                if leaf & (near[0].bit() | near[1].bit()) != 0 {
                    Some(sign.min(0))
                } else {
                    Some((-sign).min(0))
                }
            }
            NodeKind::Quad { .. } => {
                let offset = 1i128 << (data.level - 2);
                let outermost = |quadrants: [Quadrant; 2]| {
                    quadrants
                        .iter()
                        .filter_map(|&quadrant| self.edge(data.child(quadrant), edge))
                        .reduce(|a, b| if sign < 0 { a.min(b) } else { a.max(b) })
                };
                outermost(near)
                    .map(|c| c + sign * offset)
                    .or_else(|| outermost(far).map(|c| c - sign * offset))
            }
        }
    }
}
