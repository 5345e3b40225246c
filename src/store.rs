use crate::node::{Leaf, NodeData, NodeId, NodeKind};
use slab::Slab;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Initial capacity of the node table is `2.pow(DEFAULT_CAPACITY_LOG2)`.
pub const DEFAULT_CAPACITY_LOG2: u32 = 16;

/// The table doubles once it holds more nodes than this fraction of its slots.
pub(crate) const LOAD_FACTOR: f64 = 0.9;

const MULTIPLIERS: [u32; 4] = [1_000_003, 1_000_009, 1_000_033, 1_000_037];

/// Hash-consing store: every distinct node content is stored exactly once.
///
/// Nodes live in a slab and are never removed, so a `NodeId` stays valid for
/// the lifetime of the store. The table maps contents to ids with open
/// addressing and linear probing.
#[derive(Clone, Debug)]
pub(crate) struct NodeStore {
    table: Vec<Option<NodeId>>,
    nodes: Slab<NodeData>,
}

impl Index<NodeId> for NodeStore {
    type Output = NodeData;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0 as usize]
    }
}

impl IndexMut<NodeId> for NodeStore {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0 as usize]
    }
}

impl NodeStore {
    pub(crate) fn with_capacity(capacity_log2: u32) -> Self {
        debug_assert!(
            capacity_log2 < usize::BITS,
            "A table of 2.pow({}) slots cannot be allocated.",
            capacity_log2
        );
        let capacity = 1 << capacity_log2;
        NodeStore {
            table: vec![None; capacity],
            nodes: Slab::new(),
        }
    }

    /// Number of distinct nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of slots in the table.
    pub(crate) fn capacity(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn find_leaf(&mut self, leaf: Leaf) -> NodeId {
        debug_assert!(leaf < 0x10, "A leaf only has four cells.");
        self.find_or_create(NodeKind::Leaf(leaf))
    }

    pub(crate) fn find_node(&mut self, nw: NodeId, ne: NodeId, sw: NodeId, se: NodeId) -> NodeId {
        self.find_or_create(NodeKind::Quad { nw, ne, sw, se })
    }

    /// Drops memoized results. The full-superstep and single-generation
    /// caches are only dropped when `all` is set, i.e., when the rule changes.
    pub(crate) fn clear_cache(&mut self, all: bool) {
        self.nodes.iter_mut().for_each(|(_, data)| {
            data.cache_step.take();
            if all {
                data.cache.take();
                data.cache_one.take();
            }
        })
    }

    fn hash(kind: NodeKind) -> usize {
        let h = match kind {
            NodeKind::Leaf(leaf) => (0..4).fold(0u32, |h, i| {
                h.wrapping_add(((leaf >> (3 - i)) & 1) as u32 * MULTIPLIERS[i])
            }),
            NodeKind::Quad { nw, ne, sw, se } => 0u32
                .wrapping_add(nw.0.wrapping_mul(MULTIPLIERS[0]))
                .wrapping_add(ne.0.wrapping_mul(MULTIPLIERS[1]))
                .wrapping_add(sw.0.wrapping_mul(MULTIPLIERS[2]))
                .wrapping_add(se.0.wrapping_mul(MULTIPLIERS[3])),
        };
        h.wrapping_add(h >> 11) as usize
    }

    fn find_or_create(&mut self, kind: NodeKind) -> NodeId {
        let mask = self.table.len() - 1;
        let mut index = Self::hash(kind) & mask;
        while let Some(id) = self.table[index] {
            if self[id].kind == kind {
                return id;
            }
            index = (index + 1) & mask;
        }

        let (level, population) = self.measure(kind);
        let id = NodeId(self.nodes.insert(NodeData::new(level, population, kind)) as u32);
        self.table[index] = Some(id);
        if self.nodes.len() as f64 > self.table.len() as f64 * LOAD_FACTOR {
            self.grow();
        }
        id
    }

    fn measure(&self, kind: NodeKind) -> (u8, u64) {
        match kind {
            NodeKind::Leaf(leaf) => (1, leaf.count_ones() as u64),
            NodeKind::Quad { nw, ne, sw, se } => {
                let level = self[nw].level;
                debug_assert!(
                    [ne, sw, se].iter().all(|&child| self[child].level == level),
                    "All children must have the same level."
                );
                let population =
                    self[nw].population + self[ne].population + self[sw].population + self[se].population;
                (level + 1, population)
            }
        }
    }

    /// Doubles the table and places every node again.
    ///
    /// Ids are slab keys, so they survive the move unchanged; only the slot
    /// each node occupies is recomputed.
    fn grow(&mut self) {
        let capacity = self.table.len() << 1;
        debug!(
            old_capacity = self.table.len(),
            capacity,
            nodes = self.nodes.len(),
            "growing node table"
        );
        self.table = vec![None; capacity];
        let mask = capacity - 1;
        for (key, data) in self.nodes.iter() {
            let mut index = Self::hash(data.kind) & mask;
            while self.table[index].is_some() {
                index = (index + 1) & mask;
            }
            self.table[index] = Some(NodeId(key as u32));
        }
    }
}
