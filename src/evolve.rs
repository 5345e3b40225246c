use crate::{
    node::{Leaf, NodeId, NodeKind, Quadrant},
    universe::{Universe, MIN_LEVEL},
};
use tracing::trace;

/// Spreads the rows of a 2x2 leaf so that shifting the result places it in
/// one quadrant of a 4x4 block.
const fn spread(leaf: Leaf) -> u16 {
    ((leaf as u16 & 0b1100) << 2) | (leaf as u16 & 0b0011)
}

impl Universe {
    /// Advances the universe by `2.pow(self.get_step())` generations.
    pub fn step(&mut self) {
        self.advance(self.step);
    }

    /// Advances the universe by exactly one generation, whatever the step.
    pub fn advance_one_generation(&mut self) {
        self.advance(0);
    }

    fn advance(&mut self, step: u8) {
        while self.level() < step + MIN_LEVEL || self.should_expand() {
            self.expand_root();
        }
        self.root = self.step_id(self.root, step);
        while self.level() < MIN_LEVEL {
            self.expand_root();
        }
        self.generation += 1 << step;
        trace!(
            generation = self.generation,
            level = self.level(),
            population = self.population(),
            "advanced"
        );
    }

    /// The centre of a node of level `n` after `2.pow(min(step, n - 2))`
    /// generations.
    fn step_id(&mut self, id: NodeId, step: u8) -> NodeId {
        let data = &self[id];
        debug_assert!(data.level >= 2, "A leaf cannot evolve.");
        let (level, population, kind) = (data.level, data.population, data.kind);
        let max = step + 2 >= level;
        let cached = if max {
            data.cache.get().copied()
        } else if step == 0 {
            data.cache_one.get().copied()
        } else if step == self.step {
            data.cache_step
        } else {
            None
        };
        if let Some(node) = cached {
            return node;
        }
        if population == 0 {
            return self.empty_node(level - 1);
        }
        let node = match kind {
            NodeKind::Quad { nw, ne, sw, se } => match self[nw].kind {
                NodeKind::Leaf(_) => self.step_leaves(nw, ne, sw, se),
                NodeKind::Quad { .. } => self.step_quad(nw, ne, sw, se, step, max),
            },
            NodeKind::Leaf(_) => unreachable!(),
        };
        if max {
            let _ = self.store[id].cache.set(node);
        } else if step == 0 {
            let _ = self.store[id].cache_one.set(node);
        } else if step == self.step {
            self.store[id].cache_step = Some(node);
        }
        node
    }

    /// One generation of the central 2x2 block of a 4x4 block.
    fn step_leaves(&mut self, nw: NodeId, ne: NodeId, sw: NodeId, se: NodeId) -> NodeId {
        let block = spread(self.leaf(nw)) << 10
            | spread(self.leaf(ne)) << 8
            | spread(self.leaf(sw)) << 2
            | spread(self.leaf(se));
        let leaf = self.rule.step_block(block);
        self.find_leaf(leaf)
    }

    /// The centre of a node of level `n >= 2`, without evolving it.
    fn central_node(&mut self, id: NodeId) -> NodeId {
        let data = &self[id];
        let (nw, ne, sw, se) = (data.nw(), data.ne(), data.sw(), data.se());
        match self[nw].kind {
            NodeKind::Leaf(_) => {
                let leaf = (self.leaf(nw) & Quadrant::Se.bit()) << 3
                    | (self.leaf(ne) & Quadrant::Sw.bit()) << 1
                    | (self.leaf(sw) & Quadrant::Ne.bit()) >> 1
                    | (self.leaf(se) & Quadrant::Nw.bit()) >> 3;
                self.find_leaf(leaf)
            }
            NodeKind::Quad { .. } => {
                let new_nw = self[nw].se();
                let new_ne = self[ne].sw();
                let new_sw = self[sw].ne();
                let new_se = self[se].nw();
                self.find_node(new_nw, new_ne, new_sw, new_se)
            }
        }
    }

    fn step_quad(
        &mut self,
        nw: NodeId,
        ne: NodeId,
        sw: NodeId,
        se: NodeId,
        step: u8,
        max: bool,
    ) -> NodeId {
        let n01 = self.find_node(self[nw].ne(), self[ne].nw(), self[nw].se(), self[ne].sw());
        let n10 = self.find_node(self[nw].sw(), self[nw].se(), self[sw].nw(), self[sw].ne());
        let n11 = self.find_node(self[nw].se(), self[ne].sw(), self[sw].ne(), self[se].nw());
        let n12 = self.find_node(self[ne].sw(), self[ne].se(), self[se].nw(), self[se].ne());
        let n21 = self.find_node(self[sw].ne(), self[se].nw(), self[sw].se(), self[se].sw());
        let (t00, t01, t02, t10, t11, t12, t20, t21, t22);
        if max {
            t00 = self.step_id(nw, step);
            t01 = self.step_id(n01, step);
            t02 = self.step_id(ne, step);
            t10 = self.step_id(n10, step);
            t11 = self.step_id(n11, step);
            t12 = self.step_id(n12, step);
            t20 = self.step_id(sw, step);
            t21 = self.step_id(n21, step);
            t22 = self.step_id(se, step);
        } else {
            t00 = self.central_node(nw);
            t01 = self.central_node(n01);
            t02 = self.central_node(ne);
            t10 = self.central_node(n10);
            t11 = self.central_node(n11);
            t12 = self.central_node(n12);
            t20 = self.central_node(sw);
            t21 = self.central_node(n21);
            t22 = self.central_node(se);
        }
        let pre_new_nw = self.find_node(t00, t01, t10, t11);
        let pre_new_ne = self.find_node(t01, t02, t11, t12);
        let pre_new_sw = self.find_node(t10, t11, t20, t21);
        let pre_new_se = self.find_node(t11, t12, t21, t22);
        let new_nw = self.step_id(pre_new_nw, step);
        let new_ne = self.step_id(pre_new_ne, step);
        let new_sw = self.step_id(pre_new_sw, step);
        let new_se = self.step_id(pre_new_se, step);
        self.find_node(new_nw, new_ne, new_sw, new_se)
    }
}
