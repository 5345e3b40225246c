use crate::{node::NodeId, universe::Universe};
use tracing::debug;

/// A saved root and the generation it was reached at.
///
/// Nodes are never removed from the store, so holding an id is enough to
/// restore the whole universe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) root: NodeId,
    pub(crate) generation: u64,
}

/// Saved states, oldest first.
#[derive(Clone, Debug, Default)]
pub(crate) struct RewindLog {
    snapshots: Vec<Snapshot>,
}

impl RewindLog {
    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Discards the newest snapshot and returns the one below it, which
    /// stays in the log. Nothing changes if fewer than two snapshots exist.
    pub(crate) fn rewind(&mut self) -> Option<Snapshot> {
        if self.snapshots.len() <= 1 {
            return None;
        }
        self.snapshots.pop();
        self.snapshots.last().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshots.len()
    }
}

impl Universe {
    /// Records the current root and generation.
    pub fn save_state(&mut self) {
        self.history.push(Snapshot {
            root: self.root,
            generation: self.generation,
        });
        debug!(
            generation = self.generation,
            saved = self.history.len(),
            "saved state"
        );
    }

    /// Drops the most recent saved state and restores the one before it.
    ///
    /// Returns `false`, leaving the universe untouched, when there is no
    /// earlier state to go back to.
    pub fn load_previous_state(&mut self) -> bool {
        match self.history.rewind() {
            Some(Snapshot { root, generation }) => {
                self.root = root;
                self.generation = generation;
                debug!(generation, saved = self.history.len(), "restored state");
                true
            }
            None => false,
        }
    }

    pub fn clear_history(&mut self) {
        debug!(dropped = self.history.len(), "cleared history");
        self.history.clear();
    }

    /// Number of saved states.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
