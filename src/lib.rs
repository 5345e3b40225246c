//! An unbounded two-state cellular automaton, evolved with Hashlife.

mod evolve;
mod iter;
mod node;
mod pattern;
mod rewind;
mod rule;
mod stimulus;
mod store;
mod universe;

pub use pattern::{center_on_origin, get_bounds, Bounds};
pub use rule::{Rule, RuleError};
pub use stimulus::MAX_CELLS_PER_STIMULUS;
pub use store::DEFAULT_CAPACITY_LOG2;
pub use universe::{Universe, MIN_LEVEL};
