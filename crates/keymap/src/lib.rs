//! Prefix tree of key chords.
//!
//! A binding like `"W-t x"` becomes one node per chord; walking the tree
//! across key presses is what turns single events into multi-key chains.
//! Nodes can be flagged as chroot boundaries, which gives chain resets a
//! place to stop short of the root (a modal command layer).
//!
//! The tree is generic over the payload bound at leaves so it stays below
//! the action registry in the dependency graph.

mod chain;
mod tree;


pub use chain::ChordChain;
pub use tree::{Assimilated, ChordTree, Find, NodeId};
