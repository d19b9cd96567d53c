//! The chord tree proper: an arena of nodes addressed by handle.

use oxbow_primitives::{ChordKey, Keycode, ModMask};
use slab::Slab;
use smallvec::SmallVec;

use crate::chain::ChordChain;

/// Handle to a node in a [`ChordTree`] arena.
///
/// Handles stay valid until the tree is cleared or rebuilt; the chain
/// runtime resets its position to the root before either happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Result of looking a chain up in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Find {
	/// The exact path already exists; the handle is its final node.
	Existing(NodeId),
	/// A matched key is a leaf on one side and a prefix on the other: the
	/// two bindings would be ambiguous.
	Conflict,
	/// No node along the path matched.
	Absent,
}

/// Result of merging a chain into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assimilated {
	/// No top-level key matched; the chain was added as a new path.
	Added(NodeId),
	/// A childless top-level node matched; the chain's remainder was
	/// grafted under it.
	Merged(NodeId),
	/// A top-level node with children matched; the incoming chain was
	/// dropped. Callers must surface this — the bindings did not land.
	Discarded,
}

#[derive(Debug)]
struct ChordNode<A> {
	/// `None` only at the synthetic root.
	key: Option<ChordKey>,
	parent: Option<NodeId>,
	children: SmallVec<[NodeId; 4]>,
	chroot: bool,
	actions: Vec<A>,
}

impl<A> ChordNode<A> {
	fn new(key: Option<ChordKey>, parent: Option<NodeId>) -> Self {
		Self { key, parent, children: SmallVec::new(), chroot: false, actions: Vec::new() }
	}
}

/// Prefix tree of chords with payloads of type `A` bound at leaves.
#[derive(Debug)]
pub struct ChordTree<A> {
	nodes: Slab<ChordNode<A>>,
	root: NodeId,
}

impl<A> Default for ChordTree<A> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A> ChordTree<A> {
	pub fn new() -> Self {
		let mut nodes = Slab::new();
		let root = NodeId(nodes.insert(ChordNode::new(None, None)));
		Self { nodes, root }
	}

	/// The synthetic root. Never carries a key; its children are the
	/// top-level chords.
	pub fn root(&self) -> NodeId {
		self.root
	}

	/// The chord this node matches on; `None` only for the root.
	pub fn key(&self, id: NodeId) -> Option<&ChordKey> {
		self.nodes[id.0].key.as_ref()
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes[id.0].parent
	}

	pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes[id.0].children.iter().copied()
	}

	pub fn is_leaf(&self, id: NodeId) -> bool {
		self.nodes[id.0].children.is_empty()
	}

	pub fn is_chroot(&self, id: NodeId) -> bool {
		self.nodes[id.0].chroot
	}

	pub fn actions(&self, id: NodeId) -> &[A] {
		&self.nodes[id.0].actions
	}

	/// Binds a payload to a node (normally a leaf).
	pub fn push_action(&mut self, id: NodeId, action: A) {
		self.nodes[id.0].actions.push(action);
	}

	/// Removes and returns a node's payloads; used when rebinding
	/// transplants them into a fresh tree.
	pub fn take_actions(&mut self, id: NodeId) -> Vec<A> {
		std::mem::take(&mut self.nodes[id.0].actions)
	}

	/// The child of `parent` matching a keycode + lock-stripped state.
	pub fn child_matching(&self, parent: NodeId, keycode: Keycode, mods: ModMask) -> Option<NodeId> {
		self.children(parent)
			.find(|&c| self.nodes[c.0].key.as_ref().is_some_and(|k| k.matches(keycode, mods)))
	}

	/// Number of nodes, excluding the root.
	pub fn len(&self) -> usize {
		self.nodes.len() - 1
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Labels along the path from the first chord down to `id`.
	pub fn path_labels(&self, id: NodeId) -> Vec<&str> {
		let mut labels = Vec::new();
		let mut cur = Some(id);
		while let Some(n) = cur {
			if let Some(key) = &self.nodes[n.0].key {
				labels.push(key.label.as_str());
			}
			cur = self.nodes[n.0].parent;
		}
		labels.reverse();
		labels
	}

	/// Looks a chain up, reporting ambiguity.
	///
	/// Descends level by level; at each matched key, a leaf on one side
	/// paired with a prefix on the other is a conflict, because a single
	/// key press could mean both "fire" and "continue the chain".
	pub fn find(&self, chain: &ChordChain) -> Find {
		let mut parent = self.root;
		let keys = chain.keys();
		for (depth, key) in keys.iter().enumerate() {
			let Some(node) = self.child_matching(parent, key.keycode, key.mods) else {
				return Find::Absent;
			};
			let last = depth + 1 == keys.len();
			if self.is_leaf(node) != last {
				return Find::Conflict;
			}
			if last {
				return Find::Existing(node);
			}
			parent = node;
		}
		Find::Absent
	}

	/// Merges a chain into the tree.
	///
	/// Matches the chain's first chord against the top-level nodes. A
	/// childless match has the remainder grafted beneath it; a match that
	/// already has children swallows the incoming chain whole and reports
	/// [`Assimilated::Discarded`]. No match appends a fresh path.
	pub fn assimilate(&mut self, chain: ChordChain) -> Assimilated {
		let mut keys = chain.into_keys().into_iter();
		let first = keys.next().expect("chains are never empty");

		match self.child_matching(self.root, first.keycode, first.mods) {
			Some(existing) if self.is_leaf(existing) => {
				Assimilated::Merged(self.graft(existing, keys))
			}
			Some(_) => Assimilated::Discarded,
			None => {
				let top = self.insert_child(self.root, first);
				Assimilated::Added(self.graft(top, keys))
			}
		}
	}

	/// Marks the node reached by following `path` as a chroot boundary.
	/// Returns false, mutating nothing, if the full path does not exist.
	pub fn chroot(&mut self, path: &ChordChain) -> bool {
		let mut cur = self.root;
		for key in path.keys() {
			match self.child_matching(cur, key.keycode, key.mods) {
				Some(next) => cur = next,
				None => return false,
			}
		}
		self.nodes[cur.0].chroot = true;
		true
	}

	/// Drops every node except the root.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.root = NodeId(self.nodes.insert(ChordNode::new(None, None)));
	}

	fn insert_child(&mut self, parent: NodeId, key: ChordKey) -> NodeId {
		let id = NodeId(self.nodes.insert(ChordNode::new(Some(key), Some(parent))));
		self.nodes[parent.0].children.push(id);
		id
	}

	fn graft(&mut self, mut parent: NodeId, keys: impl Iterator<Item = ChordKey>) -> NodeId {
		for key in keys {
			parent = self.insert_child(parent, key);
		}
		parent
	}
}
