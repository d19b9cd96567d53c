//! The chain runtime: walks key presses through the chord tree and hands
//! completed chains to the dispatcher.

use std::rc::Rc;

use oxbow_keymap::{Assimilated, ChordChain, ChordTree, Find, NodeId};
use oxbow_primitives::{
	ChordKey, FrameContext, KeyEvent, KeyEventKind, TimerId, TranslateError, UserAction, WindowId,
	WmServices,
};
use oxbow_registry::{ActionDispatcher, ActionInstance};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{KeyboardConfig, ResetScope};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
	/// The new chain and an existing one share a key that is a leaf on
	/// one side and a prefix on the other.
	#[error("binding conflicts with an existing chain")]
	Conflict,
	/// The chain's first chord matched a node that already has children,
	/// which swallows the whole incoming chain.
	#[error("binding is shadowed by an existing chain")]
	Shadowed,
	#[error(transparent)]
	Translate(#[from] TranslateError),
}

/// Keyboard binding state: the chord tree, the current chain position,
/// and the pending auto-reset timer.
///
/// Idle means the current position is the tree root. Every position
/// change re-grabs exactly the keys that could continue the chain.
pub struct Keyboard {
	config: KeyboardConfig,
	tree: ChordTree<Rc<ActionInstance>>,
	curpos: NodeId,
	timer: Option<TimerId>,
	reset_key: Option<ChordKey>,
}

impl Keyboard {
	pub fn new(config: KeyboardConfig) -> Self {
		let tree = ChordTree::new();
		let curpos = tree.root();
		Self { config, tree, curpos, timer: None, reset_key: None }
	}

	/// Translates the reset hotkey and establishes the initial key grabs.
	/// Call after the bindings are loaded, and again after `rebind`-free
	/// reconfiguration paths.
	pub fn startup(&mut self, _reconfig: bool, services: &mut WmServices<'_>) {
		self.reset_key = match services.translator.chord(&self.config.reset_binding) {
			Ok(key) => Some(key),
			Err(err) => {
				warn!(token = %self.config.reset_binding, %err, "reset hotkey unavailable");
				None
			}
		};
		self.ungrab_keys(services);
		self.grab_keys(services);
	}

	/// Cancels any pending reset, releases the grabs and hides the popup.
	/// A true shutdown also drops the bindings; reconfiguration keeps
	/// them for `rebind` to transplant.
	pub fn shutdown(&mut self, reconfig: bool, services: &mut WmServices<'_>) {
		self.cancel_timer(services);
		self.curpos = self.tree.root();
		self.ungrab_keys(services);
		services.popup.hide();
		if !reconfig {
			self.tree.clear();
			self.reset_key = None;
		}
	}

	pub fn in_chain(&self) -> bool {
		self.curpos != self.tree.root()
	}

	/// Chords along the current chain, for diagnostics and tests.
	pub fn chain_labels(&self) -> Vec<&str> {
		self.tree.path_labels(self.curpos)
	}

	/// Binds an action instance to a chord sequence.
	///
	/// An identical path merges: the instance is appended to the existing
	/// leaf. An ambiguous prefix fails without touching the tree.
	pub fn bind<S: AsRef<str>>(
		&mut self,
		tokens: &[S],
		action: Rc<ActionInstance>,
		services: &WmServices<'_>,
	) -> Result<(), BindError> {
		let chain = ChordChain::parse(tokens, services.translator)?;
		self.bind_chain(chain, action)
	}

	fn bind_chain(&mut self, chain: ChordChain, action: Rc<ActionInstance>) -> Result<(), BindError> {
		match self.tree.find(&chain) {
			Find::Existing(leaf) => {
				self.tree.push_action(leaf, action);
				Ok(())
			}
			Find::Conflict => Err(BindError::Conflict),
			Find::Absent => match self.tree.assimilate(chain) {
				Assimilated::Added(leaf) | Assimilated::Merged(leaf) => {
					self.tree.push_action(leaf, action);
					Ok(())
				}
				Assimilated::Discarded => Err(BindError::Shadowed),
			},
		}
	}

	/// Marks the node at a chord sequence as a chroot boundary, creating
	/// the path if it does not exist yet.
	pub fn add_chroot<S: AsRef<str>>(
		&mut self,
		tokens: &[S],
		services: &WmServices<'_>,
	) -> Result<(), BindError> {
		let chain = ChordChain::parse(tokens, services.translator)?;
		if self.tree.chroot(&chain) {
			return Ok(());
		}
		match self.tree.assimilate(chain.clone()) {
			Assimilated::Added(_) | Assimilated::Merged(_) => {
				self.tree.chroot(&chain);
				Ok(())
			}
			Assimilated::Discarded => Err(BindError::Shadowed),
		}
	}

	/// Drops every binding and returns to idle.
	pub fn unbind_all(&mut self, services: &mut WmServices<'_>) {
		self.cancel_timer(services);
		self.tree.clear();
		self.curpos = self.tree.root();
		self.ungrab_keys(services);
		self.grab_keys(services);
		services.popup.hide();
	}

	/// Rebuilds the tree from its own leaves, transplanting the bound
	/// instances rather than recreating them. Used when reconfiguration
	/// re-translates every chord against a changed keymap.
	pub fn rebind(&mut self, services: &mut WmServices<'_>) {
		let mut old = std::mem::take(&mut self.tree);
		self.cancel_timer(services);
		self.curpos = self.tree.root();

		let mut nodes = Vec::new();
		let mut stack: Vec<NodeId> = old.children(old.root()).collect();
		while let Some(node) = stack.pop() {
			stack.extend(old.children(node));
			nodes.push(node);
		}

		let mut chroots = Vec::new();
		for node in nodes {
			let path = path_keys(&old, node);
			if old.is_chroot(node) {
				chroots.push(path.clone());
			}
			let actions = old.take_actions(node);
			if actions.is_empty() {
				// Nodes without actions only matter if they anchor a
				// bare chroot leaf; inner structure regrows from leaves.
				if old.is_leaf(node) && old.is_chroot(node) {
					if let Ok(chain) = ChordChain::from_keys(path) {
						self.tree.assimilate(chain);
					}
				}
				continue;
			}
			let labels: Vec<&str> = path.iter().map(|k| k.label.as_str()).collect();
			let labels = labels.join(" ");
			let Ok(chain) = ChordChain::from_keys(path) else { continue };
			for action in actions {
				if let Err(err) = self.bind_chain(chain.clone(), action) {
					warn!(chain = %labels, %err, "binding dropped during rebind");
				}
			}
		}
		for path in chroots {
			if let Ok(chain) = ChordChain::from_keys(path) {
				self.tree.chroot(&chain);
			}
		}

		self.ungrab_keys(services);
		self.grab_keys(services);
		services.popup.hide();
	}

	/// Feeds one key event through the chain.
	///
	/// Returns whether the event matched a binding (or the reset hotkey).
	/// An unmatched press leaves the chain position untouched; only the
	/// reset hotkey and the timer unwind it.
	pub fn key_event(
		&mut self,
		dispatcher: &mut ActionDispatcher,
		event: &KeyEvent,
		window: Option<WindowId>,
		services: &mut WmServices<'_>,
	) -> bool {
		if event.kind == KeyEventKind::Release {
			services.grabs.key_passive_count(-1);
			return false;
		}
		services.grabs.key_passive_count(1);

		let state = services.translator.only_modmasks(event.state);
		if let Some(reset) = &self.reset_key
			&& reset.matches(event.keycode, state)
		{
			let scope = self.config.reset_scope;
			self.reset_chains(scope, services);
			return true;
		}

		let Some(node) = self.tree.child_matching(self.curpos, event.keycode, state) else {
			return false;
		};
		services.hooks.hide_menus();

		if !self.tree.is_leaf(node) {
			self.set_curpos(node, services);
			self.arm_timer(services);
		} else if self.tree.actions(node).is_empty() && self.tree.is_chroot(node) {
			// A bare chroot: enter the modal layer without dispatching.
			self.cancel_timer(services);
			self.set_curpos(node, services);
		} else {
			let actions: Vec<Rc<ActionInstance>> = self.tree.actions(node).to_vec();
			// Interactive actions keep the chain position so cooperating
			// re-presses of the final chord route back here.
			if !actions.iter().any(|a| a.is_interactive()) {
				self.reset_chains(ResetScope::Nearest, services);
			}
			dispatcher.run_acts(
				&actions,
				UserAction::KeyboardKey,
				event.state,
				event.x_root,
				event.y_root,
				0,
				FrameContext::None,
				window,
				services,
			);
		}
		true
	}

	/// Unwinds the chain. `Nearest` and `Break` stop at chroot
	/// boundaries, which is what keeps modal layers alive across resets.
	pub fn reset_chains(&mut self, scope: ResetScope, services: &mut WmServices<'_>) {
		self.cancel_timer(services);
		let target = match scope {
			ResetScope::Full => self.tree.root(),
			ResetScope::Nearest => self.nearest_chroot(0),
			ResetScope::Break(n) => self.nearest_chroot(n),
		};
		self.set_curpos(target, services);
	}

	/// Timer callback from the host. Ids from superseded timers are
	/// ignored, so a late callback cannot unwind a newer chain position.
	pub fn on_timeout(&mut self, id: TimerId, services: &mut WmServices<'_>) {
		if self.timer != Some(id) {
			debug!(id = id.0, "stale chain timer ignored");
			return;
		}
		self.timer = None;
		self.reset_chains(ResetScope::Nearest, services);
	}

	fn set_curpos(&mut self, node: NodeId, services: &mut WmServices<'_>) {
		if self.curpos != node {
			self.ungrab_keys(services);
			self.curpos = node;
			self.grab_keys(services);
		}
		if self.in_chain() {
			let text = self.tree.path_labels(self.curpos).join(" - ");
			services.popup.show(&text, self.config.popup_delay);
		} else {
			services.popup.hide();
		}
	}

	/// Grabs exactly the keys that could continue the chain from the
	/// current position, plus the reset hotkey while mid-chain.
	fn grab_keys(&self, services: &mut WmServices<'_>) {
		let root = services.display.root_window();
		for child in self.tree.children(self.curpos) {
			if let Some(key) = self.tree.key(child) {
				services.grabs.grab_key(&mut *services.display, key.keycode, key.mods, root);
			}
		}
		if self.in_chain()
			&& let Some(reset) = &self.reset_key
		{
			services.grabs.grab_key(&mut *services.display, reset.keycode, reset.mods, root);
		}
	}

	fn ungrab_keys(&self, services: &mut WmServices<'_>) {
		let root = services.display.root_window();
		services.grabs.ungrab_all_keys(&mut *services.display, root);
	}

	fn arm_timer(&mut self, services: &mut WmServices<'_>) {
		self.cancel_timer(services);
		self.timer = Some(services.timers.schedule(self.config.chain_timeout));
	}

	fn cancel_timer(&mut self, services: &mut WmServices<'_>) {
		if let Some(id) = self.timer.take() {
			services.timers.cancel(id);
		}
	}

	fn nearest_chroot(&self, mut skip: u32) -> NodeId {
		let mut cur = Some(self.curpos);
		while let Some(node) = cur {
			if self.tree.is_chroot(node) {
				if skip == 0 {
					return node;
				}
				skip -= 1;
			}
			cur = self.tree.parent(node);
		}
		self.tree.root()
	}
}

impl Default for Keyboard {
	fn default() -> Self {
		Self::new(KeyboardConfig::default())
	}
}

fn path_keys(tree: &ChordTree<Rc<ActionInstance>>, id: NodeId) -> Vec<ChordKey> {
	let mut keys = Vec::new();
	let mut cur = Some(id);
	while let Some(node) = cur {
		if let Some(key) = tree.key(node) {
			keys.push(key.clone());
		}
		cur = tree.parent(node);
	}
	keys.reverse();
	keys
}
