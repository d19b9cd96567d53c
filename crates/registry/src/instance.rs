//! Configured action instances.

use std::any::Any;
use std::cell::RefCell;

use oxbow_primitives::{ActionData, KeyEvent, ModMask};

use crate::registry::DefId;

/// Outcome of an action's run hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
	/// The action finished within this invocation.
	Completed,
	/// The action is still running and will consume further events.
	InProgress,
}

/// What an interactive input hook did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputVerdict {
	/// Keep the session alive. `used` reports whether the event was
	/// consumed by the action.
	Continue { used: bool },
	/// The event terminates the session normally.
	Stop,
}

pub type RunFn = fn(&ActionData, &mut dyn Any) -> Progress;
pub type PreFn = fn(ModMask, &mut dyn Any) -> bool;
pub type InputFn = fn(ModMask, &KeyEvent, &mut dyn Any) -> InputVerdict;
pub type CancelFn = fn(&mut dyn Any);
pub type PostFn = fn(&mut dyn Any);
pub type FreeFn = fn(&mut dyn Any);

/// Interactive lifecycle hooks, filled in by an interactive action's
/// setup hook. A missing input hook means the instance runs one-shot.
#[derive(Default, Clone, Copy)]
pub struct InteractiveHooks {
	pub pre: Option<PreFn>,
	pub input: Option<InputFn>,
	pub cancel: Option<CancelFn>,
	pub post: Option<PostFn>,
}

/// One configured occurrence of an action.
///
/// Every binding in the configuration gets its own instance, so two
/// bindings of the same action never share option state. Instances are
/// reference counted: the chord tree holds them across reconfiguration
/// and the dispatcher holds the one driving a live session.
pub struct ActionInstance {
	pub(crate) def: DefId,
	pub(crate) run: RunFn,
	pub(crate) hooks: InteractiveHooks,
	pub(crate) options: RefCell<Box<dyn Any>>,
	pub(crate) free: Option<FreeFn>,
}

impl ActionInstance {
	pub fn def(&self) -> DefId {
		self.def
	}

	/// Whether this instance can drive an interactive session.
	pub fn is_interactive(&self) -> bool {
		self.hooks.input.is_some()
	}

	pub(crate) fn run_fn(&self) -> RunFn {
		self.run
	}

	pub(crate) fn with_options<R>(&self, f: impl FnOnce(&mut dyn Any) -> R) -> R {
		let mut options = self.options.borrow_mut();
		f(&mut **options)
	}
}

impl Drop for ActionInstance {
	fn drop(&mut self) {
		if let Some(free) = self.free {
			free(&mut **self.options.get_mut());
		}
	}
}

impl std::fmt::Debug for ActionInstance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionInstance")
			.field("def", &self.def)
			.field("interactive", &self.is_interactive())
			.finish_non_exhaustive()
	}
}
