//! Running action lists and the single interactive session.

use std::rc::Rc;

use oxbow_primitives::{
	ActionData, FrameContext, KeyEvent, ModMask, UserAction, WindowId, WmServices,
};
use tracing::{debug, error, trace};

use crate::instance::{ActionInstance, InputVerdict, Progress};
use crate::registry::ActionRegistry;

/// The one interactive action allowed to be live at a time. It holds
/// the exclusive keyboard grab and the modifier state captured when it
/// began, which the input hook uses to detect modifier release.
struct InteractiveSession {
	instance: Rc<ActionInstance>,
	initial_state: ModMask,
}

/// Owns the registry and executes instance lists bound to input events.
#[derive(Default)]
pub struct ActionDispatcher {
	pub registry: ActionRegistry,
	session: Option<InteractiveSession>,
}

impl ActionDispatcher {
	pub fn new(registry: ActionRegistry) -> Self {
		Self { registry, session: None }
	}

	pub fn startup(&mut self, reconfig: bool) {
		self.registry.startup(reconfig);
	}

	/// Any live session is cancelled on every shutdown; the catalog
	/// itself only empties on a true shutdown.
	pub fn shutdown(&mut self, reconfig: bool, services: &mut WmServices<'_>) {
		self.finish_session(true, services);
		self.registry.shutdown(reconfig);
	}

	pub fn interactive_active(&self) -> bool {
		self.session.is_some()
	}

	/// Run a bound list of instances in order against one input event.
	///
	/// Menu selections are replayed after the menu closed, so their
	/// modifier state is zeroed. Negative coordinates on both axes mean
	/// the caller had no event position and the pointer is queried
	/// instead.
	#[allow(clippy::too_many_arguments)]
	pub fn run_acts(
		&mut self,
		acts: &[Rc<ActionInstance>],
		uact: UserAction,
		state: ModMask,
		x: i32,
		y: i32,
		button: u32,
		context: FrameContext,
		window: Option<WindowId>,
		services: &mut WmServices<'_>,
	) {
		let state = if uact == UserAction::MenuSelection { ModMask::empty() } else { state };
		let (x, y) = if x < 0 && y < 0 { services.display.pointer_position() } else { (x, y) };
		let data = ActionData { uact, state, x, y, button, context, window };

		let mut update_user_time = false;
		for act in acts {
			// An already-live session whose action shares this run hook
			// keeps running and receives the invocation directly, e.g.
			// cycling forward and backward through the same scan.
			let cooperating = self
				.session
				.as_ref()
				.is_some_and(|s| std::ptr::fn_addr_eq(s.instance.run_fn(), act.run_fn()));

			let mut interactive = act.is_interactive();
			let mut granted = true;
			if !cooperating {
				if interactive {
					self.finish_session(true, services);
					// The pre hook may decline interactivity for this
					// invocation only; the instance stays interactive
					// for later bindings.
					if let Some(pre) = act.hooks.pre {
						if !act.with_options(|opts| pre(state, opts)) {
							interactive = false;
						}
					}
				}
				if interactive && !self.begin_session(act, state, services) {
					granted = false;
				}
			}
			if !granted {
				debug!(
					action = self.registry.name(act.def()),
					"keyboard grab refused, skipping interactive action"
				);
				continue;
			}

			match act.with_options(|opts| (act.run_fn())(&data, opts)) {
				Progress::Completed => {
					if interactive {
						self.finish_session(false, services);
					}
					if window.is_some()
						&& window == services.hooks.focused_window()
						&& self.registry.modifies_focus(act.def())
					{
						update_user_time = true;
					}
				}
				Progress::InProgress => {
					if !(interactive || self.registry.can_stop(act.def())) {
						debug_assert!(
							false,
							"action '{}' reported in-progress without being interactive or stoppable",
							self.registry.name(act.def())
						);
						error!(
							action = self.registry.name(act.def()),
							"in-progress result from a one-shot, non-stoppable action"
						);
					}
					// The rest of the list waits until this action ends.
					break;
				}
			}
		}

		if update_user_time {
			services.hooks.update_user_time();
		}
	}

	/// Feed a key event to the live session's input hook. Returns
	/// whether the event was consumed.
	pub fn input_event(&mut self, event: &KeyEvent, services: &mut WmServices<'_>) -> bool {
		let Some((instance, initial_state)) =
			self.session.as_ref().map(|s| (Rc::clone(&s.instance), s.initial_state))
		else {
			return false;
		};
		let input = instance.hooks.input.expect("live sessions always carry an input hook");
		match instance.with_options(|opts| input(initial_state, event, opts)) {
			InputVerdict::Continue { used } => used,
			InputVerdict::Stop => {
				self.finish_session(false, services);
				true
			}
		}
	}

	/// Cancel any live session: run its cancel hook, release the grab,
	/// run its post hook. A second call is a no-op.
	pub fn cancel_session(&mut self, services: &mut WmServices<'_>) {
		self.finish_session(true, services);
	}

	fn begin_session(
		&mut self,
		act: &Rc<ActionInstance>,
		state: ModMask,
		services: &mut WmServices<'_>,
	) -> bool {
		if !services.grabs.grab_keyboard(&mut *services.display) {
			return false;
		}
		services.hooks.halt_focus_delay();
		trace!(action = self.registry.name(act.def()), "interactive session began");
		self.session = Some(InteractiveSession { instance: Rc::clone(act), initial_state: state });
		true
	}

	/// The session slot is emptied before any hook runs, so a hook that
	/// re-enters the dispatcher sees no live session.
	fn finish_session(&mut self, cancelled: bool, services: &mut WmServices<'_>) {
		let Some(session) = self.session.take() else { return };
		if cancelled {
			if let Some(cancel) = session.instance.hooks.cancel {
				session.instance.with_options(cancel);
			}
		}
		services.grabs.ungrab_keyboard(&mut *services.display);
		if let Some(post) = session.instance.hooks.post {
			session.instance.with_options(post);
		}
		trace!(cancelled, "interactive session ended");
	}
}
