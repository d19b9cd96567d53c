//! Interfaces the window manager implements for the dispatch core.
//!
//! The core never touches the X protocol, XKB translation, timers or
//! rendering directly; it talks to these traits and only depends on their
//! success/failure contracts. Bundling them in [`WmServices`] keeps every
//! operation explicit about what it reaches for and lets tests run against
//! mock hosts.

use std::time::Duration;

use thiserror::Error;

use crate::event::WindowId;
use crate::grab::GrabStack;
use crate::key::{ChordKey, Keycode, ModMask};

/// Raw, single-attempt grab primitives on the X display.
///
/// Lock-mask expansion and grab stacking live in [`GrabStack`]; these calls
/// map one-to-one onto protocol requests.
pub trait DisplayServer {
	/// Establishes one passive key grab. Returns false if the server
	/// refused it (e.g. already grabbed by another client).
	fn grab_key(&mut self, keycode: Keycode, mods: ModMask, window: WindowId) -> bool;

	/// Releases every passive key grab on the window.
	fn ungrab_all_keys(&mut self, window: WindowId);

	/// Attempts the exclusive keyboard grab. Returns false on refusal.
	fn grab_keyboard(&mut self) -> bool;

	/// Releases the exclusive keyboard grab.
	fn ungrab_keyboard(&mut self);

	/// Current pointer position in root-window coordinates.
	fn pointer_position(&self) -> (i32, i32);

	/// The root window key grabs are established on.
	fn root_window(&self) -> WindowId;
}

/// Failure to turn a config token into a chord.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
	#[error("empty key token")]
	Empty,
	#[error("unknown key name: {0}")]
	UnknownKey(String),
	#[error("unknown modifier prefix: {0}")]
	UnknownModifier(String),
}

/// Keysym/keymap translation, owned by the host.
pub trait KeyTranslator {
	/// Translates one config token (e.g. `"W-t"`) into a chord.
	fn chord(&self, token: &str) -> Result<ChordKey, TranslateError>;

	/// Strips lock-class bits (Caps/Num/Scroll) and anything outside the
	/// eight modifier bits from a raw event state.
	fn only_modmasks(&self, raw: ModMask) -> ModMask;
}

/// Handle to a pending single-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Single-shot timers on the host's event loop.
///
/// Ids must not be reused while a consumer could still hold one; the chain
/// runtime relies on id comparison to drop callbacks from superseded timers.
pub trait TimerHost {
	/// Arms a single-shot timer and returns its id.
	fn schedule(&mut self, delay: Duration) -> TimerId;

	/// Cancels a pending timer. Unknown or already-fired ids are ignored.
	fn cancel(&mut self, id: TimerId);
}

/// On-screen feedback for an in-progress key chain. The core only supplies
/// text and a show delay; positioning and rendering are the host's.
pub trait ChainPopup {
	fn show(&mut self, text: &str, delay: Duration);
	fn hide(&mut self);
}

/// Window-manager callbacks dispatch needs around action execution.
pub trait WmHooks {
	/// The currently focused window, if any.
	fn focused_window(&self) -> Option<WindowId>;

	/// Stops any pending focus-follows-mouse delay so focus cannot move
	/// underneath an interactive action.
	fn halt_focus_delay(&mut self);

	/// Applies the batched user-time refresh after an event's action list.
	fn update_user_time(&mut self);

	/// Closes any open menus before a key binding fires.
	fn hide_menus(&mut self);
}

/// Everything the dispatch core borrows from the host for one call.
pub struct WmServices<'a> {
	pub display: &'a mut dyn DisplayServer,
	pub translator: &'a dyn KeyTranslator,
	pub timers: &'a mut dyn TimerHost,
	pub popup: &'a mut dyn ChainPopup,
	pub hooks: &'a mut dyn WmHooks,
	pub grabs: &'a mut GrabStack,
}
