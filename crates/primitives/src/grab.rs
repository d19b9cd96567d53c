//! Grab bookkeeping: the stacked exclusive keyboard grab, the lock-mask
//! combination table, and passive-grab accounting.

use tracing::warn;

use crate::event::WindowId;
use crate::host::DisplayServer;
use crate::key::{Keycode, ModMask};

/// Number of Num/Caps/Scroll lock combinations a key must be grabbed under.
pub const LOCK_COMBOS: usize = 8;

/// Ref-counted grab state shared by the chain runtime and the dispatcher.
///
/// The exclusive keyboard grab stacks: nested grabs only touch the display
/// on the 0→1 and 1→0 transitions. Passive key grabs are expanded across
/// every lock-mask combination so bindings fire regardless of Num/Caps/
/// Scroll Lock state.
#[derive(Debug)]
pub struct GrabStack {
	kgrabs: u32,
	passive: i32,
	masks: [ModMask; LOCK_COMBOS],
}

impl GrabStack {
	/// Builds the combination table from the masks the keyboard maps the
	/// three lock keys to (Caps is normally [`ModMask::LOCK`]).
	pub fn new(num: ModMask, caps: ModMask, scroll: ModMask) -> Self {
		Self {
			kgrabs: 0,
			passive: 0,
			masks: [
				ModMask::empty(),
				num,
				caps,
				scroll,
				num | caps,
				num | scroll,
				caps | scroll,
				num | caps | scroll,
			],
		}
	}

	/// True while the exclusive keyboard grab is held.
	pub fn on_keyboard(&self) -> bool {
		self.kgrabs > 0
	}

	/// Acquires (or stacks) the exclusive keyboard grab. Returns false and
	/// leaves the count untouched if the display refuses the grab.
	pub fn grab_keyboard(&mut self, display: &mut dyn DisplayServer) -> bool {
		if self.kgrabs == 0 {
			if !display.grab_keyboard() {
				return false;
			}
			self.passive = 0;
		}
		self.kgrabs += 1;
		true
	}

	/// Releases one level of the keyboard grab; the display is only
	/// ungrabbed when the count reaches zero. Returns false if no grab was
	/// held.
	pub fn ungrab_keyboard(&mut self, display: &mut dyn DisplayServer) -> bool {
		if self.kgrabs == 0 {
			return false;
		}
		self.kgrabs -= 1;
		if self.kgrabs == 0 {
			display.ungrab_keyboard();
		}
		true
	}

	/// Adjusts the passive-grab count from key press/release accounting.
	/// Ignored while the exclusive grab is held; never drops below zero.
	pub fn key_passive_count(&mut self, delta: i32) {
		if self.on_keyboard() {
			return;
		}
		self.passive = (self.passive + delta).max(0);
	}

	/// Current passive-grab count.
	pub fn passive_count(&self) -> i32 {
		self.passive
	}

	/// Establishes a passive grab for a chord under every lock-mask
	/// combination. Per-combination refusals are logged and skipped.
	pub fn grab_key(
		&self,
		display: &mut dyn DisplayServer,
		keycode: Keycode,
		mods: ModMask,
		window: WindowId,
	) {
		for lock in self.masks {
			if !display.grab_key(keycode, mods | lock, window) {
				warn!(keycode = keycode.0, mods = ?(mods | lock), "failed to grab key");
			}
		}
	}

	/// Drops every passive key grab on the window.
	pub fn ungrab_all_keys(&self, display: &mut dyn DisplayServer, window: WindowId) {
		display.ungrab_all_keys(window);
	}
}
