//! Mock host implementations for tests.
//!
//! Exported behind the `test-support` feature so downstream crates can run
//! the dispatch core against a scripted host instead of a live display.

use std::time::Duration;

use crate::event::WindowId;
use crate::grab::GrabStack;
use crate::host::{
	ChainPopup, DisplayServer, KeyTranslator, TimerHost, TimerId, TranslateError, WmHooks,
	WmServices,
};
use crate::key::{ChordKey, Keycode, ModMask};

/// Records every grab request; keyboard grabs can be scripted to fail.
#[derive(Debug, Default)]
pub struct MockDisplay {
	pub grabbed_keys: Vec<(Keycode, ModMask, WindowId)>,
	pub ungrab_all_calls: u32,
	pub keyboard_grabs: u32,
	pub keyboard_ungrabs: u32,
	pub refuse_keyboard: bool,
	pub pointer: (i32, i32),
}

impl DisplayServer for MockDisplay {
	fn grab_key(&mut self, keycode: Keycode, mods: ModMask, window: WindowId) -> bool {
		self.grabbed_keys.push((keycode, mods, window));
		true
	}

	fn ungrab_all_keys(&mut self, _window: WindowId) {
		self.ungrab_all_calls += 1;
		self.grabbed_keys.clear();
	}

	fn grab_keyboard(&mut self) -> bool {
		self.keyboard_grabs += 1;
		!self.refuse_keyboard
	}

	fn ungrab_keyboard(&mut self) {
		self.keyboard_ungrabs += 1;
	}

	fn pointer_position(&self) -> (i32, i32) {
		self.pointer
	}

	fn root_window(&self) -> WindowId {
		WindowId(1)
	}
}

impl MockDisplay {
	/// Distinct `(keycode, mods)` pairs currently grabbed, with lock-mask
	/// variants collapsed back onto the base chord.
	pub fn grabbed_chords(&self, locks: ModMask) -> Vec<(Keycode, ModMask)> {
		let mut out: Vec<(Keycode, ModMask)> = Vec::new();
		for (kc, mods, _) in &self.grabbed_keys {
			let base = (*kc, *mods - locks);
			if !out.contains(&base) {
				out.push(base);
			}
		}
		out
	}
}

/// Fixed-table translator over tokens like `"a"`, `"C-x"` or `"W-Return"`.
///
/// Letter keycodes are their ASCII values; a handful of named keys have
/// fixed codes. Modifier prefixes: `C` (Control), `S` (Shift), `A`/`M`
/// (Mod1), `W` (Mod4). NumLock sits on Mod2 and ScrollLock on Mod3.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiTranslator;

impl AsciiTranslator {
	/// The three lock-class masks this keyboard layout uses.
	pub fn lock_masks(&self) -> ModMask {
		ModMask::LOCK | ModMask::MOD2 | ModMask::MOD3
	}
}

impl KeyTranslator for AsciiTranslator {
	fn chord(&self, token: &str) -> Result<ChordKey, TranslateError> {
		if token.is_empty() {
			return Err(TranslateError::Empty);
		}

		let mut mods = ModMask::empty();
		let mut parts = token.split('-').peekable();
		let mut key = None;
		while let Some(part) = parts.next() {
			if parts.peek().is_none() {
				key = Some(part);
				break;
			}
			mods |= match part {
				"C" => ModMask::CONTROL,
				"S" => ModMask::SHIFT,
				"A" | "M" => ModMask::MOD1,
				"W" => ModMask::MOD4,
				other => return Err(TranslateError::UnknownModifier(other.to_string())),
			};
		}

		let key = key.filter(|k| !k.is_empty()).ok_or(TranslateError::Empty)?;
		let keycode = match key {
			"Return" => Keycode(36),
			"Escape" => Keycode(9),
			"Tab" => Keycode(23),
			"space" => Keycode(65),
			k if k.chars().count() == 1 => {
				let c = k.chars().next().unwrap();
				if c.is_ascii_graphic() {
					Keycode(c as u32)
				} else {
					return Err(TranslateError::UnknownKey(key.to_string()));
				}
			}
			_ => return Err(TranslateError::UnknownKey(key.to_string())),
		};

		Ok(ChordKey { keycode, mods, label: token.to_string() })
	}

	fn only_modmasks(&self, raw: ModMask) -> ModMask {
		raw & ModMask::all() - self.lock_masks()
	}
}

/// Hands out monotonically increasing ids and records every call.
#[derive(Debug, Default)]
pub struct MockTimers {
	next: u64,
	pub scheduled: Vec<(TimerId, Duration)>,
	pub cancelled: Vec<TimerId>,
}

impl TimerHost for MockTimers {
	fn schedule(&mut self, delay: Duration) -> TimerId {
		self.next += 1;
		let id = TimerId(self.next);
		self.scheduled.push((id, delay));
		id
	}

	fn cancel(&mut self, id: TimerId) {
		self.cancelled.push(id);
	}
}

/// Records popup text and visibility.
#[derive(Debug, Default)]
pub struct MockPopup {
	pub shown: Vec<(String, Duration)>,
	pub hides: u32,
	pub visible: bool,
}

impl ChainPopup for MockPopup {
	fn show(&mut self, text: &str, delay: Duration) {
		self.shown.push((text.to_string(), delay));
		self.visible = true;
	}

	fn hide(&mut self) {
		self.hides += 1;
		self.visible = false;
	}
}

/// Counts hook invocations; the focused window is scriptable.
#[derive(Debug, Default)]
pub struct MockHooks {
	pub focused: Option<WindowId>,
	pub focus_delay_halts: u32,
	pub user_time_refreshes: u32,
	pub menu_hides: u32,
}

impl WmHooks for MockHooks {
	fn focused_window(&self) -> Option<WindowId> {
		self.focused
	}

	fn halt_focus_delay(&mut self) {
		self.focus_delay_halts += 1;
	}

	fn update_user_time(&mut self) {
		self.user_time_refreshes += 1;
	}

	fn hide_menus(&mut self) {
		self.menu_hides += 1;
	}
}

/// A complete scripted host, borrowable as [`WmServices`].
#[derive(Debug)]
pub struct MockHost {
	pub display: MockDisplay,
	pub translator: AsciiTranslator,
	pub timers: MockTimers,
	pub popup: MockPopup,
	pub hooks: MockHooks,
	pub grabs: GrabStack,
}

impl Default for MockHost {
	fn default() -> Self {
		Self {
			display: MockDisplay::default(),
			translator: AsciiTranslator,
			timers: MockTimers::default(),
			popup: MockPopup::default(),
			hooks: MockHooks::default(),
			grabs: GrabStack::new(ModMask::MOD2, ModMask::LOCK, ModMask::MOD3),
		}
	}
}

impl MockHost {
	/// Borrows every collaborator for one core call.
	pub fn services(&mut self) -> WmServices<'_> {
		WmServices {
			display: &mut self.display,
			translator: &self.translator,
			timers: &mut self.timers,
			popup: &mut self.popup,
			hooks: &mut self.hooks,
			grabs: &mut self.grabs,
		}
	}
}
