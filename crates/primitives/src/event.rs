//! Input-event and action-payload types.

use crate::key::{Keycode, ModMask};

/// An X11 window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Whether a key event is a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
	Press,
	Release,
}

/// A raw keyboard event, already reduced to keycode + modifier state by the
/// host's input translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
	pub kind: KeyEventKind,
	pub keycode: Keycode,
	/// Raw modifier state, including lock bits.
	pub state: ModMask,
	/// Pointer x in root-window coordinates at event time.
	pub x_root: i32,
	/// Pointer y in root-window coordinates at event time.
	pub y_root: i32,
}

impl KeyEvent {
	/// Convenience constructor for a press with pointer at the origin.
	pub fn press(keycode: Keycode, state: ModMask) -> Self {
		Self { kind: KeyEventKind::Press, keycode, state, x_root: 0, y_root: 0 }
	}

	/// Convenience constructor for a release with pointer at the origin.
	pub fn release(keycode: Keycode, state: ModMask) -> Self {
		Self { kind: KeyEventKind::Release, keycode, state, x_root: 0, y_root: 0 }
	}
}

/// What kind of user interaction triggered an action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
	None,
	KeyboardKey,
	MousePress,
	MouseRelease,
	MouseClick,
	MouseMotion,
	/// Menu selections never carry a meaningful modifier state; the
	/// dispatcher zeroes it before running the list.
	MenuSelection,
}

/// Which part of a window frame an event landed on.
///
/// Frame geometry itself is the window manager's business; dispatch only
/// carries the context through to action hooks unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameContext {
	#[default]
	None,
	Desktop,
	Root,
	Client,
	Titlebar,
	Frame,
}

/// Per-event data handed to every action run hook.
#[derive(Debug, Clone, Copy)]
pub struct ActionData {
	pub uact: UserAction,
	/// Modifier state at dispatch time (zeroed for menu selections).
	pub state: ModMask,
	pub x: i32,
	pub y: i32,
	pub button: u32,
	pub context: FrameContext,
	/// The window the action is acting on, if any.
	pub window: Option<WindowId>,
}
