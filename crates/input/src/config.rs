//! Keyboard runtime configuration.

use std::time::Duration;

/// Chord token the reset hotkey is translated from when the config does
/// not override it.
pub const DEFAULT_RESET_BINDING: &str = "C-g";

/// How long a chain waits for its next key before resetting itself.
pub const DEFAULT_CHAIN_TIMEOUT: Duration = Duration::from_millis(3000);

/// Delay before the chain popup becomes visible, so quick chains never
/// flash it.
pub const DEFAULT_POPUP_DELAY: Duration = Duration::from_millis(1000);

/// How far a chain reset unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetScope {
	/// All the way to the root, out of every chroot layer.
	#[default]
	Full,
	/// To the nearest enclosing chroot boundary; the root if none. This
	/// is what the auto-reset timer uses, so a timeout never throws the
	/// user out of a modal layer.
	Nearest,
	/// Break out of `n` chroot boundaries, stopping at the next one.
	Break(u32),
}

#[derive(Debug, Clone)]
pub struct KeyboardConfig {
	/// Chord token for the reset hotkey, translated at startup.
	pub reset_binding: String,
	/// Strength of the reset the hotkey performs.
	pub reset_scope: ResetScope,
	pub chain_timeout: Duration,
	pub popup_delay: Duration,
}

impl Default for KeyboardConfig {
	fn default() -> Self {
		Self {
			reset_binding: DEFAULT_RESET_BINDING.to_owned(),
			reset_scope: ResetScope::Full,
			chain_timeout: DEFAULT_CHAIN_TIMEOUT,
			popup_delay: DEFAULT_POPUP_DELAY,
		}
	}
}
