//! Keyboard input dispatch for the window manager.
//!
//! Key presses walk a chord tree: internal nodes continue a chain,
//! leaves dispatch their bound action instances. While a chain is in
//! progress only the keys that could continue it (plus the reset
//! hotkey) are grabbed, and an idle timer unwinds abandoned chains back
//! to the nearest chroot boundary.
//!
//! The host's event loop owns the split between this runtime and a live
//! interactive session: while [`ActionDispatcher::interactive_active`]
//! reports a session, key events belong to
//! [`ActionDispatcher::input_event`]; otherwise they go to
//! [`Keyboard::key_event`].
//!
//! [`ActionDispatcher::interactive_active`]: oxbow_registry::ActionDispatcher::interactive_active
//! [`ActionDispatcher::input_event`]: oxbow_registry::ActionDispatcher::input_event

mod config;
mod keyboard;

#[cfg(test)]
mod tests;

pub use config::{
	DEFAULT_CHAIN_TIMEOUT, DEFAULT_POPUP_DELAY, DEFAULT_RESET_BINDING, KeyboardConfig, ResetScope,
};
pub use keyboard::{BindError, Keyboard};
