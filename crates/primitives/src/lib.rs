//! Core vocabulary for the input-dispatch subsystem: keycodes, modifier
//! masks, input events, and the interfaces the window manager provides to
//! the dispatch core (display grabs, key translation, timers, feedback).

/// Per-event payload handed to action run hooks.
pub mod event;
/// Stacked keyboard grabs and lock-mask bookkeeping.
pub mod grab;
/// Interfaces implemented by the surrounding window manager.
pub mod host;
/// Keycode, modifier mask and chord key types.
pub mod key;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use event::{ActionData, FrameContext, KeyEvent, KeyEventKind, UserAction, WindowId};
pub use grab::GrabStack;
pub use host::{
	ChainPopup, DisplayServer, KeyTranslator, TimerHost, TimerId, TranslateError, WmHooks,
	WmServices,
};
pub use key::{ChordKey, Keycode, ModMask};
