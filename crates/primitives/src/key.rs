//! Keycode, modifier mask and chord key types.

use bitflags::bitflags;

/// An X11 keycode as delivered in key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keycode(pub u32);

bitflags! {
	/// The eight X11 modifier bits.
	///
	/// Lock-class bits (Caps via [`ModMask::LOCK`], Num and Scroll via
	/// whatever `Mod*` the keyboard maps them to) never participate in
	/// binding comparisons; [`crate::KeyTranslator::only_modmasks`] strips
	/// them from raw event state.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ModMask: u32 {
		const SHIFT = 1 << 0;
		const LOCK = 1 << 1;
		const CONTROL = 1 << 2;
		const MOD1 = 1 << 3;
		const MOD2 = 1 << 4;
		const MOD3 = 1 << 5;
		const MOD4 = 1 << 6;
		const MOD5 = 1 << 7;
	}
}

/// One step of a key chain: a keycode plus the modifiers that must be held.
///
/// The label is the config token the chord was translated from and is what
/// chain feedback text is built out of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordKey {
	/// Keycode this chord matches on.
	pub keycode: Keycode,
	/// Modifier mask this chord matches on (lock bits already stripped).
	pub mods: ModMask,
	/// Human-readable label, e.g. `"W-t"`.
	pub label: String,
}

impl ChordKey {
	/// Returns true when this chord matches the given keycode and
	/// lock-stripped modifier state.
	pub fn matches(&self, keycode: Keycode, mods: ModMask) -> bool {
		self.keycode == keycode && self.mods == mods
	}
}
