//! An unattached chain of chords, built from config tokens.

use oxbow_primitives::{ChordKey, KeyTranslator, TranslateError};

/// A straight-line sequence of chords not yet part of any tree.
///
/// This is what `bind`/`chroot` operations build from config tokens before
/// merging it into the live tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordChain {
	keys: Vec<ChordKey>,
}

impl ChordChain {
	/// Translates one token per chord. Fails on an empty token list or on
	/// the first untranslatable token.
	pub fn parse<S: AsRef<str>>(
		tokens: &[S],
		translator: &dyn KeyTranslator,
	) -> Result<Self, TranslateError> {
		if tokens.is_empty() {
			return Err(TranslateError::Empty);
		}
		let keys = tokens
			.iter()
			.map(|t| translator.chord(t.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { keys })
	}

	/// Builds a chain from already-translated chords. Empty input is the
	/// caller's bug; used by rebinding, which replays existing keys.
	pub fn from_keys(keys: Vec<ChordKey>) -> Result<Self, TranslateError> {
		if keys.is_empty() {
			return Err(TranslateError::Empty);
		}
		Ok(Self { keys })
	}

	/// The chords in order, first key press first.
	pub fn keys(&self) -> &[ChordKey] {
		&self.keys
	}

	/// Number of chords in the chain.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Always false; empty chains cannot be constructed.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub(crate) fn into_keys(self) -> Vec<ChordKey> {
		self.keys
	}
}
