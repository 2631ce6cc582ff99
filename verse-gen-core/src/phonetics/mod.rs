//! Phonetic analysis of single words.
//!
//! - `PronouncingDictionary`: the read-only pronunciation lookup table
//! - `PhoneticAnalyzer`: syllable counts, stress and rhyme fingerprints
//! - `StressPattern` / `RhymeFingerprint`: the fingerprint types

/// Word → syllable count / stress fingerprint / rhyme fingerprint.
pub mod analyzer;

/// CMU-format pronunciation table.
pub mod dictionary;

/// Stress symbols, stress patterns and rhyme fingerprints.
pub mod fingerprint;

/// Digit strings spelled as English words.
mod numbers;

pub use analyzer::{PhoneticAnalyzer, WordProfile};
pub use dictionary::{PronouncingDictionary, Pronunciation};
pub use fingerprint::{RhymeFingerprint, Stress, StressPattern};

/// Source of per-word syllable and stress information.
///
/// Implemented by [`PhoneticAnalyzer`], which computes the answer, and by
/// corpus models, which answer from fingerprints precomputed at build time.
pub trait Prosody {
	fn syllable_count(&self, word: &str) -> usize;

	fn stress_fingerprint(&self, word: &str) -> StressPattern;
}
