//! Comparing stress fingerprints against meters.
//!
//! Lines are discovered last word first, so partial matches are aligned to
//! the *tail* of the target meter: a word may supply the last few syllables
//! while earlier words are still to be found.

use crate::phonetics::{Prosody, Stress, StressPattern};

/// True if either symbol is `x` or both are equal.
pub fn symbols_compatible(a: Stress, b: Stress) -> bool {
	a.compatible(b)
}

/// True if both patterns have the same length and are compatible position by position.
pub fn patterns_compatible(p: &[Stress], q: &[Stress]) -> bool {
	p.len() == q.len() && p.iter().zip(q).all(|(a, b)| symbols_compatible(*a, *b))
}

/// True if `fingerprint` covers the whole of `target`.
///
/// An empty fingerprint (a word with no syllables) never fulfills anything.
pub fn fulfills(fingerprint: &[Stress], target: &[Stress]) -> bool {
	!fingerprint.is_empty() && patterns_compatible(fingerprint, target)
}

/// True if `fingerprint` can supply the last `fingerprint.len()` syllables of `target`.
///
/// An empty fingerprint is never valid: it would leave the target unchanged
/// and the search could cycle forever.
pub fn is_valid_prefix_from_tail(fingerprint: &[Stress], target: &[Stress]) -> bool {
	!fingerprint.is_empty()
		&& fingerprint.len() <= target.len()
		&& patterns_compatible(fingerprint, &target[target.len() - fingerprint.len()..])
}

/// `target` without its last `fingerprint.len()` symbols.
///
/// Returns `None` when the fingerprint is longer than the target.
pub fn remaining_pattern<'t>(fingerprint: &[Stress], target: &'t [Stress]) -> Option<&'t [Stress]> {
	target.len().checked_sub(fingerprint.len()).map(|rest| &target[..rest])
}

/// Word-level scansion checks backed by a [`Prosody`] source.
pub struct ScansionMatcher<'a, P: Prosody + ?Sized> {
	prosody: &'a P,
}

impl<'a, P: Prosody + ?Sized> ScansionMatcher<'a, P> {
	pub fn new(prosody: &'a P) -> Self {
		Self { prosody }
	}

	pub fn fingerprint(&self, word: &str) -> StressPattern {
		self.prosody.stress_fingerprint(word)
	}

	/// The word's fingerprint matches `target` end to end.
	pub fn fulfills(&self, word: &str, target: &[Stress]) -> bool {
		fulfills(self.fingerprint(word).symbols(), target)
	}

	/// The word can end a line whose remaining meter is `target`.
	pub fn is_valid_prefix_from_tail(&self, word: &str, target: &[Stress]) -> bool {
		is_valid_prefix_from_tail(self.fingerprint(word).symbols(), target)
	}

	/// What is left of `target` for the words before `word`.
	pub fn remaining_pattern<'t>(&self, word: &str, target: &'t [Stress]) -> Option<&'t [Stress]> {
		remaining_pattern(self.fingerprint(word).symbols(), target)
	}

	/// Stress of a whole line, first word first.
	pub fn line_fingerprint<S: AsRef<str>>(&self, words: &[S]) -> StressPattern {
		let mut pattern = StressPattern::default();
		for word in words {
			pattern.extend(&self.fingerprint(word.as_ref()));
		}
		pattern
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::phonetics::{PhoneticAnalyzer, PronouncingDictionary};
	use std::sync::Arc;

	fn pattern(s: &str) -> StressPattern {
		s.parse().unwrap()
	}

	fn analyzer() -> PhoneticAnalyzer {
		PhoneticAnalyzer::new(Arc::new(PronouncingDictionary::from_entries([
			("the", "DH AH0"),
			("cat", "K AE1 T"),
			("below", "B IH0 L OW1"),
			("city", "S IH1 T IY0"),
		])))
	}

	#[test]
	fn x_matches_either_stress() {
		assert!(patterns_compatible(pattern("x1").symbols(), pattern("01").symbols()));
		assert!(!patterns_compatible(pattern("10").symbols(), pattern("01").symbols()));
		assert!(!patterns_compatible(pattern("0").symbols(), pattern("01").symbols()));
	}

	#[test]
	fn tail_alignment_checks_the_end_of_the_meter() {
		let meter = pattern("0101");
		assert!(is_valid_prefix_from_tail(pattern("01").symbols(), meter.symbols()));
		assert!(!is_valid_prefix_from_tail(pattern("10").symbols(), meter.symbols()));
		assert!(!is_valid_prefix_from_tail(pattern("01010").symbols(), meter.symbols()));
		assert!(!is_valid_prefix_from_tail(&[], meter.symbols()));
	}

	#[test]
	fn remaining_pattern_drops_the_tail() {
		let meter = pattern("01010");
		let rest = remaining_pattern(pattern("10").symbols(), meter.symbols()).unwrap();
		assert_eq!(StressPattern::new(rest.to_vec()).to_string(), "010");
		assert!(remaining_pattern(pattern("010101").symbols(), meter.symbols()).is_none());
	}

	#[test]
	fn word_level_checks_use_the_fingerprints() {
		let analyzer = analyzer();
		let matcher = ScansionMatcher::new(&analyzer);
		let iamb = pattern("01");

		assert!(matcher.fulfills("below", iamb.symbols()));
		assert!(!matcher.fulfills("city", iamb.symbols()));
		assert!(matcher.is_valid_prefix_from_tail("cat", iamb.symbols()));
		assert!(!matcher.is_valid_prefix_from_tail("the", iamb.symbols()));
		assert_eq!(matcher.remaining_pattern("cat", iamb.symbols()).unwrap(), pattern("0").symbols());
	}

	#[test]
	fn fulfilling_implies_valid_from_tail() {
		let analyzer = analyzer();
		let matcher = ScansionMatcher::new(&analyzer);
		for meter in ["0", "1", "01", "10", "0101"] {
			let meter = pattern(meter);
			for word in ["the", "cat", "below", "city", "unknown"] {
				if matcher.fulfills(word, meter.symbols()) {
					assert!(matcher.is_valid_prefix_from_tail(word, meter.symbols()));
				}
			}
		}
	}

	#[test]
	fn line_fingerprint_concatenates_words() {
		let analyzer = analyzer();
		let matcher = ScansionMatcher::new(&analyzer);
		assert_eq!(matcher.line_fingerprint(&["the", "city"]).to_string(), "010");
	}
}
