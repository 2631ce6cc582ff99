use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::Prosody;
use super::dictionary::{Pronunciation, PronouncingDictionary, is_syllabic};
use super::fingerprint::{RhymeFingerprint, Stress, StressPattern};
use super::numbers::spell_digits;

/// Characters joining the parts of a compound token.
const COMPOUND_SEPARATORS: [char; 4] = [' ', '_', '-', '.'];

/// Everything the generator needs to know about one word.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WordProfile {
	pub syllables: usize,
	pub stress: StressPattern,
	pub rhyme: Option<RhymeFingerprint>,
}

/// Maps words to syllable counts, stress fingerprints and rhyme fingerprints.
///
/// Uses the pronunciation table when it knows a word and falls back to
/// spelling heuristics otherwise. A lookup miss is never an error.
///
/// ## Invariants
/// - `stress_fingerprint(w).len() == syllable_count(w)` for every `w`
/// - results depend only on the word and the table (no hidden state)
#[derive(Clone, Debug)]
pub struct PhoneticAnalyzer {
	dictionary: Arc<PronouncingDictionary>,
	dictionary_fingerprint: u64,
}

impl PhoneticAnalyzer {
	pub fn new(dictionary: Arc<PronouncingDictionary>) -> Self {
		let dictionary_fingerprint = dictionary.fingerprint();
		Self {
			dictionary,
			dictionary_fingerprint,
		}
	}

	/// An analyzer without a pronunciation table, relying on heuristics only.
	pub fn heuristic() -> Self {
		Self::new(Arc::new(PronouncingDictionary::empty()))
	}

	pub fn dictionary(&self) -> &PronouncingDictionary {
		&self.dictionary
	}

	/// [`PronouncingDictionary::fingerprint`] of the table, computed once.
	pub fn dictionary_fingerprint(&self) -> u64 {
		self.dictionary_fingerprint
	}

	/// Resolves a lowercase word to its listed pronunciations.
	///
	/// Besides the exact spelling this accepts the dropped-g forms common in
	/// lyrics ("singin'", "prayin") and retries with punctuation removed.
	/// Every public function goes through here so they agree on which words are known.
	fn pronunciations(&self, word: &str) -> Option<&[Pronunciation]> {
		let dictionary = self.dictionary.as_ref();
		if let Some(found) = dictionary.get(word) {
			return Some(found);
		}

		if let Some(stem) = word.strip_suffix("in'") {
			if let Some(found) = dictionary.get(&format!("{stem}ing")) {
				return Some(found);
			}
		}
		if word.ends_with("in") {
			if let Some(found) = dictionary.get(&format!("{word}g")) {
				return Some(found);
			}
		}

		if word.contains(COMPOUND_SEPARATORS) {
			return None;
		}
		let cleaned: String = word.chars().filter(|c| c.is_ascii_lowercase() || *c == '\'').collect();
		if cleaned.is_empty() || cleaned == word {
			return None;
		}
		dictionary.get(&cleaned)
	}

	/// Number of syllables in `word`.
	///
	/// Known words count the stress-marked phones of their first pronunciation.
	/// Unknown words use [`heuristic_syllables`](Self::heuristic_syllables).
	pub fn syllable_count(&self, word: &str) -> usize {
		let word = word.to_lowercase();
		match self.pronunciations(&word) {
			Some(pronunciations) => count_syllabic(&pronunciations[0]),
			None => self.heuristic_syllables(&word),
		}
	}

	/// Estimates syllables for a word the table does not know.
	///
	/// - compound tokens (space, `_`, `-`, `.`) are split and summed; each
	///   inner `.` adds one syllable for the spoken "dot"
	/// - digit-only tokens are spelled out in words first
	/// - tokens without vowels are read as acronyms, letter by letter
	/// - everything else counts vowel groups
	fn heuristic_syllables(&self, word: &str) -> usize {
		let parts: Vec<&str> = word.split(COMPOUND_SEPARATORS).filter(|part| !part.is_empty()).collect();
		if parts.len() > 1 {
			let spoken_dots = word.trim_matches('.').matches('.').count();
			return parts.iter().map(|part| self.syllable_count(part)).sum::<usize>() + spoken_dots;
		}
		let Some(word) = parts.first() else { return 0 };

		if word.chars().all(|c| c.is_ascii_digit()) {
			return self.syllable_count(&spell_digits(word));
		}
		if !word.chars().any(is_vowel) {
			return acronym_syllables(word);
		}
		count_vowel_groups(word)
	}

	/// Stress fingerprint of `word`, one symbol per syllable.
	///
	/// Unknown words are fully ambiguous. For known words the stress patterns
	/// of all pronunciation variants are merged: a position where every
	/// variant agrees keeps that stress, any disagreement becomes `x`.
	/// Variants whose syllable count differs from the first pronunciation are
	/// ignored.
	pub fn stress_fingerprint(&self, word: &str) -> StressPattern {
		let word = word.to_lowercase();
		let Some(pronunciations) = self.pronunciations(&word) else {
			return StressPattern::ambiguous(self.heuristic_syllables(&word));
		};

		let first = stress_of(&pronunciations[0]);
		let mut variants: Vec<Vec<Stress>> = pronunciations[1..].iter().map(|p| stress_of(p)).collect();
		if variants.iter().any(|v| v.len() != first.len()) {
			debug!("Pronunciations of '{word}' disagree on syllable count, using the first one");
			variants.retain(|v| v.len() == first.len());
		}

		let merged = first
			.iter()
			.enumerate()
			.map(|(i, symbol)| {
				if variants.iter().all(|v| v[i] == *symbol) {
					*symbol
				} else {
					Stress::Either
				}
			})
			.collect();
		StressPattern::new(merged)
	}

	/// Rhyme fingerprint of `word`, or `None` if the table does not know it.
	///
	/// Only the first pronunciation is used: its phones from the end up to
	/// and including the last stress-marked one.
	pub fn rhyme_fingerprint(&self, word: &str) -> Option<RhymeFingerprint> {
		let word = word.to_lowercase();
		let phones = self.pronunciations(&word)?.first()?;

		let start = phones.iter().rposition(|phone| is_syllabic(phone)).unwrap_or(0);
		Some(RhymeFingerprint::new(phones[start..].to_vec()))
	}

	pub fn profile(&self, word: &str) -> WordProfile {
		WordProfile {
			syllables: self.syllable_count(word),
			stress: self.stress_fingerprint(word),
			rhyme: self.rhyme_fingerprint(word),
		}
	}
}

impl Prosody for PhoneticAnalyzer {
	fn syllable_count(&self, word: &str) -> usize {
		PhoneticAnalyzer::syllable_count(self, word)
	}

	fn stress_fingerprint(&self, word: &str) -> StressPattern {
		PhoneticAnalyzer::stress_fingerprint(self, word)
	}
}

fn is_vowel(c: char) -> bool {
	matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn count_syllabic(pronunciation: &Pronunciation) -> usize {
	pronunciation.iter().filter(|phone| is_syllabic(phone)).count()
}

/// Primary and secondary stress both count as stressed.
fn stress_of(pronunciation: &Pronunciation) -> Vec<Stress> {
	pronunciation
		.iter()
		.filter(|phone| is_syllabic(phone))
		.map(|phone| {
			if phone.contains('0') {
				Stress::Unstressed
			} else {
				Stress::Stressed
			}
		})
		.collect()
}

/// First-order approximation: one syllable per run of vowels.
///
/// Wrong on e.g. "aria" or "praying", but close enough for meter. A trailing
/// `e` after a consonant is silent. Never returns less than one.
fn count_vowel_groups(word: &str) -> usize {
	let letters: Vec<char> = word.chars().collect();
	let mut syllables = 0;
	let mut after_consonant = true;
	for &letter in &letters {
		if is_vowel(letter) {
			if after_consonant {
				syllables += 1;
			}
			after_consonant = false;
		} else {
			after_consonant = true;
		}
	}

	if let [.., before, 'e'] = letters.as_slice() {
		if before.is_alphabetic() && !is_vowel(*before) {
			syllables -= 1;
		}
	}
	syllables.max(1)
}

/// Syllables of a token spelled letter by letter ("mp3", "www").
///
/// "w" is "double-u" (3 syllables), "7" and "0" ("seven", "zero") are two.
fn acronym_syllables(word: &str) -> usize {
	word.chars()
		.filter(char::is_ascii_alphanumeric)
		.map(|c| match c {
			'w' => 3,
			'7' | '0' => 2,
			_ => 1,
		})
		.sum()
}
