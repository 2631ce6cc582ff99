use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::PoemError;
use crate::io::read_text;

/// One pronunciation: an ordered list of phones such as `["K", "AE1", "T"]`.
///
/// Vowel phones carry a stress digit (`0` unstressed, `1` primary, `2` secondary).
pub type Pronunciation = Vec<String>;

/// Read-only pronunciation lookup table.
///
/// Maps a lowercase word to every pronunciation listed for it, in file order.
/// Loaded once at startup and shared behind an `Arc`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PronouncingDictionary {
	entries: HashMap<String, Vec<Pronunciation>>,
}

impl PronouncingDictionary {
	/// An empty table: every lookup misses and the heuristics take over.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a table from `(word, phones)` pairs, e.g. for tests.
	///
	/// Repeated words accumulate variants in the given order.
	pub fn from_entries<'a, I>(entries: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut dictionary = Self::default();
		for (word, phones) in entries {
			dictionary.insert(word, phones.split_whitespace().map(str::to_owned).collect());
		}
		dictionary
	}

	/// Parses the CMU pronouncing dictionary text format.
	///
	/// - `WORD  PH1 PH2 ...` (any whitespace between word and phones)
	/// - `WORD(2)  ...` adds a variant to `word`
	/// - lines starting with `;;;` and anything after ` #` are comments
	pub fn parse(text: &str) -> Self {
		let mut dictionary = Self::default();
		for line in text.lines() {
			let line = line.split(" #").next().unwrap_or_default().trim();
			if line.is_empty() || line.starts_with(";;;") {
				continue;
			}

			let mut parts = line.split_whitespace();
			let Some(raw_word) = parts.next() else { continue };
			let phones: Pronunciation = parts.map(str::to_owned).collect();
			if phones.is_empty() {
				continue;
			}

			// WORD(2) -> WORD
			let word = match raw_word.find('(') {
				Some(index) if index > 0 && raw_word.ends_with(')') => &raw_word[..index],
				_ => raw_word,
			};
			dictionary.insert(word, phones);
		}
		dictionary
	}

	/// Loads a CMU-format dictionary file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PoemError> {
		let dictionary = Self::parse(&read_text(&path)?);
		info!("Loaded {} pronunciations from {}", dictionary.len(), path.as_ref().display());
		Ok(dictionary)
	}

	fn insert(&mut self, word: &str, phones: Pronunciation) {
		self.entries.entry(word.to_lowercase()).or_default().push(phones);
	}

	/// All pronunciations of `word`, or `None` on a lookup miss.
	pub fn get(&self, word: &str) -> Option<&[Pronunciation]> {
		self.entries.get(word).map(Vec::as_slice)
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Hash of every word and pronunciation, independent of insertion order.
	///
	/// Two tables loaded from the same file always agree; any added, removed
	/// or changed pronunciation gives a different value (barring collisions).
	pub fn fingerprint(&self) -> u64 {
		let mut words: Vec<_> = self.entries.iter().collect();
		words.sort_unstable_by(|a, b| a.0.cmp(b.0));

		let mut hasher = DefaultHasher::new();
		words.hash(&mut hasher);
		hasher.finish()
	}
}

/// Returns `true` if the phone carries a stress digit, i.e. is a syllable nucleus.
pub fn is_syllabic(phone: &str) -> bool {
	phone.contains(['0', '1', '2'])
}
