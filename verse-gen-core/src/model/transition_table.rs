use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::{Deserialize, Serialize};

/// Word → successor words.
///
/// A forward table answers "what may follow X", a backward table (built from
/// reversed chunks) answers "what may precede X".
///
/// ## Responsibilities
/// - Record transitions chunk by chunk, never across chunk boundaries
/// - Expose successors in insertion order, duplicates included
/// - Merge with another table (parallel building)
///
/// ## Invariants
/// - Successor lists are never empty
/// - Duplicates are kept: they weight random successor picks by frequency
/// - Keys are ordered, so seeded generation is reproducible
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TransitionTable {
	transitions: BTreeMap<String, Vec<String>>,
}

impl TransitionTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `word` followed by `next`.
	pub fn add_transition(&mut self, word: &str, next: &str) {
		self.transitions.entry(word.to_owned()).or_default().push(next.to_owned());
	}

	/// Records every consecutive pair of one chunk's words.
	pub fn add_chunk<S: AsRef<str>>(&mut self, words: &[S]) {
		for pair in words.windows(2) {
			self.add_transition(pair[0].as_ref(), pair[1].as_ref());
		}
	}

	/// All recorded successors of `word`, in insertion order.
	pub fn successors(&self, word: &str) -> &[String] {
		self.transitions.get(word).map(Vec::as_slice).unwrap_or_default()
	}

	/// Successors of `word` without repeats, in first-seen order.
	pub fn distinct_successors(&self, word: &str) -> Vec<&str> {
		let mut seen = HashSet::new();
		self.successors(word)
			.iter()
			.map(String::as_str)
			.filter(|next| seen.insert(*next))
			.collect()
	}

	/// Successors of `word` without repeats, in a random order weighted by
	/// how often each was observed.
	///
	/// The full list is shuffled and only first occurrences kept, so a
	/// successor comes first with probability proportional to its count.
	pub fn weighted_successors<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> Vec<&str> {
		let mut all: Vec<&str> = self.successors(word).iter().map(String::as_str).collect();
		all.shuffle(rng);
		let mut seen = HashSet::new();
		all.retain(|next| seen.insert(*next));
		all
	}

	/// Picks any word that has at least one successor.
	pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.transitions.keys().choose(rng).map(String::as_str)
	}

	/// Number of words with at least one successor.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Appends every transition of `other` after this table's own.
	///
	/// Merging tables built from consecutive chunk ranges, in order, gives the
	/// same table as building from all chunks at once.
	pub fn merge(&mut self, other: &Self) {
		for (word, successors) in &other.transitions {
			self.transitions.entry(word.clone()).or_default().extend(successors.iter().cloned());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn table(words: &[&str]) -> TransitionTable {
		let mut table = TransitionTable::new();
		table.add_chunk(words);
		table
	}

	#[test]
	fn successors_keep_order_and_duplicates() {
		let table = table(&["the", "cat", "sat", "on", "the", "mat", "the", "cat"]);
		assert_eq!(table.successors("the"), &["cat", "mat", "cat"]);
		assert_eq!(table.distinct_successors("the"), vec!["cat", "mat"]);
		assert!(table.successors("dog").is_empty());
	}

	#[test]
	fn last_word_of_a_chunk_has_no_successor() {
		let table = table(&["one", "two"]);
		assert_eq!(table.successors("one"), &["two"]);
		assert!(table.successors("two").is_empty());
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn merge_matches_a_single_build() {
		let mut left = table(&["a", "b", "a", "c"]);
		let right = table(&["a", "d"]);
		left.merge(&right);

		let mut whole = TransitionTable::new();
		whole.add_chunk(&["a", "b", "a", "c"]);
		whole.add_chunk(&["a", "d"]);
		assert_eq!(left, whole);
	}

	#[test]
	fn random_picks_come_from_the_table() {
		let table = table(&["a", "b", "a", "c"]);
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..20 {
			let key = table.random_key(&mut rng).unwrap();
			assert!(!table.successors(key).is_empty());
			let mut next = table.weighted_successors("a", &mut rng);
			next.sort_unstable();
			assert_eq!(next, vec!["b", "c"]);
		}
		assert!(TransitionTable::new().random_key(&mut rng).is_none());
		assert!(table.weighted_successors("c", &mut rng).is_empty());
	}

	#[test]
	fn frequent_successors_tend_to_come_first() {
		let mut table = TransitionTable::new();
		for _ in 0..9 {
			table.add_chunk(&["the", "cat"]);
		}
		table.add_chunk(&["the", "mat"]);

		let mut rng = StdRng::seed_from_u64(11);
		let cat_first = (0..200)
			.filter(|_| table.weighted_successors("the", &mut rng)[0] == "cat")
			.count();
		assert!(cat_first >= 150, "cat first {cat_first} times out of 200");
	}
}
