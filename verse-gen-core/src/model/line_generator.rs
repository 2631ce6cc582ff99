use std::collections::HashSet;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use super::generation_config::GenerationConfig;
use super::transition_table::TransitionTable;
use crate::error::PoemError;
use crate::phonetics::{Prosody, Stress, StressPattern};
use crate::scansion::{self, ScansionMatcher};

/// Bookkeeping for one backtracking search.
///
/// `dead_ends` remembers `(word, target length)` pairs already proven to have
/// no completion. The remaining target is always a prefix of the original
/// meter, so its length alone identifies it.
struct Search<'a> {
	steps_left: usize,
	dead_ends: HashSet<(&'a str, usize)>,
}

impl<'a> Search<'a> {
	fn new(budget: usize) -> Self {
		Self {
			steps_left: budget,
			dead_ends: HashSet::new(),
		}
	}

	/// Spends one step, returning `false` once the budget is gone.
	fn step(&mut self) -> bool {
		if self.steps_left == 0 {
			return false;
		}
		self.steps_left -= 1;
		true
	}

	fn exhausted(&self) -> bool {
		self.steps_left == 0
	}
}

/// Depth-first search for lines that satisfy a meter or a syllable count.
///
/// Walks one transition table. With the backward table a metered line is
/// built from its last word towards its first, so the last word can be
/// chosen to rhyme. With the forward table (haiku) lines grow head first.
///
/// ## Termination
/// Every step consumes at least one syllable of the target, so recursion
/// depth is bounded by the target length. Breadth is bounded by the table and
/// the overall work by `GenerationConfig::max_search_steps`.
pub struct LineGenerator<'a, P: Prosody + ?Sized> {
	table: &'a TransitionTable,
	prosody: &'a P,
	matcher: ScansionMatcher<'a, P>,
	config: GenerationConfig,
}

impl<'a, P: Prosody + ?Sized> LineGenerator<'a, P> {
	pub fn new(table: &'a TransitionTable, prosody: &'a P, config: &GenerationConfig) -> Self {
		Self {
			table,
			prosody,
			matcher: ScansionMatcher::new(prosody),
			config: *config,
		}
	}

	/// Searches for words satisfying `target`, starting from `word`.
	///
	/// The result is in walk order: `word` first, then the words found
	/// behind it in the table. Against the backward table that is the line
	/// read from its end, so callers reverse it before display.
	pub fn search_line<R: Rng + ?Sized>(&self, word: &'a str, target: &[Stress], rng: &mut R) -> Option<Vec<&'a str>> {
		let mut search = Search::new(self.config.max_search_steps);
		self.search_meter(word, target, &mut search, rng)
	}

	/// A line ending with `seed` that scans as `meter`, first word first.
	///
	/// Expects the generator to walk a backward table.
	pub fn line_ending_with<R: Rng + ?Sized>(&self, seed: &'a str, meter: &StressPattern, rng: &mut R) -> Option<Vec<&'a str>> {
		let mut line = self.search_line(seed, meter.symbols(), rng)?;
		line.reverse();
		Some(line)
	}

	fn search_meter<R: Rng + ?Sized>(
		&self,
		word: &'a str,
		target: &[Stress],
		search: &mut Search<'a>,
		rng: &mut R,
	) -> Option<Vec<&'a str>> {
		if !search.step() {
			return None;
		}

		let fingerprint = self.prosody.stress_fingerprint(word);
		if scansion::fulfills(fingerprint.symbols(), target) {
			return Some(vec![word]);
		}
		if !scansion::is_valid_prefix_from_tail(fingerprint.symbols(), target) {
			return None;
		}
		let rest = scansion::remaining_pattern(fingerprint.symbols(), target)?;
		if search.dead_ends.contains(&(word, target.len())) {
			return None;
		}

		let mut candidates: Vec<&'a str> = self
			.table
			.distinct_successors(word)
			.into_iter()
			.filter(|candidate| self.matcher.is_valid_prefix_from_tail(candidate, rest))
			.collect();
		candidates.shuffle(rng);

		for candidate in candidates {
			if let Some(mut found) = self.search_meter(candidate, rest, search, rng) {
				found.insert(0, word);
				return Some(found);
			}
			if search.exhausted() {
				return None;
			}
		}

		search.dead_ends.insert((word, target.len()));
		None
	}

	/// Searches for words totalling exactly `syllables`, starting from `word`.
	///
	/// Same shape as the metered search but only compares syllable counts.
	/// The result is in walk order.
	pub fn search_syllables<R: Rng + ?Sized>(&self, word: &'a str, syllables: usize, rng: &mut R) -> Option<Vec<&'a str>> {
		let mut search = Search::new(self.config.max_search_steps);
		self.search_count(word, syllables, &mut search, rng)
	}

	fn search_count<R: Rng + ?Sized>(
		&self,
		word: &'a str,
		remaining: usize,
		search: &mut Search<'a>,
		rng: &mut R,
	) -> Option<Vec<&'a str>> {
		if !search.step() {
			return None;
		}

		let word_syllables = self.prosody.syllable_count(word);
		if word_syllables == 0 || word_syllables > remaining {
			return None;
		}
		if word_syllables == remaining {
			return Some(vec![word]);
		}
		if search.dead_ends.contains(&(word, remaining)) {
			return None;
		}

		let rest = remaining - word_syllables;
		let mut candidates: Vec<&'a str> = self
			.table
			.distinct_successors(word)
			.into_iter()
			.filter(|candidate| {
				let count = self.prosody.syllable_count(candidate);
				count > 0 && count <= rest
			})
			.collect();
		candidates.shuffle(rng);

		for candidate in candidates {
			if let Some(mut found) = self.search_count(candidate, rest, search, rng) {
				found.insert(0, word);
				return Some(found);
			}
			if search.exhausted() {
				return None;
			}
		}

		search.dead_ends.insert((word, remaining));
		None
	}

	/// A line of exactly `target_syllables` syllables.
	///
	/// When `previous` (the last word of the previous line) is given, its
	/// successors are tried as first words, the frequent ones most likely
	/// first, before falling back to random table words. This loosely
	/// connects consecutive lines.
	///
	/// # Errors
	/// - `EmptyCorpusSelection` if the table is empty
	/// - `GenerationTimeout` after `max_attempts` seeds fail
	pub fn generate_syllable_line<R: Rng + ?Sized>(
		&self,
		target_syllables: usize,
		previous: Option<&str>,
		rng: &mut R,
	) -> Result<Vec<&'a str>, PoemError> {
		if self.table.is_empty() {
			return Err(PoemError::EmptyCorpusSelection);
		}

		let mut preferred = previous
			.map(|word| self.table.weighted_successors(word, rng))
			.unwrap_or_default()
			.into_iter();

		let max_attempts = self.config.max_attempts;
		for _ in 0..max_attempts {
			let seed = match preferred.next() {
				Some(seed) => seed,
				None => self.table.random_key(rng).ok_or(PoemError::EmptyCorpusSelection)?,
			};
			if let Some(line) = self.search_syllables(seed, target_syllables, rng) {
				return Ok(line);
			}
			debug!("No {target_syllables}-syllable line starts with '{seed}'");
		}

		Err(PoemError::GenerationTimeout { attempts: max_attempts })
	}
}
