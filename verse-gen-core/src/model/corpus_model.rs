use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};

use super::transition_table::TransitionTable;
use crate::error::PoemError;
use crate::io::{build_output_path, read_chunks};
use crate::phonetics::{PhoneticAnalyzer, Prosody, RhymeFingerprint, StressPattern, WordProfile};

/// Characters stripped from both ends of every token.
pub const STRIP_CHARS: &[char] = &['.', ',', '(', ')', '-', '?', '!', '"', ':', '*', ';'];

/// Below this many chunks the model is built on the calling thread.
const PARALLEL_THRESHOLD: usize = 256;

/// Normalizes a raw token: punctuation stripped from both ends, lowercased.
///
/// Inner apostrophes, hyphens, underscores and periods are kept for the
/// phonetic heuristics. Returns `None` if nothing is left.
pub fn normalize_word(token: &str) -> Option<String> {
	let word = token.trim_matches(STRIP_CHARS);
	if word.is_empty() {
		None
	} else {
		Some(word.to_lowercase())
	}
}

/// Splits one chunk into normalized words.
pub fn tokenize(chunk: &str) -> Vec<String> {
	chunk.split_whitespace().filter_map(normalize_word).collect()
}

/// Rhyme fingerprint → the distinct corpus words sharing it.
///
/// Only fingerprints shared by at least two words are kept: a rhyme needs a partner.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RhymeSeedIndex {
	groups: BTreeMap<RhymeFingerprint, Vec<String>>,
}

impl RhymeSeedIndex {
	/// Groups `(word, fingerprint)` pairs, dropping singleton groups.
	///
	/// Words inside a group keep the order they are given in.
	pub fn build<'a, I>(words: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a RhymeFingerprint)>,
	{
		let mut groups: BTreeMap<RhymeFingerprint, Vec<String>> = BTreeMap::new();
		for (word, rhyme) in words {
			groups.entry(rhyme.clone()).or_default().push(word.to_owned());
		}
		groups.retain(|_, members| members.len() >= 2);
		Self { groups }
	}

	/// Words rhyming under `rhyme`, if that rhyme is usable.
	pub fn group(&self, rhyme: &RhymeFingerprint) -> Option<&[String]> {
		self.groups.get(rhyme).map(Vec::as_slice)
	}

	/// Picks one rhyme group uniformly at random.
	pub fn random_group<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&RhymeFingerprint, &[String])> {
		self.groups.iter().choose(rng).map(|(rhyme, words)| (rhyme, words.as_slice()))
	}

	/// Number of usable rhyme sounds.
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}
}

/// Transitions and word set of a run of chunks, before fingerprinting.
#[derive(Default)]
struct CorpusTables {
	forward: TransitionTable,
	backward: TransitionTable,
	words: BTreeSet<String>,
}

impl CorpusTables {
	fn add_chunk(&mut self, chunk: &str) {
		let mut words = tokenize(chunk);
		self.forward.add_chunk(&words);

		// Built backwards too, so a line can start from its rhyme word
		words.reverse();
		self.backward.add_chunk(&words);

		self.words.extend(words);
	}

	fn merge(&mut self, other: Self) {
		self.forward.merge(&other.forward);
		self.backward.merge(&other.backward);
		self.words.extend(other.words);
	}
}

/// A text source prepared for poem generation.
///
/// Holds, for one corpus:
/// - `forward`: word → words that followed it
/// - `backward`: word → words that preceded it
/// - `rhyme_seeds`: rhyme sounds shared by at least two words
/// - `profiles`: syllables and fingerprints of every distinct word
///
/// Chunks (songs, sonnets, documents) are independent: no transition links
/// the last word of one chunk to the first word of the next.
///
/// Built once and never mutated afterwards, so a model can be shared
/// read-only between threads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CorpusModel {
	forward: TransitionTable,
	backward: TransitionTable,
	rhyme_seeds: RhymeSeedIndex,
	profiles: BTreeMap<String, WordProfile>,
}

impl CorpusModel {
	/// Builds a model from ordered text chunks.
	///
	/// Deterministic: identical chunks always give an identical model.
	pub fn build<S: AsRef<str> + Sync>(chunks: &[S], analyzer: &PhoneticAnalyzer) -> Self {
		let tables = if chunks.len() < PARALLEL_THRESHOLD {
			let mut tables = CorpusTables::default();
			for chunk in chunks {
				tables.add_chunk(chunk.as_ref());
			}
			tables
		} else {
			Self::build_tables_parallel(chunks)
		};
		Self::from_tables(tables, analyzer)
	}

	/// Splits the chunks into slices, tokenizes the slices on worker threads
	/// and merges the partial tables back in chunk order.
	///
	/// # Notes
	/// - Uses `num_cpus * 8` slices.
	/// - Partial tables are tagged with their slice index, so the merge order
	///   does not depend on thread scheduling.
	fn build_tables_parallel<S: AsRef<str> + Sync>(chunks: &[S]) -> CorpusTables {
		let slices = num_cpus::get() * 8;
		let slice_size = chunks.len().div_ceil(slices).max(1);

		let mut partials: Vec<(usize, CorpusTables)> = thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			for (index, slice) in chunks.chunks(slice_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					let mut partial = CorpusTables::default();
					for chunk in slice {
						partial.add_chunk(chunk.as_ref());
					}
					// The receiver outlives every worker inside this scope
					let _ = tx.send((index, partial));
				});
			}
			drop(tx);
			rx.iter().collect()
		});

		partials.sort_by_key(|(index, _)| *index);
		let mut tables = CorpusTables::default();
		for (_, partial) in partials {
			tables.merge(partial);
		}
		tables
	}

	fn from_tables(tables: CorpusTables, analyzer: &PhoneticAnalyzer) -> Self {
		let profiles: BTreeMap<String, WordProfile> = tables
			.words
			.into_iter()
			.map(|word| {
				let profile = analyzer.profile(&word);
				(word, profile)
			})
			.collect();

		let rhyme_seeds = RhymeSeedIndex::build(
			profiles
				.iter()
				.filter_map(|(word, profile)| profile.rhyme.as_ref().map(|rhyme| (word.as_str(), rhyme))),
		);

		info!(
			"Built corpus model: {} words, {} rhyme groups",
			profiles.len(),
			rhyme_seeds.len()
		);

		Self {
			forward: tables.forward,
			backward: tables.backward,
			rhyme_seeds,
			profiles,
		}
	}

	/// Loads a model for a corpus file.
	///
	/// If `use_cache` is set and a `<stem>.bin` file sits next to the corpus,
	/// it is deserialized with `postcard` and used when its [`CacheStamp`]
	/// matches the current corpus text and pronunciation table. Otherwise the
	/// corpus is read and built, and the result written to `<stem>.bin` for
	/// the next start.
	///
	/// # Notes
	/// - An outdated or unreadable cache is rebuilt, never reported.
	pub fn load_or_build<P: AsRef<Path>>(
		filepath: P,
		analyzer: &PhoneticAnalyzer,
		use_cache: bool,
	) -> Result<Self, PoemError> {
		if !use_cache {
			return Ok(Self::build(&read_chunks(&filepath)?, analyzer));
		}

		let binary_data_path = build_output_path(&filepath, "bin")?;
		let stamp = CacheStamp::new(&filepath, analyzer)?;
		if binary_data_path.exists() {
			let bytes = fs::read(&binary_data_path)?;
			match postcard::from_bytes::<CachedModel>(&bytes) {
				Ok(cached) if cached.stamp == stamp => {
					debug!("Loading cached model {}", binary_data_path.display());
					return Ok(cached.model);
				}
				Ok(_) => info!("Cached model {} is out of date, rebuilding", binary_data_path.display()),
				Err(e) => warn!("Ignoring unreadable cached model {}: {e}", binary_data_path.display()),
			}
		}

		let cached = CachedModel {
			stamp,
			model: Self::build(&read_chunks(&filepath)?, analyzer),
		};
		fs::write(&binary_data_path, postcard::to_stdvec(&cached)?)?;
		Ok(cached.model)
	}

	pub fn forward(&self) -> &TransitionTable {
		&self.forward
	}

	pub fn backward(&self) -> &TransitionTable {
		&self.backward
	}

	pub fn rhyme_seeds(&self) -> &RhymeSeedIndex {
		&self.rhyme_seeds
	}

	pub fn profile(&self, word: &str) -> Option<&WordProfile> {
		self.profiles.get(word)
	}

	/// Number of distinct words in the corpus.
	pub fn vocabulary_size(&self) -> usize {
		self.profiles.len()
	}

	/// Rhyme fingerprint of a corpus word.
	pub fn rhyme_of(&self, word: &str) -> Option<&RhymeFingerprint> {
		self.profile(word)?.rhyme.as_ref()
	}
}

/// What a cached model was built from.
///
/// A cache is reused only if both hashes still match.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
struct CacheStamp {
	/// Hash of the corpus file bytes.
	source: u64,
	/// [`PronouncingDictionary::fingerprint`](crate::phonetics::PronouncingDictionary::fingerprint)
	dictionary: u64,
}

impl CacheStamp {
	fn new<P: AsRef<Path>>(filepath: P, analyzer: &PhoneticAnalyzer) -> Result<Self, PoemError> {
		let mut hasher = DefaultHasher::new();
		fs::read(filepath)?.hash(&mut hasher);
		Ok(Self {
			source: hasher.finish(),
			dictionary: analyzer.dictionary_fingerprint(),
		})
	}
}

/// Contents of a `<stem>.bin` file.
#[derive(Serialize, Deserialize)]
struct CachedModel {
	stamp: CacheStamp,
	model: CorpusModel,
}

/// Answers from the fingerprints computed at build time.
///
/// Words outside the corpus have no syllables, which the scansion checks
/// treat as "no viable continuation".
impl Prosody for CorpusModel {
	fn syllable_count(&self, word: &str) -> usize {
		self.profile(word).map_or(0, |profile| profile.syllables)
	}

	fn stress_fingerprint(&self, word: &str) -> StressPattern {
		self.profile(word).map(|profile| profile.stress.clone()).unwrap_or_default()
	}
}
