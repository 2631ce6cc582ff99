use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use super::corpus_model::CorpusModel;

#[derive(Default)]
struct LruState {
	models: HashMap<String, Arc<CorpusModel>>,
	/// Keys from least to most recently used.
	recency: VecDeque<String>,
}

impl LruState {
	fn touch(&mut self, key: &str) {
		if let Some(position) = self.recency.iter().position(|k| k == key) {
			if let Some(k) = self.recency.remove(position) {
				self.recency.push_back(k);
			}
		}
	}
}

/// Bounded least-recently-used cache of models built from submitted text.
///
/// Keyed by the literal text and shared between request threads. A poisoned
/// lock is recovered.
pub struct ModelCache {
	capacity: usize,
	state: Mutex<LruState>,
}

impl ModelCache {
	/// A cache holding at most `capacity` models (at least one).
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity: capacity.max(1),
			state: Mutex::new(LruState::default()),
		}
	}

	fn lock(&self) -> MutexGuard<'_, LruState> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// The cached model for `text`, marking it as most recently used.
	pub fn get(&self, text: &str) -> Option<Arc<CorpusModel>> {
		let mut state = self.lock();
		let model = state.models.get(text).cloned()?;
		state.touch(text);
		Some(model)
	}

	/// Stores a model, evicting the least recently used one when full.
	pub fn insert(&self, text: &str, model: Arc<CorpusModel>) {
		let mut state = self.lock();
		if state.models.insert(text.to_owned(), model).is_some() {
			state.touch(text);
			return;
		}
		state.recency.push_back(text.to_owned());
		while state.recency.len() > self.capacity {
			if let Some(evicted) = state.recency.pop_front() {
				debug!("Evicting custom model ({} bytes of text)", evicted.len());
				state.models.remove(&evicted);
			}
		}
	}

	/// Returns the cached model for `text` or builds, caches and returns it.
	///
	/// The lock is not held while building, so two threads submitting the
	/// same new text may both build it; the last one stored wins.
	pub fn get_or_insert_with<F>(&self, text: &str, build: F) -> Arc<CorpusModel>
	where
		F: FnOnce() -> CorpusModel,
	{
		if let Some(model) = self.get(text) {
			return model;
		}
		let model = Arc::new(build());
		self.insert(text, Arc::clone(&model));
		model
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.lock().models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::phonetics::PhoneticAnalyzer;

	fn model(text: &str) -> Arc<CorpusModel> {
		Arc::new(CorpusModel::build(&[text], &PhoneticAnalyzer::heuristic()))
	}

	#[test]
	fn least_recently_used_entry_is_evicted() {
		let cache = ModelCache::new(2);
		cache.insert("one", model("one"));
		cache.insert("two", model("two"));
		assert!(cache.get("one").is_some());

		cache.insert("three", model("three"));
		assert_eq!(cache.len(), 2);
		assert!(cache.get("two").is_none());
		assert!(cache.get("one").is_some());
		assert!(cache.get("three").is_some());
	}

	#[test]
	fn builder_runs_once_per_text() {
		let cache = ModelCache::new(4);
		let mut builds = 0;
		for _ in 0..3 {
			cache.get_or_insert_with("the cat", || {
				builds += 1;
				CorpusModel::build(&["the cat"], &PhoneticAnalyzer::heuristic())
			});
		}
		assert_eq!(builds, 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn capacity_is_at_least_one() {
		let cache = ModelCache::new(0);
		assert_eq!(cache.capacity(), 1);
		cache.insert("a", model("a"));
		cache.insert("b", model("b"));
		assert_eq!(cache.len(), 1);
		assert!(cache.get("b").is_some());
	}
}
