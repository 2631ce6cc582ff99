use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PoemError;
use crate::io::read_text;
use crate::model::GenerationConfig;

/// Startup configuration of a [`PoemService`](crate::model::PoemService).
///
/// Read from a JSON file; every field is optional.
///
/// # Fields
/// - `data_folder`: directory of `.txt` / `.json` corpora, one source per file
/// - `dictionary`: CMU-format pronunciation file; heuristics only when absent
/// - `cache_models`: persist built models as `<stem>.bin` next to their corpus
/// - `custom_cache_capacity`: models kept for submitted texts
/// - `seed`: makes every generation reproducible
/// - `generation`: retry and search budgets
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
	pub data_folder: PathBuf,
	pub dictionary: Option<PathBuf>,
	pub cache_models: bool,
	pub custom_cache_capacity: usize,
	pub seed: Option<u64>,
	pub generation: GenerationConfig,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			data_folder: PathBuf::from("./data"),
			dictionary: None,
			cache_models: true,
			custom_cache_capacity: 32,
			seed: None,
			generation: GenerationConfig::default(),
		}
	}
}

impl ServiceConfig {
	/// Loads a configuration file.
	///
	/// # Errors
	/// `Io` if the file cannot be read, `Json` if it is not a valid configuration.
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, PoemError> {
		let text = read_text(filepath)?;
		Ok(serde_json::from_str(&text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_file_keeps_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		std::fs::write(
			&path,
			r#"{ "data_folder": "corpora", "seed": 42, "generation": { "max_attempts": 10 } }"#,
		)
		.unwrap();

		let config = ServiceConfig::load(&path).unwrap();
		assert_eq!(config.data_folder, PathBuf::from("corpora"));
		assert_eq!(config.seed, Some(42));
		assert_eq!(config.generation.max_attempts, 10);
		assert_eq!(config.generation.max_search_steps, GenerationConfig::default().max_search_steps);
		assert_eq!(config.custom_cache_capacity, 32);
		assert!(config.cache_models);
		assert!(config.dictionary.is_none());
	}

	#[test]
	fn zero_generation_budgets_still_allow_one_attempt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		std::fs::write(&path, r#"{ "generation": { "max_attempts": 0, "max_search_steps": 0 } }"#).unwrap();

		let config = ServiceConfig::load(&path).unwrap();
		assert_eq!(config.generation.max_attempts, 1);
		assert_eq!(config.generation.max_search_steps, 1);
	}

	#[test]
	fn malformed_file_is_a_json_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		std::fs::write(&path, "{ not json").unwrap();
		assert!(matches!(ServiceConfig::load(&path), Err(PoemError::Json(_))));
	}

	#[test]
	fn missing_file_is_an_io_error() {
		assert!(matches!(ServiceConfig::load("/definitely/not/here.json"), Err(PoemError::Io(_))));
	}
}
