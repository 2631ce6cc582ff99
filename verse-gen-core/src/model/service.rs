use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::cache::ModelCache;
use super::corpus_model::CorpusModel;
use super::generation_config::GenerationConfig;
use super::style::{PoemStyle, StyleRegistry};
use super::template::PoemTemplate;
use crate::config::ServiceConfig;
use crate::error::PoemError;
use crate::io::{self as corpus_io, CORPUS_EXTENSIONS};
use crate::phonetics::{PhoneticAnalyzer, PronouncingDictionary};

/// Entry point of the poem generator.
///
/// # Responsibilities
/// - Hold one immutable `CorpusModel` per named source
/// - Hold the registry of poem styles
/// - Build, and cache, models for texts submitted by users
/// - Turn every failure into a short message for the `generate*` calls
///
/// Shared read-only between request threads: the only interior mutability is
/// the custom-text cache and, when a seed is configured, the random source.
pub struct PoemService {
	analyzer: PhoneticAnalyzer,
	sources: BTreeMap<String, Arc<CorpusModel>>,
	styles: StyleRegistry,
	custom_models: ModelCache,
	generation: GenerationConfig,
	seeded_rng: Option<Mutex<StdRng>>,
}

impl PoemService {
	/// A service without sources, using the built-in styles.
	pub fn new(analyzer: PhoneticAnalyzer, config: &ServiceConfig) -> Self {
		Self {
			analyzer,
			sources: BTreeMap::new(),
			styles: StyleRegistry::builtin(),
			custom_models: ModelCache::new(config.custom_cache_capacity),
			generation: config.generation,
			seeded_rng: config.seed.map(|seed| Mutex::new(StdRng::seed_from_u64(seed))),
		}
	}

	/// A service without sources, using the configured pronunciation table.
	///
	/// # Errors
	/// `Io` if the dictionary file cannot be read.
	pub fn with_dictionary(config: &ServiceConfig) -> Result<Self, PoemError> {
		let analyzer = match &config.dictionary {
			Some(path) => PhoneticAnalyzer::new(Arc::new(PronouncingDictionary::load(path)?)),
			None => {
				warn!("No pronunciation dictionary configured, using spelling heuristics only");
				PhoneticAnalyzer::heuristic()
			}
		};
		Ok(Self::new(analyzer, config))
	}

	/// Loads the pronunciation table and every corpus of the data folder.
	///
	/// # Errors
	/// - `Io` if the dictionary or a corpus cannot be read, or the data
	///   folder is not a directory
	/// - `DuplicateSource` if two corpora of the data folder share a file stem
	/// - `Json` for malformed corpora, `Cache` if a model cache cannot be written
	pub fn from_config(config: &ServiceConfig) -> Result<Self, PoemError> {
		let mut service = Self::with_dictionary(config)?;
		service.load_folder(&config.data_folder, config.cache_models)?;
		Ok(service)
	}

	/// Adds every `.txt` / `.json` corpus of `folder` as a source named after
	/// the file stem. Returns the number of sources loaded.
	///
	/// # Notes
	/// - Both `"folder"` and `"folder/"` are accepted.
	/// - Subdirectories and hidden files are ignored.
	/// - Names are checked before anything is built: `foo.txt` and `foo.json`
	///   would share both the source name and the `foo.bin` cache, so they
	///   are reported as `DuplicateSource`.
	pub fn load_folder<P: AsRef<Path>>(&mut self, folder: P, use_cache: bool) -> Result<usize, PoemError> {
		let folder = corpus_io::normalize_folder(folder);
		if !folder.is_dir() {
			return Err(io::Error::new(
				io::ErrorKind::NotFound,
				format!("Expected a directory, got: {}", folder.display()),
			)
			.into());
		}

		let files = corpus_io::list_files(&folder, &CORPUS_EXTENSIONS)?;
		let mut corpora: BTreeMap<String, PathBuf> = BTreeMap::new();
		for file in &files {
			let path = folder.join(file);
			let name = corpus_io::get_filename(&path)?;
			if let Some(first) = corpora.get(&name) {
				return Err(PoemError::DuplicateSource {
					name,
					files: vec![first.display().to_string(), path.display().to_string()],
				});
			}
			corpora.insert(name, path);
		}

		for (name, path) in &corpora {
			let model = CorpusModel::load_or_build(path, &self.analyzer, use_cache)?;
			info!("Loaded source '{name}' ({} words)", model.vocabulary_size());
			self.add_model(name, model);
		}
		Ok(corpora.len())
	}

	/// Builds a model from text chunks and registers it under `name`.
	pub fn add_source<S: AsRef<str> + Sync>(&mut self, name: &str, chunks: &[S]) {
		let model = CorpusModel::build(chunks, &self.analyzer);
		self.add_model(name, model);
	}

	/// Registers an already built model, replacing any source of the same name.
	pub fn add_model(&mut self, name: &str, model: CorpusModel) {
		self.sources.insert(name.to_owned(), Arc::new(model));
	}

	pub fn register_style(&mut self, style: Arc<dyn PoemStyle>) {
		self.styles.register(style);
	}

	pub fn source_names(&self) -> Vec<String> {
		self.sources.keys().cloned().collect()
	}

	pub fn style_names(&self) -> Vec<String> {
		self.styles.names()
	}

	pub fn source(&self, name: &str) -> Option<&Arc<CorpusModel>> {
		self.sources.get(name)
	}

	pub fn analyzer(&self) -> &PhoneticAnalyzer {
		&self.analyzer
	}

	pub fn generation_config(&self) -> &GenerationConfig {
		&self.generation
	}

	fn lookup_source(&self, name: &str) -> Result<&CorpusModel, PoemError> {
		self.sources.get(name).map(Arc::as_ref).ok_or_else(|| PoemError::UnknownSource {
			name: name.to_owned(),
			valid: self.source_names(),
		})
	}

	fn lookup_style(&self, name: &str) -> Result<&Arc<dyn PoemStyle>, PoemError> {
		self.styles.get(name).ok_or_else(|| PoemError::UnknownStyle {
			name: name.to_owned(),
			valid: self.style_names(),
		})
	}

	/// Model for submitted text, built on first use and then cached.
	fn custom_model(&self, text: &str) -> Result<Arc<CorpusModel>, PoemError> {
		if text.trim().is_empty() {
			return Err(PoemError::EmptyCorpusSelection);
		}
		Ok(self.custom_models.get_or_insert_with(text, || {
			CorpusModel::build(&corpus_io::text_chunks(text), &self.analyzer)
		}))
	}

	/// Runs `f` with the service's random source.
	///
	/// A seeded service serialises generations on its single generator so
	/// results do not depend on thread scheduling.
	fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
		match &self.seeded_rng {
			Some(rng) => {
				let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
				f(&mut *rng)
			}
			None => f(&mut rand::rng()),
		}
	}

	/// Generates a poem from a named source in a named style.
	///
	/// # Errors
	/// `UnknownSource` / `UnknownStyle` for bad keys, plus every generation error.
	pub fn try_generate(&self, source: &str, style: &str) -> Result<String, PoemError> {
		self.with_rng(|rng| self.try_generate_with_rng(source, style, rng))
	}

	/// [`PoemService::try_generate`] with an explicit random source.
	pub fn try_generate_with_rng(&self, source: &str, style: &str, rng: &mut dyn RngCore) -> Result<String, PoemError> {
		let model = self.lookup_source(source)?;
		let style = self.lookup_style(style)?;
		let lines = style.compose(model, &self.generation, rng)?;
		Ok(lines.join("\n"))
	}

	/// Like [`PoemService::try_generate`], but any error becomes its user message.
	pub fn generate(&self, source: &str, style: &str) -> String {
		self.try_generate(source, style).unwrap_or_else(|e| e.user_message())
	}

	/// Generates a poem from user-submitted text.
	///
	/// The text is split into chunks on blank lines. Its model is cached by
	/// the exact text, so resubmitting the same text skips the build.
	///
	/// # Errors
	/// - `UnknownStyle` for a bad style key
	/// - `EmptyCorpusSelection` for empty text or text without usable rhymes
	pub fn try_generate_custom(&self, text: &str, style: &str) -> Result<String, PoemError> {
		self.with_rng(|rng| self.try_generate_custom_with_rng(text, style, rng))
	}

	/// [`PoemService::try_generate_custom`] with an explicit random source.
	pub fn try_generate_custom_with_rng(&self, text: &str, style: &str, rng: &mut dyn RngCore) -> Result<String, PoemError> {
		let style = self.lookup_style(style)?;
		let model = self.custom_model(text)?;
		let lines = style.compose(&model, &self.generation, rng)?;
		Ok(lines.join("\n"))
	}

	/// Like [`PoemService::try_generate_custom`], but any error becomes its user message.
	pub fn generate_custom(&self, text: &str, style: &str) -> String {
		self.try_generate_custom(text, style).unwrap_or_else(|e| e.user_message())
	}

	/// Generates a poem from a named source with a caller-supplied template.
	pub fn try_generate_with_template(&self, source: &str, template: &PoemTemplate) -> Result<String, PoemError> {
		let model = self.lookup_source(source)?;
		let lines = self.with_rng(|rng| template.generate(model, &self.generation, rng))?;
		Ok(lines.join("\n"))
	}

	pub fn generate_with_template(&self, source: &str, template: &PoemTemplate) -> String {
		self.try_generate_with_template(source, template).unwrap_or_else(|e| e.user_message())
	}

	/// Generates a poem from submitted text with a caller-supplied template.
	pub fn try_generate_custom_with_template(&self, text: &str, template: &PoemTemplate) -> Result<String, PoemError> {
		let model = self.custom_model(text)?;
		let lines = self.with_rng(|rng| template.generate(&model, &self.generation, rng))?;
		Ok(lines.join("\n"))
	}

	pub fn generate_custom_with_template(&self, text: &str, template: &PoemTemplate) -> String {
		self.try_generate_custom_with_template(text, template).unwrap_or_else(|e| e.user_message())
	}
}
