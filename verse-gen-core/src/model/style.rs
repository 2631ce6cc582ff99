use std::collections::BTreeMap;
use std::sync::Arc;

use rand::RngCore;

use super::corpus_model::CorpusModel;
use super::generation_config::GenerationConfig;
use super::line_generator::LineGenerator;
use super::template::PoemTemplate;
use crate::error::PoemError;

/// One way of turning a corpus model into a poem.
///
/// Implementations are stateless and shared between request threads.
pub trait PoemStyle: Send + Sync {
	/// Registry key, e.g. `"sonnet"`.
	fn name(&self) -> &str;

	/// Generates the poem as output lines (blank lines separate stanzas).
	fn compose(
		&self,
		model: &CorpusModel,
		config: &GenerationConfig,
		rng: &mut dyn RngCore,
	) -> Result<Vec<String>, PoemError>;
}

/// A style driven by a rhyme scheme template.
pub struct TemplateStyle {
	name: String,
	template: PoemTemplate,
}

impl TemplateStyle {
	pub fn new(name: &str, template: PoemTemplate) -> Self {
		Self {
			name: name.to_owned(),
			template,
		}
	}

	pub fn template(&self) -> &PoemTemplate {
		&self.template
	}
}

impl PoemStyle for TemplateStyle {
	fn name(&self) -> &str {
		&self.name
	}

	fn compose(
		&self,
		model: &CorpusModel,
		config: &GenerationConfig,
		rng: &mut dyn RngCore,
	) -> Result<Vec<String>, PoemError> {
		self.template.generate(model, config, rng)
	}
}

/// Three lines of 5, 7 and 5 syllables, without meter or rhyme.
///
/// Lines grow forward through the corpus. Each line tries to start with a
/// word that followed the previous line's last word.
pub struct HaikuStyle;

impl HaikuStyle {
	pub const SYLLABLES: [usize; 3] = [5, 7, 5];
}

impl PoemStyle for HaikuStyle {
	fn name(&self) -> &str {
		"haiku"
	}

	fn compose(
		&self,
		model: &CorpusModel,
		config: &GenerationConfig,
		rng: &mut dyn RngCore,
	) -> Result<Vec<String>, PoemError> {
		let generator = LineGenerator::new(model.forward(), model, config);
		let mut lines = Vec::with_capacity(Self::SYLLABLES.len());
		let mut previous: Option<&str> = None;

		for syllables in Self::SYLLABLES {
			let line = generator.generate_syllable_line(syllables, previous, rng)?;
			previous = line.last().copied();
			lines.push(line.join(" "));
		}

		Ok(lines)
	}
}

/// Style name → style.
///
/// Names are kept sorted so listings and random picks are stable.
#[derive(Clone, Default)]
pub struct StyleRegistry {
	styles: BTreeMap<String, Arc<dyn PoemStyle>>,
}

impl StyleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding `sonnet`, `limerick`, `raven verse`, `haiku` and `common meter`.
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		registry.register(Arc::new(TemplateStyle::new("sonnet", PoemTemplate::sonnet())));
		registry.register(Arc::new(TemplateStyle::new("limerick", PoemTemplate::limerick())));
		registry.register(Arc::new(TemplateStyle::new("raven verse", PoemTemplate::raven_verse())));
		registry.register(Arc::new(HaikuStyle));
		registry.register(Arc::new(TemplateStyle::new("common meter", PoemTemplate::common_meter())));
		registry
	}

	/// Adds a style, replacing any style of the same name.
	pub fn register(&mut self, style: Arc<dyn PoemStyle>) {
		self.styles.insert(style.name().to_owned(), style);
	}

	pub fn get(&self, name: &str) -> Option<&Arc<dyn PoemStyle>> {
		self.styles.get(name)
	}

	pub fn names(&self) -> Vec<String> {
		self.styles.keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.styles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.styles.is_empty()
	}
}
