use std::collections::BTreeMap;

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use super::corpus_model::CorpusModel;
use super::generation_config::GenerationConfig;
use super::line_generator::LineGenerator;
use crate::error::PoemError;
use crate::phonetics::{Stress, StressPattern};

/// Builds a pattern from a literal known to contain only `0`, `1` and `x`.
fn literal(meter: &str) -> StressPattern {
	meter.chars().filter_map(Stress::from_char).collect::<Vec<_>>().into()
}

fn literal_meters(meters: &[(char, &str)]) -> BTreeMap<char, StressPattern> {
	meters.iter().map(|(label, meter)| (*label, literal(meter))).collect()
}

/// A rhyme scheme plus the meter of every rhyme label.
///
/// The scheme is read character by character: a label character adds one
/// generated line to the current output line, a space ends the current output
/// line. Two spaces in a row therefore leave an empty line, which separates
/// stanzas.
///
/// ## Invariants
/// - every label in the scheme has a meter
/// - the scheme contains at least one label
#[derive(Clone, Debug, PartialEq)]
pub struct PoemTemplate {
	scheme: String,
	meters: BTreeMap<char, StressPattern>,
}

impl PoemTemplate {
	/// Validates and builds a template.
	///
	/// # Errors
	/// - `UndefinedRhymeLabel` if the scheme uses a label without a meter
	/// - `EmptyScheme` if the scheme has no labels at all
	pub fn new(scheme: &str, meters: BTreeMap<char, StressPattern>) -> Result<Self, PoemError> {
		if let Some(label) = scheme.chars().find(|c| *c != ' ' && !meters.contains_key(c)) {
			return Err(PoemError::UndefinedRhymeLabel(label));
		}
		if scheme.chars().all(|c| c == ' ') {
			return Err(PoemError::EmptyScheme);
		}
		Ok(Self {
			scheme: scheme.to_owned(),
			meters,
		})
	}

	/// Builds a template from textual meters such as `("A", "0101")`.
	///
	/// # Errors
	/// `InvalidMeter` for an empty meter or one containing anything but `0`, `1`, `x`,
	/// plus every error of [`PoemTemplate::new`].
	pub fn parse<'a, I>(scheme: &str, meters: I) -> Result<Self, PoemError>
	where
		I: IntoIterator<Item = (char, &'a str)>,
	{
		let mut parsed = BTreeMap::new();
		for (label, meter) in meters {
			let invalid = || PoemError::InvalidMeter { label, meter: meter.to_owned() };
			let pattern: StressPattern = meter.parse().map_err(|_| invalid())?;
			if pattern.is_empty() {
				return Err(invalid());
			}
			parsed.insert(label, pattern);
		}
		Self::new(scheme, parsed)
	}

	/// Fourteen lines of iambic pentameter in three quatrains and a couplet.
	pub fn sonnet() -> Self {
		let pentameter = "0101010101";
		Self {
			scheme: "A B A B  C D C D  E F E F  G G".to_owned(),
			meters: literal_meters(&[
				('A', pentameter),
				('B', pentameter),
				('C', pentameter),
				('D', pentameter),
				('E', pentameter),
				('F', pentameter),
				('G', pentameter),
			]),
		}
	}

	/// Five anapestic lines, the third and fourth shorter.
	pub fn limerick() -> Self {
		Self {
			scheme: "A A B B A".to_owned(),
			meters: literal_meters(&[('A', "01001001"), ('B', "01001")]),
		}
	}

	/// Trochaic octameter stanza with internal rhymes, after Poe.
	pub fn raven_verse() -> Self {
		let long = "10101010";
		let short = "1010101";
		Self {
			scheme: "AA BC DD DC EC C".to_owned(),
			meters: literal_meters(&[('A', long), ('B', long), ('C', short), ('D', long), ('E', long)]),
		}
	}

	/// Hymn quatrain alternating iambic tetrameter and trimeter.
	pub fn common_meter() -> Self {
		Self {
			scheme: "A B A B".to_owned(),
			meters: literal_meters(&[('A', "01010101"), ('B', "010101")]),
		}
	}

	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	pub fn meter(&self, label: char) -> Option<&StressPattern> {
		self.meters.get(&label)
	}

	/// How many lines each label needs: its number of occurrences in the scheme.
	pub fn line_counts(&self) -> BTreeMap<char, usize> {
		let mut counts = BTreeMap::new();
		for label in self.scheme.chars().filter(|c| *c != ' ') {
			*counts.entry(label).or_insert(0) += 1;
		}
		counts
	}

	/// Generates a poem, one `String` per output line.
	///
	/// For each label, a random rhyme group is drawn and its words are tried
	/// as line endings (in random order) until enough lines are found. A group
	/// that runs out of words is discarded and another one drawn.
	///
	/// # Errors
	/// - `EmptyCorpusSelection` if the corpus has no rhyme group
	/// - `GenerationTimeout` if a label needs more than `max_attempts` groups
	pub fn generate<R: Rng + ?Sized>(
		&self,
		model: &CorpusModel,
		config: &GenerationConfig,
		rng: &mut R,
	) -> Result<Vec<String>, PoemError> {
		if model.rhyme_seeds().is_empty() {
			return Err(PoemError::EmptyCorpusSelection);
		}

		let generator = LineGenerator::new(model.backward(), model, config);
		let mut lines_by_label = BTreeMap::new();
		for (label, count) in self.line_counts() {
			// Present by construction
			let Some(meter) = self.meters.get(&label) else {
				return Err(PoemError::UndefinedRhymeLabel(label));
			};
			let lines = Self::rhyming_lines(&generator, model, meter, count, config.max_attempts, rng)?;
			lines_by_label.insert(label, lines);
		}

		Ok(self.assemble(lines_by_label))
	}

	/// Finds `count` lines scanning as `meter` whose last words share one rhyme.
	fn rhyming_lines<'a, R: Rng + ?Sized>(
		generator: &LineGenerator<'a, CorpusModel>,
		model: &'a CorpusModel,
		meter: &StressPattern,
		count: usize,
		max_attempts: usize,
		rng: &mut R,
	) -> Result<Vec<String>, PoemError> {
		for _ in 0..max_attempts {
			let Some((rhyme, group)) = model.rhyme_seeds().random_group(rng) else {
				return Err(PoemError::EmptyCorpusSelection);
			};

			let mut seeds: Vec<&str> = group.iter().map(String::as_str).collect();
			seeds.shuffle(rng);

			let mut lines = Vec::with_capacity(count);
			for seed in seeds {
				if let Some(line) = generator.line_ending_with(seed, meter, rng) {
					lines.push(line.join(" "));
					if lines.len() == count {
						return Ok(lines);
					}
				}
			}
			debug!("Rhyme group [{rhyme}] gave {} of {count} lines for meter {meter}", lines.len());
		}

		warn!("No rhyme group produced {count} lines for meter {meter} after {max_attempts} attempts");
		Err(PoemError::GenerationTimeout { attempts: max_attempts })
	}

	/// Lays the generated lines out along the scheme.
	///
	/// Lines of a label are taken from the back of its list.
	fn assemble(&self, mut lines_by_label: BTreeMap<char, Vec<String>>) -> Vec<String> {
		let mut output = Vec::new();
		let mut current: Vec<String> = Vec::new();

		for label in self.scheme.chars() {
			if label == ' ' {
				output.push(current.join(" "));
				current.clear();
			} else if let Some(line) = lines_by_label.get_mut(&label).and_then(Vec::pop) {
				current.push(line);
			}
		}
		output.push(current.join(" "));

		output
	}
}
