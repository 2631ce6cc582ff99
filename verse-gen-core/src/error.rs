use std::io;

use thiserror::Error;

/// Message shown when a corpus cannot produce the requested poem.
pub const NO_POEM_FOUND: &str = "Sorry! I couldn't find a valid poem with that input. :(";

/// Every failure the poem generator can report.
///
/// Configuration mistakes (unknown keys, broken templates) are reported
/// immediately. Unsatisfiable constraints are recovered inside the line
/// generator by backtracking and only surface here once the configured
/// retry budget is spent.
#[derive(Debug, Error)]
pub enum PoemError {
	#[error("Source not found: {name}. Valid choices are {}", .valid.join(", "))]
	UnknownSource { name: String, valid: Vec<String> },

	#[error("Style not found: {name}. Valid choices are {}", .valid.join(", "))]
	UnknownStyle { name: String, valid: Vec<String> },

	#[error("Rhyme label '{0}' is used in the scheme but has no meter")]
	UndefinedRhymeLabel(char),

	#[error("Invalid meter '{meter}' for label '{label}': only 0, 1 and x are allowed")]
	InvalidMeter { label: char, meter: String },

	#[error("Sources {} share the name '{name}'", .files.join(" and "))]
	DuplicateSource { name: String, files: Vec<String> },

	#[error("Rhyme scheme contains no rhyme labels")]
	EmptyScheme,

	#[error("No word in the corpus shares a rhyme with another word")]
	EmptyCorpusSelection,

	#[error("Gave up after {attempts} attempts to satisfy the poem constraints")]
	GenerationTimeout { attempts: usize },

	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	#[error("Invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Model cache error: {0}")]
	Cache(#[from] postcard::Error),
}

impl PoemError {
	/// True for errors caused by the caller's choice of keys or template.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			PoemError::UnknownSource { .. }
				| PoemError::UnknownStyle { .. }
				| PoemError::UndefinedRhymeLabel(_)
				| PoemError::InvalidMeter { .. }
				| PoemError::EmptyScheme
		)
	}

	/// Short, human-readable text suitable for showing in place of a poem.
	pub fn user_message(&self) -> String {
		match self {
			PoemError::EmptyCorpusSelection | PoemError::GenerationTimeout { .. } => NO_POEM_FOUND.to_owned(),
			other => other.to_string(),
		}
	}
}
