use serde::{Deserialize, Deserializer, Serialize};

/// Limits applied while generating one poem.
///
/// A corpus may simply be unable to satisfy a meter. Instead of retrying
/// forever, generation gives up with `PoemError::GenerationTimeout` once
/// these budgets are spent.
///
/// # Fields
/// - `max_attempts`: rhyme groups tried per rhyme label, or seed words tried
///   per haiku line.
/// - `max_search_steps`: words visited by one backtracking search before it
///   abandons its seed.
///
/// Both budgets are at least one, also when read from a configuration file.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
	#[serde(deserialize_with = "at_least_one")]
	pub max_attempts: usize,
	#[serde(deserialize_with = "at_least_one")]
	pub max_search_steps: usize,
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
	usize::deserialize(deserializer).map(|budget| budget.max(1))
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			max_attempts: 500,
			max_search_steps: 50_000,
		}
	}
}

impl GenerationConfig {
	/// Sets the attempt budget (at least one attempt is always made).
	pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
		self.max_attempts = max_attempts.max(1);
		self
	}

	/// Sets the per-search step budget (at least one step is always allowed).
	pub fn with_max_search_steps(mut self, max_search_steps: usize) -> Self {
		self.max_search_steps = max_search_steps.max(1);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let config: GenerationConfig = serde_json::from_str(r#"{"max_attempts": 3}"#).unwrap();
		assert_eq!(config.max_attempts, 3);
		assert_eq!(config.max_search_steps, GenerationConfig::default().max_search_steps);
	}

	#[test]
	fn budgets_never_drop_to_zero() {
		let config = GenerationConfig::default().with_max_attempts(0).with_max_search_steps(0);
		assert_eq!(config.max_attempts, 1);
		assert_eq!(config.max_search_steps, 1);
	}

	#[test]
	fn zero_budgets_in_a_file_are_raised_to_one() {
		let config: GenerationConfig =
			serde_json::from_str(r#"{"max_attempts": 0, "max_search_steps": 0}"#).unwrap();
		assert_eq!(config, GenerationConfig::default().with_max_attempts(0).with_max_search_steps(0));
	}
}
