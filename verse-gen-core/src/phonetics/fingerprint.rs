use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stress carried by one syllable.
///
/// Written as `0`, `1` or `x` in patterns.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stress {
	/// Must be unstressed (`0`).
	Unstressed,
	/// Must be stressed (`1`).
	Stressed,
	/// Either reading is acceptable (`x`).
	Either,
}

impl Stress {
	/// Returns `true` if the two symbols can occupy the same syllable slot.
	pub fn compatible(self, other: Stress) -> bool {
		self == Stress::Either || other == Stress::Either || self == other
	}

	pub fn as_char(self) -> char {
		match self {
			Stress::Unstressed => '0',
			Stress::Stressed => '1',
			Stress::Either => 'x',
		}
	}

	pub fn from_char(c: char) -> Option<Stress> {
		match c {
			'0' => Some(Stress::Unstressed),
			'1' => Some(Stress::Stressed),
			'x' | 'X' => Some(Stress::Either),
			_ => None,
		}
	}
}

/// An ordered sequence of stress symbols.
///
/// Used both as the stress fingerprint of a word (one symbol per syllable)
/// and as a meter a line must match.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StressPattern(Vec<Stress>);

impl StressPattern {
	pub fn new(symbols: Vec<Stress>) -> Self {
		Self(symbols)
	}

	/// A pattern of `len` ambiguous symbols.
	pub fn ambiguous(len: usize) -> Self {
		Self(vec![Stress::Either; len])
	}

	/// Repeats `unit` `times` times, e.g. `"01"` five times for pentameter.
	pub fn repeat(unit: &str, times: usize) -> Option<Self> {
		unit.repeat(times).parse().ok()
	}

	pub fn symbols(&self) -> &[Stress] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn extend(&mut self, other: &StressPattern) {
		self.0.extend_from_slice(&other.0);
	}
}

impl FromStr for StressPattern {
	type Err = char;

	/// Parses a pattern such as `"01x"`, returning the first offending character on failure.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.chars()
			.map(|c| Stress::from_char(c).ok_or(c))
			.collect::<Result<Vec<_>, _>>()
			.map(Self)
	}
}

impl fmt::Display for StressPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for symbol in &self.0 {
			write!(f, "{}", symbol.as_char())?;
		}
		Ok(())
	}
}

impl From<Vec<Stress>> for StressPattern {
	fn from(symbols: Vec<Stress>) -> Self {
		Self(symbols)
	}
}

/// Phones from a word's last stressed syllable (inclusive) to its end.
///
/// Two words rhyme when their fingerprints are equal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RhymeFingerprint(Vec<String>);

impl RhymeFingerprint {
	pub fn new(phones: Vec<String>) -> Self {
		Self(phones)
	}

	pub fn phones(&self) -> &[String] {
		&self.0
	}
}

impl fmt::Display for RhymeFingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.join(" "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_and_display_round_trip_symbols() {
		let pattern: StressPattern = "01x".parse().unwrap();
		assert_eq!(pattern.symbols(), &[Stress::Unstressed, Stress::Stressed, Stress::Either]);
		assert_eq!(pattern.to_string(), "01x");
	}

	#[test]
	fn parse_rejects_foreign_characters() {
		assert_eq!("0a1".parse::<StressPattern>(), Err('a'));
	}

	#[test]
	fn either_is_compatible_with_everything() {
		assert!(Stress::Either.compatible(Stress::Stressed));
		assert!(Stress::Unstressed.compatible(Stress::Either));
		assert!(!Stress::Unstressed.compatible(Stress::Stressed));
	}

	#[test]
	fn repeat_builds_pentameter() {
		let pentameter = StressPattern::repeat("01", 5).unwrap();
		assert_eq!(pentameter.to_string(), "0101010101");
	}
}
