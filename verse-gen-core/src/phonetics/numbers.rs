// Spelling digit strings as English words so they can be syllabified.

const ONES: [&str; 20] = [
	"zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
	"eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
	"nineteen",
];

const TENS: [&str; 10] = [
	"", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 4] = [
	(1_000_000_000_000, "trillion"),
	(1_000_000_000, "billion"),
	(1_000_000, "million"),
	(1_000, "thousand"),
];

/// Longest digit string spelled as a number; longer ones are read digit by digit.
const MAX_NUMBER_DIGITS: usize = 15;

/// Spells an all-digit token as space-separated English words.
///
/// `"1999"` → `"one thousand nine hundred ninety nine"`. Leading zeros and
/// very long digit runs are read one digit at a time, the way they are spoken
/// ("007" → "zero zero seven").
pub fn spell_digits(digits: &str) -> String {
	let spoken_as_number = !digits.is_empty()
		&& digits.len() <= MAX_NUMBER_DIGITS
		&& (digits.len() == 1 || !digits.starts_with('0'));

	match digits.parse::<u64>() {
		Ok(value) if spoken_as_number => spell_number(value),
		_ => digits
			.chars()
			.filter_map(|c| c.to_digit(10))
			.map(|d| ONES[d as usize])
			.collect::<Vec<_>>()
			.join(" "),
	}
}

fn spell_number(value: u64) -> String {
	if value == 0 {
		return ONES[0].to_owned();
	}

	let mut words = Vec::new();
	let mut rest = value;
	for (scale, name) in SCALES {
		if rest >= scale {
			spell_below_thousand(rest / scale, &mut words);
			words.push(name);
			rest %= scale;
		}
	}
	spell_below_thousand(rest, &mut words);
	words.join(" ")
}

fn spell_below_thousand(value: u64, words: &mut Vec<&'static str>) {
	let hundreds = value / 100;
	let rest = (value % 100) as usize;
	if hundreds > 0 {
		words.push(ONES[hundreds as usize]);
		words.push("hundred");
	}
	match rest {
		0 => {}
		1..=19 => words.push(ONES[rest]),
		_ => {
			words.push(TENS[rest / 10]);
			if rest % 10 != 0 {
				words.push(ONES[rest % 10]);
			}
		}
	}
}
