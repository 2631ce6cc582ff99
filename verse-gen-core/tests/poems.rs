use std::sync::Arc;

use verse_gen_core::model::{CorpusModel, PoemService};
use verse_gen_core::phonetics::Prosody;
use verse_gen_core::scansion;
use verse_gen_core::{
	GenerationConfig, NO_POEM_FOUND, PhoneticAnalyzer, PoemError, PoemTemplate, PronouncingDictionary, ServiceConfig,
	StressPattern,
};

const DICTIONARY: &str = "\
;;; tiny pronunciation table
THE  DH AH0
THE(2)  DH AH1
A  AH0
CAT  K AE1 T
HAT  HH AE1 T
MAT  M AE1 T
BAT  B AE1 T
RAT  R AE1 T
DOG  D AO1 G
LOG  L AO1 G
FOG  F AO1 G
FROG  F R AA1 G
OLD  OW1 L D
SILENT  S AY1 L AH0 N T
POND  P AA1 N D
";

const CATS: &str = "the cat the hat the mat the bat the rat the cat\n\nthe dog the log the fog the dog the log";

fn analyzer() -> PhoneticAnalyzer {
	PhoneticAnalyzer::new(Arc::new(PronouncingDictionary::parse(DICTIONARY)))
}

fn config(seed: u64) -> ServiceConfig {
	ServiceConfig {
		seed: Some(seed),
		..ServiceConfig::default()
	}
}

fn service(config: &ServiceConfig) -> PoemService {
	let mut service = PoemService::new(analyzer(), config);
	service.add_source("cats", &chunks(CATS));
	service
}

fn chunks(text: &str) -> Vec<&str> {
	text.split("\n\n").collect()
}

fn scans_as(analyzer: &PhoneticAnalyzer, line: &str, meter: &str) -> bool {
	let mut pattern = StressPattern::default();
	for word in line.split(' ') {
		pattern.extend(&analyzer.stress_fingerprint(word));
	}
	let meter: StressPattern = meter.parse().unwrap();
	scansion::patterns_compatible(pattern.symbols(), meter.symbols())
}

#[test]
fn sonnet_has_three_quatrains_and_a_couplet() {
	let service = service(&config(1));
	let poem = service.try_generate("cats", "sonnet").unwrap();
	let lines: Vec<&str> = poem.split('\n').collect();

	assert_eq!(lines.len(), 17);
	let analyzer = analyzer();
	for (index, line) in lines.iter().enumerate() {
		if [4, 9, 14].contains(&index) {
			assert!(line.is_empty(), "line {index} should separate stanzas");
		} else {
			assert!(scans_as(&analyzer, line, "0101010101"), "{line}");
		}
	}

	let last_word = |line: &str| line.rsplit(' ').next().map(|word| analyzer.rhyme_fingerprint(word));
	// A B A B: lines 0 and 2 rhyme, lines 1 and 3 rhyme
	assert_eq!(last_word(lines[0]), last_word(lines[2]));
	assert_eq!(last_word(lines[1]), last_word(lines[3]));
	assert_eq!(last_word(lines[15]), last_word(lines[16]));
}

#[test]
fn couplet_lines_scan_and_rhyme() {
	let mut service = PoemService::new(analyzer(), &config(5));
	service.add_source("tiny", &["the cat", "the hat"]);
	let template = PoemTemplate::parse("A A", [('A', "01")]).unwrap();

	let poem = service.try_generate_with_template("tiny", &template).unwrap();
	let lines: Vec<&str> = poem.lines().collect();
	assert_eq!(lines.len(), 2);

	let analyzer = analyzer();
	for line in &lines {
		assert!(scans_as(&analyzer, line, "01"), "{line}");
	}
	let first = analyzer.rhyme_fingerprint(lines[0].rsplit(' ').next().unwrap());
	let second = analyzer.rhyme_fingerprint(lines[1].rsplit(' ').next().unwrap());
	assert!(first.is_some());
	assert_eq!(first, second);
}

#[test]
fn unsatisfiable_meter_times_out_with_a_friendly_message() {
	// Unstressed words never follow each other here, so "01001" cannot scan
	let config = ServiceConfig {
		generation: GenerationConfig::default().with_max_attempts(5),
		..config(2)
	};
	let service = service(&config);

	assert!(matches!(
		service.try_generate("cats", "limerick"),
		Err(PoemError::GenerationTimeout { attempts: 5 })
	));
	assert_eq!(service.generate("cats", "limerick"), NO_POEM_FOUND);
}

#[test]
fn common_meter_alternates_four_and_three_feet() {
	let service = service(&config(4));
	let poem = service.try_generate("cats", "common meter").unwrap();
	let lines: Vec<&str> = poem.lines().collect();
	assert_eq!(lines.len(), 4);

	let analyzer = analyzer();
	assert!(scans_as(&analyzer, lines[0], "01010101"));
	assert!(scans_as(&analyzer, lines[1], "010101"));
	assert!(scans_as(&analyzer, lines[2], "01010101"));
	assert!(scans_as(&analyzer, lines[3], "010101"));
}

#[test]
fn haiku_from_submitted_text() {
	let service = service(&config(6));
	let text = "the old silent pond the frog the fog\n\nthe old frog the silent dog the pond";
	let poem = service.try_generate_custom(text, "haiku").unwrap();
	let lines: Vec<&str> = poem.lines().collect();
	assert_eq!(lines.len(), 3);

	let analyzer = analyzer();
	for (line, expected) in lines.iter().zip([5, 7, 5]) {
		let syllables: usize = line.split(' ').map(|word| analyzer.syllable_count(word)).sum();
		assert_eq!(syllables, expected, "{line}");
	}
}

#[test]
fn custom_text_sonnet_and_fallbacks() {
	let service = service(&config(7));
	assert_eq!(service.generate_custom(CATS, "sonnet").lines().count(), 17);
	assert_eq!(service.generate_custom("", "sonnet"), NO_POEM_FOUND);
	assert_eq!(
		service.generate_custom(CATS, "ballad"),
		"Style not found: ballad. Valid choices are common meter, haiku, limerick, raven verse, sonnet"
	);
}

#[test]
fn same_seed_same_poem() {
	let first = service(&config(42)).generate("cats", "sonnet");
	let second = service(&config(42)).generate("cats", "sonnet");
	assert_eq!(first, second);
}

#[test]
fn fingerprints_agree_with_syllable_counts() {
	let analyzer = analyzer();
	let words = [
		"the", "cat", "silent", "pond", "frog", "unknown", "xe", "fbi", "r2d2", "singin'", "rock-n-roll", "1999",
		"we're", "&",
	];
	for word in words {
		assert_eq!(analyzer.stress_fingerprint(word).len(), analyzer.syllable_count(word), "{word}");
	}
}

#[test]
fn words_sharing_a_rhyme_share_a_seed_group() {
	let model = CorpusModel::build(&chunks(CATS), &analyzer());
	let cat = model.rhyme_of("cat").unwrap();
	let group = model.rhyme_seeds().group(cat).unwrap();
	for word in ["bat", "cat", "hat", "mat", "rat"] {
		assert!(group.iter().any(|member| member == word), "{word}");
	}
	// "frog" rhymes on AA1 G, not AO1 G
	let dog = model.rhyme_of("dog").unwrap();
	assert_eq!(model.rhyme_seeds().group(dog).unwrap(), &["dog", "fog", "log"]);
	assert_eq!(model.syllable_count("silent"), 0);
}

#[test]
fn sources_are_loaded_from_a_folder_and_cached() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("cats.txt"), CATS).unwrap();
	let assets = tempfile::tempdir().unwrap();
	let dictionary = assets.path().join("cmudict.txt");
	std::fs::write(&dictionary, DICTIONARY).unwrap();

	let config = ServiceConfig {
		data_folder: dir.path().to_path_buf(),
		dictionary: Some(dictionary),
		cache_models: true,
		..config(8)
	};
	let service = PoemService::from_config(&config).unwrap();
	assert_eq!(service.source_names(), vec!["cats"]);
	assert!(dir.path().join("cats.bin").exists());
	assert_eq!(service.generate("cats", "sonnet").lines().count(), 17);

	let reloaded = PoemService::from_config(&config).unwrap();
	assert_eq!(reloaded.source("cats"), service.source("cats"));
}

#[test]
fn cached_sources_follow_a_newly_configured_dictionary() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("cats.txt"), CATS).unwrap();
	let assets = tempfile::tempdir().unwrap();
	let dictionary = assets.path().join("cmudict.txt");
	std::fs::write(&dictionary, DICTIONARY).unwrap();

	let without_table = ServiceConfig {
		data_folder: dir.path().to_path_buf(),
		cache_models: true,
		..config(4)
	};
	let service = PoemService::from_config(&without_table).unwrap();
	assert!(service.source("cats").unwrap().rhyme_seeds().is_empty());
	assert_eq!(service.generate("cats", "common meter"), NO_POEM_FOUND);

	let with_table = ServiceConfig {
		dictionary: Some(dictionary),
		..without_table.clone()
	};
	let cached = PoemService::from_config(&with_table).unwrap();
	let fresh = PoemService::from_config(&ServiceConfig {
		cache_models: false,
		..with_table.clone()
	})
	.unwrap();
	assert!(!cached.source("cats").unwrap().rhyme_seeds().is_empty());
	assert_eq!(cached.source("cats"), fresh.source("cats"));
}
