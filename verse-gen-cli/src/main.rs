use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use verse_gen_core::{PoemError, PoemService, PoemTemplate, ServiceConfig};

#[derive(Parser)]
#[command(name = "verse-gen-cli")]
#[command(about = "Print a poem generated from a text corpus")]
struct Args {
	/// Source name (file stem of a corpus in the data folder)
	source: Option<String>,

	/// Poem style
	#[arg(default_value = "sonnet")]
	style: String,

	/// JSON service configuration
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Folder of .txt / .json corpora (overrides the configuration)
	#[arg(short, long)]
	data: Option<PathBuf>,

	/// CMU-format pronunciation dictionary (overrides the configuration)
	#[arg(long)]
	dictionary: Option<PathBuf>,

	/// Seed for reproducible poems
	#[arg(long)]
	seed: Option<u64>,

	/// List sources and styles, then exit
	#[arg(short, long)]
	list: bool,

	/// Use this text file as the corpus instead of a named source
	#[arg(long)]
	custom_file: Option<PathBuf>,

	/// Custom rhyme scheme, e.g. "A B A B" (requires --meter for each label)
	#[arg(long)]
	scheme: Option<String>,

	/// Meter of a rhyme label, e.g. A=0101010101 (repeatable)
	#[arg(long = "meter", value_name = "LABEL=PATTERN")]
	meters: Vec<String>,
}

impl Args {
	fn service_config(&self) -> Result<ServiceConfig, PoemError> {
		let mut config = match &self.config {
			Some(path) => ServiceConfig::load(path)?,
			None => ServiceConfig::default(),
		};
		if let Some(data) = &self.data {
			config.data_folder = data.clone();
		}
		if self.dictionary.is_some() {
			config.dictionary = self.dictionary.clone();
		}
		if self.seed.is_some() {
			config.seed = self.seed;
		}
		Ok(config)
	}

	/// The template given by `--scheme` / `--meter`, if any.
	fn template(&self) -> Result<Option<PoemTemplate>, String> {
		let Some(scheme) = &self.scheme else {
			return Ok(None);
		};

		let mut meters = Vec::with_capacity(self.meters.len());
		for meter in &self.meters {
			let (label, pattern) = meter
				.split_once('=')
				.ok_or_else(|| format!("Expected LABEL=PATTERN, got '{meter}'"))?;
			let mut chars = label.trim().chars();
			match (chars.next(), chars.next()) {
				(Some(c), None) => meters.push((c, pattern.trim())),
				_ => return Err(format!("Rhyme labels must be a single character, got '{label}'")),
			}
		}

		PoemTemplate::parse(scheme, meters).map(Some).map_err(|e| e.user_message())
	}
}

fn run(args: &Args) -> Result<String, String> {
	let config = args.service_config().map_err(|e| e.to_string())?;
	let template = args.template()?;

	// A submitted text does not need the data folder
	if let Some(path) = &args.custom_file {
		let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
		let service = PoemService::with_dictionary(&config).map_err(|e| e.to_string())?;
		debug!("Generating from {} ({} bytes)", path.display(), text.len());
		let poem = match &template {
			Some(template) => service.try_generate_custom_with_template(&text, template),
			None => service.try_generate_custom(&text, &args.style),
		};
		return poem.map_err(|e| e.user_message());
	}

	let service = PoemService::from_config(&config).map_err(|e| e.to_string())?;
	if args.list {
		return Ok(format!(
			"Sources:\n  {}\nStyles:\n  {}",
			service.source_names().join("\n  "),
			service.style_names().join("\n  ")
		));
	}

	let Some(source) = &args.source else {
		return Err(format!(
			"Missing source. Valid choices are {}",
			service.source_names().join(", ")
		));
	};
	let poem = match &template {
		Some(template) => service.try_generate_with_template(source, template),
		None => service.try_generate(source, &args.style),
	};
	poem.map_err(|e| e.user_message())
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
	let args = Args::parse();

	match run(&args) {
		Ok(output) => {
			println!("{output}");
			ExitCode::SUCCESS
		}
		Err(message) => {
			eprintln!("{message}");
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn meters_are_parsed_into_a_template() {
		let args = Args::parse_from(["verse-gen-cli", "--scheme", "A A", "--meter", "A=01"]);
		let template = args.template().unwrap().unwrap();
		assert_eq!(template.scheme(), "A A");
		assert_eq!(template.meter('A').unwrap().to_string(), "01");
	}

	#[test]
	fn malformed_meters_are_reported() {
		let args = Args::parse_from(["verse-gen-cli", "--scheme", "A", "--meter", "A:01"]);
		assert!(args.template().unwrap_err().contains("LABEL=PATTERN"));

		let args = Args::parse_from(["verse-gen-cli", "--scheme", "A B", "--meter", "A=01"]);
		assert!(args.template().is_err());
	}

	#[test]
	fn flags_override_the_configuration() {
		let args = Args::parse_from(["verse-gen-cli", "beatles", "limerick", "--data", "corpora", "--seed", "9"]);
		let config = args.service_config().unwrap();
		assert_eq!(config.data_folder, PathBuf::from("corpora"));
		assert_eq!(config.seed, Some(9));
		assert_eq!(args.style, "limerick");
	}
}
