use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde_json::Value;

use crate::error::PoemError;

/// File extensions recognised as corpora.
pub(crate) const CORPUS_EXTENSIONS: [&str; 2] = ["txt", "json"];

/// Reads a whole text file into memory.
///
/// `\r\n` line endings are normalised to `\n`.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	if contents.contains('\r') {
		contents = contents.replace("\r\n", "\n");
	}
	Ok(contents)
}

/// Reads a corpus file and returns its independent text chunks.
///
/// - `.json`: see [`json_chunks`]
/// - anything else: plain text split on blank lines, see [`text_chunks`]
pub(crate) fn read_chunks<P: AsRef<Path>>(filename: P) -> Result<Vec<String>, PoemError> {
	let path = filename.as_ref();
	let contents = read_text(path)?;
	if path.extension() == Some(std::ffi::OsStr::new("json")) {
		json_chunks(&contents)
	} else {
		Ok(text_chunks(&contents))
	}
}

/// Splits text into chunks separated by a blank line (`"\n\n"`).
///
/// Whitespace-only chunks are dropped.
pub(crate) fn text_chunks(text: &str) -> Vec<String> {
	text.split("\n\n")
		.filter(|chunk| !chunk.trim().is_empty())
		.map(str::to_owned)
		.collect()
}

/// Parses a JSON object keyed by document title.
///
/// Each value is one chunk and may be:
/// - a list of lines, joined with spaces
/// - a single string
/// - an object with a `"lyrics"` field holding either of the above
///
/// Titles are visited in sorted order. Values of any other shape are skipped.
pub(crate) fn json_chunks(text: &str) -> Result<Vec<String>, PoemError> {
	let documents: serde_json::Map<String, Value> = serde_json::from_str(text)?;
	Ok(documents.values().filter_map(document_chunk).collect())
}

fn document_chunk(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Array(lines) => Some(
			lines
				.iter()
				.filter_map(Value::as_str)
				.collect::<Vec<_>>()
				.join(" "),
		),
		Value::Object(fields) => fields.get("lyrics").and_then(document_chunk),
		_ => None,
	}
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"bin"` → `data/input.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/beatles.json"` → `"beatles"`
/// - `"shakespeare.txt"` → `"shakespeare"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files in a directory whose extension is one of `extensions`.
///
/// Hidden files are skipped. Returns file names only (no paths), sorted.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}

		let matches = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| extensions.contains(&ext));
		if let (true, Some(name)) = (matches, path.file_name()) {
			let name = name.to_string_lossy().to_string();
			if !name.starts_with('.') {
				files.push(name);
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_chunks_split_on_blank_lines() {
		let chunks = text_chunks("first song\nline two\n\nsecond song\n\n\n\n");
		assert_eq!(chunks, vec!["first song\nline two", "second song"]);
	}

	#[test]
	fn json_chunks_accept_lines_strings_and_lyrics_records() {
		let json = r#"{
			"b": "a single string",
			"a": ["line one", "line two"],
			"c": {"lyrics": ["from", "a record"], "year": 1965},
			"d": 42
		}"#;
		let chunks = json_chunks(json).unwrap();
		assert_eq!(chunks, vec!["line one line two", "a single string", "from a record"]);
	}

	#[test]
	fn json_chunks_reject_non_objects() {
		assert!(matches!(json_chunks("[1, 2]"), Err(PoemError::Json(_))));
	}

	#[test]
	fn read_chunks_dispatches_on_extension() {
		let dir = tempfile::tempdir().unwrap();
		let text_path = dir.path().join("poems.txt");
		fs::write(&text_path, "one\r\n\r\ntwo").unwrap();
		let json_path = dir.path().join("songs.json");
		fs::write(&json_path, r#"{"song": ["la la", "la"]}"#).unwrap();

		assert_eq!(read_chunks(&text_path).unwrap(), vec!["one", "two"]);
		assert_eq!(read_chunks(&json_path).unwrap(), vec!["la la la"]);
	}

	#[test]
	fn list_files_filters_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["b.txt", "a.json", "model.bin", ".hidden.txt"] {
			fs::write(dir.path().join(name), "x").unwrap();
		}
		let files = list_files(dir.path(), &CORPUS_EXTENSIONS).unwrap();
		assert_eq!(files, vec!["a.json", "b.txt"]);
	}

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/sonnets.json", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/sonnets.bin"));
		assert_eq!(get_filename("data/sonnets.json").unwrap(), "sonnets");
	}
}
