use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::io;

/// Reads a text file into a single `String`.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_text(filename)?.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn read_file_splits_crlf_and_lf() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "a\r\nb\nc").unwrap();

		let lines = read_file(file.path()).unwrap();
		assert_eq!(lines, vec!["a", "b", "c"]);
	}

	#[test]
	fn read_file_missing_path_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_file(dir.path().join("missing.txt")).is_err());
	}
}
