use std::io::Write;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::io::read_text;
use crate::model::generation_config::GenerationConfig;
use crate::model::generator::Generator;

/// Banner closing the header and every group.
const GROUP_BANNER: &str = "==============================";

/// Banner between the inputs of a group and its output.
const OUTPUT_BANNER: &str = "++++++++++++++++++++";

/// Splits a groups document into sentence groups.
///
/// - Groups are separated by one or more blank lines
/// - Lines starting with `#` are comments
/// - Every other line is one sentence, kept verbatim (trailing `\r` aside)
pub fn parse_groups(text: &str) -> Vec<Vec<String>> {
	let mut groups = Vec::new();
	let mut current: Vec<String> = Vec::new();

	for line in text.lines() {
		if line.trim().is_empty() {
			if !current.is_empty() {
				groups.push(std::mem::take(&mut current));
			}
			continue;
		}
		if line.starts_with('#') {
			continue;
		}
		current.push(line.to_owned());
	}
	if !current.is_empty() {
		groups.push(current);
	}

	groups
}

/// Reads and parses a groups file (see [`parse_groups`]).
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_groups<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
	Ok(parse_groups(&read_text(path)?))
}

/// Human-readable report of a batch of blends.
///
/// Layout:
/// ```text
/// POSITION_WEIGHT = 1.0
/// ...
///
/// ==============================
///
/// 5 Hello
/// 7 Bonjour
/// ++++++++++++++++++++
/// 6 Helour
///
/// ==============================
///
/// ```
/// Lengths are counted in characters.
pub struct Report<W: Write> {
	out: W,
}

impl<W: Write> Report<W> {
	pub fn new(out: W) -> Self {
		Self { out }
	}

	/// Writes the tunable constants followed by the first banner.
	pub fn write_header(&mut self, config: &GenerationConfig) -> Result<()> {
		for (name, value) in config.constants() {
			writeln!(self.out, "{name} = {value:?}")?;
		}
		write!(self.out, "\n{GROUP_BANNER}\n\n")?;
		Ok(())
	}

	/// Writes one group: its inputs, then the blended output.
	pub fn write_group<S: AsRef<str>>(&mut self, sentences: &[S], output: &str) -> Result<()> {
		for sentence in sentences {
			let sentence = sentence.as_ref();
			writeln!(self.out, "{} {}", sentence.chars().count(), sentence)?;
		}
		writeln!(self.out, "{OUTPUT_BANNER}")?;
		writeln!(self.out, "{} {}", output.chars().count(), output)?;
		write!(self.out, "\n{GROUP_BANNER}\n\n")?;
		Ok(())
	}

	/// Fits and generates every group, reporting each one.
	///
	/// Returns the generated sentences, in group order.
	///
	/// # Errors
	/// Stops at the first group that fails to fit, generate, or be written.
	pub fn write_batch(&mut self, generator: &mut Generator, groups: &[Vec<String>]) -> Result<Vec<String>> {
		self.write_header(generator.config())?;

		let mut outputs = Vec::with_capacity(groups.len());
		for (i, sentences) in groups.iter().enumerate() {
			generator.fit(sentences.as_slice())?;
			let output = generator.generate()?;
			info!("Group {}: {} sentences -> {:?}", i + 1, sentences.len(), output);

			self.write_group(sentences.as_slice(), &output)?;
			outputs.push(output);
		}

		self.out.flush()?;
		Ok(outputs)
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}
