use std::collections::HashSet;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::read_file;

/// Token marking the beginning of a sentence.
pub const BEGIN_TOKEN: &str = "<BOS>";

/// Token marking the end of a sentence.
pub const END_TOKEN: &str = "<EOS>";

/// Vowel letters used when no external table is provided.
const DEFAULT_VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Category of a character, the alphabet of the n-gram models.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
	BeginMarker,
	EndMarker,
	Consonant,
	Vowel,
	Symbol,
}

impl Category {
	/// Number of categories.
	pub const COUNT: usize = 5;

	/// Every category, in declaration order.
	pub const ALL: [Category; Category::COUNT] = [
		Category::BeginMarker,
		Category::EndMarker,
		Category::Consonant,
		Category::Vowel,
		Category::Symbol,
	];

	/// Position of the category inside `Category::ALL`.
	pub fn index(self) -> usize {
		match self {
			Category::BeginMarker => 0,
			Category::EndMarker => 1,
			Category::Consonant => 2,
			Category::Vowel => 3,
			Category::Symbol => 4,
		}
	}

	/// Returns `true` for begin and end markers.
	pub fn is_marker(self) -> bool {
		matches!(self, Category::BeginMarker | Category::EndMarker)
	}
}

/// Strips diacritics and maps any text to its nearest ASCII rendition.
///
/// Characters without a Latin equivalent vanish.
pub fn transliterate(text: &str) -> String {
	deunicode::deunicode_with_tofu(text, "")
}

/// Maps raw characters (or sentinel tokens) to a [`Category`].
///
/// A `Classifier` is an immutable configuration object: it is built once from a
/// vowel table and then shared (usually behind an `Arc`) by every sentence and
/// generator that needs it.
///
/// # Invariants
/// - Every letter of the vowel table is a single lowercase character
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
	vowels: HashSet<char>,
}

impl Default for Classifier {
	/// Classifier backed by the five Latin vowels.
	fn default() -> Self {
		Self::from_letters(DEFAULT_VOWELS)
	}
}

impl Classifier {
	/// Builds a classifier from a set of vowel letters.
	///
	/// Letters are lower-cased before being stored.
	pub fn from_letters<I: IntoIterator<Item = char>>(letters: I) -> Self {
		let vowels = letters
			.into_iter()
			.flat_map(|c| c.to_lowercase())
			.collect();
		Self { vowels }
	}

	/// Loads a vowel table from a UTF-8 file holding one letter per line.
	///
	/// # Notes
	/// - Blank lines are ignored.
	/// - Lines holding more than one character cannot match a single letter and are skipped.
	///
	/// # Errors
	/// Returns an error if the file cannot be read.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let mut letters = Vec::new();
		for line in read_file(&path)? {
			let line = line.trim();
			let mut chars = line.chars();
			match (chars.next(), chars.next()) {
				(None, _) => (),
				(Some(c), None) => letters.push(c),
				_ => warn!("Skipping vowel table entry {:?}: not a single letter", line),
			}
		}
		Ok(Self::from_letters(letters))
	}

	/// Returns `true` if `letter` (any case) belongs to the vowel table.
	pub fn is_vowel(&self, letter: char) -> bool {
		letter.to_lowercase().all(|c| self.vowels.contains(&c))
	}

	/// Classifies a character or a sentinel token.
	///
	/// - The exact sentinel tokens map to `BeginMarker` / `EndMarker`.
	/// - Otherwise the text is transliterated to ASCII; without any alphabetic
	///   character it is a `Symbol`.
	/// - Else the last alphabetic character decides between `Vowel` and `Consonant`.
	///
	/// Total and deterministic: every string, including the empty one, gets a category.
	pub fn classify(&self, text: &str) -> Category {
		if text == BEGIN_TOKEN {
			return Category::BeginMarker;
		}
		if text == END_TOKEN {
			return Category::EndMarker;
		}

		let ascii = transliterate(text);
		match ascii.chars().rev().find(|c| c.is_alphabetic()) {
			None => Category::Symbol,
			Some(c) if self.is_vowel(c) => Category::Vowel,
			Some(_) => Category::Consonant,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::Rng;
	use std::io::Write;

	#[test]
	fn sentinels_map_to_markers() {
		let classifier = Classifier::default();
		assert_eq!(classifier.classify(BEGIN_TOKEN), Category::BeginMarker);
		assert_eq!(classifier.classify(END_TOKEN), Category::EndMarker);
	}

	#[test]
	fn only_exact_sentinels_are_markers() {
		let classifier = Classifier::default();
		for text in ["<bos>", "<EOS", "BOS", "<BOS> ", "<", ">"] {
			assert!(!classifier.classify(text).is_marker(), "{text:?} classified as marker");
		}
	}

	#[test]
	fn latin_letters() {
		let classifier = Classifier::default();
		assert_eq!(classifier.classify("a"), Category::Vowel);
		assert_eq!(classifier.classify("E"), Category::Vowel);
		assert_eq!(classifier.classify("b"), Category::Consonant);
		assert_eq!(classifier.classify("Z"), Category::Consonant);
	}

	#[test]
	fn diacritics_are_stripped() {
		let classifier = Classifier::default();
		assert_eq!(classifier.classify("é"), Category::Vowel);
		assert_eq!(classifier.classify("ñ"), Category::Consonant);
		assert_eq!(classifier.classify("ü"), Category::Vowel);
	}

	#[test]
	fn non_latin_scripts_use_last_transliterated_letter() {
		let classifier = Classifier::default();
		// Cyrillic "а" -> "a", Greek "λ" -> "l"
		assert_eq!(classifier.classify("а"), Category::Vowel);
		assert_eq!(classifier.classify("λ"), Category::Consonant);
	}

	#[test]
	fn punctuation_and_whitespace_are_symbols() {
		let classifier = Classifier::default();
		for text in [" ", ",", ".", "!", "1", "", "\t", "?"] {
			assert_eq!(classifier.classify(text), Category::Symbol, "{text:?}");
		}
	}

	#[test]
	fn custom_vowel_table() {
		let classifier = Classifier::from_letters(['Y', 'a']);
		assert_eq!(classifier.classify("y"), Category::Vowel);
		assert_eq!(classifier.classify("e"), Category::Consonant);
	}

	#[test]
	fn vowel_table_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "a\ni\n\nU\nou\n").unwrap();

		let classifier = Classifier::from_file(file.path()).unwrap();
		assert!(classifier.is_vowel('a'));
		assert!(classifier.is_vowel('u'));
		assert!(!classifier.is_vowel('o'));
		assert!(!classifier.is_vowel('e'));
	}

	#[test]
	fn classify_is_total_and_deterministic() {
		let classifier = Classifier::default();
		let mut rng = rand::rng();
		for _ in 0..500 {
			let len = rng.random_range(0..4);
			let text: String = (0..len).map(|_| rng.random::<char>()).collect();
			let first = classifier.classify(&text);
			assert_eq!(first, classifier.classify(&text));
			assert!(Category::ALL.contains(&first));
			if text != BEGIN_TOKEN && text != END_TOKEN {
				assert!(!first.is_marker());
			}
		}
	}

	#[test]
	fn category_indexes_follow_all() {
		for (i, category) in Category::ALL.iter().enumerate() {
			assert_eq!(category.index(), i);
		}
	}
}
