use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use super::classifier::{BEGIN_TOKEN, Category, Classifier, END_TOKEN};

/// A classified character.
///
/// `text` is the original grapheme or a sentinel token. The category is computed
/// once at construction and can't be set from outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Char {
	text: String,
	category: Category,
}

impl Char {
	/// Classifies `text` and wraps it.
	pub fn new(text: impl Into<String>, classifier: &Classifier) -> Self {
		let text = text.into();
		let category = classifier.classify(&text);
		Self { text, category }
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn category(&self) -> Category {
		self.category
	}
}

impl fmt::Display for Char {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Anything that can be appended to a [`Sentence`].
///
/// Raw text is classified on the spot; an already classified [`Char`] is kept as is.
pub trait IntoChar {
	fn into_char(self, classifier: &Classifier) -> Char;
}

impl IntoChar for Char {
	fn into_char(self, _: &Classifier) -> Char {
		self
	}
}

impl IntoChar for &Char {
	fn into_char(self, _: &Classifier) -> Char {
		self.clone()
	}
}

impl IntoChar for &str {
	fn into_char(self, classifier: &Classifier) -> Char {
		Char::new(self, classifier)
	}
}

impl IntoChar for String {
	fn into_char(self, classifier: &Classifier) -> Char {
		Char::new(self, classifier)
	}
}

impl IntoChar for char {
	fn into_char(self, classifier: &Classifier) -> Char {
		Char::new(self.to_string(), classifier)
	}
}

/// An ordered, mutable sequence of classified characters.
///
/// Begin markers, when present, form a prefix and end markers a suffix: raw text is
/// split into single characters, none of which can spell a sentinel token.
#[derive(Clone, Debug)]
pub struct Sentence {
	chars: Vec<Char>,
	classifier: Arc<Classifier>,
}

impl Sentence {
	/// Builds a sentence from raw text.
	///
	/// # Parameters
	/// - `text`: split into characters, each classified immediately.
	/// - `leading`: number of begin markers to prepend (0 for none).
	/// - `trailing`: number of end markers to append (0 for none).
	pub fn new(text: &str, leading: usize, trailing: usize, classifier: Arc<Classifier>) -> Self {
		let mut sentence = Self::empty(classifier);
		sentence.extend(std::iter::repeat_n(BEGIN_TOKEN, leading));
		sentence.extend(text.chars());
		sentence.extend(std::iter::repeat_n(END_TOKEN, trailing));
		sentence
	}

	/// An empty sentence without any marker.
	pub fn empty(classifier: Arc<Classifier>) -> Self {
		Self { chars: Vec::new(), classifier }
	}

	/// Appends one character, classifying it if needed.
	pub fn append<C: IntoChar>(&mut self, item: C) {
		let c = item.into_char(&self.classifier);
		self.chars.push(c);
	}

	/// Appends every item of `items` in order.
	pub fn extend<I, C>(&mut self, items: I)
	where
		I: IntoIterator<Item = C>,
		C: IntoChar,
	{
		for item in items {
			self.append(item);
		}
	}

	pub fn get(&self, index: usize) -> Option<&Char> {
		self.chars.get(index)
	}

	pub fn last(&self) -> Option<&Char> {
		self.chars.last()
	}

	/// Number of characters, markers included.
	pub fn len(&self) -> usize {
		self.chars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	/// All characters, markers included.
	pub fn chars(&self) -> &[Char] {
		&self.chars
	}

	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Char> + ExactSizeIterator {
		self.chars.iter()
	}

	/// Category of every character, markers included.
	pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.chars.iter().map(Char::category)
	}

	/// Characters that are neither begin nor end markers.
	pub fn content_chars(&self) -> impl Iterator<Item = &Char> {
		self.chars.iter().filter(|c| !c.category().is_marker())
	}

	pub fn content_len(&self) -> usize {
		self.content_chars().count()
	}

	/// Content characters joined back into a string.
	pub fn content_text(&self) -> String {
		self.content_chars().map(Char::text).collect()
	}

	/// Shared classifier used for appended text.
	pub fn classifier(&self) -> &Arc<Classifier> {
		&self.classifier
	}
}

impl Index<usize> for Sentence {
	type Output = Char;

	fn index(&self, index: usize) -> &Char {
		&self.chars[index]
	}
}

impl fmt::Display for Sentence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for c in &self.chars {
			f.write_str(c.text())?;
		}
		Ok(())
	}
}
