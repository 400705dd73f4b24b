use std::collections::HashMap;

use super::classifier::Category;
use super::distribution::Distribution;
use super::sentence::Sentence;
use crate::error::{BlendError, Result};

/// Count every n-gram starts with before any observation (additive smoothing).
const SEED_COUNT: u64 = 1;

/// Builds every tuple of `len` categories, in lexicographic `Category::ALL` order.
fn all_tuples(len: usize) -> Vec<Vec<Category>> {
	let mut tuples: Vec<Vec<Category>> = vec![Vec::with_capacity(len)];
	for _ in 0..len {
		tuples = tuples
			.into_iter()
			.flat_map(|prefix| {
				Category::ALL.into_iter().map(move |category| {
					let mut tuple = prefix.clone();
					tuple.push(category);
					tuple
				})
			})
			.collect();
	}
	tuples
}

/// Represents an n-gram model over character categories.
///
/// The `NGramModel` counts every observed window of `n` categories and turns the
/// counts into one next-category [`Distribution`] per context of `n-1` categories.
///
/// # Responsibilities
/// - Count category n-grams from sentences
/// - Convert counts into smoothed conditional probabilities
/// - Predict the next-category distribution given a context
/// - Merge with another n-gram model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 2
/// - `counts` holds an entry for each of the `5^n` tuples, every count >= 1
/// - `distributions` holds an entry for each of the `5^(n-1)` contexts
#[derive(Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (number of categories in the n-gram)
	n: usize, // must be >= 2

	/// Flat count table keyed by the full n-tuple
	counts: HashMap<Vec<Category>, u64>,

	/// Mapping from a context (length n-1) to its next-category distribution
	distributions: HashMap<Vec<Category>, Distribution>,
}

impl NGramModel {
	/// Creates a new n-gram model of order `n`, with every count seeded to 1.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 2 {
			return Err(BlendError::InvalidOrder { n });
		}
		let mut model = Self { n, counts: HashMap::new(), distributions: HashMap::new() };
		model.reset();
		Ok(model)
	}

	/// Order of the model.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Length of the contexts accepted by [`NGramModel::predict`].
	pub fn context_len(&self) -> usize {
		self.n - 1
	}

	/// Forgets every observation: counts go back to the seed, distributions to uniform.
	fn reset(&mut self) {
		self.counts = all_tuples(self.n).into_iter().map(|t| (t, SEED_COUNT)).collect();
		self.normalize();
	}

	/// Learns from a corpus, replacing anything learned before.
	///
	/// Each sentence is padded with `n-1` begin markers and one end marker around its
	/// content characters. Markers the sentence already carries are dropped first, so
	/// padding never nests.
	pub fn fit(&mut self, corpus: &[Sentence]) {
		self.reset();
		for sentence in corpus {
			self.add_sentence(sentence);
		}
		self.normalize();
	}

	/// Counts the n-grams of one more sentence.
	///
	/// # Notes
	/// - Distributions are not refreshed; call [`NGramModel::normalize`] afterwards.
	pub fn add_sentence(&mut self, sentence: &Sentence) {
		let categories: Vec<Category> = std::iter::repeat_n(Category::BeginMarker, self.n - 1)
			.chain(sentence.content_chars().map(|c| c.category()))
			.chain(std::iter::once(Category::EndMarker))
			.collect();

		for window in categories.windows(self.n) {
			*self.counts.entry(window.to_vec()).or_insert(SEED_COUNT) += 1;
		}
	}

	/// Recomputes the probability tables from the counts.
	///
	/// For every context, `P(next | context) = count(context, next) / sum(count(context, *))`.
	pub fn normalize(&mut self) {
		self.distributions.clear();
		for context in all_tuples(self.n - 1) {
			let mut counts = [0u64; Category::COUNT];
			let mut key = context.clone();
			for category in Category::ALL {
				key.push(category);
				counts[category.index()] = self.counts.get(&key).copied().unwrap_or(SEED_COUNT);
				key.pop();
			}
			self.distributions.insert(context, Distribution::from_counts(&counts));
		}
	}

	/// Number of times `ngram` was counted, seed included.
	///
	/// Returns `None` if `ngram` does not have exactly `n` categories.
	pub fn count(&self, ngram: &[Category]) -> Option<u64> {
		self.counts.get(ngram).copied()
	}

	/// Predicts the next-category distribution following `context`.
	///
	/// # Errors
	/// Returns `InvalidContext` if `context` does not hold exactly `n-1` categories.
	pub fn predict(&self, context: &[Category]) -> Result<Distribution> {
		let invalid = BlendError::InvalidContext { expected: self.context_len(), got: context.len() };
		if context.len() != self.context_len() {
			return Err(invalid);
		}
		self.distributions.get(context).copied().ok_or(invalid)
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`.
	/// - Observed counts are summed; the smoothing seed is kept once.
	/// - Distributions are refreshed.
	///
	/// # Errors
	/// Returns an error if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(BlendError::OrderMismatch { expected: self.n, got: other.n });
		}

		for (ngram, count) in &other.counts {
			*self.counts.entry(ngram.clone()).or_insert(SEED_COUNT) += count.saturating_sub(SEED_COUNT);
		}
		self.normalize();

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::classifier::Classifier;
	use rand::Rng;
	use std::sync::Arc;

	use Category::*;

	fn corpus(texts: &[&str]) -> Vec<Sentence> {
		let classifier = Arc::new(Classifier::default());
		texts.iter().map(|t| Sentence::new(t, 0, 0, classifier.clone())).collect()
	}

	fn assert_normalized(distribution: &Distribution) {
		assert!((distribution.total() - 1.0).abs() < 1e-9);
		assert!(distribution.iter().all(|(_, p)| p > 0.0));
	}

	#[test]
	fn order_below_two_is_rejected() {
		assert!(matches!(NGramModel::new(1), Err(BlendError::InvalidOrder { n: 1 })));
		assert!(matches!(NGramModel::new(0), Err(BlendError::InvalidOrder { n: 0 })));
	}

	#[test]
	fn untrained_model_is_uniform() {
		let model = NGramModel::new(3).unwrap();
		assert_eq!(model.count(&[Vowel, Vowel, Vowel]), Some(1));
		assert_eq!(model.predict(&[Consonant, Symbol]).unwrap(), Distribution::uniform());
	}

	#[test]
	fn seeds_every_tuple() {
		let model = NGramModel::new(3).unwrap();
		assert_eq!(model.counts.len(), 125);
		assert_eq!(model.distributions.len(), 25);
	}

	#[test]
	fn bigram_counts() {
		let mut model = NGramModel::new(2).unwrap();
		model.fit(&corpus(&["ab"]));

		// <BOS> a b <EOS>
		assert_eq!(model.count(&[BeginMarker, Vowel]), Some(2));
		assert_eq!(model.count(&[Vowel, Consonant]), Some(2));
		assert_eq!(model.count(&[Consonant, EndMarker]), Some(2));
		assert_eq!(model.count(&[Consonant, Vowel]), Some(1));

		let distribution = model.predict(&[BeginMarker]).unwrap();
		assert!((distribution[Vowel] - 2.0 / 6.0).abs() < 1e-12);
		assert!((distribution[Consonant] - 1.0 / 6.0).abs() < 1e-12);
	}

	#[test]
	fn trigram_padding_is_applied_once() {
		let mut model = NGramModel::new(3).unwrap();
		let classifier = Arc::new(Classifier::default());
		// Already wrapped sentence: its own markers are ignored.
		model.fit(&[Sentence::new("a", 2, 1, classifier)]);

		// <BOS> <BOS> a <EOS>
		assert_eq!(model.count(&[BeginMarker, BeginMarker, Vowel]), Some(2));
		assert_eq!(model.count(&[BeginMarker, Vowel, EndMarker]), Some(2));
		assert_eq!(model.count(&[BeginMarker, BeginMarker, BeginMarker]), Some(1));
	}

	#[test]
	fn fit_replaces_previous_counts() {
		let mut model = NGramModel::new(2).unwrap();
		model.fit(&corpus(&["aaaa"]));
		model.fit(&corpus(&["b"]));
		assert_eq!(model.count(&[Vowel, Vowel]), Some(1));
		assert_eq!(model.count(&[BeginMarker, Consonant]), Some(2));
	}

	#[test]
	fn empty_sentence_counts_begin_to_end() {
		let mut model = NGramModel::new(2).unwrap();
		model.fit(&corpus(&[""]));
		assert_eq!(model.count(&[BeginMarker, EndMarker]), Some(2));
	}

	#[test]
	fn wrong_context_length_is_rejected() {
		let model = NGramModel::new(3).unwrap();
		assert!(matches!(
			model.predict(&[Vowel]),
			Err(BlendError::InvalidContext { expected: 2, got: 1 })
		));
		assert!(model.predict(&[Vowel, Vowel, Vowel]).is_err());
	}

	#[test]
	fn every_distribution_is_normalized_and_positive() {
		let mut rng = rand::rng();
		let texts: Vec<String> = (0..20)
			.map(|_| {
				let len = rng.random_range(0..30);
				(0..len).map(|_| rng.random::<char>()).collect()
			})
			.collect();
		let texts: Vec<&str> = texts.iter().map(String::as_str).collect();

		for n in 2..=4 {
			let mut model = NGramModel::new(n).unwrap();
			model.fit(&corpus(&texts));
			for context in all_tuples(n - 1) {
				assert_normalized(&model.predict(&context).unwrap());
			}
		}
	}

	#[test]
	fn merge_sums_observed_counts() {
		let mut left = NGramModel::new(2).unwrap();
		left.fit(&corpus(&["ab"]));
		let mut right = NGramModel::new(2).unwrap();
		right.fit(&corpus(&["ab", "a"]));

		left.merge(&right).unwrap();
		assert_eq!(left.count(&[BeginMarker, Vowel]), Some(4));
		assert_eq!(left.count(&[Vowel, EndMarker]), Some(2));
		assert_eq!(left.count(&[Symbol, Symbol]), Some(1));
		assert_normalized(&left.predict(&[Vowel]).unwrap());
	}

	#[test]
	fn merge_rejects_other_orders() {
		let mut left = NGramModel::new(2).unwrap();
		let right = NGramModel::new(3).unwrap();
		assert!(matches!(left.merge(&right), Err(BlendError::OrderMismatch { expected: 2, got: 3 })));
	}
}
