use std::collections::BTreeMap;

use super::classifier::Category;
use super::distribution::Distribution;
use super::ngram_model::NGramModel;
use super::sentence::Sentence;
use crate::error::{BlendError, Result};

/// Ensemble of n-gram models of distinct orders.
///
/// This struct manages:
/// - `ngrams`: a map from n-gram order to its corresponding `NGramModel`.
///
/// Predictions are the unweighted mean of every member's distribution, which
/// blends short-range and longer-range regularities without committing to a
/// single order.
#[derive(Clone, Debug)]
pub struct MultiGramModel {
	ngrams: BTreeMap<usize, NGramModel>,
}

impl MultiGramModel {
	/// Creates an untrained ensemble with one model per order.
	///
	/// Duplicate orders are collapsed.
	///
	/// # Errors
	/// - `NoOrders` if `orders` is empty.
	/// - `InvalidOrder` if any order is below 2.
	pub fn new(orders: &[usize]) -> Result<Self> {
		if orders.is_empty() {
			return Err(BlendError::NoOrders);
		}

		let mut ngrams = BTreeMap::new();
		for &n in orders {
			if !ngrams.contains_key(&n) {
				ngrams.insert(n, NGramModel::new(n)?);
			}
		}
		Ok(Self { ngrams })
	}

	/// Orders of the member models, ascending.
	pub fn orders(&self) -> impl Iterator<Item = usize> + '_ {
		self.ngrams.keys().copied()
	}

	/// Highest member order.
	pub fn max_order(&self) -> usize {
		// Never empty, enforced by `new`
		self.ngrams.keys().next_back().copied().unwrap_or(2)
	}

	/// Length of the contexts accepted by [`MultiGramModel::predict`].
	pub fn context_len(&self) -> usize {
		self.max_order() - 1
	}

	/// Member model of order `n`, if any.
	pub fn get(&self, n: usize) -> Option<&NGramModel> {
		self.ngrams.get(&n)
	}

	/// Trains every member on the same corpus.
	pub fn fit(&mut self, corpus: &[Sentence]) {
		for model in self.ngrams.values_mut() {
			model.fit(corpus);
		}
	}

	/// Averages the members' predictions.
	///
	/// `context` must hold `max order - 1` categories. Each member sees only the
	/// rightmost `n - 1` categories of it.
	///
	/// # Errors
	/// Returns `InvalidContext` if the context length is wrong.
	pub fn predict(&self, context: &[Category]) -> Result<Distribution> {
		let expected = self.context_len();
		if context.len() != expected {
			return Err(BlendError::InvalidContext { expected, got: context.len() });
		}

		let mut distributions = Vec::with_capacity(self.ngrams.len());
		for model in self.ngrams.values() {
			let start = context.len() - model.context_len();
			distributions.push(model.predict(&context[start..])?);
		}

		Distribution::mean(&distributions).ok_or(BlendError::NoOrders)
	}

	/// Merges another ensemble into this one, member by member.
	///
	/// # Errors
	/// Returns an error if the two ensembles do not hold the same orders.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if !self.orders().eq(other.orders()) {
			return Err(BlendError::OrderSetMismatch {
				expected: self.orders().collect(),
				got: other.orders().collect(),
			});
		}

		for (n, model) in self.ngrams.iter_mut() {
			if let Some(theirs) = other.ngrams.get(n) {
				model.merge(theirs)?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::classifier::Classifier;
	use std::sync::Arc;

	use Category::*;

	fn corpus(texts: &[&str]) -> Vec<Sentence> {
		let classifier = Arc::new(Classifier::default());
		texts.iter().map(|t| Sentence::new(t, 2, 1, classifier.clone())).collect()
	}

	#[test]
	fn needs_at_least_one_valid_order() {
		assert!(matches!(MultiGramModel::new(&[]), Err(BlendError::NoOrders)));
		assert!(matches!(MultiGramModel::new(&[2, 1]), Err(BlendError::InvalidOrder { n: 1 })));
	}

	#[test]
	fn duplicate_orders_collapse() {
		let model = MultiGramModel::new(&[3, 2, 3]).unwrap();
		assert_eq!(model.orders().collect::<Vec<_>>(), vec![2, 3]);
		assert_eq!(model.context_len(), 2);
	}

	#[test]
	fn prediction_is_the_mean_of_members() {
		let mut model = MultiGramModel::new(&[2, 3]).unwrap();
		model.fit(&corpus(&["Hola, mundo.", "Hello, world!"]));

		for context in [[BeginMarker, BeginMarker], [Consonant, Vowel], [Vowel, Symbol]] {
			let bigram = model.get(2).unwrap().predict(&context[1..]).unwrap();
			let trigram = model.get(3).unwrap().predict(&context).unwrap();
			let ensemble = model.predict(&context).unwrap();

			for category in Category::ALL {
				let mean = (bigram[category] + trigram[category]) / 2.0;
				assert!((ensemble[category] - mean).abs() < 1e-12);
			}
			assert!((ensemble.total() - 1.0).abs() < 1e-9);
		}
	}

	#[test]
	fn single_member_passes_through() {
		let mut model = MultiGramModel::new(&[2]).unwrap();
		model.fit(&corpus(&["abc"]));
		assert_eq!(model.predict(&[Vowel]).unwrap(), model.get(2).unwrap().predict(&[Vowel]).unwrap());
	}

	#[test]
	fn context_must_match_highest_order() {
		let model = MultiGramModel::new(&[2, 3]).unwrap();
		assert!(matches!(
			model.predict(&[Vowel]),
			Err(BlendError::InvalidContext { expected: 2, got: 1 })
		));
	}

	#[test]
	fn merge_requires_same_orders() {
		let mut left = MultiGramModel::new(&[2, 3]).unwrap();
		let right = MultiGramModel::new(&[3]).unwrap();
		match left.merge(&right) {
			Err(BlendError::OrderSetMismatch { expected, got }) => {
				assert_eq!(expected, vec![2, 3]);
				assert_eq!(got, vec![3]);
			}
			other => panic!("unexpected merge result {other:?}"),
		}

		let mut same = MultiGramModel::new(&[2, 3]).unwrap();
		same.fit(&corpus(&["a"]));
		left.merge(&same).unwrap();
		assert_eq!(left.get(2).unwrap().count(&[BeginMarker, Vowel]), Some(2));
	}
}
