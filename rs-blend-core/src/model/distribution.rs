use std::ops::{Index, IndexMut};

use super::classifier::Category;

/// Probability distribution over the next [`Category`].
///
/// Conceptually, this is the row of a Markov chain leaving one context: one
/// probability per category, indexed by the category itself.
///
/// ## Invariants
/// - Distributions produced by the n-gram models sum to 1 and are strictly positive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distribution {
	probabilities: [f64; Category::COUNT],
}

impl Distribution {
	/// Normalizes raw transition counts into probabilities.
	///
	/// Each probability is `count / total`. A zero total yields the uniform distribution.
	pub fn from_counts(counts: &[u64; Category::COUNT]) -> Self {
		let total: u64 = counts.iter().sum();
		if total == 0 {
			return Self::uniform();
		}

		let mut probabilities = [0.0; Category::COUNT];
		for (probability, count) in probabilities.iter_mut().zip(counts) {
			*probability = *count as f64 / total as f64;
		}
		Self { probabilities }
	}

	/// Same probability for every category.
	pub fn uniform() -> Self {
		Self { probabilities: [1.0 / Category::COUNT as f64; Category::COUNT] }
	}

	/// Element-wise arithmetic mean of several distributions.
	///
	/// Returns `None` if `distributions` is empty.
	pub fn mean<'a, I>(distributions: I) -> Option<Self>
	where
		I: IntoIterator<Item = &'a Distribution>,
	{
		let mut probabilities = [0.0; Category::COUNT];
		let mut count = 0usize;
		for distribution in distributions {
			for (sum, p) in probabilities.iter_mut().zip(distribution.probabilities) {
				*sum += p;
			}
			count += 1;
		}
		if count == 0 {
			return None;
		}

		for p in probabilities.iter_mut() {
			*p /= count as f64;
		}
		Some(Self { probabilities })
	}

	/// Probability of `category`.
	pub fn get(&self, category: Category) -> f64 {
		self.probabilities[category.index()]
	}

	/// Sum of all entries (1 for a normalized distribution).
	pub fn total(&self) -> f64 {
		self.probabilities.iter().sum()
	}

	/// Iterates over `(category, probability)` pairs in `Category::ALL` order.
	pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
		Category::ALL.into_iter().map(move |category| (category, self.get(category)))
	}
}

impl Index<Category> for Distribution {
	type Output = f64;

	fn index(&self, category: Category) -> &f64 {
		&self.probabilities[category.index()]
	}
}

impl IndexMut<Category> for Distribution {
	fn index_mut(&mut self, category: Category) -> &mut f64 {
		&mut self.probabilities[category.index()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_are_normalized() {
		let distribution = Distribution::from_counts(&[1, 1, 2, 4, 2]);
		assert!((distribution.total() - 1.0).abs() < 1e-12);
		assert!((distribution[Category::Vowel] - 0.4).abs() < 1e-12);
		assert!((distribution[Category::BeginMarker] - 0.1).abs() < 1e-12);
	}

	#[test]
	fn zero_counts_fall_back_to_uniform() {
		assert_eq!(Distribution::from_counts(&[0; Category::COUNT]), Distribution::uniform());
	}

	#[test]
	fn mean_is_element_wise() {
		let a = Distribution::from_counts(&[1, 0, 0, 0, 0]);
		let b = Distribution::from_counts(&[0, 1, 0, 0, 0]);
		let mean = Distribution::mean([&a, &b]).unwrap();
		assert_eq!(mean[Category::BeginMarker], 0.5);
		assert_eq!(mean[Category::EndMarker], 0.5);
		assert_eq!(mean[Category::Symbol], 0.0);
	}

	#[test]
	fn mean_of_nothing() {
		assert!(Distribution::mean(std::iter::empty()).is_none());
	}

	#[test]
	fn index_mut_scales_one_entry() {
		let mut distribution = Distribution::uniform();
		distribution[Category::Symbol] *= 3.0;
		assert!((distribution.get(Category::Symbol) - 0.6).abs() < 1e-12);
		assert!((distribution.get(Category::Vowel) - 0.2).abs() < 1e-12);
	}
}
