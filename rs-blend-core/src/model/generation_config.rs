use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BlendError, Result};
use crate::io::read_text;

/// Tunable constants of the blending engine.
///
/// `GenerationConfig` weights the four log-score terms combined at every decoding
/// step and selects the n-gram orders of the category model.
///
/// # Responsibilities
/// - Provide the default constants (`GenerationConfig::default`)
/// - Load overrides from TOML; missing keys keep their default
/// - Reject values that would make scores meaningless (`validate`)
///
/// # Invariants
/// - Once handed to a `Generator`, a configuration is never mutated
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
	/// Weight of the positional term (closeness to the source cursor).
	pub position_weight: f64,

	/// Standard deviation of the Gaussian positional decay.
	pub position_std_dev: f64,

	/// Multiplier applied to the `Symbol` probability once the symbol gap is exceeded.
	pub symbol_magnification: f64,

	/// Weight of the category term (n-gram ensemble prediction).
	pub category_weight: f64,

	/// Weight of the usage-balance term (favors less used sources).
	pub usage_weight: f64,

	/// Weight of the remaining-balance term (favors sources with more content left).
	pub remaining_weight: f64,

	/// Orders of the n-gram ensemble.
	pub orders: Vec<usize>,

	/// Guard added inside every logarithm.
	pub epsilon: f64,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			position_weight: 1.0,
			position_std_dev: 2.0,
			symbol_magnification: 3.0,
			category_weight: 1.0,
			usage_weight: 0.1,
			remaining_weight: 1.0,
			orders: vec![2, 3],
			epsilon: 1e-7,
		}
	}
}

impl GenerationConfig {
	/// Parses a TOML document.
	///
	/// # Errors
	/// Returns an error if the document is not valid TOML or fails validation.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads a TOML configuration file.
	///
	/// # Errors
	/// Returns an error if the file cannot be read, parsed, or validated.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_toml_str(&read_text(path)?)
	}

	/// Checks every constant.
	///
	/// # Errors
	/// Returns `InvalidConfig` naming the first offending field.
	pub fn validate(&self) -> Result<()> {
		let weights = [
			("position_weight", self.position_weight),
			("category_weight", self.category_weight),
			("usage_weight", self.usage_weight),
			("remaining_weight", self.remaining_weight),
		];
		for (name, value) in weights {
			if !value.is_finite() || value < 0.0 {
				return Err(BlendError::InvalidConfig(format!("{name} must be finite and >= 0, got {value}")));
			}
		}

		let positives = [
			("position_std_dev", self.position_std_dev),
			("symbol_magnification", self.symbol_magnification),
			("epsilon", self.epsilon),
		];
		for (name, value) in positives {
			if !value.is_finite() || value <= 0.0 {
				return Err(BlendError::InvalidConfig(format!("{name} must be finite and > 0, got {value}")));
			}
		}

		if self.orders.is_empty() {
			return Err(BlendError::InvalidConfig("orders cannot be empty".to_owned()));
		}
		if let Some(n) = self.orders.iter().find(|n| **n < 2) {
			return Err(BlendError::InvalidConfig(format!("orders must be >= 2, got {n}")));
		}

		Ok(())
	}

	/// `(NAME, value)` pairs of the score constants, in report order.
	pub fn constants(&self) -> [(&'static str, f64); 6] {
		[
			("POSITION_WEIGHT", self.position_weight),
			("POSITION_STD_DEV", self.position_std_dev),
			("SYMBOL_MAGNIFICATION", self.symbol_magnification),
			("CATEGORY_WEIGHT", self.category_weight),
			("USAGE_WEIGHT", self.usage_weight),
			("REMAINING_WEIGHT", self.remaining_weight),
		]
	}
}
