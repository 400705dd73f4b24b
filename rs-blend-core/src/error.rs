use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, BlendError>;

/// Every failure the blending engine can report.
///
/// Classification and sentence handling never fail: any string maps to a category.
/// The variants below cover misuse of the engine, invalid configuration and
/// external I/O.
#[derive(Error, Debug)]
pub enum BlendError {
	/// `generate` (or a decoder) was requested before `fit`.
	#[error("Generator has not been fitted")]
	NotFitted,

	/// `fit` was given no sentences at all.
	#[error("Cannot fit on an empty list of sentences")]
	EmptyCorpus,

	/// An n-gram model needs `n >= 2`.
	#[error("n must be >= 2, got {n}")]
	InvalidOrder { n: usize },

	/// Two models of different orders were merged.
	#[error("N mismatch: expected {expected}, got {got}")]
	OrderMismatch { expected: usize, got: usize },

	/// Two ensembles holding different sets of orders were merged.
	#[error("Order set mismatch: expected {expected:?}, got {got:?}")]
	OrderSetMismatch { expected: Vec<usize>, got: Vec<usize> },

	/// An ensemble was built without any member model.
	#[error("At least one n-gram order is required")]
	NoOrders,

	/// A prediction context did not have the length the model expects.
	///
	/// This is an internal contract: the engine always builds contexts of the right length.
	#[error("Invalid context length: expected {expected}, got {got}")]
	InvalidContext { expected: usize, got: usize },

	/// The decoding loop exceeded its emission ceiling without reaching an end marker.
	#[error("Generation did not terminate after {emitted} emissions")]
	GenerationDidNotTerminate { emitted: usize },

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Configuration parse error: {0}")]
	ConfigParse(#[from] toml::de::Error),
}
