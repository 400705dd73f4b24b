use std::f64::consts::TAU;
use std::sync::Arc;

use log::{debug, trace, warn};

use super::classifier::{Category, Classifier};
use super::distribution::Distribution;
use super::generation_config::GenerationConfig;
use super::multigram_model::MultiGramModel;
use super::sentence::Sentence;
use crate::error::{BlendError, Result};

/// Begin markers in front of every source and of the output.
const LEADING_MARKERS: usize = 2;

/// End markers behind every source.
const TRAILING_MARKERS: usize = 1;

/// Cursor of every source before the first emission (first eligible position is 2).
const INITIAL_CURSOR: usize = 1;

/// Gaussian density of `x` for a zero mean and standard deviation `std_dev`.
fn gaussian_density(x: f64, std_dev: f64) -> f64 {
	(-(x * x) / (2.0 * std_dev * std_dev)).exp() / (std_dev * TAU.sqrt())
}

/// Everything learned by `fit`. Read-only while generating.
#[derive(Clone, Debug)]
struct Fitted {
	/// Sources wrapped with 2 begin markers and 1 end marker.
	sources: Vec<Sentence>,
	model: MultiGramModel,
	/// Average spacing between symbols in the corpus (`+inf` without symbols).
	symbol_gap: f64,
	/// `positional_weights[d]`: Gaussian density at distance `d` from a cursor.
	positional_weights: Vec<f64>,
}

/// Blends several sentences into one by greedy character selection.
///
/// # Responsibilities
/// - Wrap the source sentences and train the category ensemble on them (`fit`)
/// - Score every remaining character of every source and emit the best one, until
///   an end marker is emitted (`generate`, or step by step through `decoder`)
///
/// # Notes
/// - `fit` keeps only immutable state; every decoding run starts a fresh session,
///   so `generate` can be called repeatedly and returns the same output.
#[derive(Clone, Debug)]
pub struct Generator {
	config: GenerationConfig,
	classifier: Arc<Classifier>,
	fitted: Option<Fitted>,
}

impl Default for Generator {
	/// Generator with the default constants and the built-in vowel table.
	fn default() -> Self {
		Self {
			config: GenerationConfig::default(),
			classifier: Arc::new(Classifier::default()),
			fitted: None,
		}
	}
}

impl Generator {
	/// Creates an unfitted generator.
	///
	/// # Errors
	/// Returns an error if `config` fails validation.
	pub fn new(config: GenerationConfig, classifier: Arc<Classifier>) -> Result<Self> {
		config.validate()?;
		Ok(Self { config, classifier, fitted: None })
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	pub fn classifier(&self) -> &Arc<Classifier> {
		&self.classifier
	}

	pub fn is_fitted(&self) -> bool {
		self.fitted.is_some()
	}

	/// Wrapped source sentences, once fitted.
	pub fn sources(&self) -> Option<&[Sentence]> {
		self.fitted.as_ref().map(|f| f.sources.as_slice())
	}

	/// Symbol gap threshold, once fitted.
	pub fn symbol_gap(&self) -> Option<f64> {
		self.fitted.as_ref().map(|f| f.symbol_gap)
	}

	/// Positional decay table, once fitted.
	pub fn positional_weights(&self) -> Option<&[f64]> {
		self.fitted.as_ref().map(|f| f.positional_weights.as_slice())
	}

	/// Trained category ensemble, once fitted.
	pub fn model(&self) -> Option<&MultiGramModel> {
		self.fitted.as_ref().map(|f| &f.model)
	}

	/// Learns from the source sentences, replacing any previous fit.
	///
	/// # Behavior
	/// - Wraps each sentence with 2 begin markers and 1 end marker.
	/// - Trains the n-gram ensemble on the wrapped sentences.
	/// - Computes the symbol gap threshold: content characters / symbol characters.
	/// - Precomputes the positional decay for every distance below the longest source.
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `sentences` is empty.
	pub fn fit<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<()> {
		if sentences.is_empty() {
			return Err(BlendError::EmptyCorpus);
		}

		let sources: Vec<Sentence> = sentences
			.iter()
			.map(|s| Sentence::new(s.as_ref(), LEADING_MARKERS, TRAILING_MARKERS, self.classifier.clone()))
			.collect();

		let mut model = MultiGramModel::new(&self.config.orders)?;
		model.fit(&sources);

		let content: usize = sources.iter().map(Sentence::content_len).sum();
		let symbols = sources
			.iter()
			.flat_map(Sentence::iter)
			.filter(|c| c.category() == Category::Symbol)
			.count();
		let symbol_gap = if symbols == 0 {
			warn!("No symbol in the corpus, symbol magnification disabled");
			f64::INFINITY
		} else {
			content as f64 / symbols as f64
		};

		let max_len = sources.iter().map(Sentence::len).max().unwrap_or(0);
		let positional_weights = (0..max_len)
			.map(|d| gaussian_density(d as f64, self.config.position_std_dev))
			.collect();

		debug!(
			"Fitted {} sources ({} content characters, {} symbols, symbol gap {:.3})",
			sources.len(),
			content,
			symbols,
			symbol_gap
		);

		self.fitted = Some(Fitted { sources, model, symbol_gap, positional_weights });
		Ok(())
	}

	/// Starts a new decoding session.
	///
	/// # Errors
	/// Returns `NotFitted` if `fit` was never called.
	pub fn decoder(&self) -> Result<Decoder<'_>> {
		let fitted = self.fitted.as_ref().ok_or(BlendError::NotFitted)?;
		Ok(Decoder::new(&self.config, fitted, self.classifier.clone()))
	}

	/// Generates the blended sentence.
	///
	/// Returns the content characters of the output, markers excluded.
	///
	/// # Errors
	/// - `NotFitted` if `fit` was never called.
	/// - `GenerationDidNotTerminate` if the emission ceiling is reached.
	pub fn generate(&self) -> Result<String> {
		self.decoder()?.finish()
	}
}

/// Lifecycle of a decoding session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
	/// Nothing emitted yet.
	Ready,
	/// At least one character emitted, no end marker yet.
	Emitting,
	/// An end marker was emitted (or the session failed); nothing more comes out.
	Done,
}

/// One emission of a decoding session.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
	/// Index of the source the character was taken from.
	pub source: usize,
	/// Position of the character inside the wrapped source.
	pub position: usize,
	pub text: String,
	pub category: Category,
	/// Cursors of every source after re-synchronization.
	pub cursors: Vec<usize>,
}

/// A stateful greedy decoding session over a fitted [`Generator`].
///
/// Each call to [`Decoder::step`] scores every character beyond the cursors,
/// emits the best one and drags every cursor to the same relative position.
/// Also usable as an iterator of `Result<Step>`.
#[derive(Debug)]
pub struct Decoder<'a> {
	config: &'a GenerationConfig,
	fitted: &'a Fitted,
	output: Sentence,
	/// Per source: last position already behind the reading position.
	cursors: Vec<usize>,
	/// Per source: characters emitted so far.
	emitted: Vec<usize>,
	/// Per source: content characters not emitted yet.
	remaining: Vec<usize>,
	state: DecoderState,
	emissions: usize,
	max_emissions: usize,
}

impl<'a> Decoder<'a> {
	fn new(config: &'a GenerationConfig, fitted: &'a Fitted, classifier: Arc<Classifier>) -> Self {
		let count = fitted.sources.len();
		let total_len: usize = fitted.sources.iter().map(Sentence::len).sum();

		Self {
			config,
			fitted,
			output: Sentence::new("", LEADING_MARKERS, 0, classifier),
			cursors: vec![INITIAL_CURSOR; count],
			emitted: vec![0; count],
			remaining: fitted.sources.iter().map(Sentence::content_len).collect(),
			state: DecoderState::Ready,
			emissions: 0,
			max_emissions: 2 * total_len + 1,
		}
	}

	pub fn state(&self) -> DecoderState {
		self.state
	}

	pub fn cursors(&self) -> &[usize] {
		&self.cursors
	}

	/// Output so far, begin markers included.
	pub fn output(&self) -> &Sentence {
		&self.output
	}

	/// Emits one character.
	///
	/// Returns `Ok(None)` once the session is done.
	///
	/// # Errors
	/// Returns `GenerationDidNotTerminate` if the emission ceiling is reached or
	/// no position is left to emit. The session is then done.
	pub fn step(&mut self) -> Result<Option<Step>> {
		if self.state == DecoderState::Done {
			return Ok(None);
		}

		let selected = if self.emissions < self.max_emissions {
			let scores = match self.scores() {
				Ok(scores) => scores,
				Err(e) => {
					self.state = DecoderState::Done;
					return Err(e);
				}
			};
			Self::select(&scores)
		} else {
			None
		};
		let Some((source, position)) = selected else {
			self.state = DecoderState::Done;
			return Err(BlendError::GenerationDidNotTerminate { emitted: self.emissions });
		};

		let c = self.fitted.sources[source][position].clone();
		let category = c.category();
		let text = c.text().to_owned();
		self.output.append(c);

		self.emissions += 1;
		self.emitted[source] += 1;
		self.remaining[source] = self.remaining[source].saturating_sub(1);
		self.resync(source, position);

		self.state = if category == Category::EndMarker { DecoderState::Done } else { DecoderState::Emitting };
		trace!("Emitted {:?} ({:?}) from source {} at {}, cursors {:?}", text, category, source, position, self.cursors);

		Ok(Some(Step { source, position, text, category, cursors: self.cursors.clone() }))
	}

	/// Runs the session to its end and returns the output content.
	///
	/// # Errors
	/// Propagates the first error of [`Decoder::step`].
	pub fn finish(mut self) -> Result<String> {
		while self.step()?.is_some() {}
		Ok(self.output.content_text())
	}

	/// Log-score of every position of every source.
	///
	/// Positions at or behind a cursor get `-inf`; every other position sums the
	/// weighted positional, category, usage-balance and remaining-balance terms.
	fn scores(&self) -> Result<Vec<Vec<f64>>> {
		let config = self.config;
		let eps = config.epsilon;
		let distribution = self.category_distribution()?;
		let usage = self.usage_weights();
		let remaining = self.remaining_weights();

		let scores = self
			.fitted
			.sources
			.iter()
			.zip(&self.cursors)
			.enumerate()
			.map(|(s, (source, &cursor))| {
				let balance = (usage[s] + eps).ln() * config.usage_weight
					+ (remaining[s] + eps).ln() * config.remaining_weight;
				source
					.iter()
					.enumerate()
					.map(|(position, c)| {
						if position <= cursor {
							return f64::NEG_INFINITY;
						}
						let closeness = self.fitted.positional_weights.get(position - cursor).copied().unwrap_or(0.0);
						(closeness + eps).ln() * config.position_weight
							+ (distribution[c.category()] + eps).ln() * config.category_weight
							+ balance
					})
					.collect()
			})
			.collect();

		Ok(scores)
	}

	/// Ensemble prediction after the output so far, with the symbol boost applied.
	fn category_distribution(&self) -> Result<Distribution> {
		let context_len = self.fitted.model.context_len();
		let categories: Vec<Category> = self.output.categories().collect();
		let tail = &categories[categories.len().saturating_sub(context_len)..];
		let context: Vec<Category> = std::iter::repeat_n(Category::BeginMarker, context_len - tail.len())
			.chain(tail.iter().copied())
			.collect();

		let mut distribution = self.fitted.model.predict(&context)?;
		distribution[Category::Symbol] *= self.symbol_magnification();
		Ok(distribution)
	}

	/// Boost for `Symbol` once the output ran longer than the symbol gap without one.
	///
	/// The run is counted back from the end of the output up to the last symbol or
	/// end marker; leading begin markers count.
	fn symbol_magnification(&self) -> f64 {
		let run = self
			.output
			.iter()
			.rev()
			.take_while(|c| !matches!(c.category(), Category::Symbol | Category::EndMarker))
			.count();
		if run as f64 > self.fitted.symbol_gap { self.config.symbol_magnification } else { 1.0 }
	}

	/// `(max emitted + 1 - emitted[s])`, normalized over sources.
	fn usage_weights(&self) -> Vec<f64> {
		let max = self.emitted.iter().copied().max().unwrap_or(0);
		let inverse: Vec<f64> = self.emitted.iter().map(|e| (max + 1 - e) as f64).collect();
		let total: f64 = inverse.iter().sum();
		inverse.iter().map(|v| v / total).collect()
	}

	/// `remaining[s]` normalized over sources, uniform once nothing remains.
	fn remaining_weights(&self) -> Vec<f64> {
		let total: usize = self.remaining.iter().sum();
		if total == 0 {
			debug!("No content left in any source, remaining weights are uniform");
			let uniform = 1.0 / self.remaining.len().max(1) as f64;
			return vec![uniform; self.remaining.len()];
		}
		self.remaining.iter().map(|r| *r as f64 / total as f64).collect()
	}

	/// First `(source, position)` holding the strictly greatest score.
	///
	/// Sources are scanned in order, positions ascending, so ties go to the earliest.
	/// Returns `None` when every score is `-inf`.
	fn select(scores: &[Vec<f64>]) -> Option<(usize, usize)> {
		let mut best = f64::NEG_INFINITY;
		let mut selected = None;
		for (source, row) in scores.iter().enumerate() {
			for (position, &score) in row.iter().enumerate() {
				if score > best {
					best = score;
					selected = Some((source, position));
				}
			}
		}
		selected
	}

	/// Moves every cursor to the relative position of the emitted character.
	///
	/// `cursor = round(len * ratio) - 1` with `ratio = (position + 1) / len(chosen)`,
	/// never moving backwards.
	fn resync(&mut self, source: usize, position: usize) {
		let ratio = (position + 1) as f64 / self.fitted.sources[source].len() as f64;
		for (cursor, sentence) in self.cursors.iter_mut().zip(&self.fitted.sources) {
			let synced = ((sentence.len() as f64 * ratio).round_ties_even() as usize).saturating_sub(1);
			*cursor = (*cursor).max(synced);
		}
	}
}

impl Iterator for Decoder<'_> {
	type Item = Result<Step>;

	fn next(&mut self) -> Option<Self::Item> {
		self.step().transpose()
	}
}
