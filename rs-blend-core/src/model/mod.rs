//! Top-level module for the sentence blending system.
//!
//! This module provides the blending engine, including:
//! - Character classification (`Classifier`, `Category`)
//! - Classified sentences (`Sentence`, `Char`)
//! - Fixed-order category n-gram models (`NGramModel`)
//! - Multi-order averaged models (`MultiGramModel`)
//! - Engine configuration (`GenerationConfig`)
//! - The greedy blending engine (`Generator`, `Decoder`)

/// Character categories and the vowel-table classifier.
pub mod classifier;

/// Ordered sequences of classified characters, with optional sentinel padding.
pub mod sentence;

/// Next-category probability distributions.
pub mod distribution;

/// Fixed-order category n-gram model (`n >= 2`).
///
/// Handles n-gram counting with additive smoothing, conversion to
/// conditional probabilities, prediction and merging.
pub mod ngram_model;

/// Ensemble of n-gram models of distinct orders, averaging their predictions.
pub mod multigram_model;

/// Tunable constants of the engine, loadable from TOML.
pub mod generation_config;

/// High-level interface blending several sentences into one.
///
/// Exposes fitting on source sentences, one-shot generation and
/// step-by-step decoding.
pub mod generator;
