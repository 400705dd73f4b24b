//! Sentence blending library.
//!
//! This crate blends several sentences (usually one idea written in different
//! languages) into a single synthetic sentence, picking characters greedily from
//! the inputs under:
//! - A category n-gram ensemble (consonant / vowel / symbol / markers)
//! - A Gaussian positional decay around per-source cursors
//! - Usage and remaining-content balancing across sources
//!
//! ```no_run
//! use rs_blend_core::model::generator::Generator;
//!
//! let mut generator = Generator::default();
//! generator.fit(&["Good morning", "Bonjour", "Buenos días"])?;
//! println!("{}", generator.generate()?);
//! # Ok::<(), rs_blend_core::error::BlendError>(())
//! ```

/// Blending engine and the models it relies on.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// Batch report over groups of sentences.
pub mod report;

/// I/O utilities (file loading).
///
/// Not exposed
pub(crate) mod io;
