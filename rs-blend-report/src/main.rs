use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use rs_blend_core::model::classifier::Classifier;
use rs_blend_core::model::generation_config::GenerationConfig;
use rs_blend_core::model::generator::Generator;
use rs_blend_core::report::{Report, read_groups};

/// Vowel table picked up when `--vowels` is not given.
const DEFAULT_VOWELS_PATH: &str = "data/vowels.txt";

/// Blends every group of sentences of a file and writes a report.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Sentence groups: one sentence per line, groups separated by blank lines
	#[arg(short, long, default_value = "data/eval_data.txt")]
	input: PathBuf,

	/// Report destination
	#[arg(short, long, default_value = "output.txt")]
	output_path: PathBuf,

	/// TOML file overriding the scoring constants
	#[arg(short, long, env = "RS_BLEND_CONFIG")]
	config: Option<PathBuf>,

	/// Vowel table, one letter per line
	#[arg(short, long)]
	vowels: Option<PathBuf>,
}

fn load_classifier(path: Option<&PathBuf>) -> anyhow::Result<Classifier> {
	let path = match path {
		Some(path) => path.clone(),
		None => {
			let default = PathBuf::from(DEFAULT_VOWELS_PATH);
			if !default.exists() {
				warn!("{} not found, using the built-in vowel table", DEFAULT_VOWELS_PATH);
				return Ok(Classifier::default());
			}
			default
		}
	};
	Classifier::from_file(&path).with_context(|| format!("Failed to load vowel table {}", path.display()))
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => GenerationConfig::from_file(path)
			.with_context(|| format!("Failed to load configuration {}", path.display()))?,
		None => GenerationConfig::default(),
	};
	let classifier = Arc::new(load_classifier(args.vowels.as_ref())?);
	let mut generator = Generator::new(config, classifier)?;

	let groups = read_groups(&args.input)
		.with_context(|| format!("Failed to read sentence groups {}", args.input.display()))?;
	info!("Loaded {} groups from {}", groups.len(), args.input.display());

	let file = File::create(&args.output_path)
		.with_context(|| format!("Failed to create {}", args.output_path.display()))?;
	let mut report = Report::new(BufWriter::new(file));
	report.write_batch(&mut generator, &groups)?;

	info!("Report written to {}", args.output_path.display());
	Ok(())
}
