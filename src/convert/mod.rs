//! Two-pass conversion driver.
//!
//! For each input dump, in order:
//! 1. the schema pass translates table definitions and appends them to the
//!    schema file (created once per run)
//! 2. the recorded column types are sealed and handed to the data pass, which
//!    writes `data_for_<table>.sql` files
//!
//! A failing file aborts the run.

use crate::data::{DataReencoder, DataStats, DEFAULT_BATCH_SIZE};
use crate::dialect::{DialectRules, DialectYamlConfig};
use crate::input::open_dump;
use crate::schema::SchemaTranslator;
use crate::writer::TableWriter;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Configuration for a conversion run
#[derive(Debug)]
pub struct ConvertConfig {
    /// Input dumps, in processing order
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the data files
    pub output_dir: PathBuf,
    /// Schema output file
    pub schema_path: PathBuf,
    /// Maximum tuples per INSERT statement
    pub batch_size: usize,
    /// Optional YAML dialect overrides
    pub dialect_config: Option<PathBuf>,
    /// Show a spinner per pass
    pub progress: bool,
    /// Suppress diagnostics
    pub quiet: bool,
    /// Parse everything, write nothing
    pub dry_run: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            schema_path: PathBuf::from("schema.sql"),
            batch_size: DEFAULT_BATCH_SIZE,
            dialect_config: None,
            progress: false,
            quiet: false,
            dry_run: false,
        }
    }
}

/// Statistics from a conversion run
#[derive(Debug, Default, Serialize)]
pub struct ConvertStats {
    /// Dump files converted
    pub files: u64,
    /// Tables written to the schema
    pub tables: u64,
    /// Index statements generated from key clauses
    pub indexes: u64,
    /// Schema lines written
    pub schema_lines: u64,
    /// Data pass counters
    pub data: DataStats,
}

pub fn run(config: ConvertConfig) -> anyhow::Result<ConvertStats> {
    let rules = match &config.dialect_config {
        Some(path) => DialectRules::new().with_overrides(DialectYamlConfig::load(path)?),
        None => DialectRules::new(),
    };

    if !config.dry_run {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Cannot create output directory: {}", config.output_dir.display())
        })?;
    }

    let mut schema_out = if config.dry_run {
        None
    } else {
        Some(TableWriter::create(&config.schema_path).with_context(|| {
            format!("Cannot create schema file: {}", config.schema_path.display())
        })?)
    };

    let mut translator = SchemaTranslator::new(rules);
    let mut reencoder = DataReencoder::new(config.output_dir.clone())
        .with_batch_size(config.batch_size)
        .with_quiet(config.quiet)
        .with_dry_run(config.dry_run);
    let mut stats = ConvertStats::default();

    // Close the schema file on every exit path; a failed flush is an error
    let result = convert_inputs(
        &config,
        &mut translator,
        &mut reencoder,
        schema_out.as_mut(),
        &mut stats,
    );
    let closed = schema_out.map(TableWriter::close).transpose();
    result?;
    closed.with_context(|| {
        format!("Cannot write schema file: {}", config.schema_path.display())
    })?;

    stats.data = reencoder.stats().clone();
    Ok(stats)
}

fn convert_inputs(
    config: &ConvertConfig,
    translator: &mut SchemaTranslator,
    reencoder: &mut DataReencoder,
    mut schema_out: Option<&mut TableWriter>,
    stats: &mut ConvertStats,
) -> anyhow::Result<()> {
    let total = config.inputs.len();

    for (idx, file) in config.inputs.iter().enumerate() {
        if !config.quiet {
            eprintln!("[{}/{}] Converting: {}", idx + 1, total, file.display());
        }

        let (reader, pb) = open_input(file, config.progress, "schema")?;
        translator
            .parse_reader(reader)
            .with_context(|| format!("Schema pass failed for {}", file.display()))?;
        finish_progress(pb, "schema translated");

        if let Some(writer) = schema_out.as_deref_mut() {
            for line in translator.output() {
                writer.write_statement(line)?;
            }
        }
        let schema_stats = translator.stats();
        stats.tables += schema_stats.tables;
        stats.indexes += schema_stats.indexes;
        stats.schema_lines += translator.output().len() as u64;

        let registry = translator.seal();

        let (reader, pb) = open_input(file, config.progress, "data")?;
        reencoder
            .parse_reader(reader, &registry)
            .with_context(|| format!("Data pass failed for {}", file.display()))?;
        finish_progress(pb, "data re-encoded");

        stats.files += 1;
    }

    Ok(())
}

/// Open a dump for one pass, with a byte-count spinner when requested.
fn open_input(
    file: &Path,
    progress: bool,
    pass: &'static str,
) -> anyhow::Result<(Box<dyn Read>, Option<ProgressBar>)> {
    let pb = if progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("{} pass...", pass));
        Some(pb)
    } else {
        None
    };

    let callback: Option<Box<dyn Fn(u64)>> = pb.clone().map(|pb| {
        Box::new(move |bytes: u64| {
            pb.set_message(format!(
                "{} pass: {:.2} MB read",
                pass,
                bytes as f64 / (1024.0 * 1024.0)
            ));
            pb.tick();
        }) as Box<dyn Fn(u64)>
    });

    let reader = open_dump(file, callback)
        .with_context(|| format!("Cannot open input file: {}", file.display()))?;
    Ok((reader, pb))
}

fn finish_progress(pb: Option<ProgressBar>, message: &'static str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message);
    }
}
