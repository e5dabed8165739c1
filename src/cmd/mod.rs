mod glob_util;

use crate::convert::{self, ConvertConfig, ConvertStats};
use crate::data::DEFAULT_BATCH_SIZE;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use glob_util::expand_inputs;

#[derive(Parser)]
#[command(name = "mysql2pg")]
#[command(version)]
#[command(about = "Convert MySQL dumps into a PostgreSQL schema file and per-table data files", long_about = None)]
pub struct Cli {
    /// MySQL dump files or glob patterns (e.g., dump.sql, dumps/*.sql.gz)
    /// Supports .gz, .bz2, .xz, .zst compression
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for the data_for_<table>.sql files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Schema output file
    #[arg(short, long, default_value = "schema.sql")]
    pub schema: PathBuf,

    /// Maximum number of rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// YAML file with extra type translations, drop prefixes and replacements
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show progress during processing
    #[arg(short, long)]
    pub progress: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print run statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Parse and validate the dumps without writing files
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.batch_size == 0 {
        anyhow::bail!("--batch-size must be at least 1");
    }

    let inputs = expand_inputs(&cli.files)?;

    let config = ConvertConfig {
        inputs,
        output_dir: cli.output_dir,
        schema_path: cli.schema,
        batch_size: cli.batch_size,
        dialect_config: cli.config,
        progress: cli.progress,
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    };
    let schema_path = config.schema_path.clone();
    let dry_run = config.dry_run;

    let start_time = Instant::now();
    let stats = convert::run(config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if !cli.quiet {
        print_stats(&stats, &schema_path, dry_run);
        eprintln!("✓ Conversion completed in {:.3?}", start_time.elapsed());
    }

    Ok(())
}

fn print_stats(stats: &ConvertStats, schema_path: &std::path::Path, dry_run: bool) {
    eprintln!();
    eprintln!("Conversion Statistics:");
    eprintln!("  Files converted: {}", stats.files);
    eprintln!("  Tables: {}", stats.tables);
    eprintln!("  Indexes: {}", stats.indexes);
    eprintln!("  INSERT lines read: {}", stats.data.insert_lines);
    eprintln!("  Rows re-encoded: {}", stats.data.tuples);
    eprintln!("  INSERT statements written: {}", stats.data.statements);

    if !stats.data.tables.is_empty() {
        eprintln!();
        eprintln!("{:<40} {:>12}", "Table Name", "Rows");
        eprintln!("{}", "─".repeat(53));
        for (table, rows) in &stats.data.tables {
            eprintln!("{:<40} {:>12}", table, rows);
        }
    }

    eprintln!();
    if dry_run {
        eprintln!("(Dry run - no output written)");
    } else {
        eprintln!("Schema written to {}", schema_path.display());
    }
}
