//! PrismColumnar - Main Entry Point
//!
//! Command line front end for analyzing, encoding and decoding single column
//! chunks. Values are read one per line.

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prism_columnar::{
    decompress, registry, ColumnType, CompressionConfig, CompressionScheme, CompressionSelector,
    EncodedBlock, ScalarValue,
};

#[derive(Parser)]
#[command(name = "prism-columnar")]
#[command(about = "PrismColumnar - columnar compression schemes for typed column chunks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate every applicable scheme and report the one selected
    Analyze {
        /// Column type (boolean, byte, short, int, long, float, double, string)
        #[arg(short = 't', long = "type")]
        column_type: ColumnType,

        /// Input file with one value per line (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON compression config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Encode a column into a single block
    Encode {
        #[arg(short = 't', long = "type")]
        column_type: ColumnType,

        #[arg(short, long)]
        input: PathBuf,

        /// Destination block file
        #[arg(short, long)]
        output: PathBuf,

        /// Force a scheme instead of selecting one
        #[arg(short, long)]
        scheme: Option<CompressionScheme>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode a block and print one value per line
    Decode {
        #[arg(short = 't', long = "type")]
        column_type: ColumnType,

        /// Block file produced by `encode`
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Loads the config file if given, then applies environment overrides
fn load_config(path: Option<&Path>) -> anyhow::Result<CompressionConfig> {
    let config = match path {
        Some(path) => CompressionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CompressionConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

/// Parses one value per line, skipping blank lines
fn parse_values(reader: impl BufRead, column_type: ColumnType) -> anyhow::Result<Vec<ScalarValue>> {
    let mut values = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() && column_type != ColumnType::String {
            continue;
        }
        let value = ScalarValue::parse(column_type, &line)
            .with_context(|| format!("Invalid value on line {}", index + 1))?;
        values.push(value);
    }
    Ok(values)
}

fn read_values(path: Option<&Path>, column_type: ColumnType) -> anyhow::Result<Vec<ScalarValue>> {
    match path {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            parse_values(BufReader::new(file), column_type)
        }
        None => parse_values(io::stdin().lock(), column_type),
    }
}

fn run_analyze(
    column_type: ColumnType,
    input: Option<&Path>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let selector = CompressionSelector::with_config(load_config(config)?)?;
    let values = read_values(input, column_type)?;
    let results = selector.analyze(column_type, &values)?;

    println!("{} values of type {}", values.len(), column_type);
    println!("{:<14} {:>12} {:>12} {:>8}", "scheme", "raw", "encoded", "ratio");
    for result in &results {
        println!(
            "{:<14} {:>12} {:>12} {:>8.2}",
            result.scheme, result.uncompressed_size, result.compressed_size, result.compression_ratio
        );
    }
    println!("selected: {}", selector.select_scheme(column_type, &values)?);
    Ok(())
}

fn run_encode(
    column_type: ColumnType,
    input: &Path,
    output: &Path,
    scheme: Option<CompressionScheme>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let selector = CompressionSelector::with_config(load_config(config)?)?;
    let values = read_values(Some(input), column_type)?;

    let block = match scheme {
        Some(scheme) => {
            if !scheme.supports(column_type) {
                bail!("Scheme {} does not support {} columns", scheme, column_type);
            }
            selector.encode_with(scheme, column_type, &values)?
        }
        None => selector.compress(column_type, &values)?,
    };

    fs::write(output, block.as_ref())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let scheme = registry().lookup(block.type_id())?;
    eprintln!(
        "Encoded {} values with {} into {} bytes",
        values.len(),
        scheme,
        block.len()
    );
    Ok(())
}

fn run_decode(column_type: ColumnType, input: &Path) -> anyhow::Result<()> {
    let mut bytes = Vec::new();
    fs::File::open(input)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let block = EncodedBlock::new(bytes)?;
    let values = decompress(block, column_type)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for value in values {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            column_type,
            input,
            config,
        } => run_analyze(column_type, input.as_deref(), config.as_deref()),
        Commands::Encode {
            column_type,
            input,
            output,
            scheme,
            config,
        } => run_encode(
            column_type,
            &input,
            &output,
            scheme,
            config.as_deref(),
        ),
        Commands::Decode { column_type, input } => run_decode(column_type, &input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
