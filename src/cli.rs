//! Command-line interface
//!
//! Two commands mirror the two pipeline entry points: `single` scores
//! one request given positionally, `batch` scores a tabular file. Both
//! write JSON to stdout. Prediction-domain failures (unknown category,
//! bad feature value, missing batch columns) are part of the output
//! contract and print as an `{"error": ...}` document with a zero exit;
//! only setup failures such as an unreadable model artifact exit
//! non-zero.

use clap::{Parser, Subcommand};
use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::PredictError;
use crate::features::RawFeatureRow;
use crate::model::ModelPackage;
use crate::pipeline::PredictionPipeline;
use crate::preprocessing::EncoderRegistry;

#[derive(Parser)]
#[command(name = "cropcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Agricultural commodity price prediction")]
#[command(long_about = None)]
pub struct Cli {
    /// Model artifact file (JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Directory holding the legacy split encoder files
    /// (district-enc.json, markets-enc.json, variety-enc.json)
    #[arg(long)]
    pub encoder_dir: Option<PathBuf>,

    /// Use the built-in static encoding tables instead of bundled or
    /// split encoders
    #[arg(long, conflicts_with = "encoder_dir")]
    pub static_encoders: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a single request
    Single {
        district: String,
        market: String,
        variety: String,
        year: String,
        month: String,
        rainfall_minus1: String,
        rainfall_minus2: String,
        rainfall_minus3: String,
        total_rainfall_3months: String,
        area_hectare: String,
        yield_tonne_per_hectare: String,
    },

    /// Score every row of a tabular file
    Batch {
        /// Input data file (CSV or JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let mut package = ModelPackage::load(&cli.model)?;

    if let Some(dir) = &cli.encoder_dir {
        let encoders = EncoderRegistry::load_split(
            dir.join("district-enc.json"),
            dir.join("markets-enc.json"),
            dir.join("variety-enc.json"),
        )?;
        package = package.with_encoders(encoders);
    } else if cli.static_encoders {
        package = package.with_encoders(EncoderRegistry::static_fallback());
    }

    let pipeline = PredictionPipeline::new(package);

    match cli.command {
        Commands::Single {
            district,
            market,
            variety,
            year,
            month,
            rainfall_minus1,
            rainfall_minus2,
            rainfall_minus3,
            total_rainfall_3months,
            area_hectare,
            yield_tonne_per_hectare,
        } => {
            let values = [
                district,
                market,
                variety,
                year,
                month,
                rainfall_minus1,
                rainfall_minus2,
                rainfall_minus3,
                total_rainfall_3months,
                area_hectare,
                yield_tonne_per_hectare,
            ];
            cmd_single(&pipeline, &values)
        }
        Commands::Batch { data, output } => cmd_batch(&pipeline, &data, output.as_deref()),
    }
}

pub fn cmd_single(pipeline: &PredictionPipeline, values: &[String]) -> anyhow::Result<()> {
    let result = RawFeatureRow::parse(values)
        .and_then(|raw| pipeline.predict_single(&raw));

    match result {
        Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        Err(e) => print_error_document(&e)?,
    }
    Ok(())
}

pub fn cmd_batch(
    pipeline: &PredictionPipeline,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let df = load_data(data_path)?;
    tracing::info!(rows = df.height(), path = %data_path.display(), "batch input loaded");

    match pipeline.predict_table(&df) {
        Ok(outcome) => {
            let json = serde_json::to_string_pretty(&outcome)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{}", json),
            }
        }
        Err(e) => print_error_document(&e)?,
    }
    Ok(())
}

fn print_error_document(e: &PredictError) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "error": e.to_string() }))?
    );
    Ok(())
}

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "json" => JsonReader::new(std::fs::File::open(path)?).finish()?,
        _ => anyhow::bail!("Unsupported file format: {}", ext),
    };

    Ok(df)
}
