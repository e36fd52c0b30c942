//! End-to-end prediction pipeline
//!
//! One pipeline wraps one normalized model package and serves three
//! entry points: a single typed request, a slice of typed requests, and
//! a tabular batch. Batch rows are isolated: a failing row produces an
//! error entry in its position and never aborts its neighbors. The only
//! whole-batch failure is the up-front required-column check.

use crate::confidence::estimate_confidence;
use crate::error::{PredictError, Result};
use crate::features::{self, RawFeatureRow};
use crate::model::ModelPackage;
use crate::preprocessing::{DISTRICT_FIELD, MARKET_FIELD, VARIETY_FIELD};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Columns a tabular batch must carry. Categorical columns are not in
/// this set: packages without encoders take pre-coded numeric values,
/// so their absence is a per-row concern, not a batch-level one.
pub const BATCH_REQUIRED_COLUMNS: [&str; 8] = [
    "Year",
    "Month",
    "Rainfall_Minus1",
    "Rainfall_Minus2",
    "Rainfall_Minus3",
    "Total_Rainfall_3Months",
    "Area (Hectare)",
    "Yield (Tonne/Hectare)",
];

/// Rainfall block of the echoed input features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallData {
    pub minus1: f64,
    pub minus2: f64,
    pub minus3: f64,
    #[serde(rename = "total3months")]
    pub total_3months: f64,
}

/// Production block of the echoed input features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionData {
    pub area_hectare: f64,
    pub yield_tonne_per_hectare: f64,
}

/// The request echoed back alongside a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFeatures {
    pub district: String,
    pub market: String,
    pub variety: String,
    pub year: i32,
    pub month: u32,
    pub rainfall_data: RainfallData,
    pub production_data: ProductionData,
}

impl InputFeatures {
    fn from_raw(raw: &RawFeatureRow) -> Self {
        Self {
            district: raw.district.clone(),
            market: raw.market.clone(),
            variety: raw.variety.clone(),
            year: raw.year,
            month: raw.month,
            rainfall_data: RainfallData {
                minus1: raw.rainfall_minus1,
                minus2: raw.rainfall_minus2,
                minus3: raw.rainfall_minus3,
                total_3months: raw.total_rainfall_3months,
            },
            production_data: ProductionData {
                area_hectare: raw.area_hectare,
                yield_tonne_per_hectare: raw.yield_tonne_per_hectare,
            },
        }
    }
}

/// One successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: f64,
    pub confidence: f64,
    pub model_type: String,
    pub input_features: InputFeatures,
}

/// One positional batch entry: a prediction or the row's own error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Ok(PredictionResult),
    Err { error: String },
}

impl BatchEntry {
    /// The prediction, when this entry succeeded.
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            Self::Ok(result) => Some(result),
            Self::Err { .. } => None,
        }
    }
}

/// A completed batch: one entry per input row, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub predictions: Vec<BatchEntry>,
    /// Count of successful rows only.
    pub total_processed: usize,
}

/// The prediction pipeline for one loaded model package
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    package: ModelPackage,
}

impl PredictionPipeline {
    /// Wrap a loaded package.
    pub fn new(package: ModelPackage) -> Self {
        Self { package }
    }

    /// The wrapped package.
    pub fn package(&self) -> &ModelPackage {
        &self.package
    }

    /// Score one request.
    ///
    /// The confidence score is rounded to one decimal; the prediction
    /// itself is reported at full precision.
    pub fn predict_single(&self, raw: &RawFeatureRow) -> Result<PredictionResult> {
        let row = features::assemble(raw, &self.package)?;
        let prediction = self.package.estimator().predict_row(&row)?;
        let confidence = round_one_decimal(estimate_confidence(&self.package, &row));

        tracing::debug!(
            district = %raw.district,
            prediction,
            confidence,
            "scored request"
        );

        Ok(PredictionResult {
            prediction,
            confidence,
            model_type: self.package.model_type().tag().to_string(),
            input_features: InputFeatures::from_raw(raw),
        })
    }

    /// Score a slice of typed requests with per-row isolation.
    pub fn predict_rows(&self, rows: &[RawFeatureRow]) -> BatchOutcome {
        let predictions: Vec<BatchEntry> = rows
            .iter()
            .map(|raw| match self.predict_single(raw) {
                Ok(result) => BatchEntry::Ok(result),
                Err(e) => BatchEntry::Err {
                    error: e.to_string(),
                },
            })
            .collect();

        let total_processed = predictions.iter().filter(|e| e.result().is_some()).count();
        tracing::info!(
            rows = rows.len(),
            succeeded = total_processed,
            "batch scored"
        );
        BatchOutcome {
            predictions,
            total_processed,
        }
    }

    /// Score a tabular batch.
    ///
    /// All required columns are checked before any row is scored; the
    /// aggregate [`PredictError::MissingColumns`] names every absent
    /// column at once. Categorical columns are read when present and
    /// default to empty strings otherwise.
    pub fn predict_table(&self, df: &DataFrame) -> Result<BatchOutcome> {
        let missing: Vec<String> = BATCH_REQUIRED_COLUMNS
            .iter()
            .filter(|name| df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PredictError::MissingColumns { missing });
        }

        let rows: Vec<Result<RawFeatureRow>> = (0..df.height())
            .map(|idx| table_row(df, idx))
            .collect();

        let predictions: Vec<BatchEntry> = rows
            .into_iter()
            .map(|row| {
                let result = row.and_then(|raw| self.predict_single(&raw));
                match result {
                    Ok(result) => BatchEntry::Ok(result),
                    Err(e) => BatchEntry::Err {
                        error: e.to_string(),
                    },
                }
            })
            .collect();

        let total_processed = predictions.iter().filter(|e| e.result().is_some()).count();
        tracing::info!(
            rows = df.height(),
            succeeded = total_processed,
            "tabular batch scored"
        );
        Ok(BatchOutcome {
            predictions,
            total_processed,
        })
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn cell_error(field: &str, value: impl ToString) -> PredictError {
    PredictError::FeatureParse {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Numeric cell with string fallback: CSV readers occasionally infer a
/// numeric column as strings when it carries stray whitespace.
fn cell_f64(df: &DataFrame, name: &str, idx: usize) -> Result<f64> {
    let value = df.column(name)?.get(idx)?;
    match value {
        AnyValue::Null => Err(cell_error(name, "null")),
        AnyValue::String(s) => s.trim().parse().map_err(|_| cell_error(name, s)),
        AnyValue::StringOwned(ref s) => {
            s.as_str().trim().parse().map_err(|_| cell_error(name, s))
        }
        other => {
            let shown = other.to_string();
            other.try_extract::<f64>().map_err(|_| cell_error(name, shown))
        }
    }
}

fn cell_i64(df: &DataFrame, name: &str, idx: usize) -> Result<i64> {
    let v = cell_f64(df, name, idx)?;
    if v.fract() != 0.0 {
        return Err(cell_error(name, v));
    }
    Ok(v as i64)
}

/// Categorical cell. Absent column or null cell yields an empty string,
/// which then fails row-locally during encoding; numeric cells are
/// rendered back to text so pre-coded batches keep working.
fn cell_string(df: &DataFrame, name: &str, idx: usize) -> Result<String> {
    let Ok(column) = df.column(name) else {
        return Ok(String::new());
    };
    let value = column.get(idx)?;
    Ok(match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.trim().to_string(),
        AnyValue::StringOwned(ref s) => s.as_str().trim().to_string(),
        other => match other.try_extract::<i64>() {
            Ok(code) => code.to_string(),
            Err(_) => other.to_string(),
        },
    })
}

fn table_row(df: &DataFrame, idx: usize) -> Result<RawFeatureRow> {
    let year = cell_i64(df, "Year", idx)?;
    let year = i32::try_from(year).map_err(|_| cell_error("Year", year))?;
    let month = cell_i64(df, "Month", idx)?;
    let month = u32::try_from(month).map_err(|_| cell_error("Month", month))?;

    let row = RawFeatureRow {
        district: cell_string(df, DISTRICT_FIELD, idx)?,
        market: cell_string(df, MARKET_FIELD, idx)?,
        variety: cell_string(df, VARIETY_FIELD, idx)?,
        year,
        month,
        rainfall_minus1: cell_f64(df, "Rainfall_Minus1", idx)?,
        rainfall_minus2: cell_f64(df, "Rainfall_Minus2", idx)?,
        rainfall_minus3: cell_f64(df, "Rainfall_Minus3", idx)?,
        total_rainfall_3months: cell_f64(df, "Total_Rainfall_3Months", idx)?,
        area_hectare: cell_f64(df, "Area (Hectare)", idx)?,
        yield_tonne_per_hectare: cell_f64(df, "Yield (Tonne/Hectare)", idx)?,
    };
    row.validate()?;
    Ok(row)
}
