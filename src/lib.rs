//! Cropcast - Crop price prediction pipeline
//!
//! This crate turns trained regression model artifacts into price
//! predictions for agricultural commodity markets:
//! - Artifact loading with shape normalization (bare estimator or
//!   bundled package with encoders and scaler)
//! - Training-faithful feature assembly: categorical encoding, fixed
//!   column order, conditional scaling
//! - Ensemble-spread confidence scoring
//! - Single and batch prediction with per-row isolation
//!
//! # Modules
//!
//! - [`model`] - Estimators, artifact shapes, the normalized package
//! - [`preprocessing`] - Categorical encoders and the standard scaler
//! - [`features`] - Raw request rows and the feature assembler
//! - [`confidence`] - Ensemble-spread confidence estimation
//! - [`pipeline`] - Single and batch prediction entry points
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Prediction pipeline
pub mod confidence;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod preprocessing;

// Services
pub mod cli;

pub use error::{PredictError, Result};
pub use features::RawFeatureRow;
pub use model::{ModelPackage, ModelType};
pub use pipeline::{BatchOutcome, PredictionPipeline, PredictionResult};
