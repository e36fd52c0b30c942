//! Ensemble-spread confidence estimation
//!
//! The score is a heuristic proxy for predictive uncertainty, not a
//! calibrated interval: member predictors of an ensemble are queried for
//! the same row and the spread of their answers is mapped to a bounded
//! score. Non-ensemble estimators get a fixed placeholder value, which
//! is a documented design placeholder rather than derived uncertainty.

use crate::error::{PredictError, Result};
use crate::model::{ModelPackage, TreeRegressor};
use ndarray::Array1;
use rayon::prelude::*;

/// Placeholder confidence for estimators without queryable members.
pub const DEFAULT_CONFIDENCE: f64 = 85.0;

/// Upper bound on member predictors queried per request. Ensembles can
/// be large; the spread estimate stabilizes well before this.
pub const MAX_SAMPLED_MEMBERS: usize = 50;

/// Lower clamp of the confidence score.
pub const MIN_CONFIDENCE: f64 = 60.0;

/// Upper clamp of the confidence score.
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Estimate the confidence score for one assembled (and, where the
/// package's policy says so, already scaled) feature row.
///
/// Failures while querying members never escalate: the price prediction
/// stays available and the score degrades to [`DEFAULT_CONFIDENCE`].
pub fn estimate_confidence(package: &ModelPackage, row: &Array1<f64>) -> f64 {
    if !package.supports_ensemble_sampling() {
        return DEFAULT_CONFIDENCE;
    }
    let Some(members) = package.estimator().ensemble_members() else {
        return DEFAULT_CONFIDENCE;
    };

    match sample_member_spread(members, row) {
        Ok(confidence) => confidence,
        Err(e) => {
            tracing::debug!(error = %e, "member sampling failed, using placeholder confidence");
            DEFAULT_CONFIDENCE
        }
    }
}

/// Query up to [`MAX_SAMPLED_MEMBERS`] members for the same row and map
/// the population standard deviation of their predictions through the
/// monotonically decreasing transform `90 - 2 * std_dev`, clamped to
/// [`MIN_CONFIDENCE`]..[`MAX_CONFIDENCE`].
fn sample_member_spread(members: &[TreeRegressor], row: &Array1<f64>) -> Result<f64> {
    let sampled = &members[..members.len().min(MAX_SAMPLED_MEMBERS)];
    if sampled.is_empty() {
        return Err(PredictError::Estimator(
            "ensemble has no members to sample".to_string(),
        ));
    }

    let predictions = sampled
        .par_iter()
        .map(|member| member.predict_row(&row.view()))
        .collect::<Result<Vec<f64>>>()?;

    let n = predictions.len() as f64;
    let mean = predictions.iter().sum::<f64>() / n;
    let variance = predictions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    Ok((90.0 - 2.0 * std_dev).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
}
