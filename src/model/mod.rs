//! Trained estimators and the model package that carries them
//!
//! Estimators are fitted offline; this module deserializes them from the
//! artifact and runs single-row inference. The package loader in
//! [`package`] normalizes the two artifact shapes (bare estimator vs.
//! bundle) into one internal representation.

mod forest;
mod linear;
mod mlp;
mod package;
mod tree;

pub use forest::ForestRegressor;
pub use linear::LinearRegressor;
pub use mlp::MlpRegressor;
pub use package::{ArtifactBundle, ModelPackage, RawArtifact};
pub use tree::{TreeNode, TreeRegressor};

use crate::error::{PredictError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Declared model type of a package
///
/// The tag drives the conditional-scaling policy: only scale-sensitive
/// model types get the bundled scaler applied to their input rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    RandomForest,
    LinearRegression,
    MlpRegressor,
    Unknown,
}

impl ModelType {
    /// Parse the free-form tag string stored in artifacts. Unrecognized
    /// tags map to `Unknown` rather than failing the load.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Random Forest" | "random_forest" => Self::RandomForest,
            "Linear Regression" | "linear_regression" => Self::LinearRegression,
            "MLP Regressor" | "mlp_regressor" => Self::MlpRegressor,
            _ => Self::Unknown,
        }
    }

    /// Canonical tag string, as emitted in prediction results.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::LinearRegression => "Linear Regression",
            Self::MlpRegressor => "MLP Regressor",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this model type was trained on scaled inputs.
    ///
    /// Tree ensembles are scale-insensitive and silently lose accuracy
    /// when fed scaled rows, so the policy is a fixed per-type set rather
    /// than anything inferred from estimator internals.
    pub fn requires_scaled_input(&self) -> bool {
        matches!(self, Self::MlpRegressor)
    }
}

/// A trained estimator, deserialized from the model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum Estimator {
    RandomForest(ForestRegressor),
    LinearRegression(LinearRegressor),
    MlpRegressor(MlpRegressor),
}

impl Estimator {
    /// Predict the target for one assembled feature row.
    pub fn predict_row(&self, row: &Array1<f64>) -> Result<f64> {
        match self {
            Self::RandomForest(forest) => forest.predict_row(row),
            Self::LinearRegression(linear) => linear.predict_row(row),
            Self::MlpRegressor(mlp) => mlp.predict_row(row),
        }
    }

    /// Member predictors, when the estimator is an ensemble whose
    /// members can be queried individually.
    pub fn ensemble_members(&self) -> Option<&[TreeRegressor]> {
        match self {
            Self::RandomForest(forest) => Some(forest.trees()),
            Self::LinearRegression(_) | Self::MlpRegressor(_) => None,
        }
    }

    /// Structural sanity checks run once at package load.
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::RandomForest(forest) => {
                if forest.n_trees() == 0 {
                    return Err(PredictError::Estimator("forest has no trees".to_string()));
                }
            }
            Self::LinearRegression(linear) => {
                if linear.n_features() == 0 {
                    return Err(PredictError::Estimator(
                        "linear model has no coefficients".to_string(),
                    ));
                }
            }
            Self::MlpRegressor(mlp) => mlp.validate()?,
        }
        Ok(())
    }
}
