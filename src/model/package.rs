//! Model artifact loading and package normalization
//!
//! Artifacts come in two shapes: a bare estimator document, or a bundle
//! carrying the estimator together with its fitted encoders, an optional
//! scaler and a model-type tag. The shape is detected exactly once here
//! and resolved into [`ModelPackage`]; downstream code never re-inspects
//! the raw artifact.

use crate::error::{PredictError, Result};
use crate::preprocessing::{EncoderRegistry, StandardScaler};
use super::{Estimator, ModelType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bundle artifact shape: estimator plus preprocessing state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub model: Estimator,
    #[serde(default)]
    pub label_encoders: Option<EncoderRegistry>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub model_type: Option<String>,
}

/// On-disk artifact document, produced by the offline training step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawArtifact {
    Bundle(ArtifactBundle),
    Bare(Estimator),
}

/// A normalized model package
///
/// Owns the estimator, encoders and scaler for the lifetime of one
/// invocation; the pipeline borrows them read-only per request. The
/// scaler field is the already-resolved scaling policy: it is populated
/// only when the declared model type requires scaled input, so callers
/// apply it unconditionally when present.
#[derive(Debug, Clone)]
pub struct ModelPackage {
    estimator: Estimator,
    encoders: Option<EncoderRegistry>,
    scaler: Option<StandardScaler>,
    model_type: ModelType,
    supports_ensemble_sampling: bool,
}

impl ModelPackage {
    /// Load and normalize an artifact file.
    ///
    /// Reading is the only side effect; loading is idempotent and safe
    /// to retry. Missing or corrupt files fail with
    /// [`PredictError::ModelLoad`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PredictError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
            .map_err(|e| PredictError::ModelLoad(format!("{}: {}", path.display(), e)))
    }

    /// Normalize an artifact document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: RawArtifact = serde_json::from_str(text)
            .map_err(|e| PredictError::ModelLoad(format!("corrupt artifact: {}", e)))?;
        Self::from_artifact(artifact)
    }

    /// Normalize an already-parsed artifact.
    pub fn from_artifact(artifact: RawArtifact) -> Result<Self> {
        let (estimator, encoders, scaler, tag) = match artifact {
            RawArtifact::Bundle(bundle) => (
                bundle.model,
                bundle.label_encoders.filter(|r| !r.is_empty()),
                bundle.scaler,
                bundle.model_type.unwrap_or_else(|| "unknown".to_string()),
            ),
            RawArtifact::Bare(estimator) => (estimator, None, None, "unknown".to_string()),
        };

        estimator
            .validate()
            .map_err(|e| PredictError::ModelLoad(e.to_string()))?;

        let model_type = ModelType::from_tag(&tag);

        // Resolve the conditional-scaling policy once: the scaler is kept
        // only when the declared model type was trained on scaled input.
        let scaler = match (scaler, model_type.requires_scaled_input()) {
            (Some(scaler), true) => Some(scaler),
            (Some(_), false) => {
                tracing::warn!(
                    model_type = model_type.tag(),
                    "artifact bundles a scaler but the model type does not take scaled input; ignoring it"
                );
                None
            }
            (None, true) => {
                tracing::warn!(
                    model_type = model_type.tag(),
                    "model type expects scaled input but the artifact bundles no scaler; rows stay unscaled"
                );
                None
            }
            (None, false) => None,
        };

        let supports_ensemble_sampling = estimator.ensemble_members().is_some();
        tracing::debug!(
            model_type = model_type.tag(),
            has_encoders = encoders.is_some(),
            scaled = scaler.is_some(),
            ensemble = supports_ensemble_sampling,
            "model package normalized"
        );

        Ok(Self {
            estimator,
            encoders,
            scaler,
            model_type,
            supports_ensemble_sampling,
        })
    }

    /// Attach an encoder registry loaded outside the artifact (the
    /// legacy split-encoder layout used with bare estimators).
    pub fn with_encoders(mut self, encoders: EncoderRegistry) -> Self {
        self.encoders = Some(encoders);
        self
    }

    /// The wrapped estimator.
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// The encoder registry, when the package carries one.
    pub fn encoders(&self) -> Option<&EncoderRegistry> {
        self.encoders.as_ref()
    }

    /// The resolved scaling transform, when the policy applies one.
    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    /// Declared model type of the package.
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Whether the estimator exposes individually queryable members.
    pub fn supports_ensemble_sampling(&self) -> bool {
        self.supports_ensemble_sampling
    }
}
