//! Categorical encoding for the three market identity fields
//!
//! Two strategies exist, and exactly one is active per model package:
//! a learned encoder fitted offline (code = position in the stored
//! class list, matching the label-encoder semantics of the training
//! step), and a static hand-authored table kept for artifacts that
//! predate bundled encoders. Both reject unseen categories with the
//! full list of valid values so the caller can self-correct.

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Field name for the district column, as used at training time.
pub const DISTRICT_FIELD: &str = "District";
/// Field name for the market column.
pub const MARKET_FIELD: &str = "Market Name";
/// Field name for the variety column.
pub const VARIETY_FIELD: &str = "Variety";

/// A fitted categorical encoder for a single field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryEncoder {
    /// Learned encoder: the class list is stored in sorted order and the
    /// code of a category is its position in that list.
    Fitted { classes: Vec<String> },
    /// Legacy hand-authored string -> code table.
    StaticTable { codes: BTreeMap<String, i64> },
}

impl CategoryEncoder {
    /// Build a learned encoder from a class set. Classes are sorted and
    /// deduplicated so codes are deterministic regardless of input order.
    pub fn fitted<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self::Fitted { classes }
    }

    /// Build a static-table encoder from explicit (category, code) pairs.
    pub fn static_table<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self::StaticTable {
            codes: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Map a raw category to its integer code.
    ///
    /// Fails with [`PredictError::UnknownCategory`] carrying the known
    /// category set when the value was not seen during fitting.
    pub fn encode(&self, field: &str, value: &str) -> Result<i64> {
        match self {
            Self::Fitted { classes } => classes
                .iter()
                .position(|c| c == value)
                .map(|idx| idx as i64)
                .ok_or_else(|| PredictError::UnknownCategory {
                    field: field.to_string(),
                    value: value.to_string(),
                    valid_values: classes.clone(),
                }),
            Self::StaticTable { codes } => {
                codes
                    .get(value)
                    .copied()
                    .ok_or_else(|| PredictError::UnknownCategory {
                        field: field.to_string(),
                        value: value.to_string(),
                        valid_values: codes.keys().cloned().collect(),
                    })
            }
        }
    }

    /// Map an integer code back to its category, if known.
    pub fn decode(&self, code: i64) -> Option<&str> {
        match self {
            Self::Fitted { classes } => {
                usize::try_from(code).ok().and_then(|idx| classes.get(idx)).map(String::as_str)
            }
            Self::StaticTable { codes } => codes
                .iter()
                .find(|(_, &c)| c == code)
                .map(|(k, _)| k.as_str()),
        }
    }

    /// The known-category set of this encoder.
    pub fn valid_values(&self) -> Vec<String> {
        match self {
            Self::Fitted { classes } => classes.clone(),
            Self::StaticTable { codes } => codes.keys().cloned().collect(),
        }
    }

    /// Load a single encoder from its own artifact file (legacy split layout).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PredictError::ModelLoad(format!("cannot read encoder {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            PredictError::ModelLoad(format!("corrupt encoder {}: {}", path.display(), e))
        })
    }
}

/// Holds the fitted encoders for the categorical fields of a model package.
///
/// The registry is an explicitly constructed value carried inside the
/// package; the pipeline borrows it read-only per request. The known
/// category sets are fixed once the registry exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderRegistry {
    encoders: HashMap<String, CategoryEncoder>,
}

impl EncoderRegistry {
    /// Build a registry from explicit (field, encoder) pairs.
    pub fn new<I, S>(encoders: I) -> Self
    where
        I: IntoIterator<Item = (S, CategoryEncoder)>,
        S: Into<String>,
    {
        Self {
            encoders: encoders.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Load the legacy split layout: three artifact files, one fitted
    /// encoder each, for district, market and variety.
    pub fn load_split(
        district: impl AsRef<Path>,
        market: impl AsRef<Path>,
        variety: impl AsRef<Path>,
    ) -> Result<Self> {
        Ok(Self::new([
            (DISTRICT_FIELD, CategoryEncoder::load(district)?),
            (MARKET_FIELD, CategoryEncoder::load(market)?),
            (VARIETY_FIELD, CategoryEncoder::load(variety)?),
        ]))
    }

    /// The hand-authored fallback tables that shipped with the earliest
    /// onion artifacts, before encoders were bundled into the package.
    pub fn static_fallback() -> Self {
        Self::new([
            (
                DISTRICT_FIELD,
                CategoryEncoder::static_table([
                    ("Belagaum", 0),
                    ("Bidar", 1),
                    ("Dharwad", 2),
                    ("Gadag", 3),
                    ("Haveri", 4),
                ]),
            ),
            (
                MARKET_FIELD,
                CategoryEncoder::static_table([
                    ("Belgaum", 0),
                    ("Dharwar", 1),
                    ("Gadag", 2),
                    ("Haveri", 3),
                    ("Hubli (Amaragol)", 4),
                    ("Ranebennur", 5),
                ]),
            ),
            (
                VARIETY_FIELD,
                CategoryEncoder::static_table([
                    ("Pusa-Red", 0),
                    ("White", 1),
                    ("Puna", 2),
                    ("Telagi", 3),
                    ("Onion", 4),
                    ("Other", 5),
                    ("Local", 6),
                ]),
            ),
        ])
    }

    /// Encoder for a field, if the registry carries one.
    pub fn get(&self, field: &str) -> Option<&CategoryEncoder> {
        self.encoders.get(field)
    }

    /// Encode a raw value for a field. A field without an encoder is a
    /// lookup miss with an empty valid set rather than a silent pass.
    pub fn encode(&self, field: &str, value: &str) -> Result<i64> {
        match self.encoders.get(field) {
            Some(enc) => enc.encode(field, value),
            None => Err(PredictError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
                valid_values: Vec::new(),
            }),
        }
    }

    /// Whether the registry holds no encoders at all.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
