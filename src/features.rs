//! Raw feature rows and the feature assembler
//!
//! The assembler turns one typed raw row into the numeric vector the
//! estimator expects. The column order below is part of the model
//! contract: it must match the training layout exactly and is never
//! reordered.

use crate::error::{PredictError, Result};
use crate::model::ModelPackage;
use crate::preprocessing::{DISTRICT_FIELD, MARKET_FIELD, VARIETY_FIELD};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Feature columns in training order. This order is a contract with the
/// artifact, not a convenience.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "District",
    "Market Name",
    "Variety",
    "Year",
    "Month",
    "Rainfall_Minus1",
    "Rainfall_Minus2",
    "Rainfall_Minus3",
    "Total_Rainfall_3Months",
    "Area_Hectare",
    "Yield_TonnePerHectare",
];

/// One raw prediction request, before encoding and scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureRow {
    pub district: String,
    pub market: String,
    pub variety: String,
    pub year: i32,
    pub month: u32,
    pub rainfall_minus1: f64,
    pub rainfall_minus2: f64,
    pub rainfall_minus3: f64,
    pub total_rainfall_3months: f64,
    pub area_hectare: f64,
    pub yield_tonne_per_hectare: f64,
}

fn parse_error(field: &str, value: &str) -> PredictError {
    PredictError::FeatureParse {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_f64(field: &str, value: &str) -> Result<f64> {
    let v: f64 = value
        .trim()
        .parse()
        .map_err(|_| parse_error(field, value))?;
    if !v.is_finite() {
        return Err(parse_error(field, value));
    }
    Ok(v)
}

fn parse_i32(field: &str, value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| parse_error(field, value))
}

impl RawFeatureRow {
    /// Parse the eleven positional feature values of a single request,
    /// in the [`FEATURE_COLUMNS`] order. Parsing stops at the first
    /// invalid field.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        if values.len() != FEATURE_COLUMNS.len() {
            return Err(parse_error("feature_count", &values.len().to_string()));
        }
        let v: Vec<&str> = values.iter().map(|s| s.as_ref()).collect();

        let year = parse_i32("year", v[3])?;
        let month_raw = parse_i32("month", v[4])?;
        let month =
            u32::try_from(month_raw).map_err(|_| parse_error("month", v[4]))?;

        let row = Self {
            district: v[0].trim().to_string(),
            market: v[1].trim().to_string(),
            variety: v[2].trim().to_string(),
            year,
            month,
            rainfall_minus1: parse_f64("rainfall_minus1", v[5])?,
            rainfall_minus2: parse_f64("rainfall_minus2", v[6])?,
            rainfall_minus3: parse_f64("rainfall_minus3", v[7])?,
            total_rainfall_3months: parse_f64("total_rainfall_3months", v[8])?,
            area_hectare: parse_f64("area_hectare", v[9])?,
            yield_tonne_per_hectare: parse_f64("yield_tonne_per_hectare", v[10])?,
        };
        row.validate()?;
        Ok(row)
    }

    /// Range-validate the numeric fields. Fail-fast: the first invalid
    /// field is reported, not the full set.
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(parse_error("month", &self.month.to_string()));
        }
        for (field, value) in [
            ("rainfall_minus1", self.rainfall_minus1),
            ("rainfall_minus2", self.rainfall_minus2),
            ("rainfall_minus3", self.rainfall_minus3),
            ("total_rainfall_3months", self.total_rainfall_3months),
            ("area_hectare", self.area_hectare),
            ("yield_tonne_per_hectare", self.yield_tonne_per_hectare),
        ] {
            if !value.is_finite() {
                return Err(parse_error(field, &value.to_string()));
            }
        }
        if self.area_hectare < 0.0 {
            return Err(parse_error("area_hectare", &self.area_hectare.to_string()));
        }
        if self.yield_tonne_per_hectare < 0.0 {
            return Err(parse_error(
                "yield_tonne_per_hectare",
                &self.yield_tonne_per_hectare.to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve one categorical field to its numeric code.
///
/// With an encoder registry the value goes through the fitted encoder.
/// Without one the package is a bare estimator and categorical inputs
/// must already be numeric codes, so the raw value is parsed directly.
fn categorical_code(
    package: &ModelPackage,
    field: &str,
    raw_field: &str,
    value: &str,
) -> Result<f64> {
    match package.encoders().and_then(|r| r.get(field)) {
        Some(encoder) => Ok(encoder.encode(field, value)? as f64),
        None => parse_f64(raw_field, value),
    }
}

/// Build the numeric feature row for one request.
///
/// Steps are order-sensitive: validate numerics, encode categoricals,
/// lay the values out in [`FEATURE_COLUMNS`] order, then apply the
/// package's resolved scaling transform when present.
pub fn assemble(raw: &RawFeatureRow, package: &ModelPackage) -> Result<Array1<f64>> {
    raw.validate()?;

    let district = categorical_code(package, DISTRICT_FIELD, "district", &raw.district)?;
    let market = categorical_code(package, MARKET_FIELD, "market", &raw.market)?;
    let variety = categorical_code(package, VARIETY_FIELD, "variety", &raw.variety)?;

    let row = Array1::from_vec(vec![
        district,
        market,
        variety,
        f64::from(raw.year),
        f64::from(raw.month),
        raw.rainfall_minus1,
        raw.rainfall_minus2,
        raw.rainfall_minus3,
        raw.total_rainfall_3months,
        raw.area_hectare,
        raw.yield_tonne_per_hectare,
    ]);

    match package.scaler() {
        Some(scaler) => scaler.transform_row(&row),
        None => Ok(row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ArtifactBundle, Estimator, ForestRegressor, RawArtifact, TreeRegressor,
    };
    use crate::preprocessing::{CategoryEncoder, EncoderRegistry, StandardScaler};

    pub(crate) fn sample_row() -> RawFeatureRow {
        RawFeatureRow {
            district: "Raichur".to_string(),
            market: "Raichur".to_string(),
            variety: "Cotton".to_string(),
            year: 2024,
            month: 10,
            rainfall_minus1: 45.2,
            rainfall_minus2: 67.8,
            rainfall_minus3: 23.4,
            total_rainfall_3months: 136.4,
            area_hectare: 15000.0,
            yield_tonne_per_hectare: 1.2,
        }
    }

    fn registry() -> EncoderRegistry {
        EncoderRegistry::new([
            (
                DISTRICT_FIELD,
                CategoryEncoder::fitted([
                    "Belagavi", "Bellary", "Dharwad", "Gadag", "Haveri", "Raichur",
                ]),
            ),
            (
                MARKET_FIELD,
                CategoryEncoder::fitted(["Gadag", "Haveri", "Raichur"]),
            ),
            (
                VARIETY_FIELD,
                CategoryEncoder::fitted(["Cotton", "Jayadhar", "Other"]),
            ),
        ])
    }

    fn bundle_package(scaler: Option<StandardScaler>, model_type: &str) -> ModelPackage {
        let bundle = RawArtifact::Bundle(ArtifactBundle {
            model: Estimator::RandomForest(ForestRegressor::new(vec![
                TreeRegressor::constant(50.0),
            ])),
            label_encoders: Some(registry()),
            scaler,
            model_type: Some(model_type.to_string()),
        });
        ModelPackage::from_artifact(bundle).unwrap()
    }

    fn bare_package() -> ModelPackage {
        let bare = RawArtifact::Bare(Estimator::RandomForest(ForestRegressor::new(vec![
            TreeRegressor::constant(50.0),
        ])));
        ModelPackage::from_artifact(bare).unwrap()
    }

    #[test]
    fn test_parse_valid_values() {
        let args = [
            "Raichur", "Raichur", "Cotton", "2024", "10", "45.2", "67.8", "23.4", "136.4",
            "15000.0", "1.2",
        ];
        let row = RawFeatureRow::parse(&args).unwrap();
        assert_eq!(row, sample_row());
    }

    #[test]
    fn test_parse_fails_fast_on_first_bad_field() {
        let args = [
            "Raichur", "Raichur", "Cotton", "twenty", "99", "45.2", "67.8", "23.4", "136.4",
            "15000.0", "1.2",
        ];
        // year is invalid and comes before the invalid month
        let err = RawFeatureRow::parse(&args).unwrap_err();
        match err {
            PredictError::FeatureParse { field, value } => {
                assert_eq!(field, "year");
                assert_eq!(value, "twenty");
            }
            other => panic!("expected FeatureParse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reports_earliest_column_when_several_are_bad() {
        let args = [
            "Raichur", "Raichur", "Cotton", "twenty", "moo", "45.2", "67.8", "23.4", "136.4",
            "15000.0", "1.2",
        ];
        // year and month are both malformed; year comes first in column order
        let err = RawFeatureRow::parse(&args).unwrap_err();
        assert!(matches!(err, PredictError::FeatureParse { ref field, .. } if field == "year"));
    }

    #[test]
    fn test_month_range() {
        let mut row = sample_row();
        row.month = 13;
        assert!(row.validate().is_err());
        row.month = 0;
        assert!(row.validate().is_err());
        row.month = 12;
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_negative_area_rejected() {
        let mut row = sample_row();
        row.area_hectare = -1.0;
        let err = row.validate().unwrap_err();
        assert!(matches!(err, PredictError::FeatureParse { ref field, .. } if field == "area_hectare"));
    }

    #[test]
    fn test_column_order_with_encoders() {
        let package = bundle_package(None, "Random Forest");
        let row = assemble(&sample_row(), &package).unwrap();

        assert_eq!(row.len(), FEATURE_COLUMNS.len());
        // Raichur is code 5 among districts, 2 among markets; Cotton is 0
        assert_eq!(row[0], 5.0);
        assert_eq!(row[1], 2.0);
        assert_eq!(row[2], 0.0);
        assert_eq!(row[3], 2024.0);
        assert_eq!(row[4], 10.0);
        assert_eq!(row[5], 45.2);
        assert_eq!(row[8], 136.4);
        assert_eq!(row[10], 1.2);
    }

    #[test]
    fn test_column_order_without_encoders() {
        let package = bare_package();
        let mut raw = sample_row();
        raw.district = "5".to_string();
        raw.market = "2".to_string();
        raw.variety = "0".to_string();

        let row = assemble(&raw, &package).unwrap();
        assert_eq!(row[0], 5.0);
        assert_eq!(row[1], 2.0);
        assert_eq!(row[2], 0.0);
        assert_eq!(row[3], 2024.0);
    }

    #[test]
    fn test_bare_package_rejects_non_numeric_categorical() {
        let package = bare_package();
        let err = assemble(&sample_row(), &package).unwrap_err();
        assert!(matches!(err, PredictError::FeatureParse { ref field, .. } if field == "district"));
    }

    #[test]
    fn test_unknown_category_surfaces_valid_values() {
        let package = bundle_package(None, "Random Forest");
        let mut raw = sample_row();
        raw.district = "Atlantis".to_string();

        let err = assemble(&raw, &package).unwrap_err();
        match err {
            PredictError::UnknownCategory {
                field, valid_values, ..
            } => {
                assert_eq!(field, "District");
                assert_eq!(
                    valid_values,
                    vec!["Belagavi", "Bellary", "Dharwad", "Gadag", "Haveri", "Raichur"]
                );
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_scaler_applies_only_when_policy_resolved() {
        // Bundled scaler with a scale-insensitive type is dropped at load,
        // so the assembled row stays in raw units.
        let scaler = StandardScaler::new(vec![0.0; 11], vec![2.0; 11]).unwrap();
        let package = bundle_package(Some(scaler), "Random Forest");
        let row = assemble(&sample_row(), &package).unwrap();
        assert_eq!(row[3], 2024.0);
    }
}
