//! Integration test: Full pipeline (load artifact → assemble → predict)

use cropcast::features::RawFeatureRow;
use cropcast::model::{
    ArtifactBundle, Estimator, ForestRegressor, MlpRegressor, ModelPackage, RawArtifact,
    TreeRegressor,
};
use cropcast::pipeline::{BatchEntry, PredictionPipeline, BATCH_REQUIRED_COLUMNS};
use cropcast::preprocessing::{
    CategoryEncoder, EncoderRegistry, StandardScaler, DISTRICT_FIELD, MARKET_FIELD,
    VARIETY_FIELD,
};
use cropcast::PredictError;
use ndarray::{arr1, arr2};
use polars::prelude::*;
use std::io::Write;

fn sample_row() -> RawFeatureRow {
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

fn cotton_registry() -> EncoderRegistry {
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

fn stub_bundle() -> RawArtifact {
    RawArtifact::Bundle(ArtifactBundle {
        model: Estimator::RandomForest(ForestRegressor::new(vec![TreeRegressor::constant(
            50.0,
        )])),
        label_encoders: Some(cotton_registry()),
        scaler: None,
        model_type: Some("Random Forest".to_string()),
    })
}

fn write_artifact(dir: &tempfile::TempDir, name: &str, artifact: &RawArtifact) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(serde_json::to_string_pretty(artifact).unwrap().as_bytes())
        .unwrap();
    path
}

#[test]
fn test_load_and_predict_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(&dir, "model.json", &stub_bundle());

    let package = ModelPackage::load(&path).unwrap();
    let pipeline = PredictionPipeline::new(package);
    let result = pipeline.predict_single(&sample_row()).unwrap();

    assert_eq!(result.prediction, 50.0);
    assert_eq!(result.confidence, 90.0);
    assert_eq!(result.model_type, "Random Forest");
    assert_eq!(result.input_features.district, "Raichur");
}

#[test]
fn test_unknown_district_end_to_end() {
    let pipeline =
        PredictionPipeline::new(ModelPackage::from_artifact(stub_bundle()).unwrap());
    let mut row = sample_row();
    row.district = "Atlantis".to_string();

    let err = pipeline.predict_single(&row).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown District: Atlantis. Available options: Belagavi, Bellary, Dharwad, Gadag, Haveri, Raichur"
    );
}

#[test]
fn test_mlp_bundle_with_scaler_round_trips_through_disk() {
    // 11 -> 1 network that sums its scaled inputs
    let mlp = MlpRegressor::new(
        vec![arr2(&[[1.0]; 11])],
        vec![arr1(&[0.0])],
    )
    .unwrap();
    let scaler = StandardScaler::new(vec![0.0; 11], vec![1.0; 11]).unwrap();
    let bundle = RawArtifact::Bundle(ArtifactBundle {
        model: Estimator::MlpRegressor(mlp),
        label_encoders: Some(cotton_registry()),
        scaler: Some(scaler),
        model_type: Some("MLP Regressor".to_string()),
    });

    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(&dir, "mlp.json", &bundle);
    let package = ModelPackage::load(&path).unwrap();
    assert!(package.scaler().is_some());

    let pipeline = PredictionPipeline::new(package);
    let result = pipeline.predict_single(&sample_row()).unwrap();

    // identity scaling: prediction is the sum of the assembled row
    // (5 + 2 + 0) + 2024 + 10 + 45.2 + 67.8 + 23.4 + 136.4 + 15000 + 1.2
    assert!((result.prediction - 17315.0).abs() < 1e-9);
    // non-ensemble placeholder
    assert_eq!(result.confidence, 85.0);
    assert_eq!(result.model_type, "MLP Regressor");
}

#[test]
fn test_legacy_split_encoders_from_directory() {
    let dir = tempfile::tempdir().unwrap();

    for (name, encoder) in [
        ("district-enc.json", CategoryEncoder::fitted(["Gadag", "Raichur"])),
        ("markets-enc.json", CategoryEncoder::fitted(["Gadag", "Raichur"])),
        ("variety-enc.json", CategoryEncoder::fitted(["Cotton", "Other"])),
    ] {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(&encoder).unwrap()).unwrap();
    }

    let bare = RawArtifact::Bare(Estimator::RandomForest(ForestRegressor::new(vec![
        TreeRegressor::constant(12.5),
    ])));
    let package = ModelPackage::from_artifact(bare)
        .unwrap()
        .with_encoders(
            EncoderRegistry::load_split(
                dir.path().join("district-enc.json"),
                dir.path().join("markets-enc.json"),
                dir.path().join("variety-enc.json"),
            )
            .unwrap(),
        );

    let pipeline = PredictionPipeline::new(package);
    let result = pipeline.predict_single(&sample_row()).unwrap();
    assert_eq!(result.prediction, 12.5);
}

#[test]
fn test_static_fallback_tables() {
    let bare = RawArtifact::Bare(Estimator::RandomForest(ForestRegressor::new(vec![
        TreeRegressor::constant(1800.0),
    ])));
    let package = ModelPackage::from_artifact(bare)
        .unwrap()
        .with_encoders(EncoderRegistry::static_fallback());
    let pipeline = PredictionPipeline::new(package);

    let mut row = sample_row();
    row.district = "Belagaum".to_string();
    row.market = "Hubli (Amaragol)".to_string();
    row.variety = "Pusa-Red".to_string();

    let result = pipeline.predict_single(&row).unwrap();
    assert_eq!(result.prediction, 1800.0);
}

#[test]
fn test_csv_batch_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("rows.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(
        file,
        "District,Market Name,Variety,Year,Month,Rainfall_Minus1,Rainfall_Minus2,Rainfall_Minus3,Total_Rainfall_3Months,Area (Hectare),Yield (Tonne/Hectare)"
    )
    .unwrap();
    writeln!(file, "Raichur,Raichur,Cotton,2024,10,45.2,67.8,23.4,136.4,15000,1.2").unwrap();
    writeln!(file, "Atlantis,Raichur,Cotton,2024,10,45.2,67.8,23.4,136.4,15000,1.2").unwrap();
    drop(file);

    let df = cropcast::cli::load_data(&csv_path).unwrap();
    let pipeline =
        PredictionPipeline::new(ModelPackage::from_artifact(stub_bundle()).unwrap());
    let outcome = pipeline.predict_table(&df).unwrap();

    assert_eq!(outcome.predictions.len(), 2);
    assert_eq!(outcome.total_processed, 1);
    assert!(matches!(outcome.predictions[1], BatchEntry::Err { .. }));
}

#[test]
fn test_batch_missing_required_column() {
    let row = sample_row();
    let df = df! {
        DISTRICT_FIELD => [row.district.clone()],
        MARKET_FIELD => [row.market.clone()],
        VARIETY_FIELD => [row.variety.clone()],
        "Year" => [row.year],
        "Month" => [row.month as i32],
        "Rainfall_Minus1" => [row.rainfall_minus1],
        "Rainfall_Minus2" => [row.rainfall_minus2],
        "Rainfall_Minus3" => [row.rainfall_minus3],
        "Total_Rainfall_3Months" => [row.total_rainfall_3months],
        "Yield (Tonne/Hectare)" => [row.yield_tonne_per_hectare],
    }
    .unwrap();

    let pipeline =
        PredictionPipeline::new(ModelPackage::from_artifact(stub_bundle()).unwrap());
    let err = pipeline.predict_table(&df).unwrap_err();
    match err {
        PredictError::MissingColumns { missing } => {
            assert_eq!(missing, vec!["Area (Hectare)"]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn test_required_columns_cover_all_numeric_features() {
    // every non-categorical feature must be demanded up front
    assert_eq!(BATCH_REQUIRED_COLUMNS.len(), 8);
    assert!(BATCH_REQUIRED_COLUMNS.contains(&"Total_Rainfall_3Months"));
    assert!(BATCH_REQUIRED_COLUMNS.contains(&"Area (Hectare)"));
}

#[test]
fn test_batch_outcome_wire_shape() {
    let pipeline =
        PredictionPipeline::new(ModelPackage::from_artifact(stub_bundle()).unwrap());
    let mut rows = vec![sample_row(); 2];
    rows[1].variety = "Nope".to_string();

    let outcome = pipeline.predict_rows(&rows);
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["total_processed"], 1);
    let entries = json["predictions"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].get("prediction").is_some());
    assert!(entries[1].get("error").is_some());
}
