//! File round-trips through a temporary directory: yearly shoreline
//! GeoJSON files, JSON configuration and CSV tables.

use approx::assert_relative_eq;
use shorewatch_core::io::{
    load_epochs, read_geojson, read_json, write_geojson, write_json, Cell, GeoJsonDirectory,
    ShorelineSource, Table,
};
use shorewatch_core::vector::total_length;
use shorewatch_core::{AnalysisConfig, Error, PredictorKind, ShorelineCache};
use std::fs;

const SHORELINE_1994: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"year": 1994, "tile": "A"},
      "geometry": {"type": "LineString", "coordinates": [[0, 0], [100, 0], [200, 10]]}
    },
    {
      "type": "Feature",
      "properties": {"year": 1994, "tile": "B"},
      "geometry": {"type": "MultiLineString", "coordinates": [[[200, 10], [300, 10]], [[5, 5], [5, 5]]]}
    }
  ]
}"#;

const SHORELINE_2024: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": null,
      "geometry": {"type": "LineString", "coordinates": [[0, 12, 0.0], [300, 22, 0.0]]}
    }
  ]
}"#;

fn shoreline_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shoreline_1994.geojson"), SHORELINE_1994).unwrap();
    fs::write(dir.path().join("shoreline_2024.geojson"), SHORELINE_2024).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a shoreline").unwrap();
    fs::write(dir.path().join("shoreline_draft.geojson"), "{}").unwrap();
    dir
}

// ---------------------------------------------------------------------------
// Shoreline directory
// ---------------------------------------------------------------------------

#[test]
fn available_years_from_file_names() {
    let dir = shoreline_dir();
    let source = GeoJsonDirectory::new(dir.path());
    assert_eq!(source.available_years().unwrap(), vec![1994, 2024]);
}

#[test]
fn load_epochs_from_directory() {
    let dir = shoreline_dir();
    let source = GeoJsonDirectory::new(dir.path());
    let mut cache = ShorelineCache::new(4);

    let epochs = load_epochs(&source, &[1994, 2004, 2014, 2024], &mut cache).unwrap();
    assert_eq!(epochs.keys().copied().collect::<Vec<_>>(), vec![1994, 2024]);

    // The degenerate second part of the MultiLineString is dropped.
    let fragments = &epochs[&1994];
    assert_eq!(fragments.len(), 2);
    assert_relative_eq!(total_length(fragments), 100.0 + 101.0_f64.sqrt() * 10.0 + 100.0, epsilon = 1e-9);

    // Third ordinate ignored
    assert_eq!(epochs[&2024][0].num_points(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn missing_file_is_no_data() {
    let dir = shoreline_dir();
    let source = GeoJsonDirectory::new(dir.path());
    assert!(source.load_year(2004).unwrap().is_none());

    let mut cache = ShorelineCache::new(2);
    let err = load_epochs(&source, &[2004, 2014], &mut cache).unwrap_err();
    assert!(matches!(err, Error::NoShorelineData));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = shoreline_dir();
    fs::write(dir.path().join("shoreline_2014.geojson"), "{\"type\": \"Feature\"").unwrap();
    let source = GeoJsonDirectory::new(dir.path());
    assert!(source.load_year(2014).is_err());
}

#[test]
fn geojson_write_then_read() {
    let dir = shoreline_dir();
    let fc = read_geojson(dir.path().join("shoreline_1994.geojson")).unwrap();
    let out = dir.path().join("nested").join("copy.geojson");
    write_geojson(&fc, &out).unwrap();

    let back = read_geojson(&out).unwrap();
    assert_eq!(back.len(), fc.len());
    assert!(back.iter().all(|f| f.get_property("tile").is_some()));
    assert_eq!(back.curves().len(), 2);
}

// ---------------------------------------------------------------------------
// Configuration and tables
// ---------------------------------------------------------------------------

#[test]
fn config_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let cfg = AnalysisConfig {
        reference_year: Some(2004),
        transect_spacing: 25.0,
        predictor: PredictorKind::Regression,
        ..Default::default()
    };
    write_json(&cfg, &path).unwrap();

    let back: AnalysisConfig = read_json(&path).unwrap();
    assert_eq!(back, cfg);
    assert_eq!(AnalysisConfig::from_json_file(&path).unwrap(), cfg);
    assert!(fs::read_to_string(&path).unwrap().contains("\"regression\""));
}

#[test]
fn csv_written_to_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("table.csv");

    let mut table = Table::new(["transect_id", "position"]);
    table.push_row(vec![Cell::from(0_i64), Cell::from(12.5)]).unwrap();
    table.push_row(vec![Cell::from(1_i64), Cell::Empty]).unwrap();
    table.write_csv(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "transect_id,position\n0,12.5\n1,\n"
    );
}
