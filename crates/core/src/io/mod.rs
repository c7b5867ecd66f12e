//! I/O for shoreline inputs and analysis outputs
//!
//! - Shoreline ingestion behind the [`ShorelineSource`] capability
//! - GeoJSON read/write for vector layers
//! - CSV tables and JSON artifacts for stage-to-stage hand-off

mod source;
mod table;

pub use source::{load_epochs, GeoJsonDirectory, InMemorySource, ShorelineSource};
pub use table::{Cell, Table};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::vector::geojson::{parse_feature_collection, to_geojson_string};
use crate::vector::FeatureCollection;

/// Read a JSON artifact
pub fn read_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write a JSON artifact (pretty-printed), creating parent directories
pub fn write_json<T, P>(value: &T, path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let mut writer = create(path.as_ref())?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a GeoJSON FeatureCollection file
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_feature_collection(&text)
}

/// Write a FeatureCollection as GeoJSON, creating parent directories
pub fn write_geojson<P: AsRef<Path>>(fc: &FeatureCollection, path: P) -> Result<()> {
    write_text(to_geojson_string(fc)?, path)
}

/// Write a text file, creating parent directories
pub fn write_text<S: AsRef<str>, P: AsRef<Path>>(content: S, path: P) -> Result<()> {
    let mut writer = create(path.as_ref())?;
    writer.write_all(content.as_ref().as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}
