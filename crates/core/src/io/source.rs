//! Shoreline sources
//!
//! The analysis stages only ever see [`ShorelineEpochs`]. Where the
//! fragments come from is hidden behind [`ShorelineSource`], selected once by
//! the caller.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::ShorelineCache;
use crate::error::{Error, Result};
use crate::geometry::Curve;
use crate::vector::ShorelineEpochs;

/// Capability to load one year's shoreline fragments.
pub trait ShorelineSource {
    /// Human-readable description for logs
    fn describe(&self) -> String;

    /// Fragments observed in `year`, or `None` when the source has no data
    /// for that year.
    fn load_year(&self, year: i32) -> Result<Option<Vec<Curve>>>;
}

/// Directory of `shoreline_<year>.geojson` files
#[derive(Debug, Clone)]
pub struct GeoJsonDirectory {
    dir: PathBuf,
}

impl GeoJsonDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File expected to hold the shoreline of `year`
    pub fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(format!("shoreline_{}.geojson", year))
    }

    /// Years for which a shoreline file exists, ascending
    pub fn available_years(&self) -> Result<Vec<i32>> {
        let mut years = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(year) = name
                .strip_prefix("shoreline_")
                .and_then(|rest| rest.strip_suffix(".geojson"))
                .and_then(|y| y.parse::<i32>().ok())
            {
                years.push(year);
            }
        }
        years.sort_unstable();
        Ok(years)
    }
}

impl ShorelineSource for GeoJsonDirectory {
    fn describe(&self) -> String {
        format!("GeoJSON directory {}", self.dir.display())
    }

    fn load_year(&self, year: i32) -> Result<Option<Vec<Curve>>> {
        let path = self.path_for(year);
        if !path.exists() {
            warn!("Shoreline file not found for {}: {}", year, path.display());
            return Ok(None);
        }

        let fc = super::read_geojson(&path)?;
        let curves = fc.curves();
        if curves.is_empty() {
            warn!("No usable shoreline fragments in {}", path.display());
            return Ok(None);
        }
        debug!("Loaded {} shoreline fragments for {}", curves.len(), year);
        Ok(Some(curves))
    }
}

/// Source backed by fragments already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    epochs: ShorelineEpochs,
}

impl InMemorySource {
    pub fn new(epochs: ShorelineEpochs) -> Self {
        Self { epochs }
    }
}

impl ShorelineSource for InMemorySource {
    fn describe(&self) -> String {
        format!("in-memory source ({} years)", self.epochs.len())
    }

    fn load_year(&self, year: i32) -> Result<Option<Vec<Curve>>> {
        Ok(self
            .epochs
            .get(&year)
            .filter(|fragments| !fragments.is_empty())
            .cloned())
    }
}

/// Load the requested years through `cache`.
///
/// Years without data are left out of the result.
///
/// # Errors
/// [`Error::NoShorelineData`] when none of the years yields any fragment.
pub fn load_epochs(
    source: &dyn ShorelineSource,
    years: &[i32],
    cache: &mut ShorelineCache,
) -> Result<ShorelineEpochs> {
    let mut epochs = ShorelineEpochs::new();

    for &year in years {
        if let Some(cached) = cache.get(year) {
            epochs.insert(year, cached.clone());
            continue;
        }
        if let Some(fragments) = source.load_year(year)? {
            cache.insert(year, fragments.clone());
            epochs.insert(year, fragments);
        }
    }

    if epochs.is_empty() {
        return Err(Error::NoShorelineData);
    }

    info!(
        "Loaded {} of {} years from {}",
        epochs.len(),
        years.len(),
        source.describe()
    );
    Ok(epochs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as StdCell;

    struct CountingSource {
        inner: InMemorySource,
        calls: StdCell<usize>,
    }

    impl ShorelineSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn load_year(&self, year: i32) -> Result<Option<Vec<Curve>>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.load_year(year)
        }
    }

    fn epochs() -> ShorelineEpochs {
        let mut e = ShorelineEpochs::new();
        e.insert(1994, vec![Curve::from_xy(&[(0.0, 0.0), (10.0, 0.0)]).unwrap()]);
        e.insert(2024, vec![Curve::from_xy(&[(0.0, 5.0), (10.0, 5.0)]).unwrap()]);
        e.insert(2004, vec![]);
        e
    }

    #[test]
    fn test_load_skips_missing_years() {
        let source = InMemorySource::new(epochs());
        let mut cache = ShorelineCache::new(4);
        let loaded = load_epochs(&source, &[1994, 2004, 2014, 2024], &mut cache).unwrap();
        assert_eq!(loaded.keys().copied().collect::<Vec<_>>(), vec![1994, 2024]);
    }

    #[test]
    fn test_no_data_is_an_error() {
        let source = InMemorySource::new(epochs());
        let mut cache = ShorelineCache::new(4);
        let err = load_epochs(&source, &[1980, 1990], &mut cache).unwrap_err();
        assert!(matches!(err, Error::NoShorelineData));
    }

    #[test]
    fn test_cache_avoids_reloading() {
        let source = CountingSource {
            inner: InMemorySource::new(epochs()),
            calls: StdCell::new(0),
        };
        let mut cache = ShorelineCache::new(4);
        load_epochs(&source, &[1994, 2024], &mut cache).unwrap();
        load_epochs(&source, &[1994, 2024], &mut cache).unwrap();
        assert_eq!(source.calls.get(), 2);

        cache.invalidate(1994);
        load_epochs(&source, &[1994, 2024], &mut cache).unwrap();
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn test_geojson_directory_paths() {
        let dir = GeoJsonDirectory::new("/data/vectors");
        assert_eq!(
            dir.path_for(2014),
            PathBuf::from("/data/vectors/shoreline_2014.geojson")
        );
    }
}
