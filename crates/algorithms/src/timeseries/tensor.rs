//! Rectangular sequence tensor
//!
//! One row per transect with at least one observation, one column per
//! canonical year. Unobserved cells hold NaN in memory and `null` on disk.

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use shorewatch_core::Error;

use crate::change::ChangeType;

/// Per-row metadata travelling with the tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    pub transect_id: u32,
    pub num_observations: usize,
    /// Canonical years with a value in this row
    pub years_present: Vec<i32>,
    /// Class from the change record, if the transect has one
    pub change_type: Option<ChangeType>,
    /// Mean of year-over-year rates after the first observation
    pub mean_annual_change: Option<f64>,
}

/// `[transects × years]` positions with NaN as the no-value marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SequenceFile", try_from = "SequenceFile")]
pub struct SequenceTensor {
    pub years: Vec<i32>,
    pub data: Array2<f64>,
    /// Parallel to the rows of `data`
    pub metadata: Vec<SequenceMetadata>,
}

impl SequenceTensor {
    /// An empty tensor over `years`
    pub fn empty(years: Vec<i32>) -> Self {
        let cols = years.len();
        Self {
            years,
            data: Array2::from_elem((0, cols), f64::NAN),
            metadata: Vec::new(),
        }
    }

    /// `(transects, years)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn num_transects(&self) -> usize {
        self.data.nrows()
    }

    pub fn transect_ids(&self) -> Vec<u32> {
        self.metadata.iter().map(|m| m.transect_id).collect()
    }

    pub fn row_index(&self, transect_id: u32) -> Option<usize> {
        self.metadata.iter().position(|m| m.transect_id == transect_id)
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(0), index)
    }

    /// Observed position, `None` for a no-value cell or unknown id/year
    pub fn get(&self, transect_id: u32, year: i32) -> Option<f64> {
        let r = self.row_index(transect_id)?;
        let c = self.years.iter().position(|&y| y == year)?;
        let v = self.data[[r, c]];
        v.is_finite().then_some(v)
    }

    /// Number of observed (non-NaN) cells
    pub fn num_observed(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }
}

/// On-disk form of [`SequenceTensor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SequenceFile {
    years: Vec<i32>,
    shape: [usize; 2],
    transect_ids: Vec<u32>,
    sequences: Vec<Vec<Option<f64>>>,
    metadata: Vec<SequenceMetadata>,
}

impl From<SequenceTensor> for SequenceFile {
    fn from(t: SequenceTensor) -> Self {
        let (rows, cols) = t.data.dim();
        let sequences = t
            .data
            .outer_iter()
            .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
            .collect();
        Self {
            years: t.years,
            shape: [rows, cols],
            transect_ids: t.metadata.iter().map(|m| m.transect_id).collect(),
            sequences,
            metadata: t.metadata,
        }
    }
}

impl TryFrom<SequenceFile> for SequenceTensor {
    type Error = Error;

    fn try_from(f: SequenceFile) -> Result<Self, Self::Error> {
        let [rows, cols] = f.shape;
        if cols != f.years.len() || rows != f.sequences.len() || rows != f.metadata.len() {
            return Err(Error::Other(format!(
                "sequence file shape {:?} does not match {} years, {} rows, {} metadata entries",
                f.shape,
                f.years.len(),
                f.sequences.len(),
                f.metadata.len()
            )));
        }
        if f.transect_ids != f.metadata.iter().map(|m| m.transect_id).collect::<Vec<_>>() {
            return Err(Error::Other(
                "sequence file transect_ids disagree with metadata".into(),
            ));
        }

        let mut flat = Vec::with_capacity(rows * cols);
        for (i, seq) in f.sequences.iter().enumerate() {
            if seq.len() != cols {
                return Err(Error::Other(format!(
                    "sequence {} has {} values, expected {}",
                    i,
                    seq.len(),
                    cols
                )));
            }
            flat.extend(seq.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        let data = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| Error::Other(format!("sequence file: {}", e)))?;

        Ok(Self {
            years: f.years,
            data,
            metadata: f.metadata,
        })
    }
}
