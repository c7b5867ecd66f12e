//! Time-series assembly
//!
//! Reshapes the per-transect position table into:
//! - a long-form table, one row per observed (transect, year)
//! - a rectangular `[transects × years]` tensor with NaN gaps

mod tensor;

pub use tensor::{SequenceMetadata, SequenceTensor};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shorewatch_core::io::{Cell, Table};
use shorewatch_core::{Error, Result};
use std::collections::HashMap;
use tracing::info;

use crate::change::{ChangeRecord, ChangeType};
use crate::transect::PositionTable;

/// One observed (transect, year) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub transect_id: u32,
    pub year: i32,
    pub position: f64,
    /// Change since the previous observed year, per year (0 for the first)
    pub annual_change: f64,
    /// Years since this transect's first observation
    pub time_since_first: i32,
    /// Carried from the change record; `None` for transects without one
    pub epr: Option<f64>,
    pub change_type: Option<ChangeType>,
}

/// Long-form rows plus the tensor built from the same positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub long_form: Vec<TimeSeriesRow>,
    pub tensor: SequenceTensor,
}

impl TimeSeries {
    pub fn years(&self) -> &[i32] {
        &self.tensor.years
    }

    /// Long-form rows of one transect, in year order
    pub fn rows_for(&self, transect_id: u32) -> impl Iterator<Item = &TimeSeriesRow> {
        self.long_form
            .iter()
            .filter(move |r| r.transect_id == transect_id)
    }
}

/// Assemble the long-form table and sequence tensor.
///
/// Every transect with at least one observed canonical year contributes
/// rows; change records only supply the carried-through EPR and class.
///
/// # Errors
/// [`Error::EmptyYears`] when the position table has no canonical years.
pub fn assemble_timeseries(table: &PositionTable, records: &[ChangeRecord]) -> Result<TimeSeries> {
    if table.years.is_empty() {
        return Err(Error::EmptyYears);
    }
    let years = &table.years;
    let by_id: HashMap<u32, &ChangeRecord> = records.iter().map(|r| (r.transect_id, r)).collect();

    let mut long_form = Vec::new();
    let mut flat = Vec::new();
    let mut metadata = Vec::new();

    for row in &table.rows {
        let observed: Vec<(i32, f64)> = years
            .iter()
            .filter_map(|y| row.positions.get(y).map(|&p| (*y, p)))
            .filter(|(_, p)| p.is_finite())
            .collect();
        let Some(&(first_year, _)) = observed.first() else {
            continue;
        };

        let record = by_id.get(&row.transect_id);
        let epr = record.map(|r| r.epr);
        let change_type = record.map(|r| r.change_type);

        let mut rates = Vec::with_capacity(observed.len().saturating_sub(1));
        let mut prev: Option<(i32, f64)> = None;
        for &(year, position) in &observed {
            let annual_change = match prev {
                Some((py, pp)) if year > py => (position - pp) / (year - py) as f64,
                _ => 0.0,
            };
            if prev.is_some() {
                rates.push(annual_change);
            }
            long_form.push(TimeSeriesRow {
                transect_id: row.transect_id,
                year,
                position,
                annual_change,
                time_since_first: year - first_year,
                epr,
                change_type,
            });
            prev = Some((year, position));
        }

        flat.extend(years.iter().map(|y| {
            row.positions
                .get(y)
                .copied()
                .filter(|p| p.is_finite())
                .unwrap_or(f64::NAN)
        }));
        metadata.push(SequenceMetadata {
            transect_id: row.transect_id,
            num_observations: observed.len(),
            years_present: observed.iter().map(|(y, _)| *y).collect(),
            change_type,
            mean_annual_change: (!rates.is_empty())
                .then(|| rates.iter().sum::<f64>() / rates.len() as f64),
        });
    }

    let data = Array2::from_shape_vec((metadata.len(), years.len()), flat)
        .map_err(|e| Error::Algorithm(format!("sequence tensor: {}", e)))?;
    let tensor = SequenceTensor {
        years: years.clone(),
        data,
        metadata,
    };

    info!(
        "Assembled {} long-form rows, tensor shape {:?}",
        long_form.len(),
        tensor.shape()
    );
    Ok(TimeSeries { long_form, tensor })
}

/// Tabulate long-form rows
pub fn long_form_table(rows: &[TimeSeriesRow]) -> Result<Table> {
    let mut table = Table::new([
        "transect_id",
        "year",
        "position",
        "annual_change",
        "time_since_first",
        "epr",
        "change_type",
    ]);
    for r in rows {
        table.push_row(vec![
            Cell::from(r.transect_id as i64),
            Cell::from(r.year),
            Cell::from(r.position),
            Cell::from(r.annual_change),
            Cell::from(r.time_since_first),
            Cell::from(r.epr),
            Cell::from(r.change_type.map(|c| c.as_str())),
        ])?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{compute_shoreline_change, ChangeParams};
    use crate::transect::TransectPositions;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn table() -> PositionTable {
        let row = |id: u32, pairs: &[(i32, f64)]| TransectPositions {
            transect_id: id,
            distance_along_coast: id as f64 * 50.0,
            positions: pairs.iter().copied().collect::<BTreeMap<_, _>>(),
        };
        PositionTable {
            years: vec![1994, 2004, 2014, 2024],
            rows: vec![
                row(0, &[(1994, 10.0), (2024, 40.0)]),
                row(1, &[]),
                row(2, &[(2004, 7.0)]),
                row(3, &[(1994, 0.0), (2004, 20.0), (2024, 10.0)]),
            ],
        }
    }

    fn assembled() -> TimeSeries {
        let t = table();
        let records = compute_shoreline_change(&t, ChangeParams::default()).unwrap();
        assemble_timeseries(&t, &records).unwrap()
    }

    #[test]
    fn test_tensor_shape_and_gaps() {
        let ts = assembled();
        assert_eq!(ts.tensor.shape(), (3, 4));
        assert_eq!(ts.tensor.transect_ids(), vec![0, 2, 3]);

        let row0 = ts.tensor.row(0);
        assert_eq!(row0[0], 10.0);
        assert!(row0[1].is_nan());
        assert!(row0[2].is_nan());
        assert_eq!(row0[3], 40.0);
    }

    #[test]
    fn test_long_form_rows() {
        let ts = assembled();
        let rows: Vec<_> = ts.rows_for(0).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].annual_change, 0.0);
        assert_eq!(rows[0].time_since_first, 0);
        assert_relative_eq!(rows[1].annual_change, 1.0);
        assert_eq!(rows[1].time_since_first, 30);
        assert_eq!(rows[1].epr, Some(1.0));
        assert_eq!(rows[1].change_type, Some(ChangeType::Accretion));
    }

    #[test]
    fn test_single_observation_transect() {
        let ts = assembled();
        let rows: Vec<_> = ts.rows_for(2).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].annual_change, 0.0);
        assert_eq!(rows[0].time_since_first, 0);
        assert_eq!(rows[0].epr, None);
        assert_eq!(rows[0].change_type, None);

        let meta = &ts.tensor.metadata[1];
        assert_eq!(meta.transect_id, 2);
        assert_eq!(meta.years_present, vec![2004]);
        assert_eq!(meta.mean_annual_change, None);
    }

    #[test]
    fn test_mean_annual_change_differs_from_epr() {
        let ts = assembled();
        let meta = &ts.tensor.metadata[2];
        // Year-over-year rates 2.0 then -0.5 over the 20-year gap
        assert_relative_eq!(meta.mean_annual_change.unwrap(), 0.75);
        assert_eq!(meta.num_observations, 3);

        let last = ts.rows_for(3).last().unwrap();
        assert_eq!(last.time_since_first, 30);
        assert_relative_eq!(last.annual_change, -0.5);
        assert_relative_eq!(last.epr.unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_tensor_matches_long_form() {
        let ts = assembled();
        for meta in &ts.tensor.metadata {
            for &year in &meta.years_present {
                let cell = ts.tensor.get(meta.transect_id, year).unwrap();
                let row = ts
                    .rows_for(meta.transect_id)
                    .find(|r| r.year == year)
                    .unwrap();
                assert_eq!(row.position, cell);
            }
        }
        assert_eq!(ts.long_form.len(), ts.tensor.num_observed());
    }

    #[test]
    fn test_long_form_csv() {
        let ts = assembled();
        let csv = long_form_table(&ts.long_form).unwrap().to_csv_string();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("transect_id,year,position,annual_change,time_since_first,epr,change_type")
        );
        assert_eq!(lines.next(), Some("0,1994,10,0,0,1,Accretion"));
        assert!(csv.contains("2,2004,7,0,0,,\n"));
    }

    #[test]
    fn test_empty_years_rejected() {
        let t = PositionTable {
            years: vec![],
            rows: vec![],
        };
        assert!(matches!(assemble_timeseries(&t, &[]), Err(Error::EmptyYears)));
    }
}
