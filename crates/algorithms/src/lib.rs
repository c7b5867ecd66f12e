//! # Shorewatch Algorithms
//!
//! Transect-based shoreline change analysis for shorewatch.
//!
//! ## Stages
//!
//! - **transect**: perpendicular sampling frame along a baseline, shoreline
//!   crossings, per-year position table
//! - **change**: NSM, EPR, MAC and erosion / stable / accretion classes
//! - **timeseries**: long-form table and `[transects × years]` sequence tensor
//! - **forecast**: pluggable next-position predictors over lookback windows
//! - **analysis**: baseline selection and the transect stage end to end

pub mod analysis;
pub mod change;
pub mod forecast;
mod maybe_rayon;
pub mod timeseries;
pub mod transect;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{run_transect_analysis, select_baseline, transect_features, TransectAnalysis};
    pub use crate::change::{
        change_table, classify, compute_change, compute_shoreline_change, ChangeParams,
        ChangeRecord, ChangeSummary, ChangeType, ShorelineChange,
    };
    pub use crate::forecast::{
        forecast_positions, forecast_table, forward_fill, run_forecast, select_predictor,
        Forecast, ForecastParams, ForecastRecord, LinearExtrapolation, Predictor, Provenance,
        RegressionPredictor,
    };
    pub use crate::timeseries::{
        assemble_timeseries, long_form_table, SequenceMetadata, SequenceTensor, TimeSeries,
        TimeSeriesRow,
    };
    pub use crate::transect::{
        generate_transects, intersect, measure_positions, PositionTable, Transect,
        TransectGenerator, TransectParams,
    };
    pub use shorewatch_core::prelude::*;
}
