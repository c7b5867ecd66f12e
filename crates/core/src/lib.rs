//! # Shorewatch Core
//!
//! Core types, traits and I/O for the shorewatch coastal change toolkit.
//!
//! This crate provides:
//! - `Curve`: validated planar polyline with arc-length queries
//! - Geometry primitives: tangents, perpendiculars, segment intersection
//! - `FeatureCollection`: vector features with attributes (GeoJSON subset)
//! - `AnalysisConfig`: the configuration surface consumed by the pipeline
//! - Shoreline ingestion behind the `ShorelineSource` capability, with an
//!   explicit `ShorelineCache`
//! - Algorithm traits for consistent API

pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod vector;

pub use cache::ShorelineCache;
pub use config::{AnalysisConfig, PredictorKind};
pub use error::{Error, Result};
pub use geometry::{Curve, SegmentIntersection};
pub use vector::ShorelineEpochs;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{AnalysisConfig, PredictorKind};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Curve, SegmentIntersection};
    pub use crate::vector::ShorelineEpochs;
    pub use crate::Algorithm;
    pub use geo_types::Coord;
}

/// Core trait for all algorithms in shorewatch.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
