//! Planar geometry for transect analysis
//!
//! Coordinates are unit-agnostic (pixels or projected metres); callers must
//! keep units consistent across a run.

mod curve;
mod primitives;

pub use curve::Curve;
pub use primitives::{
    distance, dot, lerp, perpendicular, project_onto_segment, segment_intersection, unit_vector,
    SegmentIntersection, DEGENERATE_EPS,
};
