//! Transect generation
//!
//! Anchors are placed every `spacing` units of arc length along the
//! baseline. At each anchor the forward difference towards the point one
//! spacing further on gives the local tangent; the transect is the segment
//! of the requested length centred on the anchor along the tangent's
//! left-hand normal.

use shorewatch_core::geometry::{perpendicular, unit_vector};
use shorewatch_core::{Algorithm, Curve, Error, Result};
use tracing::{debug, info, warn};

use super::Transect;

/// Parameters for transect generation
#[derive(Debug, Clone)]
pub struct TransectParams {
    /// Arc-length distance between consecutive anchors
    pub spacing: f64,
    /// Full transect length (half on each side of the baseline)
    pub length: f64,
}

impl Default for TransectParams {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            length: 300.0,
        }
    }
}

impl TransectParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing > 0.0 && self.spacing.is_finite()) {
            return Err(Error::invalid("spacing", self.spacing, "must be positive"));
        }
        if !(self.length > 0.0 && self.length.is_finite()) {
            return Err(Error::invalid("length", self.length, "must be positive"));
        }
        Ok(())
    }
}

/// Transect generation algorithm
#[derive(Debug, Clone, Default)]
pub struct TransectGenerator;

impl Algorithm for TransectGenerator {
    type Input = Curve;
    type Output = Vec<Transect>;
    type Params = TransectParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Transects"
    }

    fn description(&self) -> &'static str {
        "Generate perpendicular transects at uniform spacing along a baseline"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        generate_transects(&input, params)
    }
}

/// Upper bound on the number of anchors a single baseline may produce
pub const MAX_ANCHORS: usize = 10_000_000;

/// Anchor distances `0, s, 2s, ...` up to and including `length`.
///
/// Always `floor(length / spacing) + 1` values for a finite, non-negative
/// length and positive spacing.
///
/// # Errors
/// [`Error::InvalidParameter`] for a negative or non-finite length, a
/// non-positive spacing, or a spacing so small that the anchor count would
/// exceed [`MAX_ANCHORS`].
pub fn anchor_distances(length: f64, spacing: f64) -> Result<Vec<f64>> {
    if !(length >= 0.0 && length.is_finite()) {
        return Err(Error::invalid("length", length, "must be finite and non-negative"));
    }
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Err(Error::invalid("spacing", spacing, "must be positive"));
    }
    let steps = (length / spacing).floor();
    if !(steps < MAX_ANCHORS as f64) {
        return Err(Error::invalid(
            "spacing",
            spacing,
            format!("yields more than {} anchors over length {}", MAX_ANCHORS, length),
        ));
    }
    let n = steps as usize;
    Ok((0..=n).map(|k| (k as f64 * spacing).min(length)).collect())
}

/// Generate transects along a baseline.
///
/// Anchors whose forward-difference direction has zero length (the final
/// anchor when it sits on the curve's end, for instance) are skipped and do
/// not consume an id, so emitted ids are always `0..n` without gaps.
///
/// # Arguments
/// * `baseline` - Reference coastline
/// * `params` - Spacing and length
///
/// # Errors
/// [`Error::InvalidParameter`] for non-positive spacing or length, or a
/// spacing that would exceed [`MAX_ANCHORS`] anchors.
pub fn generate_transects(baseline: &Curve, params: TransectParams) -> Result<Vec<Transect>> {
    params.validate()?;

    let total = baseline.length();
    let half = params.length / 2.0;
    let mut transects = Vec::new();
    let mut skipped = 0usize;

    for d in anchor_distances(total, params.spacing)? {
        let anchor = baseline.point_at(d);
        let ahead = baseline.point_at((d + params.spacing).min(total));

        let Some(tangent) = unit_vector(anchor, ahead) else {
            debug!("Skipping anchor at {:.3}: zero-length direction", d);
            skipped += 1;
            continue;
        };
        let normal = perpendicular(tangent);

        transects.push(Transect {
            id: transects.len() as u32,
            distance_along_coast: d,
            start: geo_types::Coord {
                x: anchor.x - normal.x * half,
                y: anchor.y - normal.y * half,
            },
            end: geo_types::Coord {
                x: anchor.x + normal.x * half,
                y: anchor.y + normal.y * half,
            },
        });
    }

    if transects.is_empty() {
        warn!("Baseline of length {:.3} produced no transects", total);
    }
    info!(
        "Generated {} transects ({} anchors skipped)",
        transects.len(),
        skipped
    );
    Ok(transects)
}
