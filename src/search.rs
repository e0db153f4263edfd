//! Largest-first radius search.
//!
//! Feasibility is not monotonic in the radius: a lattice at one radius can hit
//! a gap that a slightly smaller lattice, shifted differently, misses. The
//! search therefore scans downward from the upper bound in steps sized to the
//! range and returns the first radius at which any candidate fits, instead of
//! bisecting.

use tracing::debug;

use crate::config::PackingSettings;
use crate::error::Result;
use crate::lattice::generate_candidates;
use crate::oracle::{BoundingBox, Candidate, SpatialOracle};

/// Step floor used when the configured `min_step` is not a positive number.
const FALLBACK_MIN_STEP: f64 = 1.0;

/// Scans radii from `upper` down to `lower` and returns the first one whose
/// lattice has at least one feasible candidate.
///
/// `Ok(None)` when no probed radius fits or the range is empty.
///
/// # Errors
///
/// Propagates oracle failures, such as an unknown territory.
pub fn find_largest_feasible_radius<O: SpatialOracle + ?Sized>(
    oracle: &O,
    territory: &str,
    lower: f64,
    upper: f64,
    settings: &PackingSettings,
) -> Result<Option<f64>> {
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Ok(None);
    }

    let bounds = oracle.bounds_of(territory)?;
    let step = search_step(lower, upper, settings);
    debug!(territory, lower, upper, step, "searching for next radius");

    let mut probe = 0_u64;
    loop {
        let radius = upper - probe as f64 * step;
        if radius < lower {
            return Ok(None);
        }
        let feasible = can_place_at_least_one(oracle, territory, &bounds, radius)?;
        debug!(radius, feasible, "probed radius");
        if feasible {
            return Ok(Some(radius));
        }
        probe += 1;
    }
}

/// Radius decrement for a search over `[lower, upper]`.
///
/// Wide ranges are split into `settings.probes` slices; narrow ranges fall
/// back to `settings.min_step`.
pub fn search_step(lower: f64, upper: f64, settings: &PackingSettings) -> f64 {
    let min_step = if settings.min_step > 0.0 {
        settings.min_step
    } else {
        FALLBACK_MIN_STEP
    };
    let slices = f64::from(settings.probes.max(1));
    ((upper - lower) / slices).floor().max(min_step)
}

/// Whether a single disk of `radius` fits anywhere on its lattice.
///
/// # Errors
///
/// Propagates oracle failures.
pub fn can_place_at_least_one<O: SpatialOracle + ?Sized>(
    oracle: &O,
    territory: &str,
    bounds: &BoundingBox,
    radius: f64,
) -> Result<bool> {
    let candidates: Vec<Candidate> = generate_candidates(bounds, radius).collect();
    if candidates.is_empty() {
        return Ok(false);
    }
    let placed = oracle.filter_feasible(territory, &candidates, radius, Some(1))?;
    Ok(!placed.is_empty())
}
