//! One packing pass at a fixed radius.

use tracing::info;

use crate::error::Result;
use crate::lattice::generate_candidates;
use crate::oracle::{Candidate, Circle, SpatialOracle};

/// Lays the lattice for `radius` over the territory, keeps every feasible
/// candidate and commits them as circles of `level`.
///
/// The whole lattice goes to the oracle in one call, so the accepted set is
/// de-conflicted against itself as well as against earlier levels. Returns the
/// number of circles placed, possibly zero.
///
/// # Errors
///
/// Propagates oracle failures; a failed commit leaves the level unplaced.
pub fn pack_level<O: SpatialOracle + ?Sized>(
    oracle: &mut O,
    territory: &str,
    radius: f64,
    level: u32,
) -> Result<usize> {
    let bounds = oracle.bounds_of(territory)?;
    let candidates: Vec<Candidate> = generate_candidates(&bounds, radius).collect();

    let placements = if candidates.is_empty() {
        Vec::new()
    } else {
        oracle.filter_feasible(territory, &candidates, radius, None)?
    };

    let circles: Vec<Circle> = placements
        .into_iter()
        .map(|candidate| Circle::at(candidate, radius, level))
        .collect();
    if !circles.is_empty() {
        oracle.commit(territory, &circles)?;
    }

    info!(
        territory,
        level,
        radius,
        candidates = candidates.len(),
        placed = circles.len(),
        "level packed"
    );
    Ok(circles.len())
}
