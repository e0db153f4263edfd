//! Spatial feasibility oracle contract and the values exchanged across it.
//!
//! The packing core never touches territory geometry. It asks an oracle for the
//! territory's bounding box, hands it lattice candidates to filter, and gives it
//! the surviving circles to persist. [`crate::memory::MemoryOracle`] is the
//! in-process implementation; a spatial database can stand behind the same trait.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Axis-aligned bounds in territory coordinates (lon/lat degrees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge
    pub min_x: f64,
    /// Southern edge
    pub min_y: f64,
    /// Eastern edge
    pub max_x: f64,
    /// Northern edge
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates bounds from edges in (min_x, min_y, max_x, max_y) order.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// True when the box spans no area a lattice could be laid over.
    ///
    /// Inverted edges and non-finite coordinates count as degenerate; a
    /// zero-width box does not, since a single row or column still fits.
    pub fn is_degenerate(&self) -> bool {
        !(self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite())
            || self.min_x > self.max_x
            || self.min_y > self.max_y
    }

    /// Whether the point lies inside or on the edge of the box.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A lattice point proposed as a circle centre. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
}

impl Candidate {
    /// Creates a candidate at (x, y).
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The candidate as an `(x, y)` tuple.
    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// An accepted circle: the unit of output.
///
/// `level` is the zero-based radius tier that placed the circle; larger levels
/// never carry larger radii.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre longitude
    pub x: f64,
    /// Centre latitude
    pub y: f64,
    /// Radius in meters
    pub radius: f64,
    /// Radius tier
    pub level: u32,
}

impl Circle {
    /// Places a circle of `radius` at a feasible candidate.
    pub fn at(candidate: Candidate, radius: f64, level: u32) -> Self {
        Self {
            x: candidate.x,
            y: candidate.y,
            radius,
            level,
        }
    }

    /// The centre as an `(x, y)` tuple.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Black-box spatial service the packing core depends on.
///
/// Implementations must make [`commit`](SpatialOracle::commit) atomic per call:
/// a later [`filter_feasible`](SpatialOracle::filter_feasible) sees either the
/// whole batch or none of it.
pub trait SpatialOracle {
    /// Bounding box of the territory.
    ///
    /// # Errors
    ///
    /// [`crate::Error::TerritoryNotFound`] for unknown ids.
    fn bounds_of(&self, territory: &str) -> Result<BoundingBox>;

    /// Returns the candidates whose disk of `radius` meters lies inside the
    /// territory and clears every committed circle by at least the oracle's
    /// tangency margin.
    ///
    /// The returned candidates must not overlap one another either. With
    /// `limit`, the oracle may stop once that many candidates are accepted.
    ///
    /// # Errors
    ///
    /// [`crate::Error::TerritoryNotFound`] for unknown ids, or any
    /// implementation-specific failure of the underlying store.
    fn filter_feasible(
        &self,
        territory: &str,
        candidates: &[Candidate],
        radius: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>>;

    /// Durably records a batch of circles.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Persistence`] when the batch cannot be stored; the core
    /// does not retry.
    fn commit(&mut self, territory: &str, circles: &[Circle]) -> Result<()>;

    /// Drops every circle recorded for the territory.
    ///
    /// # Errors
    ///
    /// Store failures; an unknown territory is not one.
    fn clear(&mut self, territory: &str) -> Result<()>;
}

impl<O: SpatialOracle + ?Sized> SpatialOracle for &mut O {
    fn bounds_of(&self, territory: &str) -> Result<BoundingBox> {
        (**self).bounds_of(territory)
    }

    fn filter_feasible(
        &self,
        territory: &str,
        candidates: &[Candidate],
        radius: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>> {
        (**self).filter_feasible(territory, candidates, radius, limit)
    }

    fn commit(&mut self, territory: &str, circles: &[Circle]) -> Result<()> {
        (**self).commit(territory, circles)
    }

    fn clear(&mut self, territory: &str) -> Result<()> {
        (**self).clear(territory)
    }
}
