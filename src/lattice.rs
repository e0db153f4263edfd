//! Hexagonal lattice of candidate circle centres.
//!
//! Rows sit `radius * sqrt(3)` meters apart, columns `2 * radius` meters apart,
//! and odd rows shift east by `radius`, so disks of `radius` centred on
//! neighbouring points are tangent. Longitude spacing is recomputed per row
//! from that row's latitude.

use crate::oracle::{BoundingBox, Candidate};
use crate::units::{meters_to_degrees_lat, meters_to_degrees_lng};

/// Lazy row-major walk over the lattice points inside a bounding box.
///
/// Points come in ascending latitude, then ascending longitude. The walk is
/// deterministic, so cloning a fresh lattice restarts the same sequence.
#[derive(Clone, Debug)]
pub struct HexLattice {
    bounds: BoundingBox,
    radius: f64,
    /// Latitude pitch between rows, in degrees
    row_step: f64,
    row: usize,
    y: f64,
    /// First longitude of the current row, odd-row offset included
    row_start: f64,
    /// Longitude pitch of the current row, in degrees
    column_step: f64,
    column: usize,
    finished: bool,
}

/// Lattice of candidates for disks of `radius` meters over `bounds`.
///
/// Empty when the radius is not a positive finite number or the box is
/// degenerate.
pub fn generate_candidates(bounds: &BoundingBox, radius: f64) -> HexLattice {
    HexLattice::new(*bounds, radius)
}

impl HexLattice {
    /// Creates the lattice for disks of `radius` meters over `bounds`.
    pub fn new(bounds: BoundingBox, radius: f64) -> Self {
        let finished = !(radius.is_finite() && radius > 0.0) || bounds.is_degenerate();
        let mut lattice = Self {
            bounds,
            radius,
            row_step: meters_to_degrees_lat(radius * 3_f64.sqrt()),
            row: 0,
            y: bounds.min_y,
            row_start: bounds.min_x,
            column_step: 0.0,
            column: 0,
            finished,
        };
        if !finished {
            lattice.enter_row(0);
        }
        lattice
    }

    /// Disk radius the lattice was laid out for, in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn enter_row(&mut self, row: usize) {
        let y = stepped(self.bounds.min_y, row, self.row_step);
        let offset = if row % 2 == 1 {
            meters_to_degrees_lng(self.radius, y)
        } else {
            0.0
        };
        self.row = row;
        self.y = y;
        self.row_start = self.bounds.min_x + offset;
        self.column_step = meters_to_degrees_lng(self.radius * 2.0, y);
        self.column = 0;
    }
}

impl Iterator for HexLattice {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        loop {
            if self.finished {
                return None;
            }

            let x = stepped(self.row_start, self.column, self.column_step);
            if x <= self.bounds.max_x {
                self.column += 1;
                return Some(Candidate::new(x, self.y));
            }

            let next_row = self.row + 1;
            if stepped(self.bounds.min_y, next_row, self.row_step) > self.bounds.max_y {
                self.finished = true;
                return None;
            }
            self.enter_row(next_row);
        }
    }
}

impl std::iter::FusedIterator for HexLattice {}

/// `origin + steps * step`, exactly `origin` for step zero even when `step`
/// overflowed to infinity.
#[inline]
fn stepped(origin: f64, steps: usize, step: f64) -> f64 {
    if steps == 0 {
        origin
    } else {
        origin + steps as f64 * step
    }
}
