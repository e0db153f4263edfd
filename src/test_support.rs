//! Shared doubles for the in-crate tests

use std::cell::RefCell;

use crate::error::{Error, Result};
use crate::oracle::{BoundingBox, Candidate, Circle, SpatialOracle};

/// Oracle whose "SQR" territory fits any disk up to `max_fit` meters anywhere.
///
/// Accepts the whole lattice up to the limit and records every call.
pub(crate) struct ThresholdOracle {
    pub(crate) bounds: BoundingBox,
    pub(crate) max_fit: f64,
    /// `(radius, limit)` of each filter call
    pub(crate) requests: RefCell<Vec<(f64, Option<usize>)>>,
    /// Batches committed since the last clear
    pub(crate) commits: Vec<Vec<Circle>>,
    pub(crate) cleared: usize,
}

impl ThresholdOracle {
    pub(crate) fn new(max_fit: f64) -> Self {
        Self {
            bounds: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            max_fit,
            requests: RefCell::new(Vec::new()),
            commits: Vec::new(),
            cleared: 0,
        }
    }

    /// Circles committed since the last clear.
    pub(crate) fn committed(&self) -> usize {
        self.commits.iter().map(Vec::len).sum()
    }
}

impl SpatialOracle for ThresholdOracle {
    fn bounds_of(&self, territory: &str) -> Result<BoundingBox> {
        if territory == "SQR" {
            Ok(self.bounds)
        } else {
            Err(Error::not_found(territory))
        }
    }

    fn filter_feasible(
        &self,
        _territory: &str,
        candidates: &[Candidate],
        radius: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>> {
        self.requests.borrow_mut().push((radius, limit));
        if radius > self.max_fit {
            return Ok(Vec::new());
        }
        let take = limit.unwrap_or(candidates.len());
        Ok(candidates.iter().copied().take(take).collect())
    }

    fn commit(&mut self, _territory: &str, circles: &[Circle]) -> Result<()> {
        self.commits.push(circles.to_vec());
        Ok(())
    }

    fn clear(&mut self, _territory: &str) -> Result<()> {
        self.cleared += 1;
        self.commits.clear();
        Ok(())
    }
}
