//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the crate.
//! Users can import everything they need with:
//!
//! ```
//! use hexpack::prelude::*;
//! ```

pub use crate::{
    BoundingBox, Candidate, Circle, GridConfig, GridGenerator, MemoryOracle, PackingSettings,
    RunSummary, SpatialOracle, Territory,
};
