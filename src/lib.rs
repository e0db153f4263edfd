//! # hexpack - multi-resolution hexagonal circle packing
//!
//! Covers a territory polygon with non-overlapping circles: the largest radius
//! first, then progressively smaller radii filling the gaps, down to a radius
//! floor. Each radius tier is a *level*.
//!
//! ## Features
//!
//! - **Hexagonal lattice candidates**: tangent-disk lattice with latitude-corrected longitude pitch
//! - **Largest-first radius search**: adaptive step scan for the next radius that still fits
//! - **Pluggable oracle**: containment, overlap and storage sit behind [`SpatialOracle`]
//! - **In-memory oracle**: [`MemoryOracle`] over `geo` polygons with a Hilbert R-tree of placed circles
//!
//! ## Quick Start
//!
//! ```rust
//! use hexpack::prelude::*;
//!
//! // A one-degree square on the equator
//! let mut oracle = MemoryOracle::new();
//! oracle.insert_territory("SQR", Territory::rectangle(0.0, 0.0, 1.0, 1.0).unwrap());
//!
//! // Radii in meters: start at 40 km, stop below 10 km
//! let config = GridConfig::new("SQR", 40_000.0, 10_000.0);
//! let summary = GridGenerator::new(&mut oracle, config).run().unwrap();
//!
//! println!("{} circles in {} levels", summary.total_circles, summary.levels);
//! assert_eq!(oracle.circle_count("SQR"), summary.total_circles);
//!
//! // Radii never grow from one level to the next
//! for pair in summary.reports.windows(2) {
//!     assert!(pair[1].radius < pair[0].radius);
//! }
//! ```
//!
//! ## How It Works
//!
//! Level 0 lays a hexagonal lattice at the maximum radius over the territory's
//! bounding box and keeps every point whose disk fits inside the territory
//! without touching anything placed so far. The radius search then scans
//! downward for the largest radius whose lattice still has a fitting point, and
//! that radius becomes the next level. When the search finds nothing, the
//! radius is cut by a fixed factor instead. The run stops below the radius
//! floor, or at a hard level cap.

pub mod config;
pub mod error;
pub mod generator;
pub mod hilbert_rtree;
pub mod lattice;
pub mod memory;
pub mod oracle;
pub mod packer;
pub mod prelude;
pub mod search;
pub mod units;

#[cfg(test)]
mod test_support;

pub use config::{GridConfig, PackingSettings};
pub use error::{Error, Result};
pub use generator::{GridGenerator, LevelReport, RunSummary};
pub use hilbert_rtree::HilbertRTree;
pub use lattice::{HexLattice, generate_candidates};
pub use memory::{MemoryOracle, Territory};
pub use oracle::{BoundingBox, Candidate, Circle, SpatialOracle};
pub use packer::pack_level;
pub use search::find_largest_feasible_radius;
