//! Level-by-level packing loop.
//!
//! Each level packs the whole lattice at the current radius, then the radius
//! search picks the next, strictly smaller radius. When the search comes back
//! empty the radius is cut by `fallback_factor` instead. The run ends once the
//! radius drops below `min_radius`, or at the `max_levels` safety cap.

use tracing::{info, warn};

use crate::config::GridConfig;
use crate::error::Result;
use crate::oracle::SpatialOracle;
use crate::packer::pack_level;
use crate::search::find_largest_feasible_radius;

/// Mutable state of one run. `current_radius` never increases.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RunState {
    /// Radius of the next level to pack, in meters
    current_radius: f64,
    /// Index of the next level to pack
    level: u32,
    /// Circles placed so far
    total_circles: usize,
}

impl RunState {
    fn start(max_radius: f64) -> Self {
        Self {
            current_radius: max_radius,
            level: 0,
            total_circles: 0,
        }
    }
}

/// Outcome of one packed level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelReport {
    /// Level index
    pub level: u32,
    /// Radius used, in meters
    pub radius: f64,
    /// Circles placed
    pub placed: usize,
}

/// Outcome of a whole run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Circles placed across all levels
    pub total_circles: usize,
    /// Number of levels processed
    pub levels: u32,
    /// Per-level results, in processing order
    pub reports: Vec<LevelReport>,
    /// True when the run stopped at the level cap rather than the radius floor
    pub capped: bool,
}

/// Drives a packing run for one territory against an oracle.
///
/// The oracle may be owned or borrowed (`&mut O` is itself an oracle).
///
/// ```
/// use hexpack::prelude::*;
///
/// let mut oracle = MemoryOracle::new();
/// oracle.insert_territory("SQR", Territory::rectangle(0.0, 0.0, 0.5, 0.5).unwrap());
///
/// let config = GridConfig::new("SQR", 20_000.0, 5_000.0);
/// let summary = GridGenerator::new(&mut oracle, config).run().unwrap();
///
/// assert_eq!(summary.total_circles, oracle.circle_count("SQR"));
/// assert!(summary.total_circles > 0);
/// ```
#[derive(Debug)]
pub struct GridGenerator<O> {
    oracle: O,
    config: GridConfig,
}

impl<O: SpatialOracle> GridGenerator<O> {
    /// Creates a generator for `config.territory_id`.
    pub fn new(oracle: O, config: GridConfig) -> Self {
        Self { oracle, config }
    }

    /// Run parameters.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The oracle the generator writes to.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Gives the oracle back.
    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Clears the territory's circles and packs it from scratch.
    ///
    /// # Errors
    ///
    /// Aborts on the first oracle error; circles committed by earlier levels
    /// stay in the oracle.
    pub fn run(&mut self) -> Result<RunSummary> {
        let GridGenerator { oracle, config } = self;
        let territory = config.territory_id.as_str();
        let settings = &config.settings;

        oracle.clear(territory)?;

        let mut summary = RunSummary::default();
        if !config.is_runnable() {
            info!(
                territory,
                max_radius = config.max_radius,
                min_radius = config.min_radius,
                "nothing to pack"
            );
            return Ok(summary);
        }

        info!(territory, max_radius = config.max_radius, "starting grid generation");
        let mut state = RunState::start(config.max_radius);

        while state.current_radius >= config.min_radius {
            if state.level >= settings.max_levels {
                warn!(territory, levels = state.level, "level cap reached");
                summary.capped = true;
                break;
            }

            let placed = pack_level(oracle, territory, state.current_radius, state.level)?;
            summary.reports.push(LevelReport {
                level: state.level,
                radius: state.current_radius,
                placed,
            });
            state.total_circles += placed;
            state.level += 1;

            if state.current_radius <= config.min_radius {
                break;
            }

            let next = find_largest_feasible_radius(
                &*oracle,
                territory,
                config.min_radius,
                state.current_radius - 1.0,
                settings,
            )?;
            state.current_radius = match next {
                Some(radius) if radius < state.current_radius => radius,
                _ => {
                    let reduced = fallback_radius(state.current_radius, settings.fallback_factor);
                    warn!(
                        from = state.current_radius,
                        to = reduced,
                        "no smaller radius found, using fallback reduction"
                    );
                    reduced
                }
            };
        }

        summary.total_circles = state.total_circles;
        summary.levels = state.level;
        info!(
            territory,
            total_circles = summary.total_circles,
            levels = summary.levels,
            "grid generation complete"
        );
        Ok(summary)
    }
}

/// `floor(radius * factor)`, forced strictly below `radius`.
fn fallback_radius(radius: f64, factor: f64) -> f64 {
    let reduced = (radius * factor).floor();
    if reduced < radius {
        reduced
    } else {
        radius - 1.0
    }
}
