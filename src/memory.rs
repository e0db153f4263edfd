//! In-process spatial oracle over `geo` polygons.
//!
//! Territories are lon/lat multipolygons; radii and distances are meters,
//! measured with [`crate::units`]. Committed circles of each territory live in
//! a [`HilbertRTree`] keyed by centre point, rebuilt after every commit.

use std::collections::HashMap;
use std::iter;

use geo::{Area, BoundingRect, Coord, EuclideanDistance, Line, LineString, MultiPolygon, Point, Polygon, Rect};

use crate::error::{Error, Result};
use crate::hilbert_rtree::HilbertRTree;
use crate::oracle::{BoundingBox, Candidate, Circle, SpatialOracle};
use crate::units::{METERS_PER_DEGREE, ground_distance, meters_per_degree_lng, meters_to_degrees_lat, meters_to_degrees_lng};

/// Clearance kept between a new disk and every committed one, in meters.
pub const DEFAULT_MARGIN: f64 = 1.0;

/// Float noise absorbed by tangency and boundary-contact tests, in meters.
const CONTACT_TOLERANCE: f64 = 1e-6;

/// A territory polygon with its precomputed bounding box.
///
/// Every ring segment is indexed by its bounding box, so disk tests only look
/// at the edges near the disk.
#[derive(Clone, Debug)]
pub struct Territory {
    shape: MultiPolygon<f64>,
    bounds: BoundingBox,
    edges: Vec<Edge>,
    edge_index: HilbertRTree,
}

/// One ring segment and the member polygon it belongs to.
#[derive(Clone, Copy, Debug)]
struct Edge {
    member: usize,
    line: Line<f64>,
}

impl Territory {
    /// Wraps a lon/lat multipolygon. Holes are honoured.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTerritory`] when the shape has no area or a non-finite
    /// vertex.
    pub fn new(shape: MultiPolygon<f64>) -> Result<Self> {
        let finite = shape.iter().all(|polygon| {
            rings(polygon)
                .flat_map(|ring| ring.coords())
                .all(|coord| coord.x.is_finite() && coord.y.is_finite())
        });
        if !finite {
            return Err(invalid("territory has a non-finite vertex"));
        }
        if shape.unsigned_area() <= 0.0 {
            return Err(invalid("territory has no area"));
        }
        let rect = shape
            .bounding_rect()
            .ok_or_else(|| invalid("territory has no vertices"))?;

        let edges: Vec<Edge> = shape
            .iter()
            .enumerate()
            .flat_map(|(member, polygon)| {
                rings(polygon)
                    .flat_map(|ring| ring.lines())
                    .map(move |line| Edge { member, line })
            })
            .collect();
        let mut edge_index = HilbertRTree::with_capacity(edges.len());
        for edge in &edges {
            let (start, end) = (edge.line.start, edge.line.end);
            edge_index.add(start.x.min(end.x), start.y.min(end.y), start.x.max(end.x), start.y.max(end.y));
        }
        edge_index.build();

        Ok(Self {
            bounds: BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
            shape,
            edges,
            edge_index,
        })
    }

    /// Wraps a single polygon.
    ///
    /// # Errors
    ///
    /// As [`Territory::new`].
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    /// Axis-aligned lon/lat rectangle.
    ///
    /// # Errors
    ///
    /// As [`Territory::new`]; a zero-width rectangle has no area.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
        Self::from_polygon(rect.to_polygon())
    }

    /// Bounding box of the whole shape.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The underlying geometry.
    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Whether a disk of `radius` meters centred at `center` lies inside.
    ///
    /// The centre must be strictly inside one member polygon, outside its
    /// holes, and at least `radius` from every ring of that polygon.
    pub fn contains_disk(&self, center: (f64, f64), radius: f64) -> bool {
        if radius.is_nan() || !self.bounds.contains_point(center.0, center.1) {
            return false;
        }
        self.enclosing_member(center)
            .is_some_and(|member| self.edges_clear(member, center, radius))
    }

    /// Lowest-numbered member polygon whose rings enclose `point`.
    ///
    /// Even-odd crossing count of a ray cast east from the point, taken over
    /// the edges the ray's box meets.
    fn enclosing_member(&self, point: (f64, f64)) -> Option<usize> {
        let (px, py) = point;
        let mut odd: Vec<usize> = Vec::new();
        self.edge_index.visit_intersecting(px, py, self.bounds.max_x, py, |position| {
            let Edge { member, line } = self.edges[position];
            let (a, b) = (line.start, line.end);
            if (a.y > py) != (b.y > py) && px < (b.x - a.x) * (py - a.y) / (b.y - a.y) + a.x {
                match odd.iter().position(|&seen| seen == member) {
                    Some(slot) => {
                        let _even = odd.swap_remove(slot);
                    }
                    None => odd.push(member),
                }
            }
            true
        });
        odd.into_iter().min()
    }

    /// Every ring segment of `member` is at least `radius` meters from
    /// `center`.
    fn edges_clear(&self, member: usize, center: (f64, f64), radius: f64) -> bool {
        let lng_scale = meters_per_degree_lng(center.1);
        let project = |coord: Coord<f64>| Coord {
            x: (coord.x - center.0) * lng_scale,
            y: (coord.y - center.1) * METERS_PER_DEGREE,
        };
        let origin = Point::new(0.0, 0.0);
        // a centre on a ring is never inside
        let limit = (radius - CONTACT_TOLERANCE).max(f64::MIN_POSITIVE);

        let (min_x, min_y, max_x, max_y) = search_extent(center, radius);
        !self.edge_index.any_intersecting(min_x, min_y, max_x, max_y, |position| {
            let edge = &self.edges[position];
            edge.member == member
                && origin.euclidean_distance(&Line::new(project(edge.line.start), project(edge.line.end))) < limit
        })
    }
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    iter::once(polygon.exterior()).chain(polygon.interiors())
}

fn invalid(reason: &str) -> Error {
    Error::InvalidTerritory {
        reason: reason.to_owned(),
    }
}

/// Lon/lat box around `center` that holds every point within `reach` meters.
///
/// Longitude span is taken at the latitude farthest from the equator the box
/// reaches, where a degree of longitude is shortest.
fn search_extent(center: (f64, f64), reach: f64) -> (f64, f64, f64, f64) {
    let dlat = meters_to_degrees_lat(reach);
    let dlng = meters_to_degrees_lng(reach, center.1.abs() + dlat);
    (center.0 - dlng, center.1 - dlat, center.0 + dlng, center.1 + dlat)
}

/// Circles committed for one territory.
#[derive(Debug, Default)]
struct CircleLayer {
    circles: Vec<Circle>,
    /// Centre points, indexed by position in `circles`
    index: HilbertRTree,
    largest_radius: f64,
}

impl CircleLayer {
    fn extend(&mut self, batch: &[Circle]) {
        self.circles.extend_from_slice(batch);

        let mut index = HilbertRTree::with_capacity(self.circles.len());
        for circle in &self.circles {
            index.add(circle.x, circle.y, circle.x, circle.y);
        }
        index.build();
        self.index = index;
        self.largest_radius = self.circles.iter().map(|circle| circle.radius).fold(0.0, f64::max);
    }

    /// Whether a disk at `center` comes within `radius + other + margin` of a
    /// committed circle.
    fn conflicts(&self, center: (f64, f64), radius: f64, margin: f64) -> bool {
        if self.circles.is_empty() {
            return false;
        }
        let (min_x, min_y, max_x, max_y) = search_extent(center, radius + self.largest_radius + margin);
        self.index.any_intersecting(min_x, min_y, max_x, max_y, |position| {
            let other = &self.circles[position];
            ground_distance(center, other.center()) <= radius + other.radius + margin
        })
    }
}

/// Centres accepted so far by one filter call, bucketed on a lon/lat grid.
///
/// Cells span at least `contact` meters each way at every latitude of the
/// batch, so a crowding centre always sits in one of the 3x3 cells around.
#[derive(Debug)]
struct AcceptedGrid {
    contact: f64,
    cell_lng: f64,
    cell_lat: f64,
    cells: HashMap<(i64, i64), Vec<(f64, f64)>>,
}

impl AcceptedGrid {
    fn new(candidates: &[Candidate], contact: f64) -> Self {
        let farthest = candidates
            .iter()
            .map(|candidate| candidate.y.abs())
            .fold(0.0, f64::max);
        Self {
            contact,
            cell_lng: meters_to_degrees_lng(contact, farthest),
            cell_lat: meters_to_degrees_lat(contact),
            cells: HashMap::new(),
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "saturating casts only merge far-off cells")]
    fn cell(&self, center: (f64, f64)) -> (i64, i64) {
        (
            (center.0 / self.cell_lng).floor() as i64,
            (center.1 / self.cell_lat).floor() as i64,
        )
    }

    /// Whether an accepted centre lies closer than `contact` to `center`.
    fn crowds(&self, center: (f64, f64)) -> bool {
        let (column, row) = self.cell(center);
        (-1..=1).any(|dx: i64| {
            (-1..=1).any(|dy: i64| {
                self.cells
                    .get(&(column.saturating_add(dx), row.saturating_add(dy)))
                    .is_some_and(|centres| {
                        centres
                            .iter()
                            .any(|&other| ground_distance(center, other) < self.contact)
                    })
            })
        })
    }

    fn insert(&mut self, center: (f64, f64)) {
        let cell = self.cell(center);
        self.cells.entry(cell).or_default().push(center);
    }
}

/// Oracle holding territories and circles in memory.
///
/// Within one [`filter_feasible`](SpatialOracle::filter_feasible) call,
/// candidates are accepted in input order and a candidate overlapping an
/// earlier accepted one is dropped. Exactly tangent candidates of the same
/// batch are both kept; the margin applies only against committed circles.
///
/// ```
/// use hexpack::prelude::*;
///
/// let mut oracle = MemoryOracle::new();
/// oracle.insert_territory("SQR", Territory::rectangle(0.0, 0.0, 1.0, 1.0).unwrap());
///
/// let inside = Candidate::new(0.5, 0.5);
/// let edge = Candidate::new(0.01, 0.5);
/// let kept = oracle.filter_feasible("SQR", &[inside, edge], 10_000.0, None).unwrap();
/// assert_eq!(kept, vec![inside]);
/// ```
#[derive(Debug)]
pub struct MemoryOracle {
    territories: HashMap<String, Territory>,
    layers: HashMap<String, CircleLayer>,
    margin: f64,
}

impl MemoryOracle {
    /// Empty oracle with [`DEFAULT_MARGIN`].
    pub fn new() -> Self {
        Self {
            territories: HashMap::new(),
            layers: HashMap::new(),
            margin: DEFAULT_MARGIN,
        }
    }

    /// Sets the clearance kept against committed circles, in meters.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Clearance kept against committed circles, in meters.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Registers a territory, replacing any previous one with the same id
    /// along with its circles.
    pub fn insert_territory(&mut self, id: impl Into<String>, territory: Territory) {
        let id = id.into();
        let _stale = self.layers.remove(&id);
        let _replaced = self.territories.insert(id, territory);
    }

    /// The territory registered under `id`.
    pub fn territory(&self, id: &str) -> Option<&Territory> {
        self.territories.get(id)
    }

    /// Circles committed for `id`, in commit order.
    pub fn circles(&self, id: &str) -> &[Circle] {
        self.layers
            .get(id)
            .map(|layer| layer.circles.as_slice())
            .unwrap_or_default()
    }

    /// Number of circles committed for `id`.
    pub fn circle_count(&self, id: &str) -> usize {
        self.circles(id).len()
    }

    fn lookup(&self, id: &str) -> Result<&Territory> {
        self.territories.get(id).ok_or_else(|| Error::not_found(id))
    }
}

impl Default for MemoryOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialOracle for MemoryOracle {
    fn bounds_of(&self, territory: &str) -> Result<BoundingBox> {
        Ok(self.lookup(territory)?.bounds())
    }

    fn filter_feasible(
        &self,
        territory: &str,
        candidates: &[Candidate],
        radius: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>> {
        let shape = self.lookup(territory)?;
        let limit = limit.unwrap_or(usize::MAX);
        let mut accepted: Vec<Candidate> = Vec::new();
        if limit == 0 || !(radius.is_finite() && radius > 0.0) {
            return Ok(accepted);
        }

        let layer = self.layers.get(territory);
        let mut batch = AcceptedGrid::new(candidates, 2.0 * radius - CONTACT_TOLERANCE);

        for candidate in candidates {
            let center = candidate.position();
            if layer.is_some_and(|layer| layer.conflicts(center, radius, self.margin)) {
                continue;
            }
            if batch.crowds(center) || !shape.contains_disk(center, radius) {
                continue;
            }
            batch.insert(center);
            accepted.push(*candidate);
            if accepted.len() >= limit {
                break;
            }
        }
        Ok(accepted)
    }

    fn commit(&mut self, territory: &str, circles: &[Circle]) -> Result<()> {
        self.lookup(territory)?;
        if let Some(bad) = circles.iter().find(|circle| {
            !(circle.x.is_finite() && circle.y.is_finite() && circle.radius.is_finite() && circle.radius > 0.0)
        }) {
            return Err(Error::persistence(
                territory,
                format!("circle at ({}, {}) with radius {} cannot be stored", bad.x, bad.y, bad.radius),
            ));
        }

        self.layers.entry(territory.to_owned()).or_default().extend(circles);
        Ok(())
    }

    fn clear(&mut self, territory: &str) -> Result<()> {
        let _removed = self.layers.remove(territory);
        Ok(())
    }
}
