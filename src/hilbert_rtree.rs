//! Static Hilbert R-tree over axis-aligned boxes.
//!
//! Packed bottom-up in the flatbush layout: leaves are sorted by the Hilbert
//! index of their centres, then grouped `node_size` at a time into parent
//! nodes until a single root remains. Items are added once, the tree is built
//! once, and queries return the original insertion indices.

use std::collections::VecDeque;

/// Axis-aligned box of one leaf or tree node
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) min_x: f64,
    pub(crate) min_y: f64,
    pub(crate) max_x: f64,
    pub(crate) max_y: f64,
}

impl Bounds {
    fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    fn extend(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    #[inline]
    fn intersects(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool {
        !(max_x < self.min_x || max_y < self.min_y || min_x > self.max_x || min_y > self.max_y)
    }
}

/// Hilbert R-tree for box intersection queries.
///
/// Node positions `[0, num_items)` hold the leaves; parent nodes follow, one
/// tree level after another, with the root last. For a leaf, `indices` holds
/// the item's insertion index; for a parent, the position of its first child.
///
/// # Examples
/// ```
/// use hexpack::HilbertRTree;
///
/// let mut tree = HilbertRTree::new();
/// tree.add(0.0, 0.0, 1.0, 1.0);
/// tree.add(0.5, 0.5, 1.5, 1.5);
/// tree.add(4.0, 4.0, 5.0, 5.0);
/// tree.build();
///
/// let mut results = Vec::new();
/// tree.query_intersecting(0.7, 0.7, 1.3, 1.3, &mut results);
/// results.sort();
/// assert_eq!(results, vec![0, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct HilbertRTree {
    /// Leaf boxes followed by parent boxes
    pub(crate) boxes: Vec<Bounds>,
    /// Item index (leaves) or first-child position (parents)
    pub(crate) indices: Vec<usize>,
    /// Level boundaries: end position of each tree level
    pub(crate) level_bounds: Vec<usize>,
    /// Node size for tree construction
    pub(crate) node_size: usize,
    /// Number of leaf items
    pub(crate) num_items: usize,
    /// Bounding box of all items
    pub(crate) bounds: Bounds,
    built: bool,
}

const MAX_HILBERT: u32 = u16::MAX as u32;
const DEFAULT_NODE_SIZE: usize = 16;

impl HilbertRTree {
    /// Creates a new empty Hilbert R-tree
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new Hilbert R-tree with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity),
            level_bounds: Vec::new(),
            node_size: DEFAULT_NODE_SIZE,
            num_items: 0,
            bounds: Bounds::empty(),
            built: false,
        }
    }

    /// Adds a bounding box to the tree.
    ///
    /// Boxes added after [`build`](Self::build) are ignored by queries until the
    /// tree is rebuilt from scratch.
    pub fn add(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        if self.built {
            return;
        }
        let item = Bounds::new(min_x, min_y, max_x, max_y);
        self.bounds.extend(&item);
        self.boxes.push(item);
        self.indices.push(self.num_items);
        self.num_items += 1;
    }

    /// Builds the index. Must be called once, after all items are added.
    pub fn build(&mut self) {
        if self.built || self.num_items == 0 {
            return;
        }
        self.built = true;

        let num_items = self.num_items;
        let node_size = self.node_size;

        let mut level_bounds = vec![num_items];
        let mut count = num_items;
        let mut total_nodes = num_items;
        loop {
            count = count.div_ceil(node_size);
            total_nodes += count;
            level_bounds.push(total_nodes);
            if count <= 1 {
                break;
            }
        }
        self.level_bounds = level_bounds;

        if num_items > node_size {
            self.sort_leaves();
        }

        self.boxes.reserve(total_nodes - num_items);
        self.indices.reserve(total_nodes - num_items);

        let mut pos = 0_usize;
        for level in 0..self.level_bounds.len() - 1 {
            let level_end = self.level_bounds[level];
            while pos < level_end {
                let first_child = pos;
                let mut node = Bounds::empty();
                let group_end = (pos + node_size).min(level_end);
                while pos < group_end {
                    node.extend(&self.boxes[pos]);
                    pos += 1;
                }
                self.boxes.push(node);
                self.indices.push(first_child);
            }
        }
    }

    /// Returns the number of items
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Returns whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Collects the indices of all items intersecting the query box.
    ///
    /// Edges are inclusive. `results` is cleared first. An unbuilt tree yields
    /// nothing.
    pub fn query_intersecting(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        results: &mut Vec<usize>,
    ) {
        results.clear();
        self.visit_intersecting(min_x, min_y, max_x, max_y, |index| {
            results.push(index);
            true
        });
    }

    /// Like [`query_intersecting`](Self::query_intersecting), but stops after
    /// `k` hits.
    pub fn query_intersecting_k(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        k: usize,
        results: &mut Vec<usize>,
    ) {
        results.clear();
        if k == 0 {
            return;
        }
        self.visit_intersecting(min_x, min_y, max_x, max_y, |index| {
            results.push(index);
            results.len() < k
        });
    }

    /// Whether any item intersects the query box and satisfies `accept`.
    ///
    /// Stops at the first accepted item.
    pub fn any_intersecting<F>(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64, mut accept: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        let mut found = false;
        self.visit_intersecting(min_x, min_y, max_x, max_y, |index| {
            found = accept(index);
            !found
        });
        found
    }

    /// Walks the tree breadth-first, calling `visit` with the index of each
    /// intersecting item until it returns false.
    pub(crate) fn visit_intersecting<F>(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64, mut visit: F)
    where
        F: FnMut(usize) -> bool,
    {
        if !self.built || self.num_items == 0 {
            return;
        }

        let mut queue = VecDeque::new();
        let mut node_index = self.boxes.len() - 1;

        loop {
            let end = (node_index + self.node_size).min(self.upper_bound(node_index));
            for pos in node_index..end {
                if !self.boxes[pos].intersects(min_x, min_y, max_x, max_y) {
                    continue;
                }
                if pos < self.num_items {
                    if !visit(self.indices[pos]) {
                        return;
                    }
                } else {
                    queue.push_back(self.indices[pos]);
                }
            }

            match queue.pop_front() {
                Some(next) => node_index = next,
                None => break,
            }
        }
    }

    // --- Private helpers ---

    /// End position of the tree level containing `node_index`
    #[inline]
    fn upper_bound(&self, node_index: usize) -> usize {
        self.level_bounds
            .iter()
            .copied()
            .find(|&bound| bound > node_index)
            .unwrap_or(self.boxes.len())
    }

    /// Reorders leaves (boxes and indices together) by Hilbert value
    fn sort_leaves(&mut self) {
        let width = self.bounds.max_x - self.bounds.min_x;
        let height = self.bounds.max_y - self.bounds.min_y;
        let hilbert_width = if width > 0.0 { f64::from(MAX_HILBERT) / width } else { 0.0 };
        let hilbert_height = if height > 0.0 { f64::from(MAX_HILBERT) / height } else { 0.0 };
        #[expect(clippy::cast_possible_truncation, reason = "clamped to the Hilbert grid first")]
        let scale = |value: f64| value.clamp(0.0, f64::from(MAX_HILBERT) - 1.0) as u32;

        let mut leaves: Vec<(u32, Bounds, usize)> = self
            .boxes
            .iter()
            .zip(&self.indices)
            .map(|(item, &index)| {
                let center_x = ((item.min_x + item.max_x) / 2.0 - self.bounds.min_x) * hilbert_width;
                let center_y = ((item.min_y + item.max_y) / 2.0 - self.bounds.min_y) * hilbert_height;
                (hilbert_xy_to_index(scale(center_x), scale(center_y)), *item, index)
            })
            .collect();
        leaves.sort_by_key(|&(hilbert, _, index)| (hilbert, index));

        for (pos, (_, item, index)) in leaves.into_iter().enumerate() {
            self.boxes[pos] = item;
            self.indices[pos] = index;
        }
    }
}

impl Default for HilbertRTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Hilbert curve index computation
/// From https://github.com/rawrunprotected/hilbert_curves (public domain)
fn interleave(mut x: u32) -> u32 {
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

#[expect(non_snake_case, reason = "names follow the reference derivation")]
pub(crate) fn hilbert_xy_to_index(x: u32, y: u32) -> u32 {
    // Initial prefix scan round, prime with x and y
    let mut a = x ^ y;
    let mut b = 0xFFFF ^ a;
    let mut c = 0xFFFF ^ (x | y);
    let mut d = x & (y ^ 0xFFFF);
    let mut A = a | (b >> 1);
    let mut B = (a >> 1) ^ a;
    let mut C = ((c >> 1) ^ (b & (d >> 1))) ^ c;
    let mut D = ((a & (c >> 1)) ^ (d >> 1)) ^ d;

    for shift in [2_u32, 4] {
        a = A;
        b = B;
        c = C;
        d = D;
        A = (a & (a >> shift)) ^ (b & (b >> shift));
        B = (a & (b >> shift)) ^ (b & ((a ^ b) >> shift));
        C ^= (a & (c >> shift)) ^ (b & (d >> shift));
        D ^= (b & (c >> shift)) ^ ((a ^ b) & (d >> shift));
    }

    // Final round and projection
    a = A;
    b = B;
    c = C;
    d = D;
    C ^= (a & (c >> 8)) ^ (b & (d >> 8));
    D ^= (b & (c >> 8)) ^ ((a ^ b) & (d >> 8));

    // Undo transformation prefix scan
    a = C ^ (C >> 1);
    b = D ^ (D >> 1);

    // Recover index bits
    let i0 = x ^ y;
    let i1 = b | (0xFFFF ^ (i0 | a));

    (interleave(i1) << 1) | interleave(i0)
}
