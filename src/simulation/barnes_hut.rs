//! # Barnes–Hut Octree (3D)
//!
//! This module implements a **3D Barnes–Hut octree** for approximating
//! gravitational acceleration in an `N`-body system. It replaces the naive
//! `O(N²)` all-pairs sum with an approximate `O(N log N)` traversal.
//!
//! ## Core Concepts
//!
//! - The simulation space is recursively subdivided into 8 octants.
//! - Each octant is a node of the tree, stored in a flat arena (`Vec<Octant>`).
//! - A node is in exactly one of three states:
//!   - `Empty`    no mass, no body, no children
//!   - `Leaf`     holds one body (by index into the body slice)
//!   - `Internal` owns 8 contiguous child slots in the arena
//! - Every non-empty node stores the total mass and center of mass (COM) of
//!   everything below it. Aggregates are updated on the way down during
//!   insertion, so no separate bottom-up pass is needed.
//!
//! ## Lifetime
//!
//! The tree is rebuilt from scratch for every force pass. [`Octree::build`]
//! clears the arena but keeps its allocation, so steady-state stepping does
//! not allocate once the arena has grown to fit the body count.

use log::debug;

use crate::simulation::forces::GravityLaw;
use crate::simulation::states::{Body, NVec3};

/// Maximum subdivision depth. A leaf at this depth absorbs further bodies
/// into its aggregate instead of splitting, which bounds recursion when
/// bodies coincide exactly.
pub const MAX_DEPTH: u32 = 64;

/// Occupancy of an octree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Region with no mass.
    Empty,
    /// Region holding a single body (index into the body slice).
    Leaf(usize),
    /// Region split into 8 children stored at `first_child..first_child + 8`.
    Internal(usize),
}

/// A single octree node: a cubic region of space plus the aggregate mass
/// data used to approximate it from far away.
#[derive(Debug, Clone)]
pub struct Octant {
    pub center: NVec3,
    pub half_width: f64,
    pub mass: f64,
    pub com: NVec3,
    pub kind: NodeKind,
}

impl Octant {
    fn empty(center: NVec3, half_width: f64) -> Self {
        Self {
            center,
            half_width,
            mass: 0.0,
            com: NVec3::zeros(),
            kind: NodeKind::Empty,
        }
    }

    /// Fold another point mass into this node's aggregate mass and COM.
    fn absorb(&mut self, m: f64, x: NVec3) {
        let total = self.mass + m;
        self.com = (self.com * self.mass + x * m) / total;
        self.mass = total;
    }
}

/// A 3D Barnes–Hut octree over a slice of bodies.
///
/// The arena (`nodes`) owns every node; the root is always slot 0. Nodes
/// refer to bodies by index only, the tree never owns or mutates them.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<Octant>,
    capped_inserts: usize,
}

impl Default for Octree {
    fn default() -> Self {
        Self::new()
    }
}

impl Octree {
    pub const ROOT: usize = 0;

    /// Create an empty tree with no arena capacity reserved.
    pub fn new() -> Self {
        Self {
            nodes: vec![Octant::empty(NVec3::zeros(), 0.5)],
            capped_inserts: 0,
        }
    }

    /// Build a fresh tree from `bodies` into a new arena.
    pub fn from_bodies(bodies: &[Body], margin: f64) -> Self {
        let mut tree = Self::new();
        tree.build(bodies, margin);
        tree
    }

    /// Rebuild the tree for the current body positions.
    ///
    /// This:
    /// 1. Clears the arena (keeping its allocation).
    /// 2. Computes a cubic root region enclosing all bodies with margin.
    /// 3. Inserts each body in index order, subdividing as needed.
    ///
    /// # Parameters
    /// - `bodies`: the body store snapshot to partition.
    /// - `margin`: added to the root cube side so edge bodies sit strictly inside.
    pub fn build(&mut self, bodies: &[Body], margin: f64) {
        let (center, half_width) = root_cube(bodies, margin);

        self.nodes.clear();
        self.nodes.push(Octant::empty(center, half_width));
        self.capped_inserts = 0;

        for (i, body) in bodies.iter().enumerate() {
            self.insert(Self::ROOT, i, body.m, body.x, bodies, 0);
        }

        if self.capped_inserts > 0 {
            debug!(
                "octree depth cap hit: {} bodies folded into co-located leaves",
                self.capped_inserts
            );
        }
    }

    pub fn root(&self) -> &Octant {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, idx: usize) -> &Octant {
        &self.nodes[idx]
    }

    /// Number of arena slots in use.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().kind == NodeKind::Empty
    }

    /// Indices of the 8 children of `idx`, if it is internal.
    pub fn children(&self, idx: usize) -> Option<std::ops::Range<usize>> {
        match self.nodes[idx].kind {
            NodeKind::Internal(first) => Some(first..first + 8),
            _ => None,
        }
    }

    /// Approximate gravitational acceleration at `pos`.
    ///
    /// Starting from the root:
    /// - `Empty` nodes contribute nothing.
    /// - `Leaf` nodes, and internal nodes with `half_width / dist < theta`, are
    ///   treated as a point mass at their COM.
    /// - Anything else is opened and its 8 children are visited.
    ///
    /// The query body itself sits in a leaf at distance zero; the law's
    /// `min_dist2` guard drops that term.
    pub fn acceleration_at(&self, pos: NVec3, law: &GravityLaw, theta: f64) -> NVec3 {
        let mut acc = NVec3::zeros();
        self.accumulate(Self::ROOT, pos, law, theta, &mut acc);
        acc
    }

    // helpers ==============================================================================

    /// Insert body `body_idx` (mass `m`, position `x`) below `node_idx`.
    ///
    /// - `Empty`    -> becomes a leaf holding the body.
    /// - `Leaf`     -> splits into 8 children, re-inserts the held body, then
    ///                 continues as internal. At `MAX_DEPTH` the body is folded
    ///                 into the leaf aggregate instead.
    /// - `Internal` -> forwards to the child octant containing `x` and folds
    ///                 the body into this node's aggregate.
    fn insert(&mut self, node_idx: usize, body_idx: usize, m: f64, x: NVec3, bodies: &[Body], depth: u32) {
        match self.nodes[node_idx].kind {
            NodeKind::Empty => {
                let node = &mut self.nodes[node_idx];
                node.kind = NodeKind::Leaf(body_idx);
                node.mass = m;
                node.com = x;
            }
            NodeKind::Leaf(existing) => {
                if depth >= MAX_DEPTH {
                    self.capped_inserts += 1;
                    self.nodes[node_idx].absorb(m, x);
                    return;
                }

                let first = self.subdivide(node_idx);
                let held = &bodies[existing];
                let held_child = first + octant_for(&self.nodes[node_idx].center, &held.x);
                self.insert(held_child, existing, held.m, held.x, bodies, depth + 1);

                // node mass/com still describe the held body; add the new one
                self.descend(node_idx, first, body_idx, m, x, bodies, depth);
            }
            NodeKind::Internal(first) => {
                self.descend(node_idx, first, body_idx, m, x, bodies, depth);
            }
        }
    }

    fn descend(&mut self, node_idx: usize, first: usize, body_idx: usize, m: f64, x: NVec3, bodies: &[Body], depth: u32) {
        let child = first + octant_for(&self.nodes[node_idx].center, &x);
        self.insert(child, body_idx, m, x, bodies, depth + 1);
        self.nodes[node_idx].absorb(m, x);
    }

    /// Split a node into 8 empty children appended to the arena.
    ///
    /// Returns the arena index of the first child. The node keeps its
    /// current mass/COM; only its kind changes to `Internal`.
    fn subdivide(&mut self, node_idx: usize) -> usize {
        let center = self.nodes[node_idx].center;
        let quarter = 0.5 * self.nodes[node_idx].half_width;
        let first = self.nodes.len();

        for octant in 0..8 {
            self.nodes.push(Octant::empty(child_center(&center, quarter, octant), quarter));
        }
        self.nodes[node_idx].kind = NodeKind::Internal(first);
        first
    }

    fn accumulate(&self, node_idx: usize, pos: NVec3, law: &GravityLaw, theta: f64, acc: &mut NVec3) {
        let node = &self.nodes[node_idx];

        let first = match node.kind {
            NodeKind::Empty => return,
            NodeKind::Leaf(_) => None,
            NodeKind::Internal(first) => Some(first),
        };

        let d = node.com - pos;
        let dist2 = d.norm_squared();

        match first {
            // dist2 == 0 gives an infinite ratio, so a node whose COM sits
            // on the query point is always opened
            Some(first) if node.half_width / dist2.sqrt() >= theta => {
                for child in first..first + 8 {
                    self.accumulate(child, pos, law, theta, acc);
                }
            }
            _ => *acc += law.point_mass(d, dist2, node.mass),
        }
    }
}

// helpers ===========================================================================

/// Cubic root region for `bodies`.
///
/// Side length is `1.5 * largest AABB extent + margin`, centered on the
/// AABB midpoint. An empty slice yields a cube of side `margin` at the origin.
fn root_cube(bodies: &[Body], margin: f64) -> (NVec3, f64) {
    if bodies.is_empty() {
        return (NVec3::zeros(), 0.5 * margin);
    }

    let mut min = NVec3::repeat(f64::INFINITY);
    let mut max = NVec3::repeat(f64::NEG_INFINITY);
    for b in bodies {
        min = min.inf(&b.x);
        max = max.sup(&b.x);
    }

    let range = max - min;
    let side = 1.5 * range.max() + margin;
    ((min + max) * 0.5, 0.5 * side)
}

/// Octant index of `p` relative to `center`.
///
/// - Bit 0 (value 1): x >= center.x
/// - Bit 1 (value 2): y >= center.y
/// - Bit 2 (value 4): z >= center.z
fn octant_for(center: &NVec3, p: &NVec3) -> usize {
    let mut idx = 0;
    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }
    if p.z >= center.z { idx |= 4; }
    idx
}

/// Center of child `octant`, offset by `quarter` (the child half-width)
/// along each axis using the same bit layout as [`octant_for`].
fn child_center(center: &NVec3, quarter: f64, octant: usize) -> NVec3 {
    let sign = |bit: usize| if octant & bit == 0 { -1.0 } else { 1.0 };
    center + NVec3::new(sign(1), sign(2), sign(4)) * quarter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::BodyId;

    fn body(i: u64, x: [f64; 3], m: f64) -> Body {
        Body {
            id: BodyId(i),
            x: x.into(),
            v: NVec3::zeros(),
            m,
            radius: 0.01,
        }
    }

    #[test]
    fn empty_tree_has_empty_root() {
        let tree = Octree::from_bodies(&[], 1.0);
        assert!(tree.is_empty());
        assert_eq!(tree.root().mass, 0.0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn single_body_is_a_leaf() {
        let bodies = [body(0, [1.0, 2.0, 3.0], 4.0)];
        let tree = Octree::from_bodies(&bodies, 1.0);
        assert_eq!(tree.root().kind, NodeKind::Leaf(0));
        assert_eq!(tree.root().mass, 4.0);
        assert_eq!(tree.root().com, NVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn octant_bits_follow_axes() {
        let c = NVec3::zeros();
        assert_eq!(octant_for(&c, &NVec3::new(-1.0, -1.0, -1.0)), 0);
        assert_eq!(octant_for(&c, &NVec3::new(1.0, -1.0, -1.0)), 1);
        assert_eq!(octant_for(&c, &NVec3::new(-1.0, 1.0, -1.0)), 2);
        assert_eq!(octant_for(&c, &NVec3::new(1.0, 1.0, 1.0)), 7);
        assert_eq!(child_center(&c, 0.5, 5), NVec3::new(0.5, -0.5, 0.5));
    }

    #[test]
    fn root_cube_bounds_all_bodies() {
        let bodies = [
            body(0, [-2.0, 0.0, 0.0], 1.0),
            body(1, [4.0, 1.0, -1.0], 1.0),
        ];
        let (center, half) = root_cube(&bodies, 1.0);
        assert_eq!(center, NVec3::new(1.0, 0.5, -0.5));
        assert!((half - 0.5 * (1.5 * 6.0 + 1.0)).abs() < 1e-12);
        for b in &bodies {
            assert!(((b.x - center).abs().max()) < half);
        }
    }

    #[test]
    fn coincident_bodies_terminate_at_depth_cap() {
        let bodies = [
            body(0, [0.3, 0.3, 0.3], 1.0),
            body(1, [0.3, 0.3, 0.3], 2.0),
            body(2, [0.3, 0.3, 0.3], 3.0),
        ];
        let tree = Octree::from_bodies(&bodies, 1.0);
        assert!((tree.root().mass - 6.0).abs() < 1e-12);
        assert!((tree.root().com - NVec3::new(0.3, 0.3, 0.3)).norm() < 1e-12);
        // one chain of 8-slot blocks per level, bounded by the cap
        assert!(tree.len() <= 1 + 8 * MAX_DEPTH as usize);
    }

    #[test]
    fn opening_angle_uses_half_extent() {
        let bodies = [body(0, [0.0, 0.0, 0.0], 1.0), body(1, [1.0, 0.0, 0.0], 1.0)];
        let tree = Octree::from_bodies(&bodies, 1.0);
        assert!(matches!(tree.root().kind, NodeKind::Internal(_)));
        assert!((tree.root().half_width - 1.25).abs() < 1e-12);

        let law = GravityLaw { g: 1.0, eps2: 0.0, min_dist2: 1e-12, repulsion: None };
        // half_width / d = 0.3125, full side / d = 0.625
        let pos = NVec3::new(0.5, 4.0, 0.0);

        let far = tree.acceleration_at(pos, &law, 0.5);
        assert!((far - NVec3::new(0.0, -0.125, 0.0)).norm() < 1e-12);

        let opened = tree.acceleration_at(pos, &law, 0.3);
        let exact = bodies
            .iter()
            .fold(NVec3::zeros(), |acc, b| acc + law.point_mass(b.x - pos, (b.x - pos).norm_squared(), b.m));
        assert!((opened - exact).norm() < 1e-12);
        assert!((opened - far).norm() > 1e-3);
    }

    #[test]
    fn arena_is_reused_across_builds() {
        let bodies: Vec<Body> = (0..32)
            .map(|i| {
                let f = i as f64;
                body(i, [(f * 0.37).sin(), (f * 0.13).cos(), (f * 0.07).sin()], 1.0)
            })
            .collect();
        let mut tree = Octree::new();
        tree.build(&bodies, 1.0);
        let first = tree.len();
        tree.build(&bodies, 1.0);
        assert_eq!(tree.len(), first);
        tree.build(&bodies[..1], 1.0);
        assert_eq!(tree.len(), 1);
    }
}
