//! Force / acceleration contributors for the n-body engine
//!
//! Defines the point-mass force law shared by every evaluator, the
//! `Acceleration` trait, and two gravity terms:
//! - `NewtonianGravity`          direct O(N²) pairwise sum (exact reference)
//! - `NewtonianGravityBarnesHut` octree approximation controlled by `theta`

use rayon::prelude::*;

use crate::simulation::barnes_hut::Octree;
use crate::simulation::engine::Engine;
use crate::simulation::params::{Parameters, Repulsion};
use crate::simulation::states::{NVec3, System};

/// Softened Newtonian point-mass law with an optional short-range
/// repulsion override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLaw {
    pub g: f64,
    pub eps2: f64,
    pub min_dist2: f64,
    pub repulsion: Option<Repulsion>,
}

impl GravityLaw {
    pub fn new(params: &Parameters, engine: &Engine) -> Self {
        Self {
            g: params.g,
            eps2: params.eps2,
            min_dist2: params.min_dist2,
            repulsion: engine.repulsion.then_some(params.repulsion),
        }
    }

    /// Acceleration toward a point mass `mass` displaced by `d` (|d|² = `dist2`).
    ///
    /// `G m d / (|d|² + eps²)^1.5`, or zero below the self-interaction guard.
    /// Inside the repulsion contact distance the term is scaled by the
    /// repulsion strength.
    #[inline]
    pub fn point_mass(&self, d: NVec3, dist2: f64, mass: f64) -> NVec3 {
        if dist2 < self.min_dist2 {
            return NVec3::zeros();
        }

        let soft2 = dist2 + self.eps2;
        let inv_r = soft2.sqrt().recip();
        let mut coef = self.g * mass * inv_r * inv_r * inv_r;

        if let Some(rep) = self.repulsion {
            if dist2 < rep.contact_distance * rep.contact_distance {
                coef *= rep.strength;
            }
        }

        coef * d
    }
}

/// Trait for acceleration sources operating on [`System`].
/// Implementations add their contribution into `out[i]` for each body.
///
/// Takes `&mut self` so a term can keep scratch storage (the octree arena)
/// alive between calls.
pub trait Acceleration {
    fn acceleration(&mut self, sys: &System, out: &mut [NVec3]);
}

/// Collection of acceleration terms.
/// Contributions from every term are summed into one vector per body.
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
    scratch: Vec<NVec3>, // per-body output of `evaluate`, kept between calls
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Add an acceleration term
    pub fn with(mut self, term: impl Acceleration + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&mut self, sys: &System, out: &mut [NVec3]) {
        out.iter_mut().for_each(|a| *a = NVec3::zeros());
        for term in &mut self.terms {
            term.acceleration(sys, out);
        }
    }

    /// Total accelerations for `sys`, written into the set's own buffer.
    ///
    /// The buffer is resized to the body count and reused across calls.
    pub fn evaluate(&mut self, sys: &System) -> &[NVec3] {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.resize(sys.bodies.len(), NVec3::zeros());
        self.accumulate_accels(sys, &mut scratch);
        self.scratch = scratch;
        &self.scratch
    }
}

/// Direct-sum Newtonian gravity.
pub struct NewtonianGravity {
    pub law: GravityLaw,
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&mut self, sys: &System, out: &mut [NVec3]) {
        let n = sys.bodies.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &sys.bodies[i];
            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let r2 = r.norm_squared();

                out[i] += self.law.point_mass(r, r2, bj.m);
                out[j] += self.law.point_mass(-r, r2, bi.m);
            }
        }
    }
}

/// Newtonian gravity evaluated via a Barnes–Hut octree.
///
/// The tree is rebuilt on every call; the arena is kept between calls.
/// Per-body queries against the finished tree run in parallel.
pub struct NewtonianGravityBarnesHut {
    pub law: GravityLaw,
    pub theta: f64,
    pub margin: f64,
    tree: Octree,
}

impl NewtonianGravityBarnesHut {
    pub fn new(law: GravityLaw, theta: f64, margin: f64) -> Self {
        Self {
            law,
            theta,
            margin,
            tree: Octree::new(),
        }
    }

    /// Tree from the most recent evaluation.
    pub fn tree(&self) -> &Octree {
        &self.tree
    }
}

impl Acceleration for NewtonianGravityBarnesHut {
    fn acceleration(&mut self, sys: &System, out: &mut [NVec3]) {
        self.tree.build(&sys.bodies, self.margin);

        let tree = &self.tree;
        let law = &self.law;
        let theta = self.theta;

        out.par_iter_mut()
            .zip(sys.bodies.par_iter())
            .for_each(|(a, b)| *a += tree.acceleration_at(b.x, law, theta));
    }
}

/// Softened gravitational potential energy, consistent with [`GravityLaw`]
/// without repulsion: `-G mi mj / sqrt(r² + eps²)` summed over pairs.
pub fn potential_energy(sys: &System, g: f64, eps2: f64) -> f64 {
    let n = sys.bodies.len();
    let mut u = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let bi = &sys.bodies[i];
            let bj = &sys.bodies[j];
            let r2 = (bj.x - bi.x).norm_squared();
            u -= g * bi.m * bj.m / (r2 + eps2).sqrt();
        }
    }
    u
}
