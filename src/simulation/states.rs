//! Core state types for the N-body simulation.
//!
//! - `Body`   a point mass with a stable `BodyId`
//! - `System` the body store: owns every live body plus the simulated time
//! - `RadiusModel` maps mass to the contact radius used by the merge test
//!
//! The body store is mutated in place by the integrator and the merge
//! resolver; everything else only borrows it for the duration of a step.

use std::fmt;

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Stable identity of a body for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub x: NVec3,     // position
    pub v: NVec3,     // velocity
    pub m: f64,       // mass
    pub radius: f64,  // contact radius, derived from mass
}

impl Body {
    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }
}

/// Mass -> radius rule.
///
/// Grows as `k * sqrt(m)` up to `mass_cap`; past the cap the radius is
/// `k * sqrt(cap) * cap / m`, floored at `min_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusModel {
    pub scale: f64,      // k
    pub mass_cap: f64,   // M_cap
    pub min_radius: f64, // r_min
}

impl RadiusModel {
    pub fn radius(&self, m: f64) -> f64 {
        if m <= self.mass_cap {
            self.scale * m.sqrt()
        } else {
            let cap = self.mass_cap;
            let shrunk = self.scale * cap.sqrt() * cap / (cap + (m - cap));
            shrunk.max(self.min_radius)
        }
    }
}

impl Default for RadiusModel {
    fn default() -> Self {
        Self {
            scale: 0.05,
            mass_cap: 100.0,
            min_radius: 0.1,
        }
    }
}

/// The body store.
#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // live bodies, index order is merge order
    pub t: f64,            // simulated time
    next_id: u64,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body, assigning it the next id.
    pub fn insert(&mut self, x: NVec3, v: NVec3, m: f64, radius: f64) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body { id, x, v, m, radius });
        id
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    pub fn momentum(&self) -> NVec3 {
        self.bodies.iter().fold(NVec3::zeros(), |p, b| p + b.momentum())
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum()
    }

    /// Mass-weighted mean position, `None` when the store is empty.
    pub fn center_of_mass(&self) -> Option<NVec3> {
        let m = self.total_mass();
        if m <= 0.0 {
            return None;
        }
        let weighted = self.bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.x * b.m);
        Some(weighted / m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_grows_with_sqrt_below_cap() {
        let model = RadiusModel { scale: 2.0, mass_cap: 100.0, min_radius: 0.5 };
        assert!((model.radius(4.0) - 4.0).abs() < 1e-12);
        assert!((model.radius(100.0) - 20.0).abs() < 1e-12);
        assert!(model.radius(9.0) > model.radius(4.0));
    }

    #[test]
    fn radius_past_cap_is_floored() {
        let model = RadiusModel { scale: 2.0, mass_cap: 100.0, min_radius: 0.5 };
        // 2 * 10 * 100 / 200 = 10
        assert!((model.radius(200.0) - 10.0).abs() < 1e-12);
        assert_eq!(model.radius(1.0e9), 0.5);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut sys = System::new();
        let a = sys.insert(NVec3::zeros(), NVec3::zeros(), 1.0, 0.1);
        sys.bodies.clear();
        let b = sys.insert(NVec3::zeros(), NVec3::zeros(), 1.0, 0.1);
        assert_ne!(a, b);
        assert_eq!(b, BodyId(1));
    }
}
