//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the runtime constants of the force law and the merge
//! rule:
//! - gravitational constant and softening (`g`, `eps2`)
//! - self-interaction guard (`min_dist2`)
//! - merge contact factor and the mass -> radius model
//! - short-range repulsion constants (only read when the engine enables it)
//! - octree root margin and the spawn RNG seed

use crate::simulation::states::RadiusModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repulsion {
    pub contact_distance: f64, // separation below which gravity is replaced
    pub strength: f64,         // multiplier applied inside contact distance (negative pushes apart)
}

impl Default for Repulsion {
    fn default() -> Self {
        Self {
            contact_distance: 0.2,
            strength: -10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub g: f64,              // gravitational constant
    pub eps2: f64,           // softening squared
    pub min_dist2: f64,      // contributions closer than this are dropped
    pub contact_factor: f64, // bodies merge at contact_factor * (r_i + r_j)
    pub radius: RadiusModel,
    pub repulsion: Repulsion,
    pub tree_margin: f64, // added to the root cube side
    pub seed: u64,        // deterministic seed for random spawns
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: 1.0,
            eps2: 1.0e-8,
            min_dist2: 1.0e-12,
            contact_factor: 0.8,
            radius: RadiusModel::default(),
            repulsion: Repulsion::default(),
            tree_margin: 1.0,
            seed: 42,
        }
    }
}
