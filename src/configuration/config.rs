//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – opening angle, substepping, time scale, optional behaviours
//! - [`ParametersConfig`] – physical constants, softening, merge and radius model
//! - [`SpawnConfig`]      – ranges used when spawning random bodies
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every section except `bodies` may be omitted; missing keys take defaults.
//!
//! # YAML format
//!
//! ```yaml
//! name: figure-eight
//!
//! engine:
//!   theta: 0.5              # Barnes–Hut opening angle, > 0
//!   substeps: 8             # integrator substeps per frame, >= 1
//!   time_scale: 1.0         # frame_dt multiplier
//!   frame_dt: 0.015         # frame period used by the headless runner
//!   merge: true             # fuse overlapping bodies
//!   repulsion: false        # push apart inside contact_distance
//!   max_bodies: 64          # spawn capacity
//!
//! parameters:
//!   G: 1.0                  # gravitational constant
//!   softening: 1.0e-4       # epsilon (squared internally)
//!   contact_factor: 0.8     # merge at 0.8 * (r_i + r_j)
//!   radius_scale: 0.01      # radius = radius_scale * sqrt(m) below mass_cap
//!   mass_cap: 100.0
//!   min_radius: 0.05
//!   seed: 42                # spawn RNG seed
//!
//! bodies:
//!   - x: [ 0.97000436, -0.24308753, 0.0 ]
//!     v: [ 0.466203685, 0.43236573, 0.0 ]
//!     m: 1.0
//! ```
//!
//! The configuration is validated and mapped into the runtime types
//! (`Engine`, `Parameters`, `System`) when a `Scenario` is built; nothing
//! here is read during stepping.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::simulation::engine::Engine;
use crate::simulation::params::{Parameters, Repulsion};
use crate::simulation::states::{NVec3, RadiusModel};

/// Engine configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub theta: f64,        // nodes with width / distance below theta are approximated by their COM
    pub substeps: u32,     // integrator substeps per rendered frame
    pub time_scale: f64,   // multiplier on the frame period
    pub frame_dt: f64,     // frame period for the headless runner
    pub merge: bool,       // resolve overlaps by inelastic merging
    pub repulsion: bool,   // short-range repulsion instead of pure softening
    pub max_bodies: usize, // random spawns beyond this count are ignored
}

impl Default for EngineConfig {
    fn default() -> Self {
        let engine = Engine::default();
        Self {
            theta: engine.theta,
            substeps: engine.substeps,
            time_scale: engine.time_scale,
            frame_dt: 1.0 / 60.0,
            merge: engine.merge_enabled,
            repulsion: engine.repulsion,
            max_bodies: engine.max_bodies,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64,                  // gravitational constant
    pub softening: f64,          // epsilon, bounds force as separation -> 0
    pub min_dist2: f64,          // self-interaction guard on squared distance
    pub contact_factor: f64,     // merge distance as a fraction of summed radii
    pub radius_scale: f64,       // k in radius = k * sqrt(m)
    pub mass_cap: f64,           // mass past which radius stops growing
    pub min_radius: f64,         // floor for saturated radii
    pub contact_distance: f64,   // repulsion range
    pub repulsion_strength: f64, // multiplier on gravity inside the repulsion range
    pub tree_margin: f64,        // extra side length on the octree root
    pub seed: u64,               // deterministic seed to make spawns reproducible
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let params = Parameters::default();
        Self {
            g: params.g,
            softening: params.eps2.sqrt(),
            min_dist2: params.min_dist2,
            contact_factor: params.contact_factor,
            radius_scale: params.radius.scale,
            mass_cap: params.radius.mass_cap,
            min_radius: params.radius.min_radius,
            contact_distance: params.repulsion.contact_distance,
            repulsion_strength: params.repulsion.strength,
            tree_margin: params.tree_margin,
            seed: params.seed,
        }
    }
}

/// Ranges for randomly spawned bodies
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    pub radius: f64,   // spawn inside a ball of this radius around the origin
    pub speed: f64,    // each velocity component uniform in [-speed, speed]
    pub mass_min: f64,
    pub mass_max: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            speed: 0.5,
            mass_min: 0.5,
            mass_max: 2.0,
        }
    }
}

/// Configuration for a single body’s initial state
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position, 3 components
    pub v: Vec<f64>, // initial velocity, 3 components
    pub m: f64,      // mass, > 0
}

impl BodyConfig {
    pub fn new(x: [f64; 3], v: [f64; 3], m: f64) -> Self {
        Self { x: x.to_vec(), v: v.to_vec(), m }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check every precondition without building anything.
    pub fn validate(&self) -> Result<()> {
        let engine = self.engine.to_engine()?;
        self.parameters.to_parameters()?;
        self.spawn.validate()?;

        if self.bodies.len() > engine.max_bodies {
            return Err(Error::config(format!(
                "{} initial bodies exceed max_bodies = {}",
                self.bodies.len(),
                engine.max_bodies
            )));
        }
        for (i, b) in self.bodies.iter().enumerate() {
            b.to_state().map_err(|e| Error::config(format!("body {i}: {e}")))?;
        }
        Ok(())
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl EngineConfig {
    pub fn to_engine(&self) -> Result<Engine> {
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(Error::config(format!("theta must be finite and > 0, got {}", self.theta)));
        }
        if self.substeps == 0 {
            return Err(Error::config("substeps must be >= 1"));
        }
        check_time_scale(self.time_scale)?;
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            return Err(Error::config(format!("frame_dt must be finite and > 0, got {}", self.frame_dt)));
        }
        if self.max_bodies == 0 {
            return Err(Error::config("max_bodies must be >= 1"));
        }

        Ok(Engine {
            theta: self.theta,
            substeps: self.substeps,
            time_scale: self.time_scale,
            merge_enabled: self.merge,
            repulsion: self.repulsion,
            max_bodies: self.max_bodies,
        })
    }
}

impl ParametersConfig {
    pub fn to_parameters(&self) -> Result<Parameters> {
        positive("G", self.g)?;
        non_negative("softening", self.softening)?;
        non_negative("min_dist2", self.min_dist2)?;
        positive("contact_factor", self.contact_factor)?;
        positive("radius_scale", self.radius_scale)?;
        positive("mass_cap", self.mass_cap)?;
        non_negative("min_radius", self.min_radius)?;
        non_negative("contact_distance", self.contact_distance)?;
        positive("tree_margin", self.tree_margin)?;
        if !self.repulsion_strength.is_finite() {
            return Err(Error::config("repulsion_strength must be finite"));
        }

        Ok(Parameters {
            g: self.g,
            eps2: self.softening * self.softening,
            min_dist2: self.min_dist2,
            contact_factor: self.contact_factor,
            radius: RadiusModel {
                scale: self.radius_scale,
                mass_cap: self.mass_cap,
                min_radius: self.min_radius,
            },
            repulsion: Repulsion {
                contact_distance: self.contact_distance,
                strength: self.repulsion_strength,
            },
            tree_margin: self.tree_margin,
            seed: self.seed,
        })
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<()> {
        positive("spawn.radius", self.radius)?;
        non_negative("spawn.speed", self.speed)?;
        positive("spawn.mass_min", self.mass_min)?;
        positive("spawn.mass_max", self.mass_max)?;
        if self.mass_min > self.mass_max {
            return Err(Error::config("spawn.mass_min must not exceed spawn.mass_max"));
        }
        Ok(())
    }
}

impl BodyConfig {
    /// Position, velocity and mass as runtime values.
    pub fn to_state(&self) -> Result<(NVec3, NVec3, f64)> {
        let x = vec3("x", &self.x)?;
        let v = vec3("v", &self.v)?;
        positive("m", self.m)?;
        Ok((x, v, self.m))
    }
}

pub(crate) fn check_time_scale(s: f64) -> Result<()> {
    positive("time_scale", s)
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("{name} must be finite and > 0, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("{name} must be finite and >= 0, got {value}")))
    }
}

fn vec3(name: &str, c: &[f64]) -> Result<NVec3> {
    match c {
        [x, y, z] if c.iter().all(|v| v.is_finite()) => Ok(NVec3::new(*x, *y, *z)),
        [_, _, _] => Err(Error::config(format!("{name} has non-finite components"))),
        _ => Err(Error::config(format!("{name} needs 3 components, got {}", c.len()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
bodies:
  - x: [0.0, 0.0, 0.0]
    v: [0.0, 0.0, 0.0]
    m: 1.0
";

    #[test]
    fn minimal_scenario_takes_defaults() -> Result<()> {
        let cfg = ScenarioConfig::from_yaml_str(MINIMAL)?;
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.parameters, ParametersConfig::default());
        assert_eq!(cfg.bodies.len(), 1);
        assert_eq!(cfg.label(), "unnamed");
        Ok(())
    }

    #[test]
    fn full_scenario_parses() -> Result<()> {
        let yaml = "
name: pair
engine:
  theta: 0.3
  substeps: 16
  repulsion: true
parameters:
  G: 2.0
  softening: 0.15
bodies:
  - { x: [-1.0, 0.0, 0.0], v: [0.0, 0.5, 0.0], m: 1.0 }
  - { x: [1.0, 0.0, 0.0], v: [0.0, -0.5, 0.0], m: 1.0 }
";
        let cfg = ScenarioConfig::from_yaml_str(yaml)?;
        assert_eq!(cfg.label(), "pair");
        let engine = cfg.engine.to_engine()?;
        assert_eq!(engine.substeps, 16);
        assert!(engine.repulsion);
        let params = cfg.parameters.to_parameters()?;
        assert_eq!(params.g, 2.0);
        assert!((params.eps2 - 0.0225).abs() < 1e-15);
        Ok(())
    }

    #[test]
    fn rejects_non_positive_theta() {
        let mut cfg = EngineConfig::default();
        cfg.theta = 0.0;
        assert!(matches!(cfg.to_engine(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_substeps() {
        let yaml = format!("engine:\n  substeps: 0\n{MINIMAL}");
        let err = ScenarioConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("substeps"));
    }

    #[test]
    fn rejects_negative_mass() {
        let yaml = "
bodies:
  - { x: [0.0, 0.0, 0.0], v: [0.0, 0.0, 0.0], m: -1.0 }
";
        let err = ScenarioConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("body 0"));
    }

    #[test]
    fn rejects_two_component_vectors() {
        let yaml = "
bodies:
  - { x: [0.0, 0.0], v: [0.0, 0.0, 0.0], m: 1.0 }
";
        assert!(ScenarioConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn rejects_more_bodies_than_capacity() {
        let yaml = format!("engine:\n  max_bodies: 0\n{MINIMAL}");
        assert!(ScenarioConfig::from_yaml_str(&yaml).is_err());

        let mut cfg = ScenarioConfig::from_yaml_str(MINIMAL).unwrap();
        cfg.engine.max_bodies = 1;
        cfg.bodies.push(cfg.bodies[0].clone());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = format!("engine:\n  thetta: 0.5\n{MINIMAL}");
        assert!(matches!(ScenarioConfig::from_yaml_str(&yaml), Err(Error::Yaml(_))));
    }
}
