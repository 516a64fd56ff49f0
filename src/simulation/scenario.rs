//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//! - active force set (`AccelSet`)
//!
//! `Scenario` is the whole simulation context. The presentation layer calls
//! `step` once per frame and reads `bodies()` in between; every command it
//! can issue (reset, spawn, pause, time scale) is a method here.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{check_time_scale, ScenarioConfig, SpawnConfig};
use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{potential_energy, AccelSet, GravityLaw, NewtonianGravityBarnesHut};
use crate::simulation::integrator::verlet_integrator;
use crate::simulation::merge::{resolve_merges, MergeEvent, MergeRules};
use crate::simulation::params::Parameters;
use crate::simulation::presets::Preset;
use crate::simulation::states::{Body, BodyId, NVec3, System};

/// What one `step` / `substep` call changed in the body store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub removed: Vec<BodyId>,     // bodies deleted by merging, in merge order
    pub merges: Vec<MergeEvent>,  // one event per fusion
}

impl StepReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.merges.is_empty()
    }

    fn append(&mut self, other: StepReport) {
        self.removed.extend(other.removed);
        self.merges.extend(other.merges);
    }
}

/// Runtime simulation context
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: AccelSet,
    spawn: SpawnConfig,
    frame_dt: f64,
    source: ScenarioConfig,
    rng: StdRng,
    paused: bool,
}

impl Scenario {
    /// Validate `cfg` and build a scenario at t = 0.
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        cfg.validate()?;

        let engine = cfg.engine.to_engine()?;
        let parameters = cfg.parameters.to_parameters()?;

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let mut system = System::new();
        for bc in &cfg.bodies {
            let (x, v, m) = bc.to_state()?;
            system.insert(x, v, m, parameters.radius.radius(m));
        }

        let forces = Self::build_forces(&engine, &parameters);
        let rng = StdRng::seed_from_u64(parameters.seed);

        info!(
            "scenario '{}': {} bodies, theta = {}, substeps = {}, merge = {}, repulsion = {}",
            cfg.label(),
            system.len(),
            engine.theta,
            engine.substeps,
            engine.merge_enabled,
            engine.repulsion
        );

        Ok(Self {
            engine,
            parameters,
            system,
            forces,
            spawn: cfg.spawn.clone(),
            frame_dt: cfg.engine.frame_dt,
            source: cfg,
            rng,
            paused: false,
        })
    }

    pub fn from_preset(preset: Preset) -> Result<Self> {
        Self::build_scenario(preset.config())
    }

    fn build_forces(engine: &Engine, parameters: &Parameters) -> AccelSet {
        let law = GravityLaw::new(parameters, engine);
        AccelSet::new().with(NewtonianGravityBarnesHut::new(law, engine.theta, parameters.tree_margin))
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    /// Simulated time since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.system.t
    }

    /// Frame period the scenario was configured with.
    pub fn frame_dt(&self) -> f64 {
        self.frame_dt
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.source
    }

    /// Advance one rendered frame.
    ///
    /// Runs `engine.substeps` substeps of `frame_dt * time_scale / substeps`.
    /// Does nothing while paused or for a non-positive / non-finite `frame_dt`.
    pub fn step(&mut self, frame_dt: f64) -> StepReport {
        let mut report = StepReport::default();
        if self.paused {
            return report;
        }
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            debug!("ignoring step with frame_dt = {frame_dt}");
            return report;
        }

        let dt = frame_dt * self.engine.time_scale / self.engine.substeps as f64;
        for _ in 0..self.engine.substeps {
            report.append(self.substep(dt));
        }

        trace!("frame: t = {:.5}, bodies = {}", self.system.t, self.system.len());
        report
    }

    /// One kick–drift–kick step of size `dt`, preceded by merge resolution
    /// against the current positions when merging is enabled.
    pub fn substep(&mut self, dt: f64) -> StepReport {
        let merges = if self.engine.merge_enabled {
            let rules = MergeRules {
                contact_factor: self.parameters.contact_factor,
                radius: self.parameters.radius,
            };
            resolve_merges(&mut self.system, &rules)
        } else {
            Vec::new()
        };

        verlet_integrator(&mut self.system, &mut self.forces, dt);

        StepReport {
            removed: merges.iter().map(|m| m.absorbed).collect(),
            merges,
        }
    }

    /// Restart from the configuration this scenario was last loaded with.
    pub fn reset(&mut self) -> Result<()> {
        self.load(self.source.clone())
    }

    /// Replace the whole state with a new configuration.
    ///
    /// On error the current state is left untouched.
    pub fn load(&mut self, cfg: ScenarioConfig) -> Result<()> {
        let paused = self.paused;
        *self = Self::build_scenario(cfg)?;
        self.paused = paused;
        Ok(())
    }

    /// Add a body with random position, velocity and mass drawn from the
    /// spawn ranges. Returns `None` (and changes nothing) at capacity.
    pub fn spawn_random_body(&mut self) -> Option<BodyId> {
        if self.system.len() >= self.engine.max_bodies {
            debug!("spawn ignored: at capacity ({})", self.engine.max_bodies);
            return None;
        }

        let s = &self.spawn;
        let dir = loop {
            let p = NVec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if p.norm_squared() <= 1.0 {
                break p;
            }
        };
        let x = dir * s.radius;
        let v = NVec3::new(
            self.rng.gen_range(-s.speed..=s.speed),
            self.rng.gen_range(-s.speed..=s.speed),
            self.rng.gen_range(-s.speed..=s.speed),
        );
        let m = self.rng.gen_range(s.mass_min..=s.mass_max);

        let id = self.system.insert(x, v, m, self.parameters.radius.radius(m));
        debug!("spawned {id}: m = {m:.4}");
        Some(id)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_time_scale(&mut self, scale: f64) -> Result<()> {
        check_time_scale(scale)?;
        self.engine.time_scale = scale;
        Ok(())
    }

    /// Kinetic plus softened potential energy.
    pub fn total_energy(&self) -> f64 {
        self.system.kinetic_energy() + potential_energy(&self.system, self.parameters.g, self.parameters.eps2)
    }
}
