pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Body, BodyId, System, NVec3, RadiusModel};
pub use simulation::barnes_hut::{Octree, Octant, NodeKind};
pub use simulation::forces::{Acceleration, AccelSet, GravityLaw, NewtonianGravity, NewtonianGravityBarnesHut};
pub use simulation::integrator::verlet_integrator;
pub use simulation::merge::{MergeEvent, MassClass};
pub use simulation::presets::Preset;
pub use simulation::scenario::{Scenario, StepReport};

pub use configuration::config::{EngineConfig, ParametersConfig, SpawnConfig, BodyConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_verlet};

pub use error::{Error, Result};
