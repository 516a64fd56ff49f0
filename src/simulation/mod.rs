pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod merge;
pub mod presets;
pub mod scenario;
pub mod barnes_hut;
