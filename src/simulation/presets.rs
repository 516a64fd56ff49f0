//! Built-in initial configurations.
//!
//! Each preset produces a plain [`ScenarioConfig`], the same thing a YAML
//! file deserializes into, so presets and files share one loading path.

use std::f64::consts::TAU;

use crate::configuration::config::{BodyConfig, EngineConfig, ParametersConfig, ScenarioConfig, SpawnConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Three equal masses on the Chenciner–Montgomery figure-eight orbit.
    FigureEight,
    /// Heavy central mass with light bodies on circular orbits.
    Orbital,
    /// Dense random-looking cluster with softening and repulsion, merges expected.
    Cluster,
}

impl Preset {
    pub fn config(self) -> ScenarioConfig {
        match self {
            Preset::FigureEight => figure_eight(),
            Preset::Orbital => orbital(),
            Preset::Cluster => cluster(),
        }
    }
}

/// Position/velocity of the first figure-eight body; the second is its
/// point reflection and the third sits at the origin moving at `-2 v`.
pub const FIGURE_EIGHT_X: [f64; 3] = [0.97000436, -0.24308753, 0.0];
pub const FIGURE_EIGHT_V: [f64; 3] = [0.466203685, 0.43236573, 0.0];

fn figure_eight() -> ScenarioConfig {
    let [x, y, _] = FIGURE_EIGHT_X;
    let [vx, vy, _] = FIGURE_EIGHT_V;

    ScenarioConfig {
        name: Some("figure-eight".into()),
        engine: EngineConfig {
            theta: 0.5,
            substeps: 8,
            frame_dt: 0.015,
            max_bodies: 64,
            ..EngineConfig::default()
        },
        parameters: ParametersConfig {
            g: 1.0,
            softening: 1.0e-4,
            radius_scale: 0.01,
            min_radius: 0.005,
            ..ParametersConfig::default()
        },
        spawn: SpawnConfig {
            radius: 1.5,
            speed: 0.2,
            mass_min: 0.01,
            mass_max: 0.05,
        },
        bodies: vec![
            BodyConfig::new([x, y, 0.0], [vx, vy, 0.0], 1.0),
            BodyConfig::new([-x, -y, 0.0], [vx, vy, 0.0], 1.0),
            BodyConfig::new([0.0, 0.0, 0.0], [-2.0 * vx, -2.0 * vy, 0.0], 1.0),
        ],
    }
}

fn orbital() -> ScenarioConfig {
    let g = 1.0;
    let star = 1000.0;
    let mut bodies = vec![BodyConfig::new([0.0; 3], [0.0; 3], star)];

    for k in 0..6 {
        let r = 4.0 + 3.0 * k as f64;
        let phase = TAU * k as f64 / 6.0;
        let speed = (g * star / r).sqrt();
        bodies.push(BodyConfig::new(
            [r * phase.cos(), r * phase.sin(), 0.0],
            [-speed * phase.sin(), speed * phase.cos(), 0.0],
            0.01 * (k + 1) as f64,
        ));
    }

    ScenarioConfig {
        name: Some("orbital".into()),
        engine: EngineConfig {
            theta: 0.5,
            substeps: 16,
            max_bodies: 128,
            ..EngineConfig::default()
        },
        parameters: ParametersConfig {
            g,
            softening: 1.0e-4,
            radius_scale: 0.02,
            mass_cap: 100.0,
            min_radius: 0.5,
            ..ParametersConfig::default()
        },
        spawn: SpawnConfig {
            radius: 20.0,
            speed: 2.0,
            mass_min: 0.01,
            mass_max: 0.1,
        },
        bodies,
    }
}

fn cluster() -> ScenarioConfig {
    let n = 48;
    let bodies = (0..n)
        .map(|i| {
            let f = i as f64;
            // deterministic scatter, no RNG needed
            let x = [(f * 0.37).sin() * 5.0, (f * 0.13).cos() * 5.0, (f * 0.07).sin() * 5.0];
            let v = [(f * 0.29).cos() * 0.2, (f * 0.41).sin() * 0.2, 0.0];
            BodyConfig::new(x, v, 1.0 + (f * 0.53).sin().abs() * 2.0)
        })
        .collect();

    ScenarioConfig {
        name: Some("cluster".into()),
        engine: EngineConfig {
            theta: 0.5,
            substeps: 20,
            merge: true,
            repulsion: true,
            max_bodies: 128,
            ..EngineConfig::default()
        },
        parameters: ParametersConfig {
            g: 1.0,
            softening: 0.15,
            radius_scale: 0.08,
            ..ParametersConfig::default()
        },
        spawn: SpawnConfig::default(),
        bodies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for p in [Preset::FigureEight, Preset::Orbital, Preset::Cluster] {
            p.config().validate().unwrap();
        }
    }

    #[test]
    fn figure_eight_has_zero_total_momentum() {
        let cfg = Preset::FigureEight.config();
        let p: f64 = (0..2)
            .map(|k| cfg.bodies.iter().map(|b| b.m * b.v[k]).sum::<f64>().abs())
            .sum();
        assert!(p < 1e-12);
    }
}
