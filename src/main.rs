use orbitree::{Preset, Scenario, ScenarioConfig};
use orbitree::{bench_gravity, bench_verlet};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::path::PathBuf;

/// Headless Barnes–Hut runner: steps a scenario and logs what happens.
#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML, looked up under `scenarios/` when not an existing path
    #[arg(short, long)]
    file: Option<String>,

    /// Built-in preset, used when no file is given
    #[arg(short, long, value_enum, default_value_t = Preset::FigureEight)]
    preset: Preset,

    /// Frames to run
    #[arg(short = 'n', long, default_value_t = 600)]
    frames: usize,

    /// Frame period, defaults to the scenario's `frame_dt`
    #[arg(long)]
    frame_dt: Option<f64>,

    /// Log diagnostics every this many frames
    #[arg(long, default_value_t = 60)]
    report_every: usize,

    /// Random bodies to spawn before running
    #[arg(long, default_value_t = 0)]
    spawn: usize,

    /// Run the direct vs Barnes–Hut timing sweeps instead
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let Some(file_name) = &args.file else {
        return Ok(args.preset.config());
    };

    let mut path = PathBuf::from(file_name);
    if !path.exists() {
        path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    }

    ScenarioConfig::from_yaml_file(&path).with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_verlet();
        return Ok(());
    }

    let mut scenario = Scenario::build_scenario(load_scenario(&args)?)?;
    for _ in 0..args.spawn {
        if scenario.spawn_random_body().is_none() {
            break;
        }
    }

    let frame_dt = args.frame_dt.unwrap_or(scenario.frame_dt());
    let mass0 = scenario.system.total_mass();
    let momentum0 = scenario.system.momentum();
    let energy0 = scenario.total_energy();
    let report_every = args.report_every.max(1);

    for frame in 1..=args.frames {
        let report = scenario.step(frame_dt);
        for m in &report.merges {
            info!(
                "frame {frame}: {} <- {} at ({:.3}, {:.3}, {:.3}), m = {:.4}, {:?}",
                m.survivor, m.absorbed, m.position.x, m.position.y, m.position.z, m.mass, m.class
            );
        }

        if frame % report_every == 0 {
            let energy = scenario.total_energy();
            info!(
                "frame {frame}: t = {:.4}, bodies = {}, dM = {:.3e}, |dP| = {:.3e}, dE/E = {:.3e}",
                scenario.elapsed(),
                scenario.bodies().len(),
                scenario.system.total_mass() - mass0,
                (scenario.system.momentum() - momentum0).norm(),
                (energy - energy0) / energy0.abs().max(f64::MIN_POSITIVE),
            );
        }
    }

    let max_r = scenario.bodies().iter().map(|b| b.x.norm()).fold(0.0, f64::max);
    info!(
        "done: t = {:.4}, {} bodies, max distance from origin = {:.4}",
        scenario.elapsed(),
        scenario.bodies().len(),
        max_r
    );

    Ok(())
}
