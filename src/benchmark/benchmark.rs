use std::time::Instant;

use crate::simulation::forces::{AccelSet, Acceleration, GravityLaw, NewtonianGravity, NewtonianGravityBarnesHut};
use crate::simulation::integrator::verlet_integrator;
use crate::simulation::states::{NVec3, System};

const THETA: f64 = 0.5;
const MARGIN: f64 = 1.0;

fn bench_law() -> GravityLaw {
    GravityLaw {
        g: 0.1,
        eps2: 1e-4,
        min_dist2: 1e-12,
        repulsion: None,
    }
}

/// Helper to build a manual System of size `n`
pub fn make_system(n: usize) -> System {
    let mut sys = System::new();

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        sys.insert(x, NVec3::zeros(), 1.0, 0.01);
    }

    sys
}

/// Time one acceleration pass, direct vs Barnes–Hut, for growing `n`
pub fn bench_gravity() {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let sys = make_system(n);
        let mut out = vec![NVec3::zeros(); n];

        let mut direct = NewtonianGravity { law: bench_law() };
        let mut bh = NewtonianGravityBarnesHut::new(bench_law(), THETA, MARGIN);

        // Warm up
        direct.acceleration(&sys, &mut out);
        bh.acceleration(&sys, &mut out);

        // Time direct
        let t0 = Instant::now();
        direct.acceleration(&sys, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Time barnes-hut
        let t1 = Instant::now();
        bh.acceleration(&sys, &mut out);
        let dt_bh = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {:8.6} s, BH = {:8.6} s", dt_direct, dt_bh);
    }
}

/// Time full verlet steps, direct vs Barnes–Hut
/// Prints CSV so it can be pasted straight into a spreadsheet
pub fn bench_verlet() {
    let steps = 2;
    let dt = 0.001;

    println!("N,direct_ms,bh_ms");

    for n in [200, 400, 800, 1600, 3200, 6400, 12800] {
        let template = make_system(n);

        let mut sys_direct = template.clone();
        let mut forces_direct = AccelSet::new().with(NewtonianGravity { law: bench_law() });
        verlet_integrator(&mut sys_direct, &mut forces_direct, dt);
        let t0 = Instant::now();
        for _ in 0..steps {
            verlet_integrator(&mut sys_direct, &mut forces_direct, dt);
        }
        let direct_ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let mut sys_bh = template.clone();
        let mut forces_bh = AccelSet::new().with(NewtonianGravityBarnesHut::new(bench_law(), THETA, MARGIN));
        verlet_integrator(&mut sys_bh, &mut forces_bh, dt);
        let t1 = Instant::now();
        for _ in 0..steps {
            verlet_integrator(&mut sys_bh, &mut forces_bh, dt);
        }
        let bh_ms = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6},{:.6}", n, direct_ms, bh_ms);
    }
}
