//! Fixed-step time integrator for the N-body system
//!
//! Velocity–Verlet (kick–drift–kick), driven by an `AccelSet`.

use super::forces::AccelSet;
use super::states::System;

/// Advance the system by one step of size `dt` using velocity–Verlet.
/// Uses two force evaluations per step and updates positions, velocities,
/// and `sys.t` in place. Accelerations go through the `AccelSet`'s
/// reusable buffer, so steady-state steps do not allocate.
pub fn verlet_integrator(sys: &mut System, forces: &mut AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 { // no bodies, return
        return;
    }
    let half_dt = 0.5 * dt; // half step dt/2

    // a_n from x_n at time t_n
    let a_old = forces.evaluate(&*sys);

    // Kick: v_n+1/2 = v_n + (1/2 * dt) * a_n
    for (b, a) in sys.bodies.iter_mut().zip(a_old) {
        b.v += half_dt * *a;
    }

    // Drift: full-step position: x_n+1 = x_n + dt v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }

    // advance time: t_n+1 = t_n + dt
    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1, same buffer as a_n
    let a_new = forces.evaluate(&*sys);

    // Second kick: v_n+1 = v_half + (dt/2) * a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new) {
        b.v += half_dt * *a;
    }
}
