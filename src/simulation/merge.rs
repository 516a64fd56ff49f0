//! Collision resolution through perfectly inelastic mergers
//!
//! Overlapping bodies fuse into the lower-indexed one. Mass and linear
//! momentum are conserved; kinetic energy is not.

use log::debug;

use crate::simulation::states::{Body, BodyId, NVec3, RadiusModel, System};

/// Coarse size class of a merge product, handed to the renderer with each
/// [`MergeEvent`] so it can pick an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassClass {
    /// Below a tenth of the radius cap mass.
    Minor,
    /// Up to the radius cap mass, radius still growing.
    Major,
    /// Past the cap, radius saturated.
    Saturated,
}

impl MassClass {
    pub fn from_mass(m: f64, model: &RadiusModel) -> Self {
        if m < 0.1 * model.mass_cap {
            MassClass::Minor
        } else if m <= model.mass_cap {
            MassClass::Major
        } else {
            MassClass::Saturated
        }
    }
}

/// One fusion: `absorbed` was folded into `survivor`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeEvent {
    pub survivor: BodyId,
    pub absorbed: BodyId,
    pub position: NVec3,
    pub mass: f64,
    pub radius: f64,
    pub class: MassClass,
}

/// Merge rule settings.
#[derive(Debug, Clone, Copy)]
pub struct MergeRules {
    pub contact_factor: f64,
    pub radius: RadiusModel,
}

/// `true` when the bodies are closer than `contact_factor * (ri + rj)`.
pub fn overlapping(a: &Body, b: &Body, contact_factor: f64) -> bool {
    let reach = contact_factor * (a.radius + b.radius);
    (b.x - a.x).norm_squared() < reach * reach
}

/// Fold `other` into `survivor`: masses add, position and velocity become
/// mass-weighted means, radius follows the new mass.
pub fn absorb(survivor: &mut Body, other: &Body, model: &RadiusModel) {
    let m = survivor.m + other.m;
    survivor.x = (survivor.x * survivor.m + other.x * other.m) / m;
    survivor.v = (survivor.momentum() + other.momentum()) / m;
    survivor.m = m;
    survivor.radius = model.radius(m);
}

/// Resolve every overlap in the body store.
///
/// Single pass over pairs `(i, j)`, `i < j`, in ascending order. The
/// survivor's updated state is used for the remaining pairs, and an absorbed
/// body takes no further part in the pass. Removed bodies are deleted only
/// after the pass, highest index first.
pub fn resolve_merges(sys: &mut System, rules: &MergeRules) -> Vec<MergeEvent> {
    let n = sys.bodies.len();
    let mut removed = vec![false; n];
    let mut events = Vec::new();

    for i in 0..n {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..n {
            if removed[j] || !overlapping(&sys.bodies[i], &sys.bodies[j], rules.contact_factor) {
                continue;
            }

            let (head, tail) = sys.bodies.split_at_mut(j);
            let survivor = &mut head[i];
            let other = &tail[0];
            absorb(survivor, other, &rules.radius);
            removed[j] = true;

            debug!(
                "merge: {} absorbed {} -> m = {:.4}, r = {:.4}",
                survivor.id, other.id, survivor.m, survivor.radius
            );
            events.push(MergeEvent {
                survivor: survivor.id,
                absorbed: other.id,
                position: survivor.x,
                mass: survivor.m,
                radius: survivor.radius,
                class: MassClass::from_mass(survivor.m, &rules.radius),
            });
        }
    }

    for j in (0..n).rev() {
        if removed[j] {
            sys.bodies.remove(j);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> MergeRules {
        MergeRules {
            contact_factor: 0.8,
            radius: RadiusModel { scale: 0.1, mass_cap: 100.0, min_radius: 0.05 },
        }
    }

    #[test]
    fn separated_bodies_do_not_merge() {
        let mut sys = System::new();
        sys.insert(NVec3::new(0.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        sys.insert(NVec3::new(1.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        let events = resolve_merges(&mut sys, &rules());
        assert!(events.is_empty());
        assert_eq!(sys.len(), 2);
    }

    #[test]
    fn contact_factor_merges_before_surfaces_touch() {
        let mut sys = System::new();
        // surfaces touch at 0.2, merge threshold is 0.16
        sys.insert(NVec3::zeros(), NVec3::zeros(), 1.0, 0.1);
        sys.insert(NVec3::new(0.17, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        assert!(resolve_merges(&mut sys, &rules()).is_empty());

        sys.bodies[1].x = NVec3::new(0.15, 0.0, 0.0);
        let events = resolve_merges(&mut sys, &rules());
        assert_eq!(events.len(), 1);
        assert_eq!(sys.len(), 1);
    }

    #[test]
    fn lower_index_survives_and_momentum_is_conserved() {
        let mut sys = System::new();
        let a = sys.insert(NVec3::new(0.0, 0.0, 0.0), NVec3::new(1.0, 0.0, 0.0), 1.0, 0.1);
        let b = sys.insert(NVec3::new(0.05, 0.0, 0.0), NVec3::new(0.0, 3.0, 0.0), 3.0, 0.1);
        let p0 = sys.momentum();

        let events = resolve_merges(&mut sys, &rules());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].survivor, a);
        assert_eq!(events[0].absorbed, b);
        assert_eq!(sys.bodies[0].id, a);
        assert!((sys.bodies[0].m - 4.0).abs() < 1e-12);
        assert!((sys.momentum() - p0).norm() < 1e-12);
        assert!((sys.bodies[0].x - NVec3::new(0.0375, 0.0, 0.0)).norm() < 1e-12);
        assert!((sys.bodies[0].radius - 0.2).abs() < 1e-12);
    }

    #[test]
    fn multiway_overlap_collapses_in_index_order() {
        let mut sys = System::new();
        let a = sys.insert(NVec3::new(0.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        let b = sys.insert(NVec3::new(0.01, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        let c = sys.insert(NVec3::new(0.02, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);
        let far = sys.insert(NVec3::new(5.0, 0.0, 0.0), NVec3::zeros(), 1.0, 0.1);

        let events = resolve_merges(&mut sys, &rules());

        let pairs: Vec<_> = events.iter().map(|e| (e.survivor, e.absorbed)).collect();
        assert_eq!(pairs, vec![(a, b), (a, c)]);
        let ids: Vec<_> = sys.bodies.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![a, far]);
        assert!((sys.total_mass() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mass_class_tracks_radius_cap() {
        let model = rules().radius;
        assert_eq!(MassClass::from_mass(1.0, &model), MassClass::Minor);
        assert_eq!(MassClass::from_mass(50.0, &model), MassClass::Major);
        assert_eq!(MassClass::from_mass(500.0, &model), MassClass::Saturated);
    }
}
