//! High-level runtime engine settings
//!
//! Selects the Barnes–Hut opening angle, frame substepping, time scale and
//! the optional behaviours (merging, short-range repulsion) used when
//! running a `Scenario`

#[derive(Debug, Clone)]
pub struct Engine {
    pub theta: f64,          // opening angle, node is approximated when width / dist < theta
    pub substeps: u32,       // integrator substeps per frame
    pub time_scale: f64,     // frame_dt multiplier
    pub merge_enabled: bool, // run the merge resolver before each substep
    pub repulsion: bool,     // push apart inside the contact distance
    pub max_bodies: usize,   // spawn capacity
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            theta: 0.5,
            substeps: 8,
            time_scale: 1.0,
            merge_enabled: true,
            repulsion: false,
            max_bodies: 256,
        }
    }
}
