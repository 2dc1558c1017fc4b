//! Hand-tuned visual parameters shared by furniture assemblers.
//!
//! These are "looks right" defaults, not correctness invariants; recipes
//! read them through [`Style`] so a whole building can be re-proportioned
//! without touching emitter code.

/// Visual proportion and variation defaults.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Style {
    /// Table/chair leg width as a fraction of object width.
    pub leg_width_ratio: f32,
    /// Table-top thickness as a fraction of object height.
    pub top_thickness_ratio: f32,
    /// Drawer face inset as a fraction of drawer width.
    pub drawer_inset_ratio: f32,
    /// Probability that a shelved item (book, bottle) is tilted.
    pub tilt_probability: f32,
    /// Maximum random tilt angle in radians.
    pub max_tilt_angle: f32,
    /// Maximum random placement jitter as a fraction of object size.
    pub placement_jitter: f32,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            leg_width_ratio: 0.08,
            top_thickness_ratio: 0.12,
            drawer_inset_ratio: 0.05,
            tilt_probability: 0.3,
            max_tilt_angle: 0.1,
            placement_jitter: 0.02,
        }
    }
}
