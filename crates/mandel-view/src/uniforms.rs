//! Uniform names shared with the fragment shader, and the per-frame values.

use crate::viewport::ViewState;

pub const U_RESOLUTION: &str = "u_resolution";
pub const U_CENTER: &str = "u_center";
pub const U_SCALE: &str = "u_scale";
pub const U_TIME: &str = "u_time";

/// Uniform values as uploaded, narrowed to `f32`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformSet {
    pub resolution: [f32; 2],
    pub center: [f32; 2],
    pub scale: f32,
    pub time: f32,
}

impl UniformSet {
    pub fn new(view: &ViewState, resolution: (u32, u32)) -> Self {
        Self {
            resolution: [resolution.0 as f32, resolution.1 as f32],
            center: view.center.to_f32(),
            scale: view.scale as f32,
            time: view.time as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_view_narrows_exactly() {
        let u = UniformSet::new(&ViewState::INITIAL, (800, 600));
        assert_eq!(u.resolution, [800.0, 600.0]);
        assert_eq!(u.center, [-0.3, 0.0]);
        assert_eq!(u.scale, 1.0);
        assert_eq!(u.time, 0.0);
    }
}
