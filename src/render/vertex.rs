use bytemuck::{Pod, Zeroable};

/// One vertex of an extruded terrain profile, in the x/y plane
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ProfileVertex {
    pub position: [f32; 2],
}

impl ProfileVertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: [x as f32, y as f32],
        }
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }
}

/// Raw byte view used when handing profiles to an upload path
pub fn profile_bytes(points: &[ProfileVertex]) -> &[u8] {
    bytemuck::cast_slice(points)
}
