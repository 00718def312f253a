//! How the scene library should frame the avatar. The scene owns the actual
//! camera; this only carries the fixed portrait parameters across the boundary.

use crate::constants::{
    camera_eye_vec3, camera_target_vec3, CAMERA_FOVY_DEG, CAMERA_ZFAR, CAMERA_ZNEAR,
};
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneFraming {
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub eye: Vec3,
    /// Orbit target, at the avatar's eye line.
    pub target: Vec3,
}

impl SceneFraming {
    /// Head-and-shoulders framing from the camera constants.
    pub fn portrait() -> Self {
        Self {
            fovy_deg: CAMERA_FOVY_DEG,
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
            eye: camera_eye_vec3(),
            target: camera_target_vec3(),
        }
    }

    pub fn viewing_distance(&self) -> f32 {
        self.eye.distance(self.target)
    }
}

impl Default for SceneFraming {
    fn default() -> Self {
        Self::portrait()
    }
}
