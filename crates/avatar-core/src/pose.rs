use crate::constants::{HIPS_YAW, IDLE_JITTER_SPAN, LOWER_ARM_ROLL, UPPER_ARM_ROLL};
use crate::rig::{AvatarRig, Joint};
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;

/// One-time pose correction applied to a freshly loaded avatar.
#[derive(Clone, Debug, PartialEq)]
pub struct RestPose {
    rotations: SmallVec<[(Joint, Vec3); 8]>,
}

impl Default for RestPose {
    fn default() -> Self {
        Self::standard()
    }
}

impl RestPose {
    /// Turn the model toward the camera and lower the arms from the T-pose.
    pub fn standard() -> Self {
        let rotations = SmallVec::from_slice(&[
            (Joint::Hips, Vec3::new(0.0, HIPS_YAW, 0.0)),
            (Joint::RightUpperArm, Vec3::new(0.0, 0.0, -UPPER_ARM_ROLL)),
            (Joint::RightLowerArm, Vec3::new(0.0, 0.0, -LOWER_ARM_ROLL)),
            (Joint::LeftUpperArm, Vec3::new(0.0, 0.0, UPPER_ARM_ROLL)),
            (Joint::LeftLowerArm, Vec3::new(0.0, 0.0, LOWER_ARM_ROLL)),
        ]);
        Self { rotations }
    }

    /// Add a small random tilt to head, neck and spine so repeated loads do
    /// not stand identically. Not used by default.
    pub fn with_jitter<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        for joint in [Joint::Head, Joint::Neck, Joint::Spine] {
            let mut axis = || (rng.gen::<f32>() - 0.5) * IDLE_JITTER_SPAN;
            let euler = Vec3::new(axis(), axis(), axis());
            self.rotations.push((joint, euler));
        }
        self
    }

    pub fn rotations(&self) -> &[(Joint, Vec3)] {
        &self.rotations
    }

    pub fn apply<R: AvatarRig + ?Sized>(&self, rig: &mut R) {
        for &(joint, euler) in &self.rotations {
            rig.set_joint_rotation(joint, euler);
        }
    }
}
