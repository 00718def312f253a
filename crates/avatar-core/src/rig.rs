//! Stable identifiers for the avatar's expressions and joints.
//!
//! The scene library addresses blend shapes and bones by string name; the rest
//! of the crate only ever uses these enums and translates at the boundary via
//! [`Expression::name`] and [`Joint::name`].

use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    BlinkLeft,
    BlinkRight,
    /// Mouth-open "ah" vowel.
    Aa,
    Happy,
    Angry,
}

impl Expression {
    pub const ALL: [Expression; 5] = [
        Expression::BlinkLeft,
        Expression::BlinkRight,
        Expression::Aa,
        Expression::Happy,
        Expression::Angry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Expression::BlinkLeft => "blinkLeft",
            Expression::BlinkRight => "blinkRight",
            Expression::Aa => "aa",
            Expression::Happy => "happy",
            Expression::Angry => "angry",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    Hips,
    RightUpperArm,
    RightLowerArm,
    LeftUpperArm,
    LeftLowerArm,
    Head,
    Neck,
    Spine,
}

impl Joint {
    pub fn name(self) -> &'static str {
        match self {
            Joint::Hips => "hips",
            Joint::RightUpperArm => "rightUpperArm",
            Joint::RightLowerArm => "rightLowerArm",
            Joint::LeftUpperArm => "leftUpperArm",
            Joint::LeftLowerArm => "leftLowerArm",
            Joint::Head => "head",
            Joint::Neck => "neck",
            Joint::Spine => "spine",
        }
    }
}

/// Snapshot of every expression weight the controller drives, each in \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExpressionWeights {
    values: [f32; Expression::ALL.len()],
}

impl ExpressionWeights {
    pub fn get(&self, expression: Expression) -> f32 {
        self.values[expression.index()]
    }

    pub fn set(&mut self, expression: Expression, weight: f32) {
        self.values[expression.index()] = weight.clamp(0.0, 1.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        Expression::ALL.iter().map(move |&e| (e, self.get(e)))
    }
}

/// The subset of the scene library's avatar handle the animation core needs.
///
/// Implemented by the web frontend over the JS scene shim and by test doubles.
pub trait AvatarRig {
    fn set_expression(&mut self, expression: Expression, weight: f32);
    /// Set a joint's local rotation as XYZ Euler angles in radians.
    fn set_joint_rotation(&mut self, joint: Joint, euler: Vec3);
    /// Advance pose interpolation and spring-bone physics.
    fn advance(&mut self, dt_sec: f32);
    fn reset_physics(&mut self);
    /// Point the gaze at the camera-anchored look-at target.
    fn look_at_camera(&mut self);
    fn attach(&mut self);
    /// Detach from the scene and release GPU resources. Called exactly once.
    fn dispose(&mut self);
}
