//! Minimal vector math for the kinematic battle and locomotion code.
use serde::{Deserialize, Serialize};

/// Squared length below which a direction is treated as degenerate.
pub(crate) const DEGENERATE_SQ: f32 = 1e-4;

/// Three-component float vector. Y is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[must_use]
    pub fn length_sq(self) -> f32 {
        self.x.mul_add(self.x, self.y.mul_add(self.y, self.z * self.z))
    }

    /// Unit vector in the same direction, or zero when degenerate.
    #[must_use]
    pub fn normalized_or_zero(self) -> Self {
        let len_sq = self.length_sq();
        if len_sq < DEGENERATE_SQ {
            Self::ZERO
        } else {
            self * (1.0 / len_sq.sqrt())
        }
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Copy with the vertical component dropped to zero.
    #[must_use]
    pub const fn horizontal(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Distance measured on the horizontal plane only.
    #[must_use]
    pub fn horizontal_distance(self, other: Self) -> f32 {
        (other - self).horizontal().length()
    }

    #[must_use]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    /// Clamped linear step toward `target` that never overshoots it.
    #[must_use]
    pub fn move_towards(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist < f32::EPSILON {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Hermite smooth-step easing over `t` in [0, 1].
#[must_use]
pub fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * 2.0f32.mul_add(-t, 3.0)
}

/// Horizontal facing angle (radians around the vertical axis) from one
/// point toward another. Returns `None` when the points coincide on the
/// horizontal plane.
#[must_use]
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let delta = (to - from).horizontal();
    if delta.length_sq() < DEGENERATE_SQ {
        None
    } else {
        Some(delta.x.atan2(delta.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    #[test]
    fn move_towards_never_overshoots() {
        let start = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(3.0, 1.0, 4.0);
        let step = start.move_towards(target, 1.0);
        assert!((start.distance(step) - 1.0).abs() < FLOAT_EPSILON);

        let landed = start.move_towards(target, 100.0);
        assert_eq!(landed, target);

        let exact = start.move_towards(target, 5.0);
        assert_eq!(exact, target);
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!((a.horizontal_distance(b) - 5.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn smooth_step_endpoints_and_midpoint() {
        assert!((smooth_step(0.0)).abs() < FLOAT_EPSILON);
        assert!((smooth_step(1.0) - 1.0).abs() < FLOAT_EPSILON);
        assert!((smooth_step(0.5) - 0.5).abs() < FLOAT_EPSILON);
        assert!((smooth_step(-4.0)).abs() < FLOAT_EPSILON);
        assert!((smooth_step(9.0) - 1.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn yaw_towards_cardinal_directions() {
        let origin = Vec3::ZERO;
        let ahead = yaw_towards(origin, Vec3::FORWARD).unwrap();
        assert!(ahead.abs() < FLOAT_EPSILON);
        let right = yaw_towards(origin, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!((right - std::f32::consts::FRAC_PI_2).abs() < FLOAT_EPSILON);
        assert!(yaw_towards(origin, Vec3::new(0.0, 5.0, 0.0)).is_none());
    }

    #[test]
    fn normalized_or_zero_handles_degenerate_input() {
        assert_eq!(Vec3::ZERO.normalized_or_zero(), Vec3::ZERO);
        let unit = Vec3::new(0.0, 0.0, 8.0).normalized_or_zero();
        assert!((unit.length() - 1.0).abs() < FLOAT_EPSILON);
    }
}
