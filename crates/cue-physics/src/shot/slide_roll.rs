//! Sliding → rolling transition.
//!
//! A freshly struck ball skids: its spin about the rolling axis does not yet
//! match its travel speed. Each tick nudges the spin toward the no-slip value
//! and bleeds a little linear speed while the mismatch lasts.

use glam::Vec3;

use crate::shot::params::ShotParameters;
use crate::shot::solver::{horizontal_unit, roll_axis};

/// Result of one slide/roll correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideRollStep {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Whether the ball was still sliding this tick.
    pub sliding: bool,
}

/// Spin about the rolling axis a ball at `speed` needs to roll without slip.
pub fn rolling_spin(params: &ShotParameters, speed: f32) -> f32 {
    if params.ball_radius > 0.0 {
        speed / params.ball_radius
    } else {
        0.0
    }
}

pub fn apply_slide_to_roll(
    params: &ShotParameters,
    velocity: Vec3,
    angular_velocity: Vec3,
    delta: f32,
) -> SlideRollStep {
    let unchanged = SlideRollStep {
        velocity,
        angular_velocity,
        sliding: false,
    };

    let speed = Vec3::new(velocity.x, 0.0, velocity.z).length();
    if speed <= params.stop_speed_threshold {
        return unchanged;
    }
    let Some(dir) = horizontal_unit(velocity) else {
        return unchanged;
    };

    let right = roll_axis(dir);
    let current_roll = angular_velocity.dot(right);
    let slip = rolling_spin(params, speed) - current_roll;
    if slip.abs() <= params.slide_threshold {
        return unchanged;
    }

    let correction = params.roll_acceleration * delta * slip.signum();
    let bleed = 1.0 - params.felt_friction * delta * 0.1;

    SlideRollStep {
        velocity: velocity * bleed,
        angular_velocity: angular_velocity + right * correction,
        sliding: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn struck_ball_gains_roll_and_loses_a_little_speed() {
        let params = ShotParameters::default();
        let v = Vec3::new(5.5, 0.0, 0.0);
        let w = Vec3::new(0.0, 0.0, 58.93);

        let step = apply_slide_to_roll(&params, v, w, DT);
        assert!(step.sliding);
        assert!((step.angular_velocity.z - (58.93 + 1.0)).abs() < 1e-3);
        let expected_speed = 5.5 * (1.0 - 0.2 * DT * 0.1);
        assert!((step.velocity.x - expected_speed).abs() < 1e-5);
    }

    #[test]
    fn overspinning_ball_loses_roll() {
        let params = ShotParameters::default();
        let v = Vec3::new(0.0, 0.0, 1.0);
        // dir = +Z, right = (-1, 0, 0); rolling needs 1/0.028 ≈ 35.7 rad/s
        let w = Vec3::new(-80.0, 0.0, 0.0);

        let step = apply_slide_to_roll(&params, v, w, DT);
        assert!(step.sliding);
        assert!((step.angular_velocity.x - (-80.0 + 1.0)).abs() < 1e-3);
    }

    #[test]
    fn rolling_ball_is_left_alone() {
        let params = ShotParameters::default();
        let v = Vec3::new(1.4, 0.0, 0.0);
        let w = Vec3::new(0.0, 0.0, 50.0); // 1.4 / 0.028 = 50

        let step = apply_slide_to_roll(&params, v, w, DT);
        assert!(!step.sliding);
        assert_eq!(step.velocity, v);
        assert_eq!(step.angular_velocity, w);
    }

    #[test]
    fn ball_below_stop_speed_is_ignored() {
        let params = ShotParameters::default();
        let step = apply_slide_to_roll(&params, Vec3::new(0.05, 0.0, 0.0), Vec3::ZERO, DT);
        assert!(!step.sliding);
    }

    #[test]
    fn vertical_motion_alone_does_not_count_as_speed() {
        let params = ShotParameters::default();
        let step = apply_slide_to_roll(&params, Vec3::new(0.0, -3.0, 0.0), Vec3::ZERO, DT);
        assert!(!step.sliding);
        assert!(!step.angular_velocity.is_nan());
    }
}
