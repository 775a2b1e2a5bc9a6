//! Cue strike → initial ball motion.

use glam::Vec3;

use crate::shot::params::ShotParameters;
use crate::shot::spin::SpinState;

/// Horizontal vectors shorter than this are treated as zero.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Initial motion of the cue ball for one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotKinematics {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub spin: SpinState,
}

fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Project `v` onto the table plane and normalize, or `None` when it has no
/// usable horizontal component.
pub fn horizontal_unit(v: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let len = flat.length();
    if len.is_finite() && len > DIRECTION_EPSILON {
        Some(flat / len)
    } else {
        None
    }
}

/// Axis about which a ball travelling along `dir` rolls forward/back.
pub fn roll_axis(dir: Vec3) -> Vec3 {
    Vec3::new(-dir.z, 0.0, dir.x)
}

/// Spin produced by striking the cue ball at a tip offset.
///
/// Offsets are fractions of the ball radius from center; the result is
/// clamped to `[-1, 1]` whatever the input range.
pub fn calculate_spin(
    params: &ShotParameters,
    vertical_offset: f32,
    horizontal_offset: f32,
    power: f32,
) -> SpinState {
    let power = finite_or_zero(power).clamp(0.0, 1.0);
    let power_scale = power.powf(params.spin_power_scaling);

    let vertical = finite_or_zero(vertical_offset * params.vertical_sensitivity * power_scale);
    let english = finite_or_zero(horizontal_offset * params.english_sensitivity * power_scale);

    SpinState {
        vertical: vertical.clamp(-1.0, 1.0),
        english: english.clamp(-1.0, 1.0),
        power,
    }
}

/// Linear and angular velocity the cue ball leaves the tip with.
///
/// The ball starts with only `initial_roll_factor` of its natural roll and
/// slides for the rest; top/back spin adds to (or subtracts from) that roll.
/// English is written to the vertical axis here, but the table zeroes that
/// axis every tick: side spin only ever acts at a cushion.
pub fn calculate_shot_physics(
    params: &ShotParameters,
    direction: Vec3,
    power: f32,
    spin: SpinState,
) -> ShotKinematics {
    let power = finite_or_zero(power).clamp(0.0, 1.0);
    let Some(dir) = horizontal_unit(direction) else {
        return ShotKinematics {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            spin,
        };
    };

    let speed = power * params.power_multiplier;
    let velocity = dir * speed;

    let right = roll_axis(dir);
    let base_roll = if params.ball_radius > DIRECTION_EPSILON {
        speed / params.ball_radius * params.initial_roll_factor
    } else {
        0.0
    };
    let vertical_spin = spin.vertical * params.topspin_angular_multiplier * power;
    let mut angular_velocity = right * (base_roll + vertical_spin);
    angular_velocity.y = spin.english * params.english_angular_multiplier * power;

    ShotKinematics {
        velocity,
        angular_velocity,
        spin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_is_clamped_for_wild_offsets() {
        let params = ShotParameters::default();
        for &(v, h) in &[(5.0, -7.0), (-3.0, 2.5), (100.0, 100.0), (-1e6, 1e6)] {
            for &power in &[0.0, 0.3, 1.0] {
                let spin = calculate_spin(&params, v, h, power);
                assert!((-1.0..=1.0).contains(&spin.vertical), "{:?}", spin);
                assert!((-1.0..=1.0).contains(&spin.english), "{:?}", spin);
            }
        }
    }

    #[test]
    fn spin_scales_with_power_exponent() {
        let params = ShotParameters::default();
        let spin = calculate_spin(&params, 0.5, -0.4, 0.25);
        // 0.25^0.5 = 0.5
        assert!((spin.vertical - 0.25).abs() < 1e-6);
        assert!((spin.english + 0.2).abs() < 1e-6);
        assert_eq!(spin.power, 0.25);
    }

    #[test]
    fn nan_offsets_give_no_spin() {
        let params = ShotParameters::default();
        let spin = calculate_spin(&params, f32::NAN, 0.5, 1.0);
        assert_eq!(spin.vertical, 0.0);
        assert!((spin.english - 0.5).abs() < 1e-6);
    }

    #[test]
    fn straight_shot_kinematics() {
        let params = ShotParameters::default();
        assert_eq!(params.power_multiplier, 11.0);
        assert_eq!(params.initial_roll_factor, 0.3);

        let shot = calculate_shot_physics(&params, Vec3::X, 0.5, SpinState::default());
        assert!((shot.velocity - Vec3::new(5.5, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(roll_axis(Vec3::X), Vec3::new(-0.0, 0.0, 1.0));
        assert!(shot.angular_velocity.x.abs() < 1e-4);
        assert!(shot.angular_velocity.y.abs() < 1e-4);
        assert!(
            (shot.angular_velocity.z - 58.93).abs() < 1e-2,
            "angvel={:?}",
            shot.angular_velocity
        );
    }

    #[test]
    fn topspin_adds_to_roll_and_english_goes_vertical() {
        let params = ShotParameters::default();
        let spin = SpinState { vertical: 0.5, english: -0.5, power: 1.0 };
        let plain = calculate_shot_physics(&params, Vec3::X, 1.0, SpinState::default());
        let spun = calculate_shot_physics(&params, Vec3::X, 1.0, spin);

        assert!((spun.angular_velocity.z - plain.angular_velocity.z - 20.0).abs() < 1e-3);
        assert!((spun.angular_velocity.y + 15.0).abs() < 1e-4);
        assert_eq!(spun.velocity, plain.velocity);
    }

    #[test]
    fn direction_is_flattened_and_normalized() {
        let params = ShotParameters::default();
        let shot = calculate_shot_physics(
            &params,
            Vec3::new(0.0, 3.0, -2.0),
            1.0,
            SpinState::default(),
        );
        assert!(shot.velocity.y.abs() < 1e-6);
        assert!((shot.velocity - Vec3::new(0.0, 0.0, -11.0)).length() < 1e-4);
    }

    #[test]
    fn vertical_direction_yields_no_motion() {
        let params = ShotParameters::default();
        let shot = calculate_shot_physics(&params, Vec3::Y, 1.0, SpinState::default());
        assert_eq!(shot.velocity, Vec3::ZERO);
        assert_eq!(shot.angular_velocity, Vec3::ZERO);
        assert!(!shot.velocity.is_nan());
    }
}
