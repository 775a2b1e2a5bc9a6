//! Speed-dependent damping and the hard-stop predicate.

use crate::shot::params::ShotParameters;

/// Damping coefficients handed to the physics body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

/// Which damping regime a speed falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedRegime {
    Stopping,
    Slow,
    Fast,
}

pub fn regime(params: &ShotParameters, speed: f32) -> SpeedRegime {
    if speed < params.stop_speed_threshold {
        SpeedRegime::Stopping
    } else if speed < params.slow_speed_threshold {
        SpeedRegime::Slow
    } else {
        SpeedRegime::Fast
    }
}

pub fn get_damping(params: &ShotParameters, speed: f32) -> Damping {
    match regime(params, speed) {
        SpeedRegime::Stopping => Damping {
            linear: params.stop_linear_damping,
            angular: params.stop_angular_damping,
        },
        SpeedRegime::Slow => Damping {
            linear: params.slow_linear_damping,
            angular: params.slow_angular_damping,
        },
        SpeedRegime::Fast => Damping {
            linear: params.fast_linear_damping,
            angular: params.fast_angular_damping,
        },
    }
}

/// Whether a ball is slow enough, in both senses, to be snapped to rest.
/// The caller zeroes linear and angular velocity when this holds.
pub fn should_stop(params: &ShotParameters, linear_speed: f32, angular_speed: f32) -> bool {
    linear_speed < params.stop_speed_threshold && angular_speed < params.stop_angular_threshold
}
