//! Tunable shot coefficients.
//!
//! Every coefficient is a plain `f32` addressable by its camelCase key, so the
//! remote tuning panel can read, write and bulk-import them without knowing
//! the struct layout. Values are not range-checked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

macro_rules! shot_parameters {
    ($( $(#[$doc:meta])* $field:ident = $key:literal : $default:expr, )*) => {
        /// Named numeric coefficients driving every part of the shot model.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ShotParameters {
            $(
                $(#[$doc])*
                #[serde(rename = $key)]
                pub $field: f32,
            )*
        }

        impl Default for ShotParameters {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl ShotParameters {
            /// Every key, in declaration order.
            pub const KEYS: &'static [&'static str] = &[$( $key, )*];

            /// Look up a coefficient by key.
            pub fn get(&self, name: &str) -> Option<f32> {
                match name {
                    $( $key => Some(self.$field), )*
                    _ => None,
                }
            }

            /// Overwrite a coefficient. Returns `false` (and changes nothing)
            /// for an unknown key.
            pub fn set(&mut self, name: &str, value: f32) -> bool {
                match name {
                    $( $key => { self.$field = value; true } )*
                    _ => false,
                }
            }
        }
    };
}

shot_parameters! {
    /// Cue speed (m/s) at full power.
    power_multiplier = "powerMultiplier": 11.0,
    ball_radius = "ballRadius": 0.028,
    ball_mass = "ballMass": 0.17,
    /// Fraction of the rolling spin a ball leaves the tip with; the rest
    /// develops while sliding.
    initial_roll_factor = "initialRollFactor": 0.3,
    vertical_sensitivity = "verticalSensitivity": 1.0,
    english_sensitivity = "englishSensitivity": 1.0,
    /// Exponent applied to power when scaling tip offset into spin.
    spin_power_scaling = "spinPowerScaling": 0.5,
    topspin_angular_multiplier = "topspinAngularMultiplier": 40.0,
    english_angular_multiplier = "englishAngularMultiplier": 30.0,

    /// Slip correction (rad/s²) applied while a ball slides.
    roll_acceleration = "rollAcceleration": 60.0,
    /// Slip (rad/s) tolerated before a ball counts as sliding.
    slide_threshold = "slideThreshold": 2.0,
    felt_friction = "feltFriction": 0.2,

    stop_speed_threshold = "stopSpeedThreshold": 0.08,
    slow_speed_threshold = "slowSpeedThreshold": 0.5,
    stop_angular_threshold = "stopAngularThreshold": 0.6,
    stop_linear_damping = "stopLinearDamping": 6.0,
    stop_angular_damping = "stopAngularDamping": 6.0,
    slow_linear_damping = "slowLinearDamping": 1.2,
    slow_angular_damping = "slowAngularDamping": 1.2,
    fast_linear_damping = "fastLinearDamping": 0.6,
    fast_angular_damping = "fastAngularDamping": 0.6,

    /// Per-tick multiplier on both spin components.
    spin_decay_rate = "spinDecayRate": 0.98,
    spin_effect_threshold = "spinEffectThreshold": 0.1,
    stop_shot_threshold = "stopShotThreshold": 0.3,
    stop_shot_retention = "stopShotRetention": 0.15,
    draw_base = "drawBase": 0.3,
    draw_multiplier = "drawMultiplier": 0.9,
    follow_base = "followBase": 0.2,
    follow_multiplier = "followMultiplier": 0.8,
    /// Share of angular velocity left after a draw shot.
    draw_spin_residual = "drawSpinResidual": 0.3,
    /// Floor on the speed follow/draw impulses scale with.
    spin_min_speed = "spinMinSpeed": 0.5,
    english_threshold = "englishThreshold": 0.1,
    cushion_speed_threshold = "cushionSpeedThreshold": 0.3,
    cushion_english_effect = "cushionEnglishEffect": 0.25,

    tunneling_speed_threshold = "tunnelingSpeedThreshold": 3.0,
    tunneling_epsilon = "tunnelingEpsilon": 0.001,

    /// Height of a resting ball's center above the floor.
    felt_height = "feltHeight": 0.79,
    drop_threshold = "dropThreshold": 0.015,
    table_length_bound = "tableLengthBound": 1.4,
    table_width_bound = "tableWidthBound": 0.75,
}

impl ShotParameters {
    /// Snapshot every coefficient as a key → value record.
    pub fn export_all(&self) -> BTreeMap<String, f32> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|v| (key.to_string(), v)))
            .collect()
    }

    /// Overwrite every known key present in `record`; unknown keys are
    /// dropped. Returns how many values were applied.
    pub fn import_all<'a, I>(&mut self, record: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a f32)>,
    {
        let mut applied = 0;
        for (key, value) in record {
            if self.set(key, *value) {
                applied += 1;
            } else {
                log::debug!("Ignoring unknown shot parameter '{}'", key);
            }
        }
        applied
    }

    /// Apply a JSON object of parameters. Unknown keys are dropped and
    /// non-numeric values for known keys are skipped.
    pub fn import_json(&mut self, json: &str) -> crate::error::Result<usize> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or(crate::error::TableError::NotAnObject)?;

        let mut applied = 0;
        for (key, value) in object {
            match value.as_f64() {
                Some(v) => {
                    if self.set(key, v as f32) {
                        applied += 1;
                    } else {
                        log::debug!("Ignoring unknown shot parameter '{}'", key);
                    }
                }
                None if self.get(key).is_some() => {
                    log::warn!("Shot parameter '{}' is not numeric: {}", key, value);
                }
                None => {}
            }
        }
        Ok(applied)
    }

    /// Serialize every coefficient as a JSON object.
    pub fn export_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(&self.export_all())?)
    }
}
