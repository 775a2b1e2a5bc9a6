use glam::{Vec2, Vec3};

use crate::core::physics::ColliderMaterial;

/// Table construction settings. Fixed for the lifetime of a [`PoolTable`];
/// runtime tunables live in [`ShotParameters`].
///
/// Lengths are meters. The table's length runs along X, its depth along Z,
/// Y is up and the table is centered on the origin.
///
/// [`PoolTable`]: crate::table::PoolTable
/// [`ShotParameters`]: crate::shot::params::ShotParameters
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Fixed timestep in seconds used by `advance` (default: 1/60).
    pub fixed_dt: f32,
    /// World sub-steps per update (default: 4, i.e. 240Hz at 60 ticks/s).
    pub physics_substeps: u32,
    pub gravity: Vec3,
    /// Distance from the center to the end-rail cushion noses.
    pub half_length: f32,
    /// Distance from the center to the long-rail cushion noses.
    pub half_width: f32,
    pub cushion_thickness: f32,
    /// Opening left in the rails at each corner pocket, per rail.
    pub corner_gap: f32,
    /// Opening left in the long rails at each side pocket.
    pub side_gap: f32,
    /// Corner pocket center (X, Z) in the +X/+Z quadrant; mirrored to the others.
    pub corner_pocket: Vec2,
    pub corner_pocket_radius: f32,
    /// |Z| of the side pocket centers.
    pub side_pocket_offset: f32,
    pub side_pocket_radius: f32,
    /// How far below the felt pocketed balls are parked.
    pub park_depth: f32,
    /// Cue ball home spot on the table plane.
    pub cue_spot: Vec2,
    /// Apex of the triangle rack on the table plane.
    pub rack_apex: Vec2,
    pub rack_rows: usize,
    pub ball_ccd: bool,
    /// Ball material. Density is derived from `ballMass` at rack time.
    pub ball_material: ColliderMaterial,
    pub cushion_material: ColliderMaterial,
    /// Frictionless by default: rolling resistance is modeled by the damping
    /// policy, not by contact friction against the slab.
    pub felt_material: ColliderMaterial,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            physics_substeps: 4,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            half_length: 1.19,
            half_width: 0.565,
            cushion_thickness: 0.05,
            corner_gap: 0.08,
            side_gap: 0.12,
            corner_pocket: Vec2::new(1.225, 0.59),
            corner_pocket_radius: 0.052,
            side_pocket_offset: 0.62,
            side_pocket_radius: 0.056,
            park_depth: 0.4,
            cue_spot: Vec2::new(-0.6, 0.0),
            rack_apex: Vec2::new(0.6, 0.0),
            rack_rows: 4,
            ball_ccd: true,
            ball_material: ColliderMaterial {
                restitution: 0.95,
                friction: 0.05,
                density: 1.0,
            },
            cushion_material: ColliderMaterial {
                restitution: 0.8,
                friction: 0.2,
                density: 1.0,
            },
            felt_material: ColliderMaterial {
                restitution: 0.0,
                friction: 0.0,
                density: 1.0,
            },
        }
    }
}
