//! Pocket geometry and the two-stage capture test.

use glam::{Vec2, Vec3};

use crate::shot::params::ShotParameters;

/// A ball whose center is this close (× pocket radius) is captured outright.
pub const CAPTURE_RADIUS_SCALE: f32 = 1.20;
/// Within this wider ring (× pocket radius) a ball is captured only once it
/// has started to drop below the felt.
pub const DROP_RADIUS_SCALE: f32 = 1.40;

/// A pocket mouth on the table plane (X, Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pocket {
    pub center: Vec2,
    pub radius: f32,
}

impl Pocket {
    pub fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            radius,
        }
    }

    fn distance_to(&self, position: Vec3) -> f32 {
        Vec2::new(position.x, position.z).distance(self.center)
    }
}

/// How a ball left play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Dropped into the pocket at this index.
    Pocket(usize),
    /// Left the table bounds entirely.
    OffTable,
}

/// Six fixed pockets. Built once with the table and never mutated.
#[derive(Debug, Clone)]
pub struct PocketTable {
    pockets: Vec<Pocket>,
}

impl PocketTable {
    pub fn new(pockets: Vec<Pocket>) -> Self {
        Self { pockets }
    }

    /// Standard layout: four corners, then the two side pockets.
    pub fn standard(
        half_length: f32,
        half_width: f32,
        corner_radius: f32,
        side_offset: f32,
        side_radius: f32,
    ) -> Self {
        Self::new(vec![
            Pocket::new(-half_length, -half_width, corner_radius),
            Pocket::new(half_length, -half_width, corner_radius),
            Pocket::new(-half_length, half_width, corner_radius),
            Pocket::new(half_length, half_width, corner_radius),
            Pocket::new(0.0, -side_offset, side_radius),
            Pocket::new(0.0, side_offset, side_radius),
        ])
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn len(&self) -> usize {
        self.pockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pockets.is_empty()
    }

    /// Test a ball center against the table bounds and every pocket.
    ///
    /// Boundary escape wins over pockets. Inside a pocket mouth the tight
    /// radius catches grazing balls at felt height; the wider ring only
    /// captures a ball that is already below `felt_height - drop_threshold`.
    pub fn check(&self, params: &ShotParameters, position: Vec3) -> Option<Capture> {
        if !position.is_finite() {
            return Some(Capture::OffTable);
        }
        if position.x.abs() > params.table_length_bound
            || position.z.abs() > params.table_width_bound
        {
            return Some(Capture::OffTable);
        }

        let dropping = position.y < params.felt_height - params.drop_threshold;
        self.pockets
            .iter()
            .enumerate()
            .find(|(_, pocket)| {
                let d = pocket.distance_to(position);
                d < pocket.radius * CAPTURE_RADIUS_SCALE
                    || (dropping && d < pocket.radius * DROP_RADIUS_SCALE)
            })
            .map(|(idx, _)| Capture::Pocket(idx))
    }

    /// Index of the pocket nearest to `position` on the table plane.
    pub fn nearest(&self, position: Vec3) -> Option<usize> {
        self.pockets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_to(position).total_cmp(&b.distance_to(position)))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_pocket() -> PocketTable {
        PocketTable::new(vec![Pocket::new(1.225, -0.59, 0.052)])
    }

    fn at_distance(d: f32, y: f32) -> Vec3 {
        // Approach the corner pocket from inside the table along -X.
        Vec3::new(1.225 - d, y, -0.59)
    }

    #[test]
    fn tight_radius_captures_at_felt_height() {
        let params = ShotParameters::default();
        let table = single_pocket();
        let felt = params.felt_height;
        assert_eq!(table.check(&params, at_distance(0.06, felt)), Some(Capture::Pocket(0)));
    }

    #[test]
    fn wide_ring_needs_a_drop() {
        let params = ShotParameters::default();
        let table = single_pocket();
        let felt = params.felt_height;

        assert_eq!(table.check(&params, at_distance(0.07, felt)), None);
        let sunk = felt - params.drop_threshold - 0.001;
        assert_eq!(table.check(&params, at_distance(0.07, sunk)), Some(Capture::Pocket(0)));
    }

    #[test]
    fn far_from_pocket_is_never_captured() {
        let params = ShotParameters::default();
        let table = single_pocket();
        assert_eq!(table.check(&params, at_distance(0.2, 0.0)), None);
    }

    #[test]
    fn boundary_escape() {
        let params = ShotParameters::default();
        let table = single_pocket();
        let felt = params.felt_height;
        assert_eq!(
            table.check(&params, Vec3::new(1.6, felt, 0.0)),
            Some(Capture::OffTable)
        );
        assert_eq!(
            table.check(&params, Vec3::new(0.0, felt, -0.9)),
            Some(Capture::OffTable)
        );
        assert_eq!(
            table.check(&params, Vec3::new(f32::NAN, felt, 0.0)),
            Some(Capture::OffTable)
        );
        assert_eq!(table.check(&params, Vec3::new(0.0, felt, 0.0)), None);
    }

    #[test]
    fn standard_layout_has_six_pockets() {
        let table = PocketTable::standard(1.225, 0.59, 0.052, 0.62, 0.056);
        assert_eq!(table.len(), 6);
        assert_eq!(table.nearest(Vec3::new(0.05, 0.0, 0.6)), Some(5));
        assert_eq!(table.nearest(Vec3::new(-1.1, 0.0, -0.5)), Some(0));
    }
}
