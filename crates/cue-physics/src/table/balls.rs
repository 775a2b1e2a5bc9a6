//! Ball records and the triangle rack.

use glam::{Vec2, Vec3};

use crate::api::types::{BallNumber, EntityId, CUE_BALL};
use crate::core::physics::PhysicsBody;

/// One ball on the table.
///
/// Velocities live on the physics body; `position` is the logical mirror the
/// renderer and the replication layer read, kept in sync after every step
/// and every correction this crate makes.
#[derive(Debug, Clone)]
pub struct Ball {
    pub number: BallNumber,
    pub entity: EntityId,
    pub body: PhysicsBody,
    pub position: Vec3,
    /// Terminal for the current shot; cleared only by a respot or re-rack.
    pub pocketed: bool,
    pub visible: bool,
}

impl Ball {
    pub fn is_cue(&self) -> bool {
        self.number == CUE_BALL
    }

    pub fn is_active(&self) -> bool {
        !self.pocketed
    }
}

/// Balls indexed by their stable number (index 0 is the cue ball).
#[derive(Debug, Clone, Default)]
pub struct BallRegistry {
    balls: Vec<Ball>,
}

impl BallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next ball. Numbers are assigned in insertion order.
    pub fn push(&mut self, entity: EntityId, body: PhysicsBody, position: Vec3) -> BallNumber {
        let number = self.balls.len() as BallNumber;
        self.balls.push(Ball {
            number,
            entity,
            body,
            position,
            pocketed: false,
            visible: true,
        });
        number
    }

    pub fn get(&self, number: BallNumber) -> Option<&Ball> {
        self.balls.get(number as usize)
    }

    pub fn get_mut(&mut self, number: BallNumber) -> Option<&mut Ball> {
        self.balls.get_mut(number as usize)
    }

    pub fn cue(&self) -> Option<&Ball> {
        self.get(CUE_BALL)
    }

    pub fn cue_mut(&mut self) -> Option<&mut Ball> {
        self.get_mut(CUE_BALL)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> {
        self.balls.iter_mut()
    }

    /// Balls still in play.
    pub fn active(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().filter(|b| b.is_active())
    }

    /// Object balls still in play.
    pub fn active_object_balls(&self) -> impl Iterator<Item = &Ball> {
        self.active().filter(|b| !b.is_cue())
    }

    /// Resolve a body's entity back to its ball number.
    pub fn number_of(&self, entity: EntityId) -> Option<BallNumber> {
        self.balls.iter().find(|b| b.entity == entity).map(|b| b.number)
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }
}

/// Triangle rack on the table plane (X, Z), apex pointing toward the cue ball
/// (−X) and rows spreading toward +X.
///
/// For four rows (the ten-pin bowling rack):
/// ```text
///           7
///        4
///     2     8
///  1     5
///     3     9
///        6
///           10
/// ```
/// Returned positions are in ball order, starting with ball 1.
pub fn rack_positions(apex: Vec2, ball_radius: f32, rows: usize) -> Vec<Vec2> {
    // Tight rack with a hair of clearance so nothing starts interpenetrating
    let gap = ball_radius * 2.0 + 0.0005;
    let row_offset = gap * 0.866; // sqrt(3)/2 for equilateral triangle

    let mut positions = Vec::with_capacity(rows * (rows + 1) / 2);
    for row in 0..rows {
        let x = apex.x + row as f32 * row_offset;
        for slot in 0..=row {
            let z_offset = slot as f32 - row as f32 / 2.0;
            positions.push(Vec2::new(x, apex.y + z_offset * gap));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_pin_rack_shape() {
        let r = 0.028;
        let positions = rack_positions(Vec2::new(0.6, 0.0), r, 4);
        assert_eq!(positions.len(), 10);
        assert_eq!(positions[0], Vec2::new(0.6, 0.0));

        // Back row is the widest and furthest from the apex
        let back: Vec<_> = positions[6..].iter().collect();
        assert!(back.iter().all(|p| p.x > 0.6));
        assert!((back[0].y + back[3].y).abs() < 1e-6);
    }

    #[test]
    fn racked_balls_do_not_overlap() {
        let r = 0.028;
        let positions = rack_positions(Vec2::ZERO, r, 5);
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(*b) >= 2.0 * r, "{:?} vs {:?}", a, b);
            }
        }
    }
}
