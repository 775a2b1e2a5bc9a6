//! Pre-step safety net against the cue ball skipping through an object ball.
//!
//! At break speed the cue ball covers several radii per fixed step, so the
//! narrow phase can miss a thin target entirely. Before stepping, a ray along
//! the cue ball's velocity is tested against every active object ball; if one
//! would be crossed this frame the cue ball is moved up to touching distance
//! and the engine resolves the contact on the next step.

use glam::Vec3;

use crate::api::types::BallNumber;
use crate::core::physics::PhysicsWorld;
use crate::shot::params::ShotParameters;
use crate::table::balls::BallRegistry;

/// A correction made by the guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelingCorrection {
    pub target: BallNumber,
    pub from: Vec3,
    pub to: Vec3,
}

/// Distance along a unit ray to the first intersection with a sphere, or
/// `None` if the ray misses or the sphere lies behind the origin. An origin
/// already inside the sphere reports `0.0`.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Run the guard for the cue ball. Returns the correction applied, if any.
pub fn prevent_tunneling(
    params: &ShotParameters,
    world: &mut PhysicsWorld,
    balls: &mut BallRegistry,
    delta: f32,
) -> Option<TunnelingCorrection> {
    let cue = balls.cue().filter(|b| b.is_active())?;
    let cue_body = cue.body;
    let velocity = world.velocity(&cue_body);
    let speed = velocity.length();
    if !speed.is_finite() || speed < params.tunneling_speed_threshold {
        return None;
    }

    let origin = world.body_position(&cue_body);
    let dir = velocity / speed;
    let radius = params.ball_radius;
    let reach = speed * delta + radius;

    let (target, target_body, hit) = balls
        .active_object_balls()
        .filter_map(|ball| {
            let center = world.body_position(&ball.body);
            ray_sphere(origin, dir, center, radius).map(|t| (ball.number, ball.body, t))
        })
        .filter(|(_, _, t)| *t <= reach)
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    let safe = hit - radius - params.tunneling_epsilon;
    if safe < 0.0 {
        // Already touching; let the contact solver separate them.
        return None;
    }

    let to = origin + dir * safe;
    world.set_body_position(&cue_body, to);
    if let Some(cue) = balls.cue_mut() {
        cue.position = to;
    }
    world.wake_up(&target_body);

    log::debug!(
        "Tunneling guard: cue ball at {:.2} m/s clamped {:.4} m short of ball {}",
        speed,
        safe,
        target
    );
    Some(TunnelingCorrection {
        target,
        from: origin,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_sphere_front_face() {
        let t = ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(0.1, 0.0, 0.0), 0.028).unwrap();
        assert!((t - 0.072).abs() < 1e-6);
    }

    #[test]
    fn ray_misses_offset_and_rear_spheres() {
        assert!(ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(0.1, 0.0, 0.05), 0.028).is_none());
        assert!(ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(-0.1, 0.0, 0.0), 0.028).is_none());
    }

    #[test]
    fn origin_inside_sphere_reports_zero() {
        assert_eq!(
            ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(0.01, 0.0, 0.0), 0.028),
            Some(0.0)
        );
    }
}
