//! Contact classification and tick-deferred spin impulses.
//!
//! The rigid-body solver resolves the elastic bounce of a contact in the same
//! step that reports it. Anything written to the cue ball's velocity before
//! that would be overwritten, so spin effects are queued when the contact is
//! reported and fired at the start of the next tick, on top of the bounce.

use glam::Vec3;

use crate::api::types::{BallNumber, CushionSegment, EntityId, CUE_BALL};
use crate::core::physics::{CollisionPair, PhysicsWorld};
use crate::shot::params::ShotParameters;
use crate::shot::solver::horizontal_unit;
use crate::shot::spin::{ShotId, SpinSlot};
use crate::table::balls::BallRegistry;
use crate::table::report::ShotReport;

/// What a contact-begin event was between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Cue ball against an object ball.
    CueObject { object: BallNumber },
    /// Two object balls.
    ObjectObject { a: BallNumber, b: BallNumber },
    /// Any ball against a rail.
    Cushion { ball: BallNumber, segment: CushionSegment },
    /// Felt, parked bodies, anything not modeled here.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingEffect {
    /// Follow, draw or stop along `normal` (cue → object at contact time).
    Spin { normal: Vec3 },
    /// English deflection off a rail.
    Cushion { segment: CushionSegment },
}

/// A spin impulse waiting for its tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingImpulse {
    pub due_tick: u64,
    pub shot: ShotId,
    pub effect: PendingEffect,
}

/// A spin effect that actually changed the cue ball's motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinEffect {
    Follow { added: Vec3 },
    Draw { removed: Vec3 },
    Stop { retained: f32 },
    CushionEnglish { segment: CushionSegment, nudge: Vec3 },
}

/// Borrowed view of the table a contact is classified against.
pub struct ContactScene<'a> {
    pub params: &'a ShotParameters,
    pub world: &'a PhysicsWorld,
    pub balls: &'a BallRegistry,
    pub cushions: &'a [(EntityId, CushionSegment)],
    pub spin: &'a SpinSlot,
}

impl ContactScene<'_> {
    fn cushion(&self, entity: EntityId) -> Option<CushionSegment> {
        self.cushions
            .iter()
            .find(|(id, _)| *id == entity)
            .map(|(_, segment)| *segment)
    }

    pub fn classify(&self, pair: &CollisionPair) -> ContactKind {
        let ball_a = self.balls.number_of(pair.entity_a);
        let ball_b = self.balls.number_of(pair.entity_b);

        match (ball_a, ball_b) {
            (Some(a), Some(b)) => match (a, b) {
                (CUE_BALL, object) | (object, CUE_BALL) => ContactKind::CueObject { object },
                (a, b) => ContactKind::ObjectObject { a, b },
            },
            (Some(ball), None) => self
                .cushion(pair.entity_b)
                .map_or(ContactKind::Other, |segment| ContactKind::Cushion { ball, segment }),
            (None, Some(ball)) => self
                .cushion(pair.entity_a)
                .map_or(ContactKind::Other, |segment| ContactKind::Cushion { ball, segment }),
            (None, None) => ContactKind::Other,
        }
    }
}

/// Queue of spin impulses scheduled from contact events.
#[derive(Debug, Clone, Default)]
pub struct CollisionResponder {
    pending: Vec<PendingImpulse>,
}

impl CollisionResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PendingImpulse] {
        &self.pending
    }

    /// Drop everything queued. A new shot does this; stale entries would be
    /// no-ops anyway since they carry the old shot's id.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Classify a contact-begin event, update the shot report and schedule
    /// any spin impulse for `tick + 1`.
    pub fn on_contact(
        &mut self,
        scene: &ContactScene<'_>,
        report: &mut ShotReport,
        pair: &CollisionPair,
        tick: u64,
    ) -> ContactKind {
        let kind = scene.classify(pair);
        if !pair.started {
            return kind;
        }
        let Some(cue) = scene.balls.cue().filter(|b| b.is_active()) else {
            return kind;
        };

        match kind {
            ContactKind::CueObject { object } => {
                report.record_object_contact(object);

                let Some(shot) = scene.spin.current_shot() else {
                    return kind;
                };
                let Some(object_ball) = scene.balls.get(object) else {
                    return kind;
                };
                let cue_pos = scene.world.body_position(&cue.body);
                let object_pos = scene.world.body_position(&object_ball.body);
                let Some(normal) = horizontal_unit(object_pos - cue_pos) else {
                    return kind;
                };
                self.pending.push(PendingImpulse {
                    due_tick: tick + 1,
                    shot,
                    effect: PendingEffect::Spin { normal },
                });
            }
            ContactKind::Cushion { ball, segment } if ball == cue.number => {
                report.record_cushion(segment);

                let Some(shot) = scene.spin.current_shot() else {
                    return kind;
                };
                let english = scene.spin.current().map_or(0.0, |s| s.english);
                let speed = scene.world.velocity(&cue.body).length();
                if english.abs() > scene.params.english_threshold
                    && speed > scene.params.cushion_speed_threshold
                {
                    self.pending.push(PendingImpulse {
                        due_tick: tick + 1,
                        shot,
                        effect: PendingEffect::Cushion { segment },
                    });
                }
            }
            _ => {}
        }
        kind
    }

    /// Apply every impulse due at or before `tick`, in scheduling order.
    pub fn fire_due(
        &mut self,
        params: &ShotParameters,
        world: &mut PhysicsWorld,
        balls: &BallRegistry,
        spin: &mut SpinSlot,
        tick: u64,
    ) -> Vec<SpinEffect> {
        let (due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_tick <= tick);
        self.pending = later;

        due.into_iter()
            .filter_map(|impulse| fire(params, world, balls, spin, impulse))
            .collect()
    }
}

fn fire(
    params: &ShotParameters,
    world: &mut PhysicsWorld,
    balls: &BallRegistry,
    spin_slot: &mut SpinSlot,
    impulse: PendingImpulse,
) -> Option<SpinEffect> {
    let cue = balls.cue().filter(|b| b.is_active())?;
    let velocity = world.velocity(&cue.body);

    match impulse.effect {
        PendingEffect::Spin { normal } => {
            // Consumed whatever the outcome: one ball-ball effect per shot.
            let spin = spin_slot.take_for(impulse.shot)?;
            let effective_speed = velocity.length().max(params.spin_min_speed);

            if spin.vertical < -params.spin_effect_threshold {
                if spin.vertical.abs() < params.stop_shot_threshold {
                    world.set_velocity(&cue.body, velocity * params.stop_shot_retention);
                    log::debug!("Stop shot: cue ball velocity scaled by {}", params.stop_shot_retention);
                    Some(SpinEffect::Stop {
                        retained: params.stop_shot_retention,
                    })
                } else {
                    let strength =
                        params.draw_base + params.draw_multiplier * spin.vertical.abs() * spin.power;
                    let removed = normal * effective_speed * strength;
                    world.set_velocity(&cue.body, velocity - removed);
                    let angvel = world.angular_velocity(&cue.body);
                    world.set_angular_velocity(&cue.body, angvel * params.draw_spin_residual);
                    log::debug!("Draw: removed {:?} from cue ball velocity", removed);
                    Some(SpinEffect::Draw { removed })
                }
            } else if spin.vertical > params.spin_effect_threshold {
                let strength =
                    params.follow_base + params.follow_multiplier * spin.vertical * spin.power;
                let added = normal * effective_speed * strength;
                world.set_velocity(&cue.body, velocity + added);
                log::debug!("Follow: added {:?} to cue ball velocity", added);
                Some(SpinEffect::Follow { added })
            } else {
                None
            }
        }
        PendingEffect::Cushion { segment } => {
            let spin = spin_slot.peek_for(impulse.shot)?;
            let speed = Vec3::new(velocity.x, 0.0, velocity.z).length();
            let nudge =
                segment.english_axis() * (spin.english * speed * params.cushion_english_effect);
            world.set_velocity(&cue.body, velocity + nudge);
            log::debug!("English off {} cushion: nudge {:?}", segment, nudge);
            Some(SpinEffect::CushionEnglish { segment, nudge })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};
    use crate::shot::spin::SpinState;

    const CUSHION: EntityId = EntityId(100);

    struct Rig {
        params: ShotParameters,
        world: PhysicsWorld,
        balls: BallRegistry,
        cushions: Vec<(EntityId, CushionSegment)>,
        spin: SpinSlot,
        report: ShotReport,
        responder: CollisionResponder,
    }

    impl Rig {
        /// Cue ball at the origin, ball 1 one diameter along +X, ball 2 far away.
        fn new() -> Self {
            let params = ShotParameters::default();
            let mut world = PhysicsWorld::new(Vec3::ZERO);
            let mut balls = BallRegistry::new();
            let r = params.ball_radius;
            for (i, pos) in [Vec3::ZERO, Vec3::new(2.0 * r, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.3)]
                .into_iter()
                .enumerate()
            {
                let entity = EntityId(i as u32 + 1);
                let body = world.create_body(
                    entity,
                    &BodyDesc::dynamic(ColliderDesc::Ball { radius: r })
                        .with_position(pos)
                        .with_gravity_scale(0.0),
                    ColliderMaterial::default(),
                );
                balls.push(entity, body, pos);
            }
            Self {
                params,
                world,
                balls,
                cushions: vec![(CUSHION, CushionSegment::Left)],
                spin: SpinSlot::new(),
                report: ShotReport::default(),
                responder: CollisionResponder::new(),
            }
        }

        fn contact(&mut self, a: EntityId, b: EntityId, tick: u64) -> ContactKind {
            let scene = ContactScene {
                params: &self.params,
                world: &self.world,
                balls: &self.balls,
                cushions: &self.cushions,
                spin: &self.spin,
            };
            let pair = CollisionPair { entity_a: a, entity_b: b, started: true };
            self.responder.on_contact(&scene, &mut self.report, &pair, tick)
        }

        fn fire(&mut self, tick: u64) -> Vec<SpinEffect> {
            self.responder
                .fire_due(&self.params, &mut self.world, &self.balls, &mut self.spin, tick)
        }

        fn cue_velocity(&self) -> Vec3 {
            let cue = self.balls.cue().unwrap();
            self.world.velocity(&cue.body)
        }

        fn set_cue_velocity(&mut self, v: Vec3) {
            let body = self.balls.cue().unwrap().body;
            self.world.set_velocity(&body, v);
        }
    }

    fn spin(vertical: f32, english: f32, power: f32) -> SpinState {
        SpinState { vertical, english, power }
    }

    #[test]
    fn classifies_both_orders() {
        let mut rig = Rig::new();
        assert_eq!(rig.contact(EntityId(2), EntityId(1), 0), ContactKind::CueObject { object: 1 });
        assert_eq!(rig.contact(EntityId(1), EntityId(2), 0), ContactKind::CueObject { object: 1 });
        assert_eq!(
            rig.contact(EntityId(3), EntityId(2), 0),
            ContactKind::ObjectObject { a: 2, b: 1 }
        );
        assert_eq!(
            rig.contact(CUSHION, EntityId(1), 0),
            ContactKind::Cushion { ball: 0, segment: CushionSegment::Left }
        );
        assert_eq!(rig.contact(EntityId(1), EntityId(999), 0), ContactKind::Other);
    }

    #[test]
    fn object_contact_is_recorded_without_spin() {
        let mut rig = Rig::new();
        rig.contact(EntityId(1), EntityId(3), 5);
        rig.contact(EntityId(1), EntityId(2), 6);
        assert!(rig.report.cue_ball_contacted);
        assert_eq!(rig.report.first_contact, Some(2));
        assert!(rig.responder.pending().is_empty());
    }

    #[test]
    fn impulse_waits_one_tick() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.8, 0.0, 1.0));
        rig.contact(EntityId(1), EntityId(2), 10);
        rig.set_cue_velocity(Vec3::new(0.5, 0.0, 0.0));

        assert!(rig.fire(10).is_empty());
        assert_eq!(rig.responder.pending().len(), 1);
        assert_eq!(rig.fire(11).len(), 1);
        assert!(rig.responder.pending().is_empty());
    }

    #[test]
    fn follow_pushes_through_along_normal() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.8, 0.0, 1.0));
        rig.contact(EntityId(1), EntityId(2), 0);
        // Post-bounce: the cue ball has nearly stopped
        rig.set_cue_velocity(Vec3::new(0.1, 0.0, 0.0));

        let effects = rig.fire(1);
        // effective speed floors at 0.5; strength = 0.2 + 0.8 * 0.8 * 1.0 = 0.84
        assert!(matches!(effects[0], SpinEffect::Follow { .. }));
        assert!((rig.cue_velocity().x - (0.1 + 0.5 * 0.84)).abs() < 1e-4);
        assert!(!rig.spin.is_live());
    }

    #[test]
    fn strong_backspin_draws_back() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(-0.8, 0.0, 0.8));
        rig.contact(EntityId(1), EntityId(2), 0);
        rig.set_cue_velocity(Vec3::new(0.2, 0.0, 0.0));
        let body = rig.balls.cue().unwrap().body;
        rig.world.set_angular_velocity(&body, Vec3::new(0.0, 0.0, -10.0));

        let effects = rig.fire(1);
        assert!(matches!(effects[0], SpinEffect::Draw { .. }));
        // 0.2 - 0.5 * (0.3 + 0.9 * 0.8 * 0.8)
        assert!((rig.cue_velocity().x - (0.2 - 0.5 * 0.876)).abs() < 1e-4);
        assert!(rig.cue_velocity().x < 0.0);
        let angvel = rig.world.angular_velocity(&body);
        assert!((angvel.z + 3.0).abs() < 1e-4);
    }

    #[test]
    fn weak_backspin_is_a_stop_shot() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(-0.2, 0.0, 1.0));
        rig.contact(EntityId(1), EntityId(2), 0);
        rig.set_cue_velocity(Vec3::new(1.0, 0.0, 0.0));

        let effects = rig.fire(1);
        assert_eq!(effects, vec![SpinEffect::Stop { retained: 0.15 }]);
        assert!((rig.cue_velocity().x - 0.15).abs() < 1e-5);
    }

    #[test]
    fn new_shot_turns_pending_impulse_into_noop() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.9, 0.0, 1.0));
        rig.contact(EntityId(1), EntityId(2), 0);
        rig.spin.begin_shot(spin(0.9, 0.0, 1.0));
        rig.set_cue_velocity(Vec3::new(1.0, 0.0, 0.0));

        assert!(rig.fire(1).is_empty());
        assert_eq!(rig.cue_velocity(), Vec3::new(1.0, 0.0, 0.0));
        assert!(rig.spin.is_live(), "the newer shot's spin must survive");
    }

    #[test]
    fn only_one_ball_ball_effect_per_shot() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.9, 0.0, 1.0));
        rig.contact(EntityId(1), EntityId(2), 0);
        rig.contact(EntityId(1), EntityId(3), 0);
        rig.set_cue_velocity(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rig.fire(1).len(), 1);
    }

    #[test]
    fn english_deflects_off_cushion_without_consuming_spin() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.0, 0.6, 1.0));
        rig.set_cue_velocity(Vec3::new(-2.0, 0.0, 0.0));
        rig.contact(CUSHION, EntityId(1), 0);
        assert_eq!(rig.report.last_cushion, Some(CushionSegment::Left));
        assert_eq!(rig.report.cushion_hits, 1);

        // Post-bounce the ball leaves the left rail toward +X
        rig.set_cue_velocity(Vec3::new(2.0, 0.0, 0.0));
        let effects = rig.fire(1);
        assert_eq!(effects.len(), 1);
        let v = rig.cue_velocity();
        assert!((v.z - 0.6 * 2.0 * 0.25).abs() < 1e-5, "v={:?}", v);
        assert!(rig.spin.is_live());
    }

    #[test]
    fn slow_or_plain_cushion_hits_schedule_nothing() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.0, 0.6, 1.0));
        rig.set_cue_velocity(Vec3::new(-0.1, 0.0, 0.0));
        rig.contact(CUSHION, EntityId(1), 0);
        assert!(rig.responder.pending().is_empty());

        rig.spin.begin_shot(spin(0.5, 0.05, 1.0));
        rig.set_cue_velocity(Vec3::new(-2.0, 0.0, 0.0));
        rig.contact(CUSHION, EntityId(1), 0);
        assert!(rig.responder.pending().is_empty());
    }

    #[test]
    fn pocketed_cue_ball_ignores_contacts() {
        let mut rig = Rig::new();
        rig.spin.begin_shot(spin(0.9, 0.0, 1.0));
        rig.balls.cue_mut().unwrap().pocketed = true;
        rig.contact(EntityId(1), EntityId(2), 0);
        assert!(!rig.report.cue_ball_contacted);
        assert!(rig.responder.pending().is_empty());
    }
}
