//! The table aggregate: world, balls, pockets and the per-tick pipeline.

pub mod balls;
pub mod config;
pub mod report;
pub mod snapshot;

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::api::types::{BallNumber, CushionSegment, EntityId, CUE_BALL};
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsWorld};
use crate::core::time::FixedTimestep;
use crate::error::{Result, TableError};
use crate::shot::damping::{get_damping, should_stop};
use crate::shot::params::ShotParameters;
use crate::shot::slide_roll::apply_slide_to_roll;
use crate::shot::solver::{self, horizontal_unit, ShotKinematics};
use crate::shot::spin::{SpinInput, SpinSlot, SpinState};
use crate::systems::collision::{CollisionResponder, ContactKind, ContactScene, SpinEffect};
use crate::systems::pockets::{Capture, PocketTable};
use crate::systems::tunneling::{self, TunnelingCorrection};

use self::balls::{rack_positions, Ball, BallRegistry};
use self::config::TableConfig;
use self::report::ShotReport;
use self::snapshot::{BallSnapshot, TableSnapshot};

/// Everything that happened during one or more `update` ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEvents {
    /// Ticks run (always 1 from `update`, 0..=max from `advance`).
    pub ticks: u32,
    /// Classified contact-begin events, excluding felt and parked bodies.
    pub contacts: Vec<ContactKind>,
    pub spin_effects: Vec<SpinEffect>,
    pub captures: Vec<(BallNumber, Capture)>,
    pub tunneling: Vec<TunnelingCorrection>,
}

impl FrameEvents {
    fn merge(&mut self, other: FrameEvents) {
        self.ticks += other.ticks;
        self.contacts.extend(other.contacts);
        self.spin_effects.extend(other.spin_effects);
        self.captures.extend(other.captures);
        self.tunneling.extend(other.tunneling);
    }
}

/// A racked table and the shot physics layered over its rigid-body world.
///
/// Single-threaded: every mutation happens inside `update` or one of the
/// collaborator calls (`shoot_cue_ball`, `import_state`, parameter writes),
/// all of which the host serializes with ticks.
pub struct PoolTable {
    config: TableConfig,
    params: ShotParameters,
    world: PhysicsWorld,
    balls: BallRegistry,
    pockets: PocketTable,
    cushions: Vec<(EntityId, CushionSegment)>,
    spin: SpinSlot,
    responder: CollisionResponder,
    report: ShotReport,
    timestep: FixedTimestep,
    tick: u64,
    next_entity: u32,
    /// Reused across ticks.
    collisions: Vec<CollisionPair>,
}

impl PoolTable {
    pub fn new(config: TableConfig) -> Self {
        Self::with_params(config, ShotParameters::default())
    }

    /// Build the felt, rails and a fresh rack. Ball radius, mass and felt
    /// height are read from `params` once, here.
    pub fn with_params(config: TableConfig, params: ShotParameters) -> Self {
        let substeps = config.physics_substeps.max(1);
        let mut world = PhysicsWorld::new(config.gravity);
        world.set_dt(config.fixed_dt / substeps as f32);

        let pockets = PocketTable::standard(
            config.corner_pocket.x,
            config.corner_pocket.y,
            config.corner_pocket_radius,
            config.side_pocket_offset,
            config.side_pocket_radius,
        );
        let timestep = FixedTimestep::new(config.fixed_dt);

        let mut table = Self {
            config,
            params,
            world,
            balls: BallRegistry::new(),
            pockets,
            cushions: Vec::with_capacity(CushionSegment::ALL.len()),
            spin: SpinSlot::new(),
            responder: CollisionResponder::new(),
            report: ShotReport::default(),
            timestep,
            tick: 0,
            next_entity: 1,
            collisions: Vec::new(),
        };
        table.build_felt();
        table.build_cushions();
        table.build_balls();

        log::info!(
            "Table built: {} balls, {} cushions, {} pockets, {} bodies",
            table.balls.len(),
            table.cushions.len(),
            table.pockets.len(),
            table.world.body_count()
        );
        table
    }

    // -- Shots --

    /// Strike the cue ball. `direction` is flattened onto the table plane;
    /// `power` is clamped to `[0, 1]`; a missing spin means a center hit.
    ///
    /// Starts a new shot: the report is reset, queued spin impulses are
    /// dropped and the spin slot is handed to the new shot.
    pub fn shoot_cue_ball(
        &mut self,
        direction: Vec3,
        power: f32,
        spin: Option<SpinInput>,
    ) -> Result<ShotKinematics> {
        let cue = self
            .balls
            .cue()
            .ok_or(TableError::UnknownBall(CUE_BALL))?;
        if cue.pocketed {
            return Err(TableError::CueBallPocketed);
        }
        let body = cue.body;
        horizontal_unit(direction).ok_or(TableError::DegenerateDirection)?;

        let power = unit_or_zero(power).max(0.0);
        let input = spin.unwrap_or_default();
        let spin = SpinState {
            vertical: unit_or_zero(input.vertical),
            english: unit_or_zero(input.english),
            power,
        };
        let shot = solver::calculate_shot_physics(&self.params, direction, power, spin);

        self.report = ShotReport::default();
        self.responder.clear();
        let shot_id = self.spin.begin_shot(shot.spin);

        self.world.set_velocity(&body, shot.velocity);
        self.world.set_angular_velocity(&body, shot.angular_velocity);
        self.world.wake_up(&body);

        log::info!(
            "Shot {:?}: power {:.2}, speed {:.2} m/s, spin v={:.2} e={:.2}",
            shot_id,
            power,
            shot.velocity.length(),
            shot.spin.vertical,
            shot.spin.english
        );
        Ok(shot)
    }

    /// Preview the spin a tip offset would produce at `power`.
    pub fn calculate_spin(&self, vertical_offset: f32, horizontal_offset: f32, power: f32) -> SpinState {
        solver::calculate_spin(&self.params, vertical_offset, horizontal_offset, power)
    }

    // -- Simulation --

    /// Run one fixed tick of `delta` seconds.
    ///
    /// Order: due spin impulses, the tunneling guard, damping / slide-to-roll
    /// / hard stop, spin decay, the world step, contact handling, position
    /// sync and finally pocket captures.
    pub fn update(&mut self, delta: f32) -> FrameEvents {
        let mut events = FrameEvents::default();
        if !delta.is_finite() || delta <= 0.0 {
            log::warn!("Ignoring update with delta {}", delta);
            return events;
        }

        self.tick += 1;
        events.ticks = 1;

        events.spin_effects = self.responder.fire_due(
            &self.params,
            &mut self.world,
            &self.balls,
            &mut self.spin,
            self.tick,
        );
        events.tunneling.extend(self.prevent_tunneling(delta));

        self.apply_rolling_model(delta);
        self.spin.decay(self.params.spin_decay_rate);

        self.step_world(delta, &mut events.contacts);
        self.sync_positions();
        self.capture_balls(&mut events.captures);
        events
    }

    /// Accumulate a variable frame time and run as many fixed ticks as it
    /// covers.
    pub fn advance(&mut self, frame_dt: f32) -> FrameEvents {
        let steps = self.timestep.accumulate(frame_dt);
        let dt = self.timestep.dt();
        let mut events = FrameEvents::default();
        for _ in 0..steps {
            events.merge(self.update(dt));
        }
        events
    }

    /// Move a fast cue ball up to touching distance of an object ball it
    /// would otherwise pass through during the next `delta` seconds.
    pub fn prevent_tunneling(&mut self, delta: f32) -> Option<TunnelingCorrection> {
        tunneling::prevent_tunneling(&self.params, &mut self.world, &mut self.balls, delta)
    }

    /// Whether every ball still in play has come to rest.
    pub fn is_settled(&self) -> bool {
        self.balls.active().all(|ball| {
            should_stop(
                &self.params,
                self.world.velocity(&ball.body).length(),
                self.world.angular_velocity(&ball.body).length(),
            )
        })
    }

    fn apply_rolling_model(&mut self, delta: f32) {
        let params = &self.params;
        for ball in self.balls.active() {
            let body = ball.body;
            let velocity = self.world.velocity(&body);
            let angular = self.world.angular_velocity(&body);
            if velocity == Vec3::ZERO && angular == Vec3::ZERO {
                continue;
            }

            let damping = get_damping(params, velocity.length());
            self.world.set_damping(&body, damping.linear, damping.angular);

            let step = apply_slide_to_roll(params, velocity, angular, delta);
            let mut new_velocity = step.velocity;
            let mut new_angular = step.angular_velocity;
            if ball.is_cue() {
                // English only acts at rails; never let it swerve the ball.
                new_angular.y = 0.0;
            }
            if should_stop(params, new_velocity.length(), new_angular.length()) {
                new_velocity = Vec3::ZERO;
                new_angular = Vec3::ZERO;
            }

            if new_velocity != velocity {
                self.world.set_velocity(&body, new_velocity);
            }
            if new_angular != angular {
                self.world.set_angular_velocity(&body, new_angular);
            }
        }
    }

    fn step_world(&mut self, delta: f32, contacts: &mut Vec<ContactKind>) {
        let substeps = self.config.physics_substeps.max(1);
        self.world.set_dt(delta / substeps as f32);

        self.collisions.clear();
        for _ in 0..substeps {
            self.world.step_into(&mut self.collisions);
        }

        let scene = ContactScene {
            params: &self.params,
            world: &self.world,
            balls: &self.balls,
            cushions: &self.cushions,
            spin: &self.spin,
        };
        for pair in self.collisions.iter().filter(|p| p.started) {
            match self
                .responder
                .on_contact(&scene, &mut self.report, pair, self.tick)
            {
                ContactKind::Other => {}
                kind => contacts.push(kind),
            }
        }
    }

    fn sync_positions(&mut self) {
        for ball in self.balls.iter_mut().filter(|b| b.is_active()) {
            ball.position = self.world.body_position(&ball.body);
        }
    }

    fn capture_balls(&mut self, captures: &mut Vec<(BallNumber, Capture)>) {
        let found: Vec<_> = self
            .balls
            .active()
            .filter_map(|ball| {
                self.pockets
                    .check(&self.params, ball.position)
                    .map(|capture| (ball.number, capture))
            })
            .collect();

        for (number, capture) in found {
            self.pocket_ball(number, capture);
            captures.push((number, capture));
        }
    }

    /// Take a ball out of play: stop it, park it below the felt under its
    /// pocket and disable its body. Only a respot, re-rack or import brings
    /// it back.
    fn pocket_ball(&mut self, number: BallNumber, capture: Capture) {
        let Some(ball) = self.balls.get_mut(number) else {
            return;
        };
        let pocket = match capture {
            Capture::Pocket(idx) => Some(idx),
            Capture::OffTable => self.pockets.nearest(ball.position),
        };
        let center = pocket
            .and_then(|idx| self.pockets.pockets().get(idx))
            .map_or(Vec2::ZERO, |p| p.center);
        let park = Vec3::new(
            center.x,
            self.params.felt_height - self.config.park_depth,
            center.y,
        );

        self.world.set_velocity(&ball.body, Vec3::ZERO);
        self.world.set_angular_velocity(&ball.body, Vec3::ZERO);
        self.world.set_body_position(&ball.body, park);
        self.world.set_body_enabled(&ball.body, false);

        ball.pocketed = true;
        ball.visible = ball.is_cue();
        ball.position = park;
        self.report.record_capture(number);
        if number == CUE_BALL {
            self.spin.clear();
        }

        match capture {
            Capture::Pocket(idx) => log::info!("Ball {} dropped into pocket {}", number, idx),
            Capture::OffTable => log::info!("Ball {} left the table", number),
        }
    }

    // -- Replication --

    pub fn export_state(&self) -> TableSnapshot {
        TableSnapshot {
            balls: self.balls.iter().map(|b| self.snapshot_of(b)).collect(),
            spin: self.spin.current(),
        }
    }

    /// Overwrite ball state and the cue ball's spin from a snapshot.
    ///
    /// Every ball number is checked before anything is written, so an
    /// invalid snapshot leaves the table untouched. Queued spin impulses are
    /// dropped; the restored spin belongs to a fresh shot id.
    pub fn import_state(&mut self, snapshot: &TableSnapshot) -> Result<()> {
        if let Some(unknown) = snapshot
            .balls
            .iter()
            .find(|s| self.balls.get(s.number).is_none())
        {
            return Err(TableError::UnknownBall(unknown.number));
        }

        for state in &snapshot.balls {
            let Some(ball) = self.balls.get_mut(state.number) else {
                continue;
            };
            let position = Vec3::from_array(state.position);
            self.world.set_body_enabled(&ball.body, !state.is_pocketed);
            self.world.set_body_position(&ball.body, position);
            self.world
                .set_velocity(&ball.body, Vec3::from_array(state.velocity));
            self.world
                .set_angular_velocity(&ball.body, Vec3::from_array(state.angular_velocity));

            ball.position = position;
            ball.pocketed = state.is_pocketed;
            ball.visible = state.visible;
        }

        self.responder.clear();
        self.spin.restore(snapshot.spin);
        log::debug!("Imported state for {} balls", snapshot.balls.len());
        Ok(())
    }

    pub fn export_state_json(&self) -> Result<String> {
        self.export_state().to_json()
    }

    pub fn import_state_json(&mut self, json: &str) -> Result<()> {
        let snapshot = TableSnapshot::from_json(json)?;
        self.import_state(&snapshot)
    }

    // -- Parameters --

    pub fn params(&self) -> &ShotParameters {
        &self.params
    }

    /// Set one coefficient by key. Returns `false` for an unknown key.
    pub fn set_param(&mut self, name: &str, value: f32) -> bool {
        let applied = self.params.set(name, value);
        if applied {
            log::debug!("Shot parameter {} = {}", name, value);
        } else {
            log::debug!("Ignoring unknown shot parameter '{}'", name);
        }
        applied
    }

    pub fn export_params(&self) -> Result<String> {
        self.params.export_json()
    }

    /// Apply a JSON object of coefficients; returns how many were applied.
    pub fn import_params(&mut self, json: &str) -> Result<usize> {
        let applied = self.params.import_json(json)?;
        log::info!("Imported {} shot parameters", applied);
        Ok(applied)
    }

    pub fn update_all_params(&mut self, record: &BTreeMap<String, f32>) -> usize {
        self.params.import_all(record)
    }

    // -- Table management --

    /// Put a ball back in play at `spot` (X, Z on the table plane), at rest.
    pub fn respot_ball(&mut self, number: BallNumber, spot: Vec2) -> Result<()> {
        let felt_height = self.params.felt_height;
        let ball = self
            .balls
            .get_mut(number)
            .ok_or(TableError::UnknownBall(number))?;
        place_at_rest(&mut self.world, ball, Vec3::new(spot.x, felt_height, spot.y));
        log::info!("Ball {} respotted at ({:.3}, {:.3})", number, spot.x, spot.y);
        Ok(())
    }

    /// Return every ball to its starting spot and forget the current shot.
    pub fn rack(&mut self) {
        let felt_height = self.params.felt_height;
        let spots = self.home_spots();
        for (ball, spot) in self.balls.iter_mut().zip(spots) {
            place_at_rest(&mut self.world, ball, Vec3::new(spot.x, felt_height, spot.y));
        }
        self.spin.clear();
        self.responder.clear();
        self.report = ShotReport::default();
        self.timestep.reset();
        log::info!("Re-racked {} balls", self.balls.len());
    }

    // -- Views --

    pub fn ball(&self, number: BallNumber) -> Option<BallSnapshot> {
        self.balls.get(number).map(|b| self.snapshot_of(b))
    }

    pub fn balls(&self) -> &BallRegistry {
        &self.balls
    }

    pub fn pockets(&self) -> &PocketTable {
        &self.pockets
    }

    /// The cue ball's live spin, if any.
    pub fn spin(&self) -> Option<SpinState> {
        self.spin.current()
    }

    pub fn shot_report(&self) -> &ShotReport {
        &self.report
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // -- private helpers --

    fn snapshot_of(&self, ball: &Ball) -> BallSnapshot {
        BallSnapshot {
            number: ball.number,
            is_pocketed: ball.pocketed,
            visible: ball.visible,
            position: ball.position.to_array(),
            velocity: self.world.velocity(&ball.body).to_array(),
            angular_velocity: self.world.angular_velocity(&ball.body).to_array(),
        }
    }

    /// Cue spot followed by the rack slots, in ball-number order.
    fn home_spots(&self) -> Vec<Vec2> {
        std::iter::once(self.config.cue_spot)
            .chain(rack_positions(
                self.config.rack_apex,
                self.params.ball_radius,
                self.config.rack_rows,
            ))
            .collect()
    }

    fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    fn build_felt(&mut self) {
        let c = &self.config;
        let half_thickness = 0.025;
        let half_extents = Vec3::new(
            c.half_length + c.cushion_thickness + 0.1,
            half_thickness,
            c.half_width + c.cushion_thickness + 0.1,
        );
        // Slab top sits one radius below ball centers.
        let top = self.params.felt_height - self.params.ball_radius;
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid { half_extents })
            .with_position(Vec3::new(0.0, top - half_thickness, 0.0));
        let material = c.felt_material;

        let entity = self.alloc_entity();
        self.world.create_body(entity, &desc, material);
    }

    fn build_cushions(&mut self) {
        let c = self.config.clone();
        let y = self.params.felt_height;
        let half_height = self.params.ball_radius * 1.5;
        let half_t = c.cushion_thickness / 2.0;

        // End rails span the depth between the corner openings.
        let end_half_span = (c.half_width - c.corner_gap).max(0.0);
        // Each long rail is split by the side pocket.
        let long_inner = c.side_gap / 2.0;
        let long_outer = c.half_length - c.corner_gap;
        let long_half_span = ((long_outer - long_inner) / 2.0).max(0.0);
        let long_center = (long_outer + long_inner) / 2.0;

        let end_extents = Vec3::new(half_t, half_height, end_half_span);
        let long_extents = Vec3::new(long_half_span, half_height, half_t);
        let end_x = c.half_length + half_t;
        let long_z = c.half_width + half_t;

        for segment in CushionSegment::ALL {
            let (position, half_extents) = match segment {
                CushionSegment::Left => (Vec3::new(-end_x, y, 0.0), end_extents),
                CushionSegment::Right => (Vec3::new(end_x, y, 0.0), end_extents),
                CushionSegment::TopLeft => (Vec3::new(-long_center, y, -long_z), long_extents),
                CushionSegment::TopRight => (Vec3::new(long_center, y, -long_z), long_extents),
                CushionSegment::BottomLeft => (Vec3::new(-long_center, y, long_z), long_extents),
                CushionSegment::BottomRight => (Vec3::new(long_center, y, long_z), long_extents),
            };
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid { half_extents }).with_position(position);
            let entity = self.alloc_entity();
            self.world.create_body(entity, &desc, c.cushion_material);
            self.cushions.push((entity, segment));
        }
    }

    fn build_balls(&mut self) {
        let radius = self.params.ball_radius;
        let material = ColliderMaterial {
            density: ball_density(&self.params),
            ..self.config.ball_material
        };

        for spot in self.home_spots() {
            let position = Vec3::new(spot.x, self.params.felt_height, spot.y);
            let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius })
                .with_position(position)
                .with_ccd(self.config.ball_ccd)
                .with_linear_damping(self.params.fast_linear_damping)
                .with_angular_damping(self.params.fast_angular_damping);
            let entity = self.alloc_entity();
            let body = self.world.create_body(entity, &desc, material);
            self.balls.push(entity, body, position);
        }
    }
}

impl Default for PoolTable {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

/// Density that gives a ball of `ballRadius` the configured `ballMass`.
fn ball_density(params: &ShotParameters) -> f32 {
    let volume = 4.0 / 3.0 * PI * params.ball_radius.powi(3);
    if volume > 0.0 {
        params.ball_mass / volume
    } else {
        1.0
    }
}

/// Finite values clamped to `[-1, 1]`; anything else becomes 0.
fn unit_or_zero(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn place_at_rest(world: &mut PhysicsWorld, ball: &mut Ball, position: Vec3) {
    world.set_body_enabled(&ball.body, true);
    world.set_body_position(&ball.body, position);
    world.set_velocity(&ball.body, Vec3::ZERO);
    world.set_angular_velocity(&ball.body, Vec3::ZERO);
    world.wake_up(&ball.body);
    ball.position = position;
    ball.pocketed = false;
    ball.visible = true;
}
