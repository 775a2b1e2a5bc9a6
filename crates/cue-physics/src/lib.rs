pub mod api;
pub mod core;
pub mod error;
pub mod shot;
pub mod systems;
pub mod table;

// Re-export key types at crate root for convenience
pub use api::types::{BallNumber, CushionSegment, EntityId, CUE_BALL};
pub use crate::core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsBody, PhysicsWorld,
};
pub use crate::core::time::FixedTimestep;
pub use error::{Result, TableError};
pub use shot::damping::{get_damping, should_stop, Damping, SpeedRegime};
pub use shot::params::ShotParameters;
pub use shot::slide_roll::{apply_slide_to_roll, SlideRollStep};
pub use shot::solver::{calculate_shot_physics, calculate_spin, ShotKinematics};
pub use shot::spin::{ShotId, SpinInput, SpinSlot, SpinState};
pub use systems::collision::{CollisionResponder, ContactKind, PendingImpulse, SpinEffect};
pub use systems::pockets::{Capture, Pocket, PocketTable};
pub use systems::tunneling::TunnelingCorrection;
pub use table::config::TableConfig;
pub use table::report::ShotReport;
pub use table::snapshot::{BallSnapshot, TableSnapshot};
pub use table::{FrameEvents, PoolTable};
