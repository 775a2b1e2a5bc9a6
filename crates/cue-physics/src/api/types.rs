use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for a body registered with the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Stable ball number. `0` is always the cue ball.
pub type BallNumber = u8;

pub const CUE_BALL: BallNumber = 0;

/// Identity of a cushion rail segment.
///
/// The table's length runs along X and its depth along Z. `Left`/`Right`
/// are the short end rails; the long rails are split by the side pockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CushionSegment {
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CushionSegment {
    pub const ALL: [CushionSegment; 6] = [
        CushionSegment::Left,
        CushionSegment::Right,
        CushionSegment::TopLeft,
        CushionSegment::TopRight,
        CushionSegment::BottomLeft,
        CushionSegment::BottomRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CushionSegment::Left => "left",
            CushionSegment::Right => "right",
            CushionSegment::TopLeft => "top-left",
            CushionSegment::TopRight => "top-right",
            CushionSegment::BottomLeft => "bottom-left",
            CushionSegment::BottomRight => "bottom-right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Unit normal pointing from the rail into the play area.
    /// Top rails sit at negative Z.
    pub fn inward_normal(self) -> Vec3 {
        match self {
            CushionSegment::Left => Vec3::X,
            CushionSegment::Right => Vec3::NEG_X,
            CushionSegment::TopLeft | CushionSegment::TopRight => Vec3::Z,
            CushionSegment::BottomLeft | CushionSegment::BottomRight => Vec3::NEG_Z,
        }
    }

    /// Axis along which english deflects a ball leaving this rail: the
    /// inward normal turned a quarter in the table plane. End rails push
    /// along depth (Z), long rails along length (X).
    pub fn english_axis(self) -> Vec3 {
        let n = self.inward_normal();
        Vec3::new(-n.z, 0.0, n.x)
    }
}

impl std::fmt::Display for CushionSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
