//! Plain-numeric table state for replication.

use serde::{Deserialize, Serialize};

use crate::api::types::BallNumber;
use crate::shot::spin::SpinState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallSnapshot {
    pub number: BallNumber,
    pub is_pocketed: bool,
    pub visible: bool,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
}

/// Every ball plus the cue ball's live spin (`null` when there is none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub balls: Vec<BallSnapshot>,
    pub spin: Option<SpinState>,
}

impl TableSnapshot {
    pub fn ball(&self, number: BallNumber) -> Option<&BallSnapshot> {
        self.balls.iter().find(|b| b.number == number)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
