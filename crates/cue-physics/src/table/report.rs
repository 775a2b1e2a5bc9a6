use serde::{Deserialize, Serialize};

use crate::api::types::{BallNumber, CushionSegment, CUE_BALL};

/// Per-shot bookkeeping handed to the rules layer. Reset by every shot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotReport {
    /// Object balls captured this shot, in capture order.
    pub pocketed: Vec<BallNumber>,
    pub cue_ball_pocketed: bool,
    /// Whether the cue ball has touched any object ball.
    pub cue_ball_contacted: bool,
    /// First object ball the cue ball touched.
    pub first_contact: Option<BallNumber>,
    /// Last rail the cue ball touched.
    pub last_cushion: Option<CushionSegment>,
    pub cushion_hits: u32,
}

impl ShotReport {
    pub fn record_capture(&mut self, number: BallNumber) {
        if number == CUE_BALL {
            self.cue_ball_pocketed = true;
        } else if !self.pocketed.contains(&number) {
            self.pocketed.push(number);
        }
    }

    pub fn record_object_contact(&mut self, number: BallNumber) {
        self.cue_ball_contacted = true;
        self.first_contact.get_or_insert(number);
    }

    pub fn record_cushion(&mut self, segment: CushionSegment) {
        self.last_cushion = Some(segment);
        self.cushion_hits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_capture_is_a_flag_not_a_list_entry() {
        let mut report = ShotReport::default();
        report.record_capture(CUE_BALL);
        report.record_capture(4);
        report.record_capture(4);
        assert!(report.cue_ball_pocketed);
        assert_eq!(report.pocketed, vec![4]);
    }

    #[test]
    fn first_contact_sticks() {
        let mut report = ShotReport::default();
        report.record_object_contact(3);
        report.record_object_contact(7);
        assert_eq!(report.first_contact, Some(3));
        assert!(report.cue_ball_contacted);
    }
}
