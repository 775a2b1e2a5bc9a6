//! Cue-ball spin and its per-shot ownership.

use serde::{Deserialize, Serialize};

/// Spin components are dropped once both fall below this magnitude.
pub const SPIN_EPSILON: f32 = 0.01;

/// Spin imparted by striking the cue ball off-center.
///
/// `vertical` is top (+) / back (−) spin, `english` is side spin; both lie in
/// `[-1, 1]`. `power` is the stroke power in `[0, 1]` the spin was made with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpinState {
    pub vertical: f32,
    pub english: f32,
    pub power: f32,
}

impl SpinState {
    pub fn is_negligible(&self) -> bool {
        self.vertical.abs() < SPIN_EPSILON && self.english.abs() < SPIN_EPSILON
    }
}

/// Raw spin requested by the aiming layer for a shot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpinInput {
    pub vertical: f32,
    pub english: f32,
}

/// Identifies one cue strike. Pending spin effects carry the id of the shot
/// that scheduled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct LiveSpin {
    shot: ShotId,
    spin: SpinState,
}

/// The cue ball's single spin slot.
///
/// Holds at most one spin, tagged with its shot. Readers that captured a
/// [`ShotId`] earlier can only see or consume the spin while that shot still
/// owns the slot, so an effect scheduled by an old shot can never act on a
/// newer one.
#[derive(Debug, Clone, Default)]
pub struct SpinSlot {
    live: Option<LiveSpin>,
    next_shot: u32,
}

impl SpinSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new shot, discarding whatever spin the previous one left.
    pub fn begin_shot(&mut self, spin: SpinState) -> ShotId {
        self.next_shot = self.next_shot.wrapping_add(1);
        let shot = ShotId(self.next_shot);
        self.live = if spin.is_negligible() {
            None
        } else {
            Some(LiveSpin { shot, spin })
        };
        shot
    }

    /// Put back a spin received from a replicated snapshot. It belongs to a
    /// fresh shot id, so nothing pending locally can consume it.
    pub fn restore(&mut self, spin: Option<SpinState>) -> ShotId {
        self.begin_shot(spin.unwrap_or_default())
    }

    pub fn current(&self) -> Option<SpinState> {
        self.live.map(|l| l.spin)
    }

    pub fn current_shot(&self) -> Option<ShotId> {
        self.live.map(|l| l.shot)
    }

    /// Spin still owned by `shot`, if any.
    pub fn peek_for(&self, shot: ShotId) -> Option<SpinState> {
        self.live.filter(|l| l.shot == shot).map(|l| l.spin)
    }

    /// Take and clear the spin, but only if `shot` still owns it.
    pub fn take_for(&mut self, shot: ShotId) -> Option<SpinState> {
        match self.live {
            Some(l) if l.shot == shot => {
                self.live = None;
                Some(l.spin)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.live = None;
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Scale both components by `rate`; the slot empties once both are
    /// negligible.
    pub fn decay(&mut self, rate: f32) {
        if let Some(live) = &mut self.live {
            live.spin.vertical *= rate;
            live.spin.english *= rate;
            if live.spin.is_negligible() {
                self.live = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(vertical: f32, english: f32) -> SpinState {
        SpinState { vertical, english, power: 1.0 }
    }

    #[test]
    fn decays_geometrically() {
        let mut slot = SpinSlot::new();
        slot.begin_shot(spin(0.5, 0.0));
        for _ in 0..40 {
            slot.decay(0.98);
        }
        let v = slot.current().expect("still live").vertical;
        let expected = 0.5 * 0.98f32.powi(40);
        assert!((v - expected).abs() < 1e-4, "v={} expected={}", v, expected);
        assert!((v - 0.222).abs() < 1e-3);
    }

    #[test]
    fn clears_once_both_axes_negligible() {
        let mut slot = SpinSlot::new();
        slot.begin_shot(spin(0.5, -0.3));
        let mut ticks = 0;
        while slot.is_live() {
            slot.decay(0.98);
            ticks += 1;
            assert!(ticks < 1000, "spin never cleared");
        }
        // 0.5 * 0.98^n < 0.01 first holds at n = 194
        assert_eq!(ticks, 194);
    }

    #[test]
    fn new_shot_replaces_old_spin() {
        let mut slot = SpinSlot::new();
        let first = slot.begin_shot(spin(0.8, 0.0));
        let second = slot.begin_shot(spin(-0.4, 0.2));
        assert_ne!(first, second);
        assert_eq!(slot.peek_for(first), None);
        assert_eq!(slot.take_for(first), None);
        assert_eq!(slot.current().unwrap().vertical, -0.4);
    }

    #[test]
    fn take_consumes_once() {
        let mut slot = SpinSlot::new();
        let shot = slot.begin_shot(spin(0.6, 0.0));
        assert!(slot.take_for(shot).is_some());
        assert!(slot.take_for(shot).is_none());
        assert!(!slot.is_live());
    }

    #[test]
    fn negligible_spin_is_never_live() {
        let mut slot = SpinSlot::new();
        let shot = slot.begin_shot(spin(0.0, 0.005));
        assert!(slot.peek_for(shot).is_none());
    }

    #[test]
    fn restore_uses_fresh_shot() {
        let mut slot = SpinSlot::new();
        let old = slot.begin_shot(spin(0.7, 0.0));
        let restored = slot.restore(Some(spin(0.7, 0.0)));
        assert_ne!(old, restored);
        assert!(slot.take_for(old).is_none());
        assert!(slot.take_for(restored).is_some());
    }
}
