/// Fixed timestep accumulator.
/// Turns variable frame times into a whole number of fixed `update` ticks so
/// shot physics stays deterministic regardless of render rate.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Upper bound on ticks per frame.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Override the per-frame tick cap (at least one tick).
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death after a stall (headset removed, tab hidden)
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partial tick, e.g. after a re-rack.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn caps_steps_per_frame() {
        let mut ts = FixedTimestep::new(1.0 / 60.0).with_max_steps(4);
        assert_eq!(ts.accumulate(1.0), 4);
    }

    #[test]
    fn ignores_negative_and_nan_frames() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn reset_drops_partial_tick() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        ts.accumulate(0.012);
        ts.reset();
        assert_eq!(ts.accumulate(0.008), 0);
    }
}
