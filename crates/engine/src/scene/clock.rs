use std::time::Instant;

/// Elapsed/delta pair handed to every behavior update, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// Per-frame time source. `tick` is called exactly once per frame by
/// the loop; reads between ticks are pure. The first tick reports a
/// delta of zero so nothing animates off an undefined interval.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Option<Instant>,
    elapsed: f32,
    delta: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_tick: None,
            elapsed: 0.0,
            delta: 0.0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.advance_to(Instant::now())
    }

    fn advance_to(&mut self, now: Instant) -> FrameTime {
        self.delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.last_tick = Some(now);
        self.time()
    }

    pub fn time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed,
            delta: self.delta,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        let time = clock.advance_to(start + Duration::from_millis(5));
        assert_eq!(time.delta, 0.0);
        assert!((time.elapsed - 0.005).abs() < 0.0001);
    }

    #[test]
    fn delta_measures_interval_since_previous_tick() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        clock.advance_to(start + Duration::from_millis(10));
        let time = clock.advance_to(start + Duration::from_millis(26));
        assert!((time.delta - 0.016).abs() < 0.0001);
        assert!((time.elapsed - 0.026).abs() < 0.0001);
    }

    #[test]
    fn reads_between_ticks_are_stable() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        clock.advance_to(start + Duration::from_millis(10));
        clock.advance_to(start + Duration::from_millis(30));

        let first = (clock.elapsed(), clock.delta());
        let second = (clock.elapsed(), clock.delta());
        assert_eq!(first, second);
        assert_eq!(clock.time().elapsed, first.0);
    }
}
