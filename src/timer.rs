use std::time::{Duration, Instant};

/// Per-frame clock. Elapsed time drives the point light orbits, delta time drives the camera.
pub struct FrameClock {
    start: Instant,
    last: Instant,
    elapsed: f32,
    dt_max_cap: Option<f32>,
}

impl FrameClock {
    pub fn new() -> FrameClock {
        let now = Instant::now();

        FrameClock {
            start: now,
            last: now,
            elapsed: 0.0,
            dt_max_cap: None,
        }
    }

    pub fn set_delta_time_max_cap(&mut self, cap: f32) {
        self.dt_max_cap = Some(cap);
    }

    pub fn get_elapsed_time(&self) -> f32 {
        self.elapsed
    }

    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;

        self.advance(delta, now.duration_since(self.start))
    }

    fn advance(&mut self, delta: Duration, since_start: Duration) -> f32 {
        self.elapsed = since_start.as_secs_f32();
        let dt = delta.as_secs_f32();

        match self.dt_max_cap {
            None => dt,
            Some(c) => dt.min(c),
        }
    }
}

impl Default for FrameClock {
    fn default() -> FrameClock {
        FrameClock::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_limits_delta_but_not_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.set_delta_time_max_cap(0.1);

        let dt = clock.advance(Duration::from_millis(500), Duration::from_secs(2));

        assert_eq!(dt, 0.1);
        assert_eq!(clock.get_elapsed_time(), 2.0);
        assert_eq!(clock.advance(Duration::from_millis(20), Duration::from_secs(2)), 0.02);
    }

    #[test]
    fn elapsed_time_is_monotonic() {
        let mut clock = FrameClock::new();
        let first = {
            clock.tick();
            clock.get_elapsed_time()
        };
        clock.tick();

        assert!(clock.get_elapsed_time() >= first);
    }
}
