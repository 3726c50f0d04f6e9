use std::time::{Duration, Instant};

/// Averages the frame rate over a fixed reporting interval.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    interval: Duration,
    window_start: Option<Instant>,
    frames: u32,
}

impl FpsMeter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: None,
            frames: 0,
        }
    }

    /// Counts one frame at `now`. Once `interval` has elapsed, returns the
    /// average frames per second over it and starts a new interval.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }

        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.window_start = Some(now);
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_interval() {
        let mut meter = FpsMeter::new(Duration::from_secs(2));
        let t0 = Instant::now();

        assert_eq!(meter.frame(t0), None);
        for i in 1..120 {
            assert_eq!(meter.frame(t0 + Duration::from_millis(i * 16)), None);
        }
        let fps = meter.frame(t0 + Duration::from_secs(2)).unwrap();
        // 121 frames counted over 2 s.
        assert!((fps - 60.5).abs() < 0.01, "{fps}");

        assert_eq!(meter.frame(t0 + Duration::from_millis(2016)), None);
    }
}
