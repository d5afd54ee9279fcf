use std::time::Duration;

/// Host clock reading for one loop iteration.
///
/// `now` is monotonic host time in seconds; `dt` is the time elapsed since the previous
/// iteration. The host loop has no fixed period, so every rate in the engine is scaled by `dt`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub now: f64,
    pub dt: f32,
}

impl FrameTime {
    pub fn new(now: f64, dt: f32) -> Self {
        Self {
            now,
            dt: dt.max(0.0),
        }
    }

    /// Builds the frame for `now` given the previous frame's timestamp.
    pub fn since(now: f64, last: f64) -> Self {
        Self::new(now, delta_time(now, last).unwrap_or(0.0))
    }
}

/// Seconds elapsed between `last` and `now`, or `None` if the clock went backwards.
pub fn delta_time(now: f64, last: f64) -> Option<f32> {
    (now >= last).then(|| (now - last) as f32)
}

/// Host time `delay` after `now`.
#[inline]
pub fn after(now: f64, delay: Duration) -> f64 {
    now + delay.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_time_rejects_backwards_clock() {
        assert_eq!(delta_time(10.5, 10.0), Some(0.5));
        assert_eq!(delta_time(9.0, 10.0), None);
        assert_eq!(FrameTime::since(9.0, 10.0).dt, 0.0);
    }
}
