use std::thread;
use std::time::{Duration, Instant};

/// Wall-clock throttle for the control loop: successive `tick` calls are
/// capped at the given rate. Governs tick length only, nothing runs
/// concurrently with the caller.
pub struct Ticker {
    last: Option<Instant>,
}

impl Ticker {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn tick(&mut self, fps: u32) {
        let target = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < target {
                thread::sleep(target - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_paces_the_loop() {
        let mut ticker = Ticker::new();
        let start = Instant::now();

        ticker.tick(100);
        ticker.tick(100);
        ticker.tick(100);

        // Two full intervals after the free first tick.
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
