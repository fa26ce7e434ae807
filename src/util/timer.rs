/// One-shot delay. Each owner keeps a single handle per kind of deferred
/// work; arming always replaces whatever was pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    pub fn new() -> Self {
        Self { remaining: None }
    }

    /// Schedule to fire after `secs`, cancelling any pending fire.
    pub fn arm(&mut self, secs: f32) {
        self.remaining = Some(secs.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the delay
    /// elapses; the handle is disarmed afterwards.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(left) = self.remaining.as_mut() else {
            return false;
        };
        *left -= dt;
        if *left <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

/// Fixed-period repeating timer.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: f32,
    elapsed: f32,
    running: bool,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            elapsed: 0.0,
            running: false,
        }
    }

    /// (Re)start from zero. A running schedule is dropped first.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `dt` and return how many periods completed. Catches up
    /// on long gaps instead of dropping fires.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_fires_once() {
        let mut c = Countdown::new();
        c.arm(1.0);
        assert!(!c.tick(0.5));
        assert!(c.tick(0.5));
        assert!(!c.tick(10.0));
        assert!(!c.is_armed());
    }

    #[test]
    fn rearm_replaces_pending() {
        let mut c = Countdown::new();
        c.arm(1.0);
        c.tick(0.9);
        c.arm(1.0);
        assert!(!c.tick(0.5));
        assert!(c.tick(0.5));
    }

    #[test]
    fn cancelled_countdown_never_fires() {
        let mut c = Countdown::new();
        c.arm(0.1);
        c.cancel();
        assert!(!c.tick(1.0));
    }

    #[test]
    fn interval_counts_periods() {
        let mut i = Interval::new(15.0);
        assert_eq!(i.tick(100.0), 0); // not started
        i.start();
        assert_eq!(i.tick(14.0), 0);
        assert_eq!(i.tick(1.0), 1);
        assert_eq!(i.tick(31.0), 2);
    }

    #[test]
    fn interval_restart_resets_phase() {
        let mut i = Interval::new(10.0);
        i.start();
        i.tick(9.0);
        i.start();
        assert_eq!(i.tick(9.0), 0);
        i.stop();
        i.stop();
        assert!(!i.is_running());
        assert_eq!(i.tick(50.0), 0);
    }
}
