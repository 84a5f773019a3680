/// Challenge-mode clock: counts engine ticks and reports whole elapsed
/// seconds. Runs from the instant a challenge session starts; `stop()` is
/// permanent for the session. Practice sessions hold a stopped timer that
/// never leaves zero — there is no pause/resume, only running or reset.

#[derive(Clone, Debug)]
pub struct ModeTimer {
    running: bool,
    ticks: u64,
    ticks_per_second: u64,
}

impl ModeTimer {
    pub fn running(ticks_per_second: u64) -> Self {
        ModeTimer {
            running: true,
            ticks: 0,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    pub fn stopped(ticks_per_second: u64) -> Self {
        ModeTimer {
            running: false,
            ticks: 0,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    pub fn tick(&mut self) {
        if self.running {
            self.ticks += 1;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.ticks / self.ticks_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whole_seconds() {
        let mut t = ModeTimer::running(20);
        for _ in 0..19 {
            t.tick();
        }
        assert_eq!(t.elapsed_seconds(), 0);
        t.tick();
        assert_eq!(t.elapsed_seconds(), 1);
        for _ in 0..40 {
            t.tick();
        }
        assert_eq!(t.elapsed_seconds(), 3);
    }

    #[test]
    fn stop_is_permanent() {
        let mut t = ModeTimer::running(10);
        for _ in 0..25 {
            t.tick();
        }
        t.stop();
        let frozen = t.elapsed_seconds();
        for _ in 0..100 {
            t.tick();
        }
        assert_eq!(t.elapsed_seconds(), frozen);
        assert!(!t.is_running());
    }

    #[test]
    fn stopped_timer_stays_at_zero() {
        let mut t = ModeTimer::stopped(20);
        for _ in 0..100 {
            t.tick();
        }
        assert_eq!(t.elapsed_seconds(), 0);
    }
}
