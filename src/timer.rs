use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Test lengths offered to the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum TestDuration {
    #[default]
    #[value(name = "30")]
    #[strum(serialize = "30s")]
    Thirty,
    #[value(name = "60")]
    #[strum(serialize = "60s")]
    Sixty,
    #[value(name = "120")]
    #[strum(serialize = "120s")]
    OneTwenty,
}

impl TestDuration {
    pub fn secs(self) -> u32 {
        match self {
            Self::Thirty => 30,
            Self::Sixty => 60,
            Self::OneTwenty => 120,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Thirty => Self::Sixty,
            Self::Sixty => Self::OneTwenty,
            Self::OneTwenty => Self::Thirty,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Thirty => Self::OneTwenty,
            Self::Sixty => Self::Thirty,
            Self::OneTwenty => Self::Sixty,
        }
    }
}

/// Identifies the countdown run a scheduled tick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a stopped or superseded run
    Stale,
    /// The countdown was never started
    Idle,
    Running(u32),
    /// Remaining time hit zero; returned once per run
    Expired,
}

/// One-tick-per-second countdown driven by an external scheduler
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: TestDuration,
    remaining: u32,
    running: bool,
    epoch: u64,
}

impl Countdown {
    pub fn new(duration: TestDuration) -> Self {
        Self {
            duration,
            remaining: duration.secs(),
            running: false,
            epoch: 0,
        }
    }

    pub fn duration(&self) -> TestDuration {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.duration.secs() - self.remaining
    }

    pub fn token(&self) -> Option<TimerToken> {
        self.running.then_some(TimerToken { epoch: self.epoch })
    }

    /// Begin counting down. Starting an already running countdown hands back
    /// the current token.
    pub fn start(&mut self) -> TimerToken {
        if !self.running {
            self.epoch += 1;
            self.running = true;
        }
        TimerToken { epoch: self.epoch }
    }

    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if token.epoch != self.epoch || (!self.running && self.epoch > 0) {
            return TickOutcome::Stale;
        }
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.epoch += 1;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    /// Halt ticking; outstanding tokens become stale
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.epoch += 1;
        }
    }

    /// Rewind to a full countdown of `duration`, invalidating outstanding tokens
    pub fn reset(&mut self, duration: TestDuration) {
        self.running = false;
        self.epoch += 1;
        self.duration = duration;
        self.remaining = duration.secs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_duration_secs() {
        assert_eq!(TestDuration::Thirty.secs(), 30);
        assert_eq!(TestDuration::Sixty.secs(), 60);
        assert_eq!(TestDuration::OneTwenty.secs(), 120);
        assert_eq!(TestDuration::default(), TestDuration::Thirty);
    }

    #[test]
    fn test_duration_cycle() {
        for d in [TestDuration::Thirty, TestDuration::Sixty, TestDuration::OneTwenty] {
            assert_eq!(d.next().prev(), d);
        }
        assert_eq!(TestDuration::OneTwenty.next(), TestDuration::Thirty);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(TestDuration::Sixty.to_string(), "60s");
    }

    #[test]
    fn test_countdown_runs_to_expiry_once() {
        let mut timer = Countdown::new(TestDuration::Thirty);
        let token = timer.start();
        assert!(timer.token().is_some());

        for expected in (1..30).rev() {
            assert_eq!(timer.tick(token), TickOutcome::Running(expected));
        }
        assert_eq!(timer.tick(token), TickOutcome::Expired);
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.elapsed(), 30);
        assert!(timer.token().is_none());

        assert_eq!(timer.tick(token), TickOutcome::Stale);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut timer = Countdown::new(TestDuration::Sixty);
        let first = timer.start();
        let second = timer.start();
        assert_eq!(first, second);
        assert_eq!(timer.token(), Some(first));
    }

    #[test]
    fn test_reset_invalidates_old_token() {
        let mut timer = Countdown::new(TestDuration::Thirty);
        let old = timer.start();
        timer.tick(old);

        timer.reset(TestDuration::Sixty);
        assert_eq!(timer.remaining(), 60);
        assert_eq!(timer.token(), None);
        assert_matches!(timer.tick(old), TickOutcome::Stale);

        let new = timer.start();
        assert_ne!(old, new);
        assert_matches!(timer.tick(old), TickOutcome::Stale);
        assert_eq!(timer.remaining(), 60);
        assert_eq!(timer.tick(new), TickOutcome::Running(59));
    }

    #[test]
    fn test_stop_halts_ticking() {
        let mut timer = Countdown::new(TestDuration::Thirty);
        let token = timer.start();
        timer.stop();
        assert_eq!(timer.tick(token), TickOutcome::Stale);
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn test_tick_before_start_is_idle() {
        let mut timer = Countdown::new(TestDuration::Thirty);
        let token = TimerToken { epoch: 0 };
        assert_eq!(timer.tick(token), TickOutcome::Idle);
        assert_eq!(timer.remaining(), 30);
    }
}
