use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::timer::TimerToken;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown second elapsed for the armed session
    Tick(TimerToken),
    /// Poll interval passed with no input and no armed countdown
    Idle,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The production cadence: one countdown second per tick
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    token: TimerToken,
    next_tick: Instant,
}

/// Schedules countdown ticks and interleaves them with input events.
///
/// Ticks fire on a fixed cadence from the moment the runner is armed, no
/// matter how many key events arrive in between.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    armed: Option<Armed>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            armed: None,
        }
    }

    /// Start ticking for `token`. Re-arming with the current token keeps the
    /// existing schedule.
    pub fn arm(&mut self, token: TimerToken) {
        if self.armed.is_some_and(|a| a.token == token) {
            return;
        }
        self.armed = Some(Armed {
            token,
            next_tick: Instant::now() + self.ticker.interval(),
        });
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn armed_token(&self) -> Option<TimerToken> {
        self.armed.map(|a| a.token)
    }

    /// Blocks until the next event or the next scheduled tick
    pub fn step(&mut self) -> AppEvent {
        let timeout = match self.armed {
            Some(a) => a.next_tick.saturating_duration_since(Instant::now()),
            None => self.ticker.interval(),
        };
        if self.armed.is_some() && timeout.is_zero() {
            return self.fire();
        }

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.fire(),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                self.fire()
            }
        }
    }

    fn fire(&mut self) -> AppEvent {
        match self.armed.as_mut() {
            Some(a) => {
                a.next_tick += self.ticker.interval();
                AppEvent::Tick(a.token)
            }
            None => AppEvent::Idle,
        }
    }
}
