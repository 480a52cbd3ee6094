use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::countdown::Countdown;

/// How long the loop waits for input before checking the countdown again
pub const TICK_RATE_MS: u64 = 100;

/// What the game loop has to react to next
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// Whole seconds that came due on the round's countdown
    Seconds(u32),
    /// The input side hung up; nothing more will arrive
    Closed,
}

/// Input feeding the game loop (keyboard, resize)
pub trait GameEventSource: Send + 'static {
    /// Wait up to `timeout` for the next input event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Terminal input read on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(GameEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(GameEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    tracing::warn!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if forwarded.is_err() {
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

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scripted input for headless rounds
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Where the runner reads the time it feeds to the countdown
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulated clock that moves forward by `step` on every read after the first
#[derive(Debug)]
pub struct SteppingClock {
    start: Instant,
    step: Duration,
    reads: Cell<u32>,
}

impl SteppingClock {
    pub fn new(start: Instant, step: Duration) -> Self {
        Self {
            start,
            step,
            reads: Cell::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        self.start + self.step * reads
    }
}

/// Interleaves input with the seconds a round's countdown hands out
pub struct Runner<E: GameEventSource, C: Clock> {
    event_source: E,
    clock: C,
    poll_interval: Duration,
}

impl<E: GameEventSource, C: Clock> Runner<E, C> {
    pub fn new(event_source: E, clock: C) -> Self {
        Self {
            event_source,
            clock,
            poll_interval: Duration::from_millis(TICK_RATE_MS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// A countdown started at this runner's notion of now
    pub fn start_clock(&self) -> Countdown {
        Countdown::start(self.clock.now())
    }

    /// Block until something happens: due seconds on `countdown` come first,
    /// then input. A stopped countdown never produces `Seconds`.
    pub fn step(&self, countdown: &mut Countdown) -> GameEvent {
        loop {
            let due = countdown.poll(self.clock.now());
            if due > 0 {
                return GameEvent::Seconds(due);
            }

            match self.event_source.recv_timeout(self.poll_interval) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return GameEvent::Closed,
            }
        }
    }
}
