use std::time::{Duration, Instant};

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Turns wall-clock time into whole-second ticks for a round.
///
/// The game loop polls it between input events; only full seconds are handed out and
/// the remainder is carried into the next poll. Once stopped it never yields
/// another tick.
#[derive(Debug, Clone)]
pub struct Countdown {
    last_poll: Instant,
    carried: Duration,
    running: bool,
}

impl Countdown {
    pub fn start(now: Instant) -> Self {
        Self {
            last_poll: now,
            carried: Duration::ZERO,
            running: true,
        }
    }

    /// Number of whole seconds that elapsed since the previous poll
    pub fn poll(&mut self, now: Instant) -> u32 {
        if !self.running {
            return 0;
        }

        if now > self.last_poll {
            self.carried += now - self.last_poll;
            self.last_poll = now;
        }

        let mut due = 0;
        while self.carried >= ONE_SECOND {
            self.carried -= ONE_SECOND;
            due += 1;
        }
        due
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.carried = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
