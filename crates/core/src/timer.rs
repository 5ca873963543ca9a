//! Countdown state for the test timer. The ticking itself is driven by the
//! caller once per second.

pub const DEFAULT_DURATION_SECS: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// One second elapsed.
    Running,
    /// The countdown had already reached zero; it is now paused.
    Expired,
    /// The countdown is paused.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    initial: u32,
    time_left: u32,
    running: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            initial: seconds,
            time_left: seconds,
            running: false,
        }
    }

    /// Starts the countdown. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Pause and restore the initial duration.
    pub fn reset(&mut self) {
        self.pause();
        self.time_left = self.initial;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        if self.time_left > 0 {
            self.time_left -= 1;
            Tick::Running
        } else {
            self.pause();
            Tick::Expired
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `MM:SS`, minutes are not capped at 59.
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_hour() {
        let countdown = Countdown::default();
        assert_eq!(countdown.time_left(), 3600);
        assert_eq!(countdown.formatted(), "60:00");
        assert!(!countdown.is_running());
    }

    #[test]
    fn test_formatting_is_zero_padded() {
        assert_eq!(Countdown::new(65).formatted(), "01:05");
        assert_eq!(Countdown::new(0).formatted(), "00:00");
        assert_eq!(Countdown::new(6000).formatted(), "100:00");
    }

    #[test]
    fn test_ticks_only_while_running() {
        let mut countdown = Countdown::new(10);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.time_left(), 10);

        assert!(countdown.start());
        assert!(!countdown.start());
        assert_eq!(countdown.tick(), Tick::Running);
        assert_eq!(countdown.time_left(), 9);
    }

    #[test]
    fn test_expiry_fires_once_after_reaching_zero() {
        let mut countdown = Countdown::new(2);
        countdown.start();

        assert_eq!(countdown.tick(), Tick::Running);
        assert_eq!(countdown.tick(), Tick::Running);
        assert_eq!(countdown.time_left(), 0);
        assert!(countdown.is_running());

        assert_eq!(countdown.tick(), Tick::Expired);
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn test_reset_restores_initial_and_pauses() {
        let mut countdown = Countdown::new(5);
        countdown.start();
        countdown.tick();
        countdown.reset();
        assert_eq!(countdown.time_left(), 5);
        assert!(!countdown.is_running());
    }
}
