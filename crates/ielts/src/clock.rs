//! Background task ticking a [`Countdown`] once per period.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ielts_core::timer::{Countdown, Tick};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A running test timer. The task is aborted when the handle is dropped.
#[derive(Debug)]
pub struct TimerHandle {
    countdown: Arc<Mutex<Countdown>>,
    expired: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

fn lock(countdown: &Mutex<Countdown>) -> MutexGuard<'_, Countdown> {
    countdown.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TimerHandle {
    /// Start a countdown of `seconds`, ticking every second.
    pub fn start(seconds: u32) -> Self {
        Self::with_period(seconds, TICK_PERIOD)
    }

    pub fn with_period(seconds: u32, period: Duration) -> Self {
        let countdown = Arc::new(Mutex::new(Countdown::new(seconds)));
        lock(&countdown).start();

        let (tx, expired) = watch::channel(false);
        let shared = Arc::clone(&countdown);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let tick = lock(&shared).tick();
                if tick == Tick::Expired {
                    log::info!("test timer expired");
                    let _ = tx.send(true);
                    break;
                }
            }
        });

        Self {
            countdown,
            expired,
            task,
        }
    }

    pub fn time_left(&self) -> u32 {
        lock(&self.countdown).time_left()
    }

    pub fn formatted(&self) -> String {
        lock(&self.countdown).formatted()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.countdown).is_running()
    }

    pub fn pause(&self) {
        lock(&self.countdown).pause();
    }

    pub fn resume(&self) {
        lock(&self.countdown).start();
    }

    pub fn is_expired(&self) -> bool {
        *self.expired.borrow()
    }

    /// Receiver that flips to `true` once time is up.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.expired.clone()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Resolves when `expired` turns `true`. Never resolves if the timer is
/// dropped first.
pub async fn wait_expired(expired: &mut watch::Receiver<bool>) {
    if expired.wait_for(|done| *done).await.is_err() {
        std::future::pending::<()>().await;
    }
}
