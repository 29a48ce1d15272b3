use std::fmt::Display;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

/// Blocking wait between actions; injected so tests can record instead.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        engine_debug!("waiting {} seconds", duration.as_secs_f64());
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }
}

/// Bounded attempts with a fixed delay. At least one attempt is always made,
/// even when `max_retries` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Navigation flavour: failures are logged and retried after `delay`;
    /// once attempts run out the caller simply continues. One more `delay`
    /// is always waited at the end to let the page settle.
    pub fn run_swallowing<S, E, F>(&self, sleeper: &S, action: &str, mut operation: F)
    where
        S: Sleeper + ?Sized,
        E: Display,
        F: FnMut() -> Result<(), E>,
    {
        let max = self.attempts();
        let mut attempt = 1;
        while attempt <= max {
            match operation() {
                Ok(()) => {
                    engine_info!("success while {action} (attempt: {attempt}/{max})");
                    break;
                }
                Err(err) => {
                    engine_error!("error while {action} (attempt: {attempt}/{max})");
                    engine_error!("{err}");
                    sleeper.sleep(self.delay);
                }
            }
            attempt += 1;
        }
        if attempt > max {
            engine_warn!("giving up {action} after {max} attempts");
        }
        sleeper.sleep(self.delay);
    }

    /// Harvest flavour: every attempt, successful or not, is followed by
    /// `delay`, and the caller learns whether any attempt succeeded.
    pub fn run_until_success<S, T, E, F>(
        &self,
        sleeper: &S,
        action: &str,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        S: Sleeper + ?Sized,
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max = self.attempts();
        for attempt in 1..=max {
            let result = operation(attempt);
            let outcome = match result {
                Ok(value) => {
                    engine_info!("success {action} (attempt: {attempt}/{max})");
                    Some(value)
                }
                Err(err) => {
                    engine_error!("failed {action} (attempt: {attempt}/{max})");
                    engine_error!("{err}");
                    None
                }
            };
            sleeper.sleep(self.delay);
            if let Some(value) = outcome {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
        }
        RetryOutcome::Exhausted { attempts: max }
    }
}
