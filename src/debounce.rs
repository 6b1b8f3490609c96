//! Cancellable delayed calls.
//!
//! [`debounce`] wraps a function so that only the last call in a burst runs,
//! once the quiet period has elapsed. The wrapper does not own a timer: the
//! caller passes the current time in and polls [`Debounced::fire_if_due`]
//! from whatever timer it has (`setTimeout` in the browser, a loop natively).

use std::time::Duration;

/// A pending call with the most recent argument
#[derive(Debug)]
pub struct Debounced<T, F> {
    delay_ms: f64,
    deadline_ms: Option<f64>,
    latest: Option<T>,
    f: F,
}

/// Wrap `f` so that it runs `delay` after the last [`Debounced::schedule`].
pub fn debounce<T, R, F>(delay: Duration, f: F) -> Debounced<T, F>
where
    F: FnMut(T) -> R,
{
    Debounced {
        delay_ms: delay.as_secs_f64() * 1000.0,
        deadline_ms: None,
        latest: None,
        f,
    }
}

impl<T, R, F> Debounced<T, F>
where
    F: FnMut(T) -> R,
{
    /// Quiet period in milliseconds.
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay_ms = delay.as_secs_f64() * 1000.0;
    }

    /// Queue a call with `arg`, replacing any queued argument and restarting
    /// the quiet period.
    pub fn schedule(&mut self, now_ms: f64, arg: T) {
        self.latest = Some(arg);
        self.deadline_ms = Some(now_ms + self.delay_ms);
    }

    /// Time at which the queued call becomes due.
    pub fn deadline_ms(&self) -> Option<f64> {
        self.deadline_ms
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Run the queued call if its quiet period is over.
    pub fn fire_if_due(&mut self, now_ms: f64) -> Option<R> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Run the queued call now, regardless of the deadline.
    pub fn flush(&mut self) -> Option<R> {
        self.deadline_ms = None;
        let arg = self.latest.take()?;
        Some((self.f)(arg))
    }

    /// Drop the queued call. Returns true when one was pending.
    pub fn cancel(&mut self) -> bool {
        self.latest = None;
        self.deadline_ms.take().is_some()
    }
}
