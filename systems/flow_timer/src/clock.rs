//! Background thread that beats at a fixed interval.

use std::{
    io,
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, trace};

/// Whether the clock keeps beating after a beat returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockControl {
    /// Wait one more interval and beat again.
    Continue,
    /// Leave the beat loop and end the thread.
    Break,
}

type Flag = Arc<(Mutex<bool>, Condvar)>;

/// Receiving half of the stop flag, held by the clock thread.
struct StopSignal {
    inner: Flag,
}

impl StopSignal {
    fn new() -> (Self, StopTrigger) {
        let inner: Flag = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Waits for the stop flag or the timeout. Returns `true` once stopped.
    fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, condvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return true;
        }
        let (stopped, _) = condvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

/// Sending half of the stop flag, held by the [`Clock`] handle.
struct StopTrigger {
    inner: Flag,
}

impl StopTrigger {
    fn stop(&self) {
        let (lock, condvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        condvar.notify_all();
    }
}

/// Handle to a running background clock.
///
/// Dropping the handle asks the thread to stop without waiting for it.
pub struct Clock {
    trigger: StopTrigger,
    thread: Option<JoinHandle<()>>,
}

impl Clock {
    /// Spawns a thread that calls `beat` once per `interval` until `beat`
    /// returns [`ClockControl::Break`] or the clock is stopped.
    pub fn spawn<F>(interval: Duration, mut beat: F) -> io::Result<Self>
    where
        F: FnMut() -> ClockControl + Send + 'static,
    {
        let (signal, trigger) = StopSignal::new();
        let thread = thread::Builder::new()
            .name("pipeflow-clock".into())
            .spawn(move || {
                let mut beats = 0_u64;
                while !signal.wait_timeout(interval) {
                    beats += 1;
                    trace!(beats, "clock beat");
                    if beat() == ClockControl::Break {
                        break;
                    }
                }
                debug!(beats, "clock finished");
            })?;

        Ok(Self {
            trigger,
            thread: Some(thread),
        })
    }

    /// Whether the beat loop is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the clock and waits for its thread to exit.
    ///
    /// Must not be called while holding a lock the beat closure acquires.
    pub fn stop(mut self) {
        self.trigger.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Waits until the beat loop ends on its own.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ClockControl};
    use std::{
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn beat_can_end_the_clock() {
        let beats = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&beats);
        let clock = Clock::spawn(Duration::from_millis(1), move || {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ClockControl::Break
            } else {
                ClockControl::Continue
            }
        })
        .expect("spawn clock");

        clock.join();
        assert_eq!(beats.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn no_beat_runs_after_stop_returns() {
        let beats = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&beats);
        let clock = Clock::spawn(Duration::from_millis(1), move || {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            ClockControl::Continue
        })
        .expect("spawn clock");

        thread::sleep(Duration::from_millis(20));
        clock.stop();
        let after_stop = beats.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));

        assert_eq!(beats.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn dropping_the_handle_stops_the_thread() {
        let beats = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&beats);
        let clock = Clock::spawn(Duration::from_secs(60), move || {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            ClockControl::Continue
        })
        .expect("spawn clock");

        assert!(clock.is_running());
        drop(clock);
        assert_eq!(beats.load(Ordering::SeqCst), 0);
    }
}
