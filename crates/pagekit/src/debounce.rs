//! Debounced function calls.
//!
//! Each call restarts a timer. With `immediate` unset the function runs
//! with the latest arguments once the timer expires; with `immediate` set
//! it runs on the first call of a burst and the expiry only re-arms it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

struct TimerState {
    handle: Option<JoinHandle<()>>,
    /// Bumped on every restart and cancel; a timer only acts if it still
    /// holds the current generation.
    generation: u64,
}

/// A debounced wrapper around a function. Clones share the same timer.
pub struct Debounced<A> {
    func: Arc<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    immediate: bool,
    timer: Arc<Mutex<TimerState>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            delay: self.delay,
            immediate: self.immediate,
            timer: Arc::clone(&self.timer),
        }
    }
}

/// Wrap `func` so it only runs after `delay` has passed without a new call.
///
/// With `immediate`, `func` runs on the leading edge instead.
pub fn debounce<A, F>(func: F, delay: Duration, immediate: bool) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        func: Arc::new(func),
        delay,
        immediate,
        timer: Arc::new(Mutex::new(TimerState {
            handle: None,
            generation: 0,
        })),
    }
}

impl<A: Send + 'static> Debounced<A> {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a call. Must be called from within a tokio runtime.
    pub fn call(&self, args: A) {
        let leading = {
            let mut timer = self.lock();
            let call_now = self.immediate && timer.handle.is_none();

            if let Some(handle) = timer.handle.take() {
                handle.abort();
            }
            timer.generation += 1;
            let generation = timer.generation;

            // In immediate mode the timer only re-arms the leading edge.
            let (leading, trailing) = if self.immediate {
                (call_now.then_some(args), None)
            } else {
                (None, Some(args))
            };

            let func = Arc::clone(&self.func);
            let state = Arc::clone(&self.timer);
            let delay = self.delay;
            timer.handle = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                {
                    let mut timer = state.lock().unwrap_or_else(|p| p.into_inner());
                    if timer.generation != generation {
                        return;
                    }
                    timer.handle = None;
                }
                if let Some(args) = trailing {
                    func(args);
                }
            }));

            leading
        };

        if let Some(args) = leading {
            (self.func)(args);
        }
    }

    /// Drop a pending call. The next call starts a fresh burst.
    pub fn cancel(&self) {
        let mut timer = self.lock();
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation += 1;
    }

    /// Whether a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.lock().handle.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
