//! The arena lock, its change condition, and the stop signal
//!
//! Every background thread parks on the same condition variable, so any
//! change that could matter to a waiter is followed by a broadcast. Sleeps
//! are condition waits with a timeout, which lets a stop request cut them
//! short.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::world::ArenaWorld;

pub struct SharedArena {
    state: Mutex<ArenaWorld>,
    changed: Condvar,
}

impl SharedArena {
    pub fn new(world: ArenaWorld) -> Self {
        Self {
            state: Mutex::new(world),
            changed: Condvar::new(),
        }
    }

    /// Take the arena lock. A panicked holder does not poison the session.
    pub fn lock(&self) -> MutexGuard<'_, ArenaWorld> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake every waiter so it re-checks its condition
    pub fn notify_all(&self) {
        self.changed.notify_all();
    }

    /// Raise the stop flag and wake everyone. Returns false if already stopped.
    pub fn request_stop(&self) -> bool {
        let first = self.lock().request_stop();
        self.changed.notify_all();
        first
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().is_stopped()
    }

    /// Sleep until `deadline` unless the session stops or `cancel` turns true.
    ///
    /// Returns true when the full sleep elapsed and the caller should carry on.
    pub fn sleep_until<F>(&self, deadline: Instant, cancel: F) -> bool
    where
        F: Fn(&ArenaWorld) -> bool,
    {
        let mut world = self.lock();
        loop {
            if world.is_stopped() || cancel(&world) {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            world = self
                .changed
                .wait_timeout(world, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn sleep_for(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration, |_| false)
    }

    /// Block until `ready` holds or the session stops, then hand back the lock
    pub fn wait_until<F>(&self, ready: F) -> MutexGuard<'_, ArenaWorld>
    where
        F: Fn(&ArenaWorld) -> bool,
    {
        let world = self.lock();
        self.changed
            .wait_while(world, |w| !w.is_stopped() && !ready(w))
            .unwrap_or_else(PoisonError::into_inner)
    }
}
