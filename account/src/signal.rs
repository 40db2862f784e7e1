//! Single-shot "profile available" notification.
//!
//! DESIGN
//! ======
//! Waiters join the current cycle. `resolve` fires every waiter of that cycle
//! exactly once and starts a new, empty cycle, so a waiter that subscribes
//! after a profile was set only sees the *next* profile, never the old one.
//! This is a per-cycle broadcast, not a durable stream: nothing is retained
//! after a cycle fires.

#[cfg(test)]
#[path = "signal_test.rs"]
mod signal_test;

use tokio::sync::oneshot;

use crate::profile::Profile;

/// The waiter set for the current profile cycle.
#[derive(Debug, Default)]
pub struct ProfileSignal {
    waiters: Vec<oneshot::Sender<Profile>>,
}

impl ProfileSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current cycle. Waiters already dropped are pruned first.
    pub fn subscribe(&mut self) -> ProfileWaiter {
        self.waiters.retain(|tx| !tx.is_closed());
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        ProfileWaiter { rx }
    }

    /// Fire the current cycle with `profile` and start a fresh one.
    ///
    /// Returns how many live waiters were notified.
    pub fn resolve(&mut self, profile: &Profile) -> usize {
        std::mem::take(&mut self.waiters)
            .into_iter()
            .filter_map(|tx| tx.send(profile.clone()).ok())
            .count()
    }

    /// Number of waiters in the current cycle, including any dropped since
    /// the last `subscribe`.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.waiters.len()
    }
}

/// Outcome of a non-blocking check on a [`ProfileWaiter`].
#[derive(Debug, PartialEq, Eq)]
pub enum WaiterPoll {
    Ready(Profile),
    Pending,
    /// The signal was dropped before firing.
    Closed,
}

/// Receiving end of one cycle of a [`ProfileSignal`].
#[derive(Debug)]
pub struct ProfileWaiter {
    rx: oneshot::Receiver<Profile>,
}

impl ProfileWaiter {
    /// Wait for the cycle to fire. `None` if the signal was dropped first.
    pub async fn wait(self) -> Option<Profile> {
        self.rx.await.ok()
    }

    /// Check without waiting.
    pub fn poll(&mut self) -> WaiterPoll {
        match self.rx.try_recv() {
            Ok(profile) => WaiterPoll::Ready(profile),
            Err(oneshot::error::TryRecvError::Empty) => WaiterPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => WaiterPoll::Closed,
        }
    }
}
