use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strum_macros::Display;
use tokio::sync::oneshot;

/// Named signals published by the inbound decode path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Signal {
    #[strum(to_string = "motorFinished")]
    MotorFinished,
    #[strum(to_string = "markerFinished")]
    MarkerFinished,
    #[strum(to_string = "soundFinished")]
    SoundFinished,
    #[strum(to_string = "nosePressed")]
    NosePressed,
}

struct Waiter {
    token: u64,
    tx: oneshot::Sender<()>,
}

#[derive(Default)]
struct Inner {
    next_token: u64,
    waiters: HashMap<Signal, Vec<Waiter>>,
}

/// Publish/subscribe bus for completion signals.
///
/// Every subscription is a single-fire slot with a unique token, removed
/// when its signal fires or when the [`Completion`] is dropped. Repeated
/// commands therefore never accumulate listeners; two in-flight operations
/// awaiting the same signal both resolve on one firing.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<Mutex<Inner>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-fire slot resolving on the next publish of `signal`.
    pub fn subscribe(&self, signal: Signal) -> Completion {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap();
        let token = inner.next_token;
        inner.next_token += 1;
        inner
            .waiters
            .entry(signal)
            .or_default()
            .push(Waiter { token, tx });
        Completion {
            inner: Arc::clone(&self.inner),
            signal,
            token,
            rx,
        }
    }

    /// Fire every slot currently registered for `signal`, consuming them.
    /// Never blocks: slots whose waiter has already gone away are ignored.
    pub fn publish(&self, signal: Signal) {
        let fired = {
            let mut inner = self.inner.lock().unwrap();
            inner.waiters.remove(&signal).unwrap_or_default()
        };
        for waiter in fired {
            let _ = waiter.tx.send(());
        }
    }

    /// Number of live slots for `signal`.
    pub fn pending(&self, signal: Signal) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.waiters.get(&signal).map_or(0, Vec::len)
    }
}

/// Single-fire handle resolving on the next publish of its signal.
pub struct Completion {
    inner: Arc<Mutex<Inner>>,
    signal: Signal,
    token: u64,
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Resolves when the signal fires. Safe to race against a deadline:
    /// whichever side loses simply drops this handle.
    pub async fn wait(&mut self) {
        let _ = (&mut self.rx).await;
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(waiters) = inner.waiters.get_mut(&self.signal) {
            waiters.retain(|w| w.token != self.token);
            if waiters.is_empty() {
                inner.waiters.remove(&self.signal);
            }
        }
    }
}
