//! Values produced off the prompt thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Weak;
use std::thread;
use std::time::Duration;

const FORWARD_POLL: Duration = Duration::from_millis(50);

/// A value that is either available now or will be delivered by another thread.
pub struct Deferred<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Ready(T),
    Pending(Receiver<T>),
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.inner {
            Inner::Ready(_) => "ready",
            Inner::Pending(_) => "pending",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

/// Sending half of [`Deferred::channel`].
pub struct Resolver<T> {
    tx: Sender<T>,
}

impl<T> Resolver<T> {
    /// Deliver the value. Returns it back if the deferred was already dropped.
    pub fn resolve(self, value: T) -> Result<(), T> {
        self.tx.send(value).map_err(|err| err.0)
    }
}

impl<T: Send + 'static> Deferred<T> {
    pub fn ready(value: T) -> Self {
        Self {
            inner: Inner::Ready(value),
        }
    }

    /// Run `task` on a named worker thread.
    pub fn spawn<F>(task: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (deferred, resolver) = Self::channel();
        let spawned = thread::Builder::new()
            .name("prompt-task".to_string())
            .spawn(move || {
                let _ = resolver.resolve(task());
            });
        if let Err(err) = spawned {
            // The resolver moved into the failed closure was dropped, so the deferred reports
            // disconnection when awaited.
            tracing::error!(error = %err, "failed to spawn prompt task thread");
        }
        deferred
    }

    pub fn channel() -> (Self, Resolver<T>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                inner: Inner::Pending(rx),
            },
            Resolver { tx },
        )
    }

    /// Take the value if it is already available.
    pub fn try_take(self) -> Result<T, Self> {
        match self.inner {
            Inner::Ready(value) => Ok(value),
            Inner::Pending(rx) => match rx.try_recv() {
                Ok(value) => Ok(value),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Err(Self {
                    inner: Inner::Pending(rx),
                }),
            },
        }
    }

    /// Block until the value arrives. `None` when the producer went away.
    pub fn wait(self) -> Option<T> {
        match self.inner {
            Inner::Ready(value) => Some(value),
            Inner::Pending(rx) => rx.recv().ok(),
        }
    }

    /// Deliver the eventual value (or its absence) through `notify` from a helper thread.
    ///
    /// The helper exits without calling `notify` once no strong reference behind `interest`
    /// remains.
    pub(crate) fn forward<W, F>(self, interest: Weak<W>, notify: F)
    where
        W: Send + Sync + 'static,
        F: FnOnce(Option<T>) + Send + 'static,
    {
        let spawned = thread::Builder::new()
            .name("prompt-deferred".to_string())
            .spawn(move || {
                if let Some(outcome) = self.wait_while(|| interest.strong_count() > 0) {
                    notify(outcome);
                }
            });
        if let Err(err) = spawned {
            tracing::error!(error = %err, "failed to spawn deferred forwarder thread");
        }
    }

    /// Like [`Deferred::wait`], polling `alive` between receive attempts. `None` when `alive`
    /// reported false before the producer finished.
    fn wait_while(self, alive: impl Fn() -> bool) -> Option<Option<T>> {
        let rx = match self.inner {
            Inner::Ready(value) => return Some(Some(value)),
            Inner::Pending(rx) => rx,
        };
        loop {
            match rx.recv_timeout(FORWARD_POLL) {
                Ok(value) => return Some(Some(value)),
                Err(RecvTimeoutError::Disconnected) => return Some(None),
                Err(RecvTimeoutError::Timeout) if !alive() => {
                    tracing::debug!("deferred value abandoned by its prompt");
                    return None;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}
