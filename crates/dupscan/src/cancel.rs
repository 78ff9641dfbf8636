//! Shared one-way cancellation signal.
//!
//! The signal is level-triggered: once set it stays set for the rest of the
//! process, and every observer sees it. Producers race it against their
//! channel sends through [`CancelSignal::done`], which becomes permanently
//! ready (disconnected) when the signal is set.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Idempotent, clonable cancellation flag.
///
/// Clones share state; cancelling any clone cancels all of them.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancel, which disconnects `done`.
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

impl CancelSignal {
    /// Create an unset signal.
    #[must_use]
    pub fn new() -> Self {
        let (trigger, done) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Set the signal.
    ///
    /// Safe to call concurrently from any number of threads. Returns `true`
    /// only for the call that actually flipped it.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(trigger);
        true
    }

    /// Whether the signal has been set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that is ready (disconnected) once the signal is set.
    ///
    /// Intended for `crossbeam_channel::select!`; nothing is ever sent on it.
    #[must_use]
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Route the process interrupt (Ctrl-C) to `signal`.
///
/// Can succeed at most once per process; later calls return an error.
pub fn cancel_on_interrupt(signal: &CancelSignal) -> Result<(), ctrlc::Error> {
    let signal = signal.clone();
    ctrlc::set_handler(move || {
        if signal.cancel() {
            warn!("interrupt received, stopping scan");
        }
    })
}
