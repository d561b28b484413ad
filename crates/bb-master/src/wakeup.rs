//! Background wake-up loop for the sequencer.

use bb_engine::{AudioClock, Sequencer};
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) fn lock(sequencer: &Mutex<Sequencer>) -> MutexGuard<'_, Sequencer> {
    sequencer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A thread that fills the sequencer every `period` until cancelled.
pub(crate) struct Wakeup {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Wakeup {
    pub fn spawn<C>(sequencer: Arc<Mutex<Sequencer>>, clock: C, period: Duration) -> io::Result<Self>
    where
        C: AudioClock + Send + 'static,
    {
        let (cancel, signal) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("bb-sequencer".into())
            .spawn(move || loop {
                match signal.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let scheduled = lock(&sequencer).fill(&clock);
                        if scheduled > 0 {
                            tracing::debug!(scheduled, "sequencer drain");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        Ok(Self { cancel: Some(cancel), thread: Some(thread) })
    }

    /// Stop the loop and wait for the thread. A wake-up that has not fired
    /// yet never will.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::warn!("sequencer thread panicked");
            }
        }
    }
}

impl Drop for Wakeup {
    fn drop(&mut self) {
        self.stop();
    }
}
