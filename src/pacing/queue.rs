use super::frames::FrameScheduler;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Receives one rendering unit per frame.
pub type CharSink = Arc<dyn Fn(char) + Send + Sync>;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<char>,
    draining: bool,
    closed: bool,
}

impl QueueState {
    fn close(&mut self) -> usize {
        self.closed = true;
        self.draining = false;
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}

struct Inner {
    state: Mutex<QueueState>,
    sink: CharSink,
    frames: Arc<dyn FrameScheduler>,
    shutdown: CancellationToken,
    idle: Notify,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Smooths bursty fragments into a steady one-character-per-frame stream.
///
/// At most one drain task runs per queue. Dropping the queue (or calling [`discard`]) stops
/// emission immediately and throws away anything still buffered.
///
/// The sink runs while the queue's lock is held so that nothing is emitted after a discard;
/// it must not call back into the queue.
///
/// Cancelling the queue's [`shutdown_token`] has the same effect as [`discard`]. No character
/// starts emitting once the token reports cancelled.
///
/// [`discard`]: PacingQueue::discard
/// [`shutdown_token`]: PacingQueue::shutdown_token
pub struct PacingQueue {
    inner: Arc<Inner>,
}

impl PacingQueue {
    pub fn new<S>(sink: S, frames: Arc<dyn FrameScheduler>) -> Self
    where
        S: Fn(char) + Send + Sync + 'static,
    {
        Self::with_shutdown(sink, frames, CancellationToken::new())
    }

    /// A queue that also stops when `parent` is cancelled.
    pub fn with_cancellation<S>(
        sink: S,
        frames: Arc<dyn FrameScheduler>,
        parent: &CancellationToken,
    ) -> Self
    where
        S: Fn(char) + Send + Sync + 'static,
    {
        Self::with_shutdown(sink, frames, parent.child_token())
    }

    fn with_shutdown<S>(
        sink: S,
        frames: Arc<dyn FrameScheduler>,
        shutdown: CancellationToken,
    ) -> Self
    where
        S: Fn(char) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                sink: Arc::new(sink),
                frames,
                shutdown,
                idle: Notify::new(),
            }),
        }
    }

    /// Token cancelled when the queue closes. Cancelling it closes the queue.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Append a fragment's characters. Must be called from within a tokio runtime.
    ///
    /// Empty fragments, and pushes after a discard, are ignored.
    pub fn push(&self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        let start_drain = {
            let mut st = self.inner.state();
            if st.closed {
                return;
            }
            if self.inner.shutdown.is_cancelled() {
                st.close();
                return;
            }
            st.pending.extend(fragment.chars());
            !std::mem::replace(&mut st.draining, true)
        };
        if start_drain {
            tokio::spawn(drain(self.inner.clone()));
        }
    }

    /// Stop emitting and drop everything buffered. Idempotent.
    pub fn discard(&self) {
        let dropped = self.inner.state().close();
        self.inner.shutdown.cancel();
        self.inner.idle.notify_waiters();
        if dropped > 0 {
            debug!(dropped, "discarded pending characters");
        }
    }

    /// Characters buffered but not yet emitted.
    pub fn pending(&self) -> usize {
        self.inner.state().pending.len()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.state().draining
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state().closed || self.inner.shutdown.is_cancelled()
    }

    /// Wait until every buffered character has been emitted, or the queue was discarded.
    pub async fn finished(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let st = self.inner.state();
                if st.closed || !st.draining || self.inner.shutdown.is_cancelled() {
                    return;
                }
            }
            notified.await;
        }
    }
}

impl Drop for PacingQueue {
    fn drop(&mut self) {
        self.discard();
    }
}

async fn drain(inner: Arc<Inner>) {
    loop {
        {
            let mut st = inner.state();
            if inner.shutdown.is_cancelled() {
                st.close();
                break;
            }
            if st.closed || st.pending.is_empty() {
                st.draining = false;
                break;
            }
        }

        tokio::select! {
            biased;
            _ = inner.shutdown.cancelled() => {
                inner.state().close();
                break;
            }
            _ = inner.frames.next_frame() => {}
        }

        let mut st = inner.state();
        if st.closed {
            break;
        }
        if inner.shutdown.is_cancelled() {
            st.close();
            break;
        }
        if let Some(c) = st.pending.pop_front() {
            (inner.sink)(c);
        }
    }
    inner.idle.notify_waiters();
}
