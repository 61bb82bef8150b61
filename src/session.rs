//! One paced generation: a streaming call wired into a [`PacingQueue`].
//!
//! | Outcome | Queue |
//! |---------|-------|
//! | Completed | drained to the sink, then `run` returns `Ok(())` |
//! | Failed | discarded at once, error returned |
//! | Aborted | discarded the moment the token fires, `Aborted` returned (treat as a silent stop) |

use crate::client::{GenerationOptions, Generator};
use crate::error::{ClassifiedError, Error};
use crate::pacing::PacingQueue;
use crate::types::Message;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owns the pacing queue for a single generation.
///
/// The session's cancellation token is the queue's shutdown token: cancelling it stops
/// emission at once, before the generation itself has noticed. Once a run fails or is aborted
/// the queue is closed; start a new session for the next one.
pub struct PacedSession {
    queue: PacingQueue,
    cancel: CancellationToken,
}

impl PacedSession {
    pub fn new(queue: PacingQueue) -> Self {
        let cancel = queue.shutdown_token();
        Self { queue, cancel }
    }

    pub fn queue(&self) -> &PacingQueue {
        &self.queue
    }

    /// Token that stops this session's generation and its queue when cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort the generation and discard anything not yet rendered.
    pub fn cancel(&self) {
        self.queue.discard();
    }

    /// Drive `generation`, which pushes fragments into the queue it is given, and settle the
    /// queue according to the outcome.
    ///
    /// Cancelling the session ends the run with `Aborted` even if `generation` ignores the
    /// token.
    pub async fn run<'a, F, Fut>(&'a self, generation: F) -> Result<(), ClassifiedError>
    where
        F: FnOnce(&'a PacingQueue) -> Fut,
        Fut: Future<Output = Result<(), ClassifiedError>>,
    {
        let outcome = tokio::select! {
            biased;
            r = generation(&self.queue) => r,
            _ = self.cancel.cancelled() => Err(Error::Cancelled.into()),
        };

        match outcome {
            Ok(()) => {
                self.queue.finished().await;
                if self.cancel.is_cancelled() {
                    return Err(Error::Cancelled.into());
                }
                debug!("paced session drained");
                Ok(())
            }
            Err(e) => {
                self.queue.discard();
                Err(e)
            }
        }
    }

    /// Stream `messages` through `generator` into the queue.
    ///
    /// The generation always observes the session's token. A token already carried by
    /// `options` is honoured as well: cancelling it cancels the session.
    pub async fn generate(
        &self,
        generator: &Generator,
        messages: &[Message],
        mut options: GenerationOptions,
    ) -> Result<(), ClassifiedError> {
        let caller = options.cancellation.replace(self.cancel.clone());
        self.run(|queue| async move {
            let stream = generator.generate_stream(messages, options, move |f| queue.push(f));
            match caller {
                Some(caller) => tokio::select! {
                    biased;
                    _ = caller.cancelled() => {
                        self.cancel();
                        Err(Error::Cancelled.into())
                    }
                    r = stream => r,
                },
                None => stream.await,
            }
        })
        .await
    }
}
