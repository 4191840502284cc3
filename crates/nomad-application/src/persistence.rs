//! Ordered background persistence.
//!
//! Each manager owns one [`PersistenceWriter`]. Jobs run one at a time in
//! submission order, so the document written last always reflects the latest
//! in-memory state. Callers receive a [`PendingWrite`] they may await or drop.

use std::future::Future;
use std::pin::Pin;

use nomad_core::error::{NomadError, Result};
use tokio::sync::{mpsc, oneshot};

type Job = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

struct Submission {
    description: String,
    job: Job,
    done: oneshot::Sender<Result<()>>,
}

/// FIFO writer task. Must be created inside a Tokio runtime.
#[derive(Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<Submission>,
}

impl PersistenceWriter {
    /// Spawns the writer task. `owner` names the manager in log lines.
    pub fn spawn(owner: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Submission>();

        tokio::spawn(async move {
            while let Some(submission) = rx.recv().await {
                let result = submission.job.await;
                match &result {
                    Ok(()) => tracing::debug!("[{}] persisted {}", owner, submission.description),
                    Err(e) => tracing::warn!(
                        "[{}] failed to persist {}: {}",
                        owner,
                        submission.description,
                        e
                    ),
                }
                // The caller may have dropped its handle
                let _ = submission.done.send(result);
            }
            tracing::debug!("[{}] writer stopped", owner);
        });

        Self { tx }
    }

    /// Queues `job` behind every previously submitted job.
    pub fn submit<F>(&self, description: impl Into<String>, job: F) -> PendingWrite
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let (done, rx) = oneshot::channel();
        let submission = Submission {
            description: description.into(),
            job: Box::pin(job),
            done,
        };

        match self.tx.send(submission) {
            Ok(()) => PendingWrite::queued(rx),
            Err(_) => PendingWrite::failed(NomadError::internal("persistence writer stopped")),
        }
    }
}

enum PendingState {
    Skipped,
    Queued(oneshot::Receiver<Result<()>>),
    Failed(NomadError),
}

/// Completion handle of one persistence job.
///
/// Dropping it does not cancel the write.
pub struct PendingWrite {
    state: PendingState,
}

impl PendingWrite {
    /// A handle for a mutation that is never persisted (guest identities).
    pub fn skipped() -> Self {
        Self {
            state: PendingState::Skipped,
        }
    }

    fn queued(rx: oneshot::Receiver<Result<()>>) -> Self {
        Self {
            state: PendingState::Queued(rx),
        }
    }

    fn failed(error: NomadError) -> Self {
        Self {
            state: PendingState::Failed(error),
        }
    }

    /// Whether no store write was issued for this mutation.
    pub fn is_skipped(&self) -> bool {
        matches!(self.state, PendingState::Skipped)
    }

    /// Waits until the write reached the store.
    pub async fn wait(self) -> Result<()> {
        match self.state {
            PendingState::Skipped => Ok(()),
            PendingState::Failed(error) => Err(error),
            PendingState::Queued(rx) => rx
                .await
                .unwrap_or_else(|_| Err(NomadError::internal("persistence writer dropped the job"))),
        }
    }
}

impl std::fmt::Debug for PendingWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            PendingState::Skipped => "skipped",
            PendingState::Queued(_) => "queued",
            PendingState::Failed(_) => "failed",
        };
        f.debug_struct("PendingWrite").field("state", &state).finish()
    }
}
