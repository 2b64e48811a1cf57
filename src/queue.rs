use axum::async_trait;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Work item handed to the deferred-processing queue after an upload
/// commits. No consumer is wired up yet; delivery and ordering carry no
/// guarantees.
#[derive(Debug, Clone, Serialize)]
pub struct FileJob {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn dispatch(&self, job: FileJob) -> anyhow::Result<()>;
}

/// Fire-and-forget sink: logs the job and drops it.
pub struct NullQueue;

#[async_trait]
impl JobQueue for NullQueue {
    async fn dispatch(&self, job: FileJob) -> anyhow::Result<()> {
        debug!(file_id = %job.file_id, user_id = %job.user_id, "file job dispatched (no consumer)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_queue_accepts_jobs() {
        let queue = NullQueue;
        let job = FileJob {
            file_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            filename: "report.pdf".into(),
        };
        assert!(queue.dispatch(job).await.is_ok());
    }
}
