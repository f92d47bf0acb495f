use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::consts::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::error::VideoTaskError;
use crate::videogen::extract::extract_video_url;
use crate::videogen::types::{GenerationRequest, PersistedResult, PollOutcome, TaskHandle, TaskStatus};
use crate::videogen::{truncate_for_log, TaskApi};

/// Drives one image-to-video task through submit, poll, extract and save
pub struct VideoTaskRunner<A> {
    api: A,
    output_path: PathBuf,
    max_attempts: u32,
    poll_interval: Duration,
}

impl<A: TaskApi> VideoTaskRunner<A> {
    pub fn new(api: A, output_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            output_path: output_path.into(),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_polling(mut self, max_attempts: u32, poll_interval: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.poll_interval = poll_interval;
        self
    }

    pub async fn submit(&self, request: &GenerationRequest) -> Result<TaskHandle, VideoTaskError> {
        info!("Creating I2V task");
        info!("Image: {}", truncate_for_log(request.image_url()));
        info!("Prompt: {}", request.prompt());
        info!("Duration: {}s", request.duration_seconds());

        let handle = self.api.create_task(request).await?;
        info!("Task created with ID: {}", handle.task_id);

        Ok(handle)
    }

    /// Queries the task until it succeeds or fails, or until `max_attempts`
    /// queries came back pending. Sleeps `poll_interval` between queries.
    pub async fn poll(
        &self,
        handle: &TaskHandle,
        max_attempts: u32,
        poll_interval: Duration,
    ) -> Result<PollOutcome, VideoTaskError> {
        info!("Polling status of task {}", handle.task_id);

        for attempt in 1..=max_attempts {
            let snapshot = self.api.get_task(handle).await?;

            match TaskStatus::from_upstream(&snapshot.status) {
                TaskStatus::Succeeded => {
                    info!("Task {} succeeded after {} attempts", handle.task_id, attempt);
                    return Ok(PollOutcome {
                        status: TaskStatus::Succeeded,
                        payload: Some(snapshot.raw),
                        error: None,
                        attempts: attempt,
                    });
                }
                TaskStatus::Failed => {
                    let reason = snapshot
                        .error
                        .map(|e| e.describe())
                        .unwrap_or_else(|| "Unknown error".to_string());
                    error!("Task {} failed: {}", handle.task_id, reason);
                    return Ok(PollOutcome {
                        status: TaskStatus::Failed,
                        payload: None,
                        error: Some(reason),
                        attempts: attempt,
                    });
                }
                _ => {
                    info!(
                        "[{}/{}] Status: {}, waiting {:?}...",
                        attempt, max_attempts, snapshot.status, poll_interval
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(poll_interval).await;
            }
        }

        warn!(
            "Task {} timed out after {} attempts",
            handle.task_id, max_attempts
        );
        Ok(PollOutcome {
            status: TaskStatus::Timeout,
            payload: None,
            error: None,
            attempts: max_attempts,
        })
    }

    /// Runs the whole task. The result file is only written when the task
    /// succeeds; failed and timed out tasks come back without touching disk.
    pub async fn run(&self, request: &GenerationRequest) -> Result<PersistedResult, VideoTaskError> {
        let handle = self.submit(request).await?;
        let outcome = self
            .poll(&handle, self.max_attempts, self.poll_interval)
            .await?;

        if outcome.status != TaskStatus::Succeeded {
            warn!(
                "Task {} ended as {} after {} attempts: {}",
                handle.task_id,
                outcome.status.as_str(),
                outcome.attempts,
                outcome.error.as_deref().unwrap_or("no video produced")
            );
            return Ok(PersistedResult {
                task_id: handle.task_id,
                status: outcome.status,
                video_url: None,
                full_result: None,
            });
        }

        let payload = outcome.payload.unwrap_or(Value::Null);
        info!(
            "Full result: {}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
        );

        let video_url = extract_video_url(&payload);
        match &video_url {
            Some(url) => info!("Video URL: {}", url),
            None => warn!("Could not extract video URL from result"),
        }

        let result = PersistedResult {
            task_id: handle.task_id,
            status: TaskStatus::Succeeded,
            video_url,
            full_result: Some(payload),
        };
        self.persist(&result).await?;

        Ok(result)
    }

    async fn persist(&self, result: &PersistedResult) -> Result<(), VideoTaskError> {
        let bytes = serde_json::to_vec_pretty(result)
            .map_err(|e| VideoTaskError::Persist(format!("Failed to serialize result: {e}")))?;

        tokio::fs::write(&self.output_path, bytes)
            .await
            .map_err(|e| {
                VideoTaskError::Persist(format!(
                    "Failed to write {}: {e}",
                    self.output_path.display()
                ))
            })?;

        info!("Saved result to {}", self.output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::videogen::types::TaskSnapshot;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays scripted status payloads, repeating the last one forever
    struct ScriptedApi {
        create_error: Option<String>,
        statuses: Vec<Value>,
        creates: AtomicU32,
        queries: AtomicU32,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<Value>) -> Self {
            Self {
                create_error: None,
                statuses,
                creates: AtomicU32::new(0),
                queries: AtomicU32::new(0),
            }
        }

        fn failing_create(message: &str) -> Self {
            Self {
                create_error: Some(message.to_string()),
                ..Self::new(vec![])
            }
        }
    }

    #[async_trait]
    impl TaskApi for ScriptedApi {
        async fn create_task(
            &self,
            _request: &GenerationRequest,
        ) -> Result<TaskHandle, VideoTaskError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            match &self.create_error {
                Some(message) => Err(VideoTaskError::Submission(message.clone())),
                None => Ok(TaskHandle {
                    task_id: "cgt-test".to_string(),
                }),
            }
        }

        async fn get_task(&self, _handle: &TaskHandle) -> Result<TaskSnapshot, VideoTaskError> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst) as usize;
            let raw = self
                .statuses
                .get(n)
                .or_else(|| self.statuses.last())
                .cloned()
                .unwrap_or_else(|| json!({ "status": "queued" }));
            Ok(TaskSnapshot::from_value(raw))
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("https://img.test/grandma.png", "Slow zoom in", 5).unwrap()
    }

    fn handle() -> TaskHandle {
        TaskHandle {
            task_id: "cgt-test".to_string(),
        }
    }

    fn runner(api: ScriptedApi, output_path: &Path) -> VideoTaskRunner<ScriptedApi> {
        VideoTaskRunner::new(api, output_path).with_polling(5, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_poll_times_out_when_never_leaving_pending() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(
            ScriptedApi::new(vec![json!({ "status": "running" })]),
            &dir.path().join("out.json"),
        );

        let outcome = runner.poll(&handle(), 4, Duration::ZERO).await.unwrap();

        assert_eq!(outcome.status, TaskStatus::Timeout);
        assert!(outcome.payload.is_none());
        assert_eq!(outcome.attempts, 4);
        assert_eq!(runner.api.queries.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_stops_on_failed() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(
            ScriptedApi::new(vec![
                json!({ "status": "queued" }),
                json!({ "status": "running" }),
                json!({ "status": "failed", "error": { "message": "content policy" } }),
                json!({ "status": "succeeded" }),
            ]),
            &dir.path().join("out.json"),
        );

        let outcome = runner.poll(&handle(), 120, Duration::ZERO).await.unwrap();

        assert_eq!(outcome.status, TaskStatus::Failed);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.error.as_deref(), Some("content policy"));
        assert_eq!(runner.api.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_returns_payload_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let done = json!({ "status": "succeeded", "content": { "video_url": "X" } });
        let runner = runner(
            ScriptedApi::new(vec![json!({ "status": "queued" }), done.clone()]),
            &dir.path().join("out.json"),
        );

        let outcome = runner.poll(&handle(), 10, Duration::ZERO).await.unwrap();

        assert_eq!(outcome.status, TaskStatus::Succeeded);
        assert_eq!(outcome.payload, Some(done));
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn test_run_persists_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i2v-success-result.json");
        let runner = runner(
            ScriptedApi::new(vec![
                json!({ "status": "running" }),
                json!({ "id": "cgt-test", "status": "succeeded", "output": [{ "url": "Y" }] }),
            ]),
            &path,
        );

        let result = runner.run(&request()).await.unwrap();

        assert_eq!(result.status, TaskStatus::Succeeded);
        assert_eq!(result.video_url.as_deref(), Some("Y"));

        let saved: PersistedResult =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved, result);
        assert_eq!(saved.task_id, "cgt-test");
    }

    #[tokio::test]
    async fn test_run_persists_success_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let runner = runner(
            ScriptedApi::new(vec![json!({ "status": "succeeded" })]),
            &path,
        );

        let result = runner.run(&request()).await.unwrap();

        assert_eq!(result.status, TaskStatus::Succeeded);
        assert!(result.video_url.is_none());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_run_does_not_write_on_failure_or_timeout() {
        let dir = tempfile::tempdir().unwrap();

        let failed_path = dir.path().join("failed.json");
        let result = runner(
            ScriptedApi::new(vec![json!({ "status": "failed" })]),
            &failed_path,
        )
        .run(&request())
        .await
        .unwrap();
        assert_eq!(result.status, TaskStatus::Failed);
        assert!(!failed_path.exists());

        let timeout_path = dir.path().join("timeout.json");
        let result = runner(
            ScriptedApi::new(vec![json!({ "status": "queued" })]),
            &timeout_path,
        )
        .run(&request())
        .await
        .unwrap();
        assert_eq!(result.status, TaskStatus::Timeout);
        assert!(result.video_url.is_none());
        assert!(!timeout_path.exists());
    }

    #[tokio::test]
    async fn test_run_submission_error_skips_polling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let runner = runner(ScriptedApi::failing_create("no task id"), &path);

        let err = runner.run(&request()).await.unwrap_err();

        assert!(matches!(err, VideoTaskError::Submission(_)));
        assert!(!err.is_fatal());
        assert_eq!(runner.api.creates.load(Ordering::SeqCst), 1);
        assert_eq!(runner.api.queries.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }
}
