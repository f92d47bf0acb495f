use async_trait::async_trait;

use crate::consts::LOG_TRUNCATE_CHARS;
use crate::error::VideoTaskError;
use crate::videogen::types::{TaskHandle, TaskSnapshot};

pub mod extract;
pub mod models;
pub mod runner;
pub mod types;

pub use runner::VideoTaskRunner;
pub use types::{GenerationRequest, PersistedResult, TaskStatus};

/// Task-based generation API: create returns an id right away, the result
/// is fetched by querying the task until it settles.
#[async_trait]
pub trait TaskApi {
    async fn create_task(&self, request: &GenerationRequest) -> Result<TaskHandle, VideoTaskError>;

    async fn get_task(&self, handle: &TaskHandle) -> Result<TaskSnapshot, VideoTaskError>;
}

pub fn truncate_for_log(text: &str) -> &str {
    text.char_indices()
        .nth(LOG_TRUNCATE_CHARS)
        .map(|(idx, _)| &text[..idx])
        .unwrap_or(text)
}
