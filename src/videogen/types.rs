use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VideoTaskError;

/// Durations the seedance models accept
pub const SUPPORTED_DURATIONS: [u32; 2] = [5, 10];

/// Image-to-video generation input. Validated once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    image_url: String,
    prompt: String,
    duration_seconds: u32,
    resolution: String,
    camera_fixed: bool,
}

impl GenerationRequest {
    pub fn new(
        image_url: impl Into<String>,
        prompt: impl Into<String>,
        duration_seconds: u32,
    ) -> Result<Self, VideoTaskError> {
        let image_url = image_url.into();
        if image_url.trim().is_empty() {
            return Err(VideoTaskError::InvalidInput(
                "image url must not be empty".to_string(),
            ));
        }
        if !SUPPORTED_DURATIONS.contains(&duration_seconds) {
            return Err(VideoTaskError::InvalidInput(format!(
                "duration must be 5 or 10 seconds, got {duration_seconds}"
            )));
        }

        Ok(Self {
            image_url,
            prompt: prompt.into(),
            duration_seconds,
            resolution: crate::consts::DEFAULT_RESOLUTION.to_string(),
            camera_fixed: false,
        })
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    pub fn with_camera_fixed(mut self, camera_fixed: bool) -> Self {
        self.camera_fixed = camera_fixed;
        self
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Prompt with the generation parameters appended as `--flag value`
    /// directives, which is how the task API takes them.
    pub fn directive_text(&self) -> String {
        format!(
            "{} --resolution {} --duration {} --camerafixed {}",
            self.prompt, self.resolution, self.duration_seconds, self.camera_fixed
        )
    }

    pub fn content(&self) -> Vec<ContentSegment> {
        vec![
            ContentSegment::Text {
                text: self.directive_text(),
            },
            ContentSegment::ImageUrl {
                image_url: ImageUrl {
                    url: self.image_url.clone(),
                },
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub model: String,
    pub content: Vec<ContentSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
    Timeout,
}

impl TaskStatus {
    /// Maps the upstream status string. Anything that is not a terminal
    /// state (`queued`, `running`, unknown values) keeps the task pending.
    pub fn from_upstream(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProviderError {
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "Unknown error".to_string(),
        }
    }
}

/// One status query result: the raw payload plus the fields the poll loop
/// needs from it.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub status: String,
    pub error: Option<ProviderError>,
    pub raw: Value,
}

impl TaskSnapshot {
    pub fn from_value(raw: Value) -> Self {
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let error = raw
            .get("error")
            .filter(|e| !e.is_null())
            .and_then(|e| serde_json::from_value(e.clone()).ok());

        Self { status, error, raw }
    }
}

#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub status: TaskStatus,
    pub payload: Option<Value>,
    pub error: Option<String>,
    pub attempts: u32,
}

/// What gets written to the output file after a successful task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub video_url: Option<String>,
    pub full_result: Option<Value>,
}
