use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{ApiKey, AppConfig};
use crate::error::VideoTaskError;
use crate::videogen::types::{
    CreateTaskRequest, GenerationRequest, ProviderError, TaskHandle, TaskSnapshot,
};
use crate::videogen::TaskApi;

/// Connection settings for the Ark content generation API
#[derive(Debug, Clone)]
pub struct ArkConfig {
    pub base_url: Url,
    pub api_key: ApiKey,
    pub model: String,
}

impl ArkConfig {
    pub fn new(app_config: &AppConfig, api_key: ApiKey) -> Result<Self, VideoTaskError> {
        let base_url = Url::parse(&app_config.base_url).map_err(|e| {
            VideoTaskError::InvalidInput(format!("invalid base_url {}: {e}", app_config.base_url))
        })?;

        Ok(Self {
            base_url,
            api_key,
            model: app_config.model.clone(),
        })
    }

    fn tasks_url(&self) -> String {
        format!(
            "{}/contents/generations/tasks",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/{task_id}", self.tasks_url())
    }
}

/// Client for seedance image-to-video tasks
#[derive(Clone)]
pub struct ArkClient {
    pub config: ArkConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreateTaskResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ProviderError,
}

impl ArkClient {
    pub fn new(config: ArkConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn error_text(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) => format!("{status} - {}", parsed.error.describe()),
            Err(_) => format!("{status} - {body}"),
        }
    }
}

#[async_trait]
impl TaskApi for ArkClient {
    async fn create_task(&self, request: &GenerationRequest) -> Result<TaskHandle, VideoTaskError> {
        let body = CreateTaskRequest {
            model: self.config.model.clone(),
            content: request.content(),
        };

        info!("Submitting seedance task with model {}", self.config.model);

        let response = self
            .http_client
            .post(self.config.tasks_url())
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to submit task: {}", e);
                VideoTaskError::Submission(format!("Failed to submit task: {e}"))
            })?;

        if !response.status().is_success() {
            let error_text = Self::error_text(response).await;
            error!("Ark API error: {}", error_text);
            return Err(VideoTaskError::Submission(format!(
                "Ark API error: {error_text}"
            )));
        }

        let created: CreateTaskResponse = response.json().await.map_err(|e| {
            VideoTaskError::Submission(format!("Failed to parse create response: {e}"))
        })?;

        if let Some(err) = created.error {
            return Err(VideoTaskError::Submission(err.describe()));
        }

        match created.id.filter(|id| !id.is_empty()) {
            Some(task_id) => Ok(TaskHandle { task_id }),
            None => Err(VideoTaskError::Submission(
                "Create response did not contain a task id".to_string(),
            )),
        }
    }

    async fn get_task(&self, handle: &TaskHandle) -> Result<TaskSnapshot, VideoTaskError> {
        let response = self
            .http_client
            .get(self.config.task_url(&handle.task_id))
            .bearer_auth(self.config.api_key.expose())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to check task status: {}", e);
                VideoTaskError::Network(format!("Failed to check task status: {e}"))
            })?;

        if !response.status().is_success() {
            let error_text = Self::error_text(response).await;
            return Err(VideoTaskError::Provider(format!(
                "Failed to check task status: {error_text}"
            )));
        }

        let raw: Value = response.json().await.map_err(|e| {
            VideoTaskError::Provider(format!("Failed to parse status response: {e}"))
        })?;

        debug!("Task {} status payload: {}", handle.task_id, raw);

        Ok(TaskSnapshot::from_value(raw))
    }
}
