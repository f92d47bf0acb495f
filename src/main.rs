use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::error::VideoTaskError;
use crate::videogen::models::seedance::{ArkClient, ArkConfig};
use crate::videogen::{GenerationRequest, PersistedResult, TaskStatus, VideoTaskRunner};

mod config;
mod consts;
mod error;
mod videogen;

const TROUBLESHOOTING_HINTS: [&str; 3] = [
    "API key has I2V permissions",
    "BytePlus service status",
    "Account tier supports I2V",
];

async fn main_impl<F>(lookup: F) -> Result<PersistedResult, VideoTaskError>
where
    F: Fn(&str) -> Option<String>,
{
    // Credentials are resolved before anything touches the network
    let api_key = crate::config::api_key_from(&lookup)?;
    let conf = AppConfig::load()?;

    let request = GenerationRequest::new(
        crate::config::image_url_from(&lookup),
        conf.prompt.clone(),
        conf.duration_seconds,
    )?
    .with_resolution(conf.resolution.clone())
    .with_camera_fixed(conf.camera_fixed);

    let client = ArkClient::new(ArkConfig::new(&conf, api_key)?);
    let runner = VideoTaskRunner::new(client, conf.output_path.clone())
        .with_polling(conf.max_attempts, conf.poll_interval()?);

    runner.run(&request).await
}

fn summary_lines(outcome: &Result<PersistedResult, VideoTaskError>) -> Vec<String> {
    let banner = "=".repeat(60);
    let headline = match outcome {
        Ok(PersistedResult {
            status: TaskStatus::Succeeded,
            video_url: Some(url),
            ..
        }) => {
            return vec![
                banner.clone(),
                "SUCCESS! I2V task produced a video".to_string(),
                banner,
                format!("Video URL: {url}"),
            ];
        }
        Ok(result) => format!(
            "FAILED - no video URL produced (status: {})",
            result.status.as_str()
        ),
        Err(e) => format!("FAILED - {e}"),
    };

    let mut lines = vec![banner.clone(), headline, banner, "Please check:".to_string()];
    lines.extend(
        TROUBLESHOOTING_HINTS
            .iter()
            .enumerate()
            .map(|(i, hint)| format!("{}. {hint}", i + 1)),
    );
    lines
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,reqwest=warn,hyper=warn",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Seedance I2V generation test");

    let outcome = main_impl(|name| std::env::var(name).ok()).await;
    match &outcome {
        Err(e) if e.is_fatal() => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => error!("Error: {}", e),
        Ok(_) => {}
    }

    println!();
    for line in summary_lines(&outcome) {
        println!("{line}");
    }
    ExitCode::SUCCESS
}
