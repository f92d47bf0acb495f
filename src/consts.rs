use std::time::Duration;

pub const ARK_API_URL: &str = "https://ark.ap-southeast.bytepluses.com/api/v3";

pub const SEEDANCE_PRO_MODEL: &str = "seedance-1-0-pro-250528";

/// Checked in order, first non-empty value wins
pub const API_KEY_ENV_VARS: [&str; 2] = ["BYTEPLUS_API_KEY", "ARK_API_KEY"];

pub const TEST_IMAGE_URL_ENV_VAR: &str = "TEST_IMAGE_URL";

pub const PLACEHOLDER_IMAGE_URL: &str = "https://example.com/your-image.jpg";

pub const DEFAULT_OUTPUT_PATH: &str = "./i2v-success-result.json";

pub const DEFAULT_PROMPT: &str = "Slow gentle camera zoom in on peaceful grandmother's face. Her hands move gracefully knitting. Natural breathing. Soft ambient light. Calm and serene atmosphere.";

pub const DEFAULT_RESOLUTION: &str = "1080p";

pub const DEFAULT_DURATION_SECS: u32 = 5;

/// 2 minutes at the default interval
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Long URLs and prompts are cut to this many chars in logs
pub const LOG_TRUNCATE_CHARS: usize = 80;
