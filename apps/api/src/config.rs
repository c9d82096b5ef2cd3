use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if the oracle credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound (in characters) for job descriptions and skill lists.
    pub max_input_length: usize,
    pub max_upload_bytes: usize,
    pub llm_timeout_secs: u64,
    pub llm_retry_deadline_secs: u64,
    /// When set, only network errors, 429 and 5xx responses are retried.
    pub llm_retry_transient_only: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-pro-latest".to_string()),
            port: parse_env("PORT", 7860)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_input_length: parse_env("MAX_INPUT_LENGTH", 500)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_retry_deadline_secs: parse_env("LLM_RETRY_DEADLINE_SECS", 120)?,
            llm_retry_transient_only: parse_env("LLM_RETRY_TRANSIENT_ONLY", false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
