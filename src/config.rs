use crate::errors::{AppError, AppResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ai_temperature: f64,
    pub ai_max_tokens: u32,
    pub data_dir: PathBuf,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let ai_temperature = env_var_or("AI_TEMPERATURE", "0.8")
            .parse::<f64>()
            .map_err(|e| AppError::Config(format!("AI_TEMPERATURE: {e}")))?;

        let ai_max_tokens = env_var_or("AI_MAX_TOKENS", "500")
            .parse::<u32>()
            .map_err(|e| AppError::Config(format!("AI_MAX_TOKENS: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("SERVER_PORT: {e}")))?;

        Ok(Self {
            openai_api_key: env_var("OPENAI_API_KEY")?,
            openai_base_url: env_var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env_var_or("OPENAI_MODEL", "gpt-4o"),
            ai_temperature,
            ai_max_tokens,
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            server_port,
        })
    }
}

fn env_var(key: &str) -> AppResult<String> {
    std::env::var(key).map_err(|_| AppError::Config(format!("missing env var: {key}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
