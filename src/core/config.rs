use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const DEFAULT_SYSTEM_MESSAGE: &str = "You are an AI therapist. Provide detailed, empathetic, and structured responses with clear headings: 'Your Feelings', 'Next Steps', and 'Reflection'. Include supportive language, actionable suggestions, and reflective questions. Elaborate your answers to offer comprehensive guidance.";

/// Which conversation model the server exposes. Only one is mounted
/// per deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatVariant {
    /// One session per caller id that moves through diagnosis and
    /// conclusion phases
    #[default]
    Phased,
    /// A single global conversation with a fixed history window and
    /// edit/regenerate support
    Windowed,
}

impl fmt::Display for ChatVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChatVariant::Phased => write!(f, "phased"),
            ChatVariant::Windowed => write!(f, "windowed"),
        }
    }
}

impl FromStr for ChatVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phased" => Ok(ChatVariant::Phased),
            "windowed" => Ok(ChatVariant::Windowed),
            other => Err(anyhow!("Unknown chat variant: {}", other)),
        }
    }
}

/// Sampling parameters forwarded to the inference backend on every
/// request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 300,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.9,
            repetition_penalty: 1.1,
            stop: vec![String::from("[INST]"), String::from("</s>")],
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_api_hostname: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub generation: GenerationParams,
    pub system_message: String,
    pub variant: ChatVariant,
    pub static_dir: String,
}

impl AppConfig {
    /// Reads the config from the environment. Fails when the backend
    /// API key is missing so the process never starts half configured.
    pub fn from_env() -> Result<Self> {
        let llm_api_key = env::var("SOLACE_API_KEY")
            .map_err(|_| anyhow!("Missing env var SOLACE_API_KEY"))?;
        let llm_api_hostname = env::var("SOLACE_LLM_HOST")
            .unwrap_or_else(|_| "https://api.arliai.com".to_string());
        let llm_model = env::var("SOLACE_LLM_MODEL")
            .unwrap_or_else(|_| "Mistral-Nemo-12B-Instruct-2407".to_string());
        let system_message = env::var("SOLACE_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let static_dir = env::var("SOLACE_STATIC_DIR").unwrap_or_else(|_| "./web-ui".to_string());
        let variant = match env::var("SOLACE_CHAT_VARIANT") {
            Ok(v) => v.parse()?,
            Err(_) => ChatVariant::default(),
        };
        let llm_timeout = Duration::from_secs(parse_env_or("SOLACE_LLM_TIMEOUT_SECS", 30)?);

        let defaults = GenerationParams::default();
        let generation = GenerationParams {
            max_tokens: parse_env_or("SOLACE_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_env_or("SOLACE_TEMPERATURE", defaults.temperature)?,
            top_k: parse_env_or("SOLACE_TOP_K", defaults.top_k)?,
            top_p: parse_env_or("SOLACE_TOP_P", defaults.top_p)?,
            repetition_penalty: parse_env_or(
                "SOLACE_REPETITION_PENALTY",
                defaults.repetition_penalty,
            )?,
            stop: defaults.stop,
        };

        Ok(Self {
            llm_api_hostname,
            llm_api_key,
            llm_model,
            llm_timeout,
            generation,
            system_message,
            variant,
            static_dir,
        })
    }
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for env var {}: {}", key, val)),
        Err(_) => Ok(default),
    }
}
