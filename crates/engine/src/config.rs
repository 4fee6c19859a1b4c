//! Engine configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

const DEFAULT_STORY_FILE: &str = "story.json";
const DEFAULT_ENDINGS_DIR: &str = "endings";
const DEFAULT_USER: &str = "local";
const DEFAULT_INSIGHT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_INSIGHT_MAX_RETRIES: u32 = 2;

/// Where discovered endings are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndingsStore {
    /// One JSON file per user under this directory.
    JsonFiles(PathBuf),
    Memory,
}

/// Which text generator provides narrative insight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightProvider {
    HuggingFace { api_url: String, api_token: String },
    Ollama { base_url: String, model: String },
    Disabled,
}

impl InsightProvider {
    pub fn name(&self) -> &'static str {
        match self {
            InsightProvider::HuggingFace { .. } => "huggingface",
            InsightProvider::Ollama { .. } => "ollama",
            InsightProvider::Disabled => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub story_file: PathBuf,
    pub endings: EndingsStore,
    pub insight: InsightProvider,
    pub insight_timeout: Duration,
    pub insight_max_retries: u32,
    /// User id the console plays as.
    pub console_user: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let story_file =
            PathBuf::from(get("STORY_FILE").unwrap_or_else(|| DEFAULT_STORY_FILE.into()));

        let endings = match get("ENDINGS_STORE").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("memory") => EndingsStore::Memory,
            other => {
                if let Some(other) = other.filter(|v| *v != "json") {
                    tracing::warn!(value = other, "Unknown ENDINGS_STORE, using json files");
                }
                EndingsStore::JsonFiles(PathBuf::from(
                    get("ENDINGS_DIR").unwrap_or_else(|| DEFAULT_ENDINGS_DIR.into()),
                ))
            }
        };

        let hf = match (get("HF_API_URL"), get("HF_API_TOKEN")) {
            (Some(api_url), Some(api_token)) => {
                Some(InsightProvider::HuggingFace { api_url, api_token })
            }
            _ => None,
        };
        let ollama = || InsightProvider::Ollama {
            base_url: get("OLLAMA_BASE_URL").unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.into()),
            model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
        };

        let insight = match get("INSIGHT_PROVIDER").map(|v| v.to_ascii_lowercase()).as_deref() {
            None => hf.unwrap_or(InsightProvider::Disabled),
            Some("huggingface" | "hf") => hf.unwrap_or_else(|| {
                tracing::warn!(
                    "INSIGHT_PROVIDER=huggingface needs HF_API_URL and HF_API_TOKEN; insight disabled"
                );
                InsightProvider::Disabled
            }),
            Some("ollama") => ollama(),
            Some("none" | "off" | "disabled") => InsightProvider::Disabled,
            Some(other) => {
                tracing::warn!(value = other, "Unknown INSIGHT_PROVIDER; insight disabled");
                InsightProvider::Disabled
            }
        };

        let insight_timeout_secs = match parse_or(
            get("INSIGHT_TIMEOUT_SECS"),
            "INSIGHT_TIMEOUT_SECS",
            DEFAULT_INSIGHT_TIMEOUT_SECS,
        ) {
            0 => {
                tracing::warn!(
                    default = DEFAULT_INSIGHT_TIMEOUT_SECS,
                    "INSIGHT_TIMEOUT_SECS must be positive, using default"
                );
                DEFAULT_INSIGHT_TIMEOUT_SECS
            }
            secs => secs,
        };
        let insight_timeout = Duration::from_secs(insight_timeout_secs);
        let insight_max_retries = parse_or(
            get("INSIGHT_MAX_RETRIES"),
            "INSIGHT_MAX_RETRIES",
            DEFAULT_INSIGHT_MAX_RETRIES,
        );

        Self {
            story_file,
            endings,
            insight,
            insight_timeout,
            insight_max_retries,
            console_user: get("QUESTLINE_USER").unwrap_or_else(|| DEFAULT_USER.into()),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    value: Option<String>,
    key: &str,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Unparseable setting, using default");
            default
        }),
    }
}
