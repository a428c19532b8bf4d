//! Application configuration (`config.toml`).
//!
//! Every field has a default so a missing or partial file is valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 1200;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 18;
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub language: LanguageConfig,
    pub fetcher: FetcherConfig,
    pub reveal: RevealConfig,
    pub location: LocationConfig,
    pub voice: VoiceConfig,
    pub escalation: EscalationConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    pub default: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Which fetcher implementation answers queries.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetcherMode {
    /// Keyword-matching stub behind an artificial delay
    #[default]
    Local,
    /// Multipart POST to a backend endpoint
    Remote,
}

impl std::str::FromStr for FetcherMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "mock" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown fetcher mode '{other}' (expected local or remote)")),
        }
    }
}

/// What the remote fetcher returns when the backend cannot answer.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// The standard apology message
    #[default]
    Apology,
    /// The local keyword answer (still flagged as an error)
    Local,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FetcherConfig {
    pub mode: FetcherMode,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub mock_latency_ms: u64,
    pub fallback: FallbackPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            mode: FetcherMode::Local,
            endpoint: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            fallback: FallbackPolicy::Apology,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    pub interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_REVEAL_INTERVAL_MS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Fixed coordinates; take precedence over `lookup_url`
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// HTTP endpoint returning `{"latitude": .., "longitude": ..}`
    pub lookup_url: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: DEFAULT_LOCATION_TIMEOUT_SECS,
            latitude: None,
            longitude: None,
            lookup_url: None,
        }
    }
}

/// External speech programs. `{lang}` in an argument is replaced by the language code.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct VoiceConfig {
    /// Command printing one transcript line to stdout
    pub input_command: Option<Vec<String>>,
    /// Command reading the text to speak from its last argument
    pub output_command: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EscalationConfig {
    pub address: Option<String>,
    pub subject: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            address: None,
            subject: "Farmer query needs expert review".to_string(),
        }
    }
}
