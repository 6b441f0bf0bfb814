use serde::{Deserialize, Serialize};

/// Configuration for the caption sampling window applied when a request
/// does not specify its own values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// How much media time one extraction run covers, in seconds.
    pub default_duration_seconds: f64,
    /// Cadence between successive caption samples, in seconds.
    pub tick_interval_seconds: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_duration_seconds: 30.0,
            tick_interval_seconds: 1.0,
        }
    }
}

/// Configuration for the document summarization service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// Bearer token for the inference endpoint. Summarization requests are
    /// rejected with a user-facing error while this is unset.
    pub api_key: Option<String>,
    /// Inference endpoint receiving the transcript.
    pub endpoint: String,
    /// Upper bound on the generated summary length, in tokens.
    pub max_summary_length: u32,
    /// Lower bound on the generated summary length, in tokens.
    pub min_summary_length: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
                .to_string(),
            max_summary_length: 150,
            min_summary_length: 30,
        }
    }
}

/// Configuration for the translation service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Translation endpoint queried with `q` and `langpair` parameters.
    pub endpoint: String,
    /// Language the captions are assumed to be in.
    pub source_language: String,
    /// Target language used when a request does not name one.
    pub default_target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mymemory.translated.net/get".to_string(),
            source_language: "en".to_string(),
            default_target_language: "hi".to_string(),
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Defaults for the caption sampling window.
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Settings for the summarization service.
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    /// Settings for the translation service.
    #[serde(default)]
    pub translation: TranslationConfig,
}
