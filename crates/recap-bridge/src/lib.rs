//! Communication bridge between the host surface and the backend.
//!
//! This crate defines the types and protocols used to connect the
//! native-messaging host surface with an asynchronous backend responsible
//! for caption extraction, summarization, translation, and configuration.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The host surface sends commands (e.g., extract a transcript,
//!   summarize it, request config).
//! - The backend pushes events (e.g., the finished transcript,
//!   notifications, API responses).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns. Each command produces exactly one terminal
//! response or error notification; deduplicating repeated delivery from the
//! transport above this layer is the relay's responsibility.

pub mod config;
pub mod notification;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the host surface of state
/// updates.
///
/// These are typically sent in response to commands or to push asynchronous
/// outcomes (e.g., a transcript that finished sampling, notifications).
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Generic message for all notifications in the application.
    NotificationMessage(notification::NotificationMessage),
    /// Response to the configuration request from the host surface.
    ConfigurationResponse(config::Config),
    /// The transcript produced by a finished (or cancelled) extraction run.
    TranscriptResponse {
        /// Deduplicated, whitespace-normalized caption text.
        text: String,
        /// `false` when the run was cancelled and the text is partial.
        complete: bool,
    },
    /// The summary returned by the summarization service.
    SummaryResponse { summary: String },
    /// The translation returned by the translation service.
    TranslationResponse {
        translated: String,
        target_language: String,
    },
}

/// Commands issued by the host surface to control or query the backend.
///
/// These messages drive the core functionality of the application.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Request to replace and persist the application configuration.
    UpdateConfiguration(config::Config),
    /// Request to sample captions from the active page and produce a
    /// transcript. Omitted fields fall back to the configured defaults.
    ExtractTranscriptRequest {
        duration_seconds: Option<f64>,
        tick_interval_seconds: Option<f64>,
    },
    /// Request to cancel the extraction run currently in flight, if any.
    CancelExtractionRequest,
    /// Request to summarize the given transcript text.
    SummarizeRequest { transcript: String },
    /// Request to translate the given text into the target language.
    TranslateRequest {
        text: String,
        target_language: String,
    },
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// the host surface and the backend.
pub struct BridgeChannels {
    /// Receiver used by the host surface to get messages from the backend.
    pub host_rx: Receiver<MessageFromBackend>,
    /// Sender used by the host surface to send commands to the backend.
    pub host_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the host surface.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the host.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_host_tx, to_host_rx) = mpsc::channel(buffer);
        Self {
            host_tx: to_backend_tx,
            host_rx: to_host_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_host_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
