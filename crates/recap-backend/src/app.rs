//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! responses and notifications back to the host bridge.

use std::sync::Arc;

use recap_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::page::PageProvider;
use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the host bridge.
    pub tx: Sender<MessageFromBackend>,
    /// Access to the media page captions are sampled from.
    pub page_provider: Arc<dyn PageProvider>,
}

impl AppContext {
    /// Read and dispatch messages from the host bridge until it closes.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a host message: {message:?}");
            self.dispatch_message(message).await;
        }
    }

    /// Dispatches the received message from the host surface down to
    /// individual service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::UpdateConfiguration(config) => {
                services::config_service::handle_update_configuration(self.clone(), config).await;
            }
            MessageToBackend::ExtractTranscriptRequest {
                duration_seconds,
                tick_interval_seconds,
            } => {
                services::transcript_service::handle_extract_transcript_request(
                    self.clone(),
                    duration_seconds,
                    tick_interval_seconds,
                )
                .await;
            }
            MessageToBackend::CancelExtractionRequest => {
                services::transcript_service::handle_cancel_request(self.clone()).await;
            }
            MessageToBackend::SummarizeRequest { transcript } => {
                services::summary_service::handle_summarize_request(self.clone(), transcript)
                    .await;
            }
            MessageToBackend::TranslateRequest {
                text,
                target_language,
            } => {
                services::translation_service::handle_translate_request(
                    self.clone(),
                    text,
                    target_language,
                )
                .await;
            }
        }
    }

    /// Send a message to the host bridge.
    pub async fn send(&self, message: MessageFromBackend) {
        self.tx
            .send(message)
            .await
            .expect("failed to send message to host surface");
    }

    /// Send a notification message to the host bridge.
    pub async fn send_notification(
        &self,
        notification_type: recap_bridge::notification::NotificationType,
        content: impl Into<String>,
    ) {
        self.send(MessageFromBackend::NotificationMessage(
            recap_bridge::notification::NotificationMessage {
                notification_type,
                message: content.into(),
            },
        ))
        .await;
    }
}
