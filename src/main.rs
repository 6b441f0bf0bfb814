mod page;
mod protocol;

use std::io;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use recap_bridge::{BridgeChannels, MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender, UnboundedReceiver, UnboundedSender};

use crate::page::{PageReply, PageRpc, PageSnapshot, RelayPageProvider};
use crate::protocol::{RelayCommand, RelayEvent};

fn main() -> anyhow::Result<()> {
    // stdout belongs to the native-messaging stream; logs go to stderr.
    simple_logger::SimpleLogger::new()
        .with_colors(false)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    let channels = BridgeChannels::default();
    let (outbound_tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();

    let rpc = PageRpc::new(outbound_tx.clone());
    let provider = Arc::new(RelayPageProvider::new(rpc.clone()));
    recap_backend::run(channels.backend_rx, channels.backend_tx, provider);

    // Single writer owns stdout; everything outbound funnels through it.
    thread::spawn(move || write_loop(outbound_rx));
    thread::spawn(move || event_pump(channels.host_rx, outbound_tx));

    read_loop(channels.host_tx, rpc);
    log::info!("Relay disconnected; shutting down");
    Ok(())
}

/// Routes inbound relay frames until the stream closes: page replies go to
/// the RPC registry, commands go over the bridge to the backend.
fn read_loop(to_backend: Sender<MessageToBackend>, rpc: PageRpc) {
    let mut stdin = io::stdin().lock();
    loop {
        let frame: io::Result<Option<RelayCommand>> = protocol::read_frame(&mut stdin);
        let command = match frame {
            Ok(Some(command)) => command,
            Ok(None) => break,
            Err(err) => {
                log::error!("Relay stream is unreadable: {err}");
                break;
            }
        };

        let message = match command {
            RelayCommand::PageState {
                id,
                captions_present,
                media_present,
                visible_text,
                position_seconds,
                playing,
            } => {
                rpc.resolve(
                    id,
                    PageReply::State(PageSnapshot {
                        captions_present,
                        media_present,
                        visible_text,
                        position_seconds,
                        playing,
                    }),
                );
                continue;
            }
            RelayCommand::Ack { id } => {
                rpc.resolve(id, PageReply::Ack);
                continue;
            }
            RelayCommand::GetConfig => MessageToBackend::ConfigurationRequest,
            RelayCommand::SetConfig { config } => MessageToBackend::UpdateConfiguration(config),
            RelayCommand::GetTranscript {
                duration_seconds,
                tick_interval_seconds,
            } => MessageToBackend::ExtractTranscriptRequest {
                duration_seconds,
                tick_interval_seconds,
            },
            RelayCommand::CancelTranscript => MessageToBackend::CancelExtractionRequest,
            RelayCommand::Summarize { transcript } => {
                MessageToBackend::SummarizeRequest { transcript }
            }
            RelayCommand::Translate {
                text,
                target_language,
            } => MessageToBackend::TranslateRequest {
                text,
                target_language,
            },
        };

        if to_backend.blocking_send(message).is_err() {
            log::error!("Backend is gone; stopping the relay router");
            break;
        }
    }
}

/// Forwards backend events to the relay as outbound frames.
fn event_pump(mut from_backend: Receiver<MessageFromBackend>, outbound: UnboundedSender<RelayEvent>) {
    while let Some(message) = from_backend.blocking_recv() {
        let event = match message {
            MessageFromBackend::NotificationMessage(notification) => RelayEvent::Notification {
                level: notification.notification_type.as_str(),
                message: notification.message,
            },
            MessageFromBackend::ConfigurationResponse(config) => RelayEvent::Config { config },
            MessageFromBackend::TranscriptResponse { text, complete } => {
                RelayEvent::Transcript { text, complete }
            }
            MessageFromBackend::SummaryResponse { summary } => RelayEvent::Summary { summary },
            MessageFromBackend::TranslationResponse {
                translated,
                target_language,
            } => RelayEvent::Translation {
                translated,
                target_language,
            },
        };

        if outbound.send(event).is_err() {
            break;
        }
    }
}

/// Serializes every outbound frame onto stdout.
fn write_loop(mut outbound_rx: UnboundedReceiver<RelayEvent>) {
    let mut stdout = io::stdout().lock();
    while let Some(event) = outbound_rx.blocking_recv() {
        if let Err(err) = protocol::write_frame(&mut stdout, &event) {
            log::error!("Failed to write a frame to the relay: {err}");
            break;
        }
    }
}
