//! Native-messaging wire protocol between the host and the extension relay.
//!
//! Frames follow the Chrome native messaging convention: a 4-byte
//! little-endian payload length followed by a UTF-8 JSON document. The relay
//! sends [`RelayCommand`]s on stdin; the host answers with [`RelayEvent`]s
//! on stdout. Page RPC messages (`queryPage`/`pageState`, `seek`,
//! `setPlaying`/`ack`) share the same stream, correlated by `id`.

use std::io::{self, Read, Write};

use recap_bridge::config::Config;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Upper bound on a single inbound frame. Anything larger is treated as a
/// corrupt stream rather than buffered.
pub const MAX_FRAME_BYTES: u32 = 1024 * 1024;

/// Messages the extension relay sends to the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RelayCommand {
    /// Fetch the current configuration.
    GetConfig,
    /// Replace and persist the configuration.
    SetConfig { config: Config },
    /// Sample captions from the active page and produce a transcript.
    GetTranscript {
        duration_seconds: Option<f64>,
        tick_interval_seconds: Option<f64>,
    },
    /// Cancel the extraction currently in flight.
    CancelTranscript,
    /// Summarize the given transcript text.
    Summarize { transcript: String },
    /// Translate the given text into the target language.
    Translate {
        text: String,
        target_language: String,
    },
    /// Reply to a `queryPage` request: a snapshot of the page's caption and
    /// playback state.
    PageState {
        id: u64,
        captions_present: bool,
        media_present: bool,
        visible_text: String,
        position_seconds: f64,
        playing: bool,
    },
    /// Reply to a `seek` or `setPlaying` request.
    Ack { id: u64 },
}

/// Messages the host sends to the extension relay.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RelayEvent {
    /// The current configuration.
    Config { config: Config },
    /// The transcript produced by a finished (or cancelled) extraction run.
    Transcript { text: String, complete: bool },
    /// The summary returned by the summarization service.
    Summary { summary: String },
    /// The translation returned by the translation service.
    Translation {
        translated: String,
        target_language: String,
    },
    /// A user-facing notification.
    Notification {
        level: &'static str,
        message: String,
    },
    /// Ask the relay for a snapshot of the page state.
    QueryPage { id: u64 },
    /// Ask the relay to move playback to the given position.
    Seek { id: u64, seconds: f64 },
    /// Ask the relay to resume or pause playback.
    SetPlaying { id: u64, playing: bool },
}

/// Reads one length-prefixed JSON frame. Returns `Ok(None)` on a clean EOF
/// before the length prefix, i.e. the relay hung up.
pub fn read_frame<T: DeserializeOwned>(reader: &mut impl Read) -> io::Result<Option<T>> {
    let mut length_bytes = [0u8; 4];
    match reader.read_exact(&mut length_bytes) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }

    let length = u32::from_le_bytes(length_bytes);
    if length > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {length} bytes exceeds the {MAX_FRAME_BYTES} byte limit"),
        ));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload)?;

    match serde_json::from_slice(&payload) {
        Ok(message) => Ok(Some(message)),
        Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

/// Writes one length-prefixed JSON frame and flushes, so the relay never
/// waits on a partially buffered message.
pub fn write_frame<T: Serialize>(writer: &mut impl Write, message: &T) -> io::Result<()> {
    let payload = serde_json::to_vec(message)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn frames_round_trip() {
        let event = RelayEvent::Seek {
            id: 7,
            seconds: 42.5,
        };

        let mut buffer = Vec::new();
        write_frame(&mut buffer, &event).unwrap();

        let mut cursor = Cursor::new(buffer);
        let parsed: serde_json::Value = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(parsed["type"], "seek");
        assert_eq!(parsed["id"], 7);
        assert_eq!(parsed["seconds"], 42.5);

        // Nothing left on the stream.
        let done: Option<serde_json::Value> = read_frame(&mut cursor).unwrap();
        assert!(done.is_none());
    }

    #[test]
    fn parses_relay_commands_by_tag() {
        let payload = br#"{"type":"getTranscript","durationSeconds":20.0}"#;
        let mut frame = (payload.len() as u32).to_le_bytes().to_vec();
        frame.extend_from_slice(payload);

        let command: RelayCommand = read_frame(&mut Cursor::new(frame)).unwrap().unwrap();
        match command {
            RelayCommand::GetTranscript {
                duration_seconds,
                tick_interval_seconds,
            } => {
                assert_eq!(duration_seconds, Some(20.0));
                assert_eq!(tick_interval_seconds, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let mut frame = (MAX_FRAME_BYTES + 1).to_le_bytes().to_vec();
        frame.extend_from_slice(b"{}");

        let result: io::Result<Option<serde_json::Value>> = read_frame(&mut Cursor::new(frame));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_streams_surface_an_error() {
        // Length prefix promises more bytes than follow.
        let mut frame = 16u32.to_le_bytes().to_vec();
        frame.extend_from_slice(b"{}");

        let result: io::Result<Option<serde_json::Value>> = read_frame(&mut Cursor::new(frame));
        assert!(result.is_err());
    }
}
