//! The media page seen through the extension relay.
//!
//! The backend's sampler works against the [`recap_core::CaptionSurface`]
//! and [`recap_core::MediaTransport`] traits; here they are implemented as
//! request/response RPC over the native-messaging stream. Each query gets a
//! fresh id, the reply router resolves it, and a bounded timeout keeps a
//! dead relay from wedging an extraction run — a page that stops answering
//! simply looks like a page with no captions and no media.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use recap_backend::page::{Acquisition, PageHandles, PageProvider};
use recap_core::{CaptionSurface, MediaTransport};
use tokio::sync::mpsc::UnboundedSender;

use crate::protocol::RelayEvent;

/// How long a page query may wait for the relay's reply.
const REPLY_TIMEOUT_MILLISECONDS: u64 = 1_000;

/// A snapshot of the page's caption and playback state, as reported by the
/// relay in a `pageState` frame.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub captions_present: bool,
    pub media_present: bool,
    pub visible_text: String,
    pub position_seconds: f64,
    pub playing: bool,
}

/// A resolved page RPC reply.
#[derive(Debug)]
pub enum PageReply {
    State(PageSnapshot),
    Ack,
}

/// Correlates outbound page queries with inbound relay replies.
#[derive(Clone)]
pub struct PageRpc {
    outbound: UnboundedSender<RelayEvent>,
    pending: Arc<Mutex<HashMap<u64, mpsc::Sender<PageReply>>>>,
    next_id: Arc<AtomicU64>,
}

impl PageRpc {
    pub fn new(outbound: UnboundedSender<RelayEvent>) -> Self {
        Self {
            outbound,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Routes an inbound reply to the query waiting for it. Replies with an
    /// unknown id (e.g., arriving after their query timed out) are dropped.
    pub fn resolve(&self, id: u64, reply: PageReply) {
        let waiter = self
            .pending
            .lock()
            .expect("page RPC registry lock poisoned")
            .remove(&id);
        match waiter {
            // The waiter may have timed out between removal and send.
            Some(reply_tx) => {
                let _ = reply_tx.send(reply);
            }
            None => log::debug!("Dropping page reply with unknown id {id}"),
        }
    }

    /// Sends one query frame and blocks for its reply, up to the timeout.
    fn request(&self, build: impl FnOnce(u64) -> RelayEvent) -> Option<PageReply> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = mpsc::channel();
        self.pending
            .lock()
            .expect("page RPC registry lock poisoned")
            .insert(id, reply_tx);

        if self.outbound.send(build(id)).is_err() {
            log::error!("Relay writer is gone; page query {id} not sent");
            self.pending
                .lock()
                .expect("page RPC registry lock poisoned")
                .remove(&id);
            return None;
        }

        match reply_rx.recv_timeout(Duration::from_millis(REPLY_TIMEOUT_MILLISECONDS)) {
            Ok(reply) => Some(reply),
            Err(_) => {
                log::warn!("Page query {id} received no reply within the timeout");
                self.pending
                    .lock()
                    .expect("page RPC registry lock poisoned")
                    .remove(&id);
                None
            }
        }
    }

    fn snapshot(&self) -> PageSnapshot {
        match self.request(|id| RelayEvent::QueryPage { id }) {
            Some(PageReply::State(snapshot)) => snapshot,
            // An unresponsive relay reads as an absent page.
            _ => PageSnapshot::default(),
        }
    }
}

/// The active media page, reached over the relay connection.
pub struct RelayPage {
    rpc: PageRpc,
}

impl CaptionSurface for RelayPage {
    fn has_captions(&self) -> bool {
        self.rpc.snapshot().captions_present
    }

    fn visible_text(&self) -> String {
        self.rpc.snapshot().visible_text
    }
}

impl MediaTransport for RelayPage {
    fn has_media(&self) -> bool {
        self.rpc.snapshot().media_present
    }

    fn position_seconds(&self) -> f64 {
        self.rpc.snapshot().position_seconds
    }

    fn seek_to(&mut self, seconds: f64) {
        let _ = self.rpc.request(|id| RelayEvent::Seek { id, seconds });
    }

    fn is_playing(&self) -> bool {
        self.rpc.snapshot().playing
    }

    fn set_playing(&mut self, playing: bool) {
        let _ = self.rpc.request(|id| RelayEvent::SetPlaying { id, playing });
    }
}

/// Produces relay-backed page handles. The relayed page supports direct
/// seeking, so extraction runs use the polling strategy.
pub struct RelayPageProvider {
    rpc: PageRpc,
}

impl RelayPageProvider {
    pub fn new(rpc: PageRpc) -> Self {
        Self { rpc }
    }
}

impl PageProvider for RelayPageProvider {
    fn connect(&self) -> PageHandles {
        PageHandles {
            surface: Box::new(RelayPage {
                rpc: self.rpc.clone(),
            }),
            acquisition: Acquisition::Seek(Box::new(RelayPage {
                rpc: self.rpc.clone(),
            })),
        }
    }
}
