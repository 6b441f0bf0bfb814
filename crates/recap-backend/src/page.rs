//! The acquisition seam between the backend and a concrete media page.
//!
//! The backend never knows how captions are rendered or how the page is
//! reached; the host surface hands it a [`PageProvider`] and the transcript
//! service works against the handles it produces. Swapping the page
//! technology (remote relay RPC, an embedded webview, a test fixture) means
//! swapping the provider, nothing else.

use recap_core::{CaptionSurface, MediaTransport};
use tokio::sync::mpsc;

/// How caption text is acquired from the page, selecting the sampler
/// strategy used for a run.
pub enum Acquisition {
    /// The page supports direct seeking: playback is paused and the
    /// position is stepped through the window (polling strategy).
    Seek(Box<dyn MediaTransport + Send>),
    /// The page pushes caption-change notifications while playback keeps
    /// running (observation strategy).
    Notify(mpsc::Receiver<String>),
}

/// Everything one extraction run needs from the page.
pub struct PageHandles {
    /// Read access to the caption-rendering region. Shared by reference
    /// with the sampler while a run is in flight, so `Sync` is required.
    pub surface: Box<dyn CaptionSurface + Send + Sync>,
    /// The acquisition capability the page supports.
    pub acquisition: Acquisition,
}

/// Produces fresh page handles for each extraction run.
pub trait PageProvider: Send + Sync {
    fn connect(&self) -> PageHandles;
}
