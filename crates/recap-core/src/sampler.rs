//! Bounded collection of caption fragments over one sampling window.
//!
//! A run is created with [`new_run`], which pairs the [`SamplerRun`] doing
//! the work with the caller's [`RunHandle`] cancellation capability. Each
//! run owns its fragment sequence; concurrent extractions are independent
//! pairs, never shared state.
//!
//! Two acquisition strategies sit behind the same contract:
//!
//! - [`SamplerRun::poll`] pauses playback and steps the position through
//!   the window tick by tick, sampling the surface after each seek. Original
//!   position and play state are restored on every exit path.
//! - [`SamplerRun::observe`] leaves playback running and records caption
//!   change notifications pushed by the surface until the window elapses.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep, sleep_until};

use crate::{
    CAPTION_SETTLE_MILLISECONDS, CaptionFragment, CaptionSurface, MediaTransport, SamplingWindow,
    Transcript, normalizer,
};

/// Terminal failures of an extraction run.
///
/// Both are detected before any fragment is collected and are never retried
/// internally; the caller decides on retry, backoff, or user messaging.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No caption-rendering region was present when sampling started.
    #[error("no caption surface found; captions may be disabled")]
    NoCaptionSurface,
    /// No playable media was found on the page.
    #[error("no playable media found on the page")]
    NoMediaSurface,
}

/// The raw outcome of a run: the ordered fragments plus whether the window
/// was fully covered (`complete == false` after mid-run cancellation).
#[derive(Debug, Clone)]
pub struct Sampled {
    pub fragments: Vec<CaptionFragment>,
    pub complete: bool,
}

impl Sampled {
    /// Normalizes the collected fragments into the run's transcript.
    pub fn into_transcript(self) -> Transcript {
        Transcript {
            text: normalizer::normalize_fragments(&self.fragments),
            complete: self.complete,
        }
    }
}

/// Caller-held cancellation capability for one run.
///
/// Cancelling ends the run at its next suspension point; the run still
/// performs its restoration guarantees and returns the fragments gathered
/// so far. Dropping the handle without cancelling lets the run finish.
#[derive(Debug)]
pub struct RunHandle {
    cancel_tx: watch::Sender<bool>,
}

impl RunHandle {
    pub fn cancel(&self) {
        // Receiver side may already be gone if the run finished.
        let _ = self.cancel_tx.send(true);
    }
}

/// One extraction run over a [`SamplingWindow`].
#[derive(Debug)]
pub struct SamplerRun {
    window: SamplingWindow,
    cancel_rx: watch::Receiver<bool>,
}

/// Creates a run for the given window together with its cancellation handle.
pub fn new_run(window: SamplingWindow) -> (SamplerRun, RunHandle) {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    (SamplerRun { window, cancel_rx }, RunHandle { cancel_tx })
}

/// Resolves once the paired [`RunHandle`] cancels. Never resolves if the
/// handle was dropped without cancelling.
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Scoped pause-and-restore around a polling run.
///
/// Acquiring records the current position and play state and pauses
/// playback; dropping restores both. Tying restoration to `Drop` makes it
/// hold on every exit path: completion, error, and cancellation alike.
struct TransportGuard<'a> {
    transport: &'a mut (dyn MediaTransport + Send),
    original_position: f64,
    was_playing: bool,
}

impl<'a> TransportGuard<'a> {
    fn acquire(transport: &'a mut (dyn MediaTransport + Send)) -> Self {
        let original_position = transport.position_seconds();
        let was_playing = transport.is_playing();
        if was_playing {
            transport.set_playing(false);
        }

        Self {
            transport,
            original_position,
            was_playing,
        }
    }

    fn seek_to(&mut self, seconds: f64) {
        self.transport.seek_to(seconds);
    }
}

impl Drop for TransportGuard<'_> {
    fn drop(&mut self) {
        self.transport.seek_to(self.original_position);
        if self.was_playing {
            self.transport.set_playing(true);
        }
    }
}

impl SamplerRun {
    /// Seek-driven acquisition: pauses playback, steps through the window
    /// at the tick cadence, and samples the surface after each jump once it
    /// has had [`CAPTION_SETTLE_MILLISECONDS`] to repaint.
    ///
    /// An uncancelled run yields exactly [`SamplingWindow::tick_count`]
    /// fragments, empty-text samples included. The transport is restored to
    /// its original position and play state before this returns, on every
    /// exit path.
    pub async fn poll(
        self,
        surface: &(dyn CaptionSurface + Sync),
        transport: &mut (dyn MediaTransport + Send),
    ) -> Result<Sampled, CaptureError> {
        if !surface.has_captions() {
            return Err(CaptureError::NoCaptionSurface);
        }
        if !transport.has_media() {
            return Err(CaptureError::NoMediaSurface);
        }

        let window = self.window;
        let mut cancel_rx = self.cancel_rx;
        let settle = Duration::from_millis(CAPTION_SETTLE_MILLISECONDS);

        let mut guard = TransportGuard::acquire(transport);
        let mut fragments = Vec::with_capacity(window.tick_count());
        let mut complete = true;

        for tick in 0..window.tick_count() {
            let position = window.start_seconds() + tick as f64 * window.tick_interval_seconds();
            guard.seek_to(position);

            tokio::select! {
                _ = sleep(settle) => {}
                _ = cancelled(&mut cancel_rx) => {
                    log::debug!("polling run cancelled after {} of {} ticks", tick, window.tick_count());
                    complete = false;
                    break;
                }
            }

            fragments.push(CaptionFragment {
                observed_at_seconds: position,
                text: surface.visible_text(),
            });
        }

        drop(guard);
        Ok(Sampled {
            fragments,
            complete,
        })
    }

    /// Notification-driven acquisition: playback keeps running and each
    /// caption change pushed on `events` is recorded as a fragment, stamped
    /// with the elapsed time since the run began.
    ///
    /// The run ends when the window duration elapses, when the event
    /// channel closes (the surface went away), or on cancellation.
    pub async fn observe(
        self,
        surface: &(dyn CaptionSurface + Sync),
        events: &mut mpsc::Receiver<String>,
    ) -> Result<Sampled, CaptureError> {
        if !surface.has_captions() {
            return Err(CaptureError::NoCaptionSurface);
        }

        let window = self.window;
        let mut cancel_rx = self.cancel_rx;
        let started = Instant::now();
        let deadline = started + window.duration();

        let mut fragments = Vec::new();
        let mut complete = true;

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                _ = cancelled(&mut cancel_rx) => {
                    log::debug!("observation run cancelled after {} fragment(s)", fragments.len());
                    complete = false;
                    break;
                }
                event = events.recv() => match event {
                    Some(text) => fragments.push(CaptionFragment {
                        observed_at_seconds: window.start_seconds()
                            + started.elapsed().as_secs_f64(),
                        text,
                    }),
                    // Surface disconnected; whatever was gathered stands.
                    None => break,
                },
            }
        }

        Ok(Sampled {
            fragments,
            complete,
        })
    }
}
