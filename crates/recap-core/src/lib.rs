//! Caption sampling and transcript normalization primitives.
//!
//! This crate turns a stream of overlapping, possibly duplicated on-screen
//! caption fragments into a single clean transcript string. It provides the
//! data model for one extraction run (a [`SamplingWindow`] producing
//! [`CaptionFragment`]s), the capability traits a host page must implement
//! ([`CaptionSurface`], [`MediaTransport`]), the bounded sampling loop
//! ([`sampler`]), and the deterministic cleanup pass ([`normalizer`]).

pub mod normalizer;
pub mod sampler;

use std::time::Duration;

/// How long the sampler waits after a seek for the caption surface to
/// repaint before reading its text, in milliseconds.
///
/// Caption renderers update asynchronously after a position change; reading
/// immediately after the seek would observe the previous cue. A longer wait
/// makes a run slower, a shorter one risks sampling stale text.
pub const CAPTION_SETTLE_MILLISECONDS: u64 = 100;

/// Upper bound on the number of samples one run may take.
///
/// Window parameters arrive from the host's peers, so `duration / tick` on
/// hostile values can reach any magnitude; allocations and loop bounds are
/// sized from it. 10 000 one-second ticks covers almost three hours of
/// media, well past any sensible extraction request.
pub const MAX_TICKS_PER_RUN: usize = 10_000;

/// One timestamped sample of the currently visible caption text.
///
/// Produced once per sampling tick. `text` may be empty (nothing captioned
/// at that instant) or a verbatim repeat of the previous tick (cues persist
/// on screen across ticks); the [`normalizer`] is responsible for cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFragment {
    /// Media position at which the text was observed, in seconds.
    pub observed_at_seconds: f64,
    /// Raw caption text visible at that instant.
    pub text: String,
}

/// Errors raised when constructing an invalid [`SamplingWindow`].
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// The requested window duration was zero or negative.
    #[error("sampling window duration must be positive, got {0}")]
    NonPositiveDuration(f64),
    /// The requested tick interval was zero or negative.
    #[error("sampling tick interval must be positive, got {0}")]
    NonPositiveTick(f64),
    /// The window would need more samples than one run may take.
    #[error("sampling window needs {0} samples, over the per-run limit")]
    TooManyTicks(f64),
}

/// The bounded time span and cadence over which caption fragments are
/// collected for one extraction run.
///
/// Construction validates the invariants (`duration_seconds > 0`,
/// `tick_interval_seconds > 0`), so every existing window is usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingWindow {
    start_seconds: f64,
    duration_seconds: f64,
    tick_interval_seconds: f64,
}

impl SamplingWindow {
    pub fn new(
        start_seconds: f64,
        duration_seconds: f64,
        tick_interval_seconds: f64,
    ) -> Result<Self, WindowError> {
        if duration_seconds <= 0.0 || !duration_seconds.is_finite() {
            return Err(WindowError::NonPositiveDuration(duration_seconds));
        }
        if tick_interval_seconds <= 0.0 || !tick_interval_seconds.is_finite() {
            return Err(WindowError::NonPositiveTick(tick_interval_seconds));
        }
        let ticks = (duration_seconds / tick_interval_seconds).ceil();
        if ticks > MAX_TICKS_PER_RUN as f64 {
            return Err(WindowError::TooManyTicks(ticks));
        }

        Ok(Self {
            start_seconds,
            duration_seconds,
            tick_interval_seconds,
        })
    }

    /// Media position at which sampling begins, in seconds.
    pub fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    /// Total span of media time covered by the run, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Cadence between successive samples, in seconds.
    pub fn tick_interval_seconds(&self) -> f64 {
        self.tick_interval_seconds
    }

    /// Wall-clock duration of the whole window.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    /// Number of samples an uncancelled run produces: `ceil(duration / tick)`.
    /// At most [`MAX_TICKS_PER_RUN`], enforced at construction.
    pub fn tick_count(&self) -> usize {
        (self.duration_seconds / self.tick_interval_seconds).ceil() as usize
    }
}

/// The final transcript produced from one run's fragments.
///
/// Owned by the caller that requested extraction; the normalizer retains
/// nothing. An empty `text` is a valid outcome meaning "nothing captioned
/// during the window" — whether that is an error is the caller's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Deduplicated, whitespace-normalized caption text.
    pub text: String,
    /// `false` when the run was cancelled mid-window and the transcript
    /// covers only the fragments collected up to that point.
    pub complete: bool,
}

/// Read access to the on-screen region where timed captions are rendered.
///
/// Implementations live outside this crate (a DOM bridge, a remote page
/// connection, a test fixture); the sampler only requires this contract.
pub trait CaptionSurface {
    /// Whether a caption-rendering region is currently present at all.
    fn has_captions(&self) -> bool;

    /// The caption text currently displayed. Empty when nothing is on
    /// screen at this instant.
    fn visible_text(&self) -> String;
}

/// Playback position and play/pause control for the media being captioned.
pub trait MediaTransport {
    /// Whether playable media is present on the page.
    fn has_media(&self) -> bool;

    /// Current playback position, in seconds.
    fn position_seconds(&self) -> f64;

    /// Moves playback to the given position, in seconds.
    fn seek_to(&mut self, seconds: f64);

    /// Whether the media is currently playing (not paused).
    fn is_playing(&self) -> bool;

    /// Resumes (`true`) or pauses (`false`) playback.
    fn set_playing(&mut self, playing: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_duration() {
        assert!(matches!(
            SamplingWindow::new(0.0, 0.0, 1.0),
            Err(WindowError::NonPositiveDuration(_))
        ));
        assert!(matches!(
            SamplingWindow::new(0.0, -2.0, 1.0),
            Err(WindowError::NonPositiveDuration(_))
        ));
    }

    #[test]
    fn rejects_non_positive_tick_interval() {
        assert!(matches!(
            SamplingWindow::new(0.0, 5.0, 0.0),
            Err(WindowError::NonPositiveTick(_))
        ));
    }

    #[test]
    fn rejects_windows_with_excessive_tick_counts() {
        assert!(matches!(
            SamplingWindow::new(0.0, 1.0e18, 1.0e-9),
            Err(WindowError::TooManyTicks(_))
        ));

        // The limit itself is still accepted.
        assert!(SamplingWindow::new(0.0, MAX_TICKS_PER_RUN as f64, 1.0).is_ok());
        assert!(matches!(
            SamplingWindow::new(0.0, MAX_TICKS_PER_RUN as f64 + 1.0, 1.0),
            Err(WindowError::TooManyTicks(_))
        ));
    }

    #[test]
    fn tick_count_rounds_up() {
        let window = SamplingWindow::new(0.0, 3.0, 1.0).unwrap();
        assert_eq!(window.tick_count(), 3);

        let window = SamplingWindow::new(0.0, 3.5, 1.0).unwrap();
        assert_eq!(window.tick_count(), 4);

        let window = SamplingWindow::new(0.0, 0.5, 1.0).unwrap();
        assert_eq!(window.tick_count(), 1);
    }
}
