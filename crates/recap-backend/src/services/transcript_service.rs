use recap_bridge::MessageFromBackend;
use recap_bridge::notification::NotificationType;
use recap_core::sampler::{self, CaptureError, SamplerRun};
use recap_core::{SamplingWindow, Transcript};

use crate::page::{Acquisition, PageHandles};
use crate::state::ActiveRun;

/// Handles an incoming transcript extraction request (see
/// [`recap_bridge::MessageToBackend::ExtractTranscriptRequest`]).
///
/// Any run already in flight is cancelled and awaited first, so its
/// transport restoration has finished before the new run touches the page.
/// The sampling itself happens on a spawned task, keeping the dispatch loop
/// responsive to cancellation requests.
pub async fn handle_extract_transcript_request(
    context: super::AppContextHandle,
    duration_seconds: Option<f64>,
    tick_interval_seconds: Option<f64>,
) {
    let sampling = {
        let state = context.state.read().await;
        state.config.sampling.clone()
    };
    let duration = duration_seconds.unwrap_or(sampling.default_duration_seconds);
    let tick = tick_interval_seconds.unwrap_or(sampling.tick_interval_seconds);

    if let Some(previous) = context.state.write().await.active_run.take() {
        log::info!("Tearing down the previous extraction run before starting a new one");
        previous.handle.cancel();
        if let Err(err) = previous.task.await {
            log::error!("Previous extraction task failed: {err}");
        }
    }

    let mut page = context.page_provider.connect();

    // The run starts wherever playback currently is, like a viewer asking
    // "summarize the next N seconds".
    let start = match &page.acquisition {
        Acquisition::Seek(transport) => transport.position_seconds(),
        Acquisition::Notify(_) => 0.0,
    };

    let window = match SamplingWindow::new(start, duration, tick) {
        Ok(window) => window,
        Err(err) => {
            log::error!("Rejected extraction request: {err}");
            context
                .send_notification(NotificationType::Error, err.to_string())
                .await;
            return;
        }
    };

    log::info!(
        "Sampling captions for {:.1}s starting at {:.1}s (tick {:.2}s)",
        window.duration_seconds(),
        window.start_seconds(),
        window.tick_interval_seconds(),
    );

    let (run, handle) = sampler::new_run(window);

    // Page calls block while a relay reply is outstanding, so the run lives
    // on a blocking thread and drives its timers through the runtime handle
    // instead of occupying an async worker.
    let runtime = tokio::runtime::Handle::current();
    let task_context = context.clone();
    let task = tokio::task::spawn_blocking(move || {
        runtime.block_on(async move {
            let outcome = run_extraction(run, &mut page).await;
            task_context.state.write().await.active_run = None;

            match outcome {
                Ok(transcript) => {
                    if !transcript.complete {
                        log::info!("Extraction was cancelled; returning the partial transcript");
                    }
                    task_context
                        .send(MessageFromBackend::TranscriptResponse {
                            text: transcript.text,
                            complete: transcript.complete,
                        })
                        .await;
                }
                Err(err) => {
                    log::error!("Extraction failed: {err}");
                    task_context
                        .send_notification(NotificationType::Error, err.to_string())
                        .await;
                }
            }
        })
    });

    context.state.write().await.active_run = Some(ActiveRun { handle, task });
}

/// Drives the sampler strategy matching the page's acquisition capability
/// and normalizes the result.
async fn run_extraction(
    run: SamplerRun,
    page: &mut PageHandles,
) -> Result<Transcript, CaptureError> {
    let sampled = match &mut page.acquisition {
        Acquisition::Seek(transport) => run.poll(page.surface.as_ref(), transport.as_mut()).await?,
        Acquisition::Notify(events) => run.observe(page.surface.as_ref(), events).await?,
    };

    Ok(sampled.into_transcript())
}

/// Handles a cancellation request for the extraction run currently in
/// flight. Cancelling when nothing runs is not an error.
///
/// Waits for the cancelled task to finish so the page is back in its
/// original state by the time the partial transcript goes out.
pub async fn handle_cancel_request(context: super::AppContextHandle) {
    match context.state.write().await.active_run.take() {
        Some(active) => {
            log::info!("Cancelling the active extraction run");
            active.handle.cancel();
            if let Err(err) = active.task.await {
                log::error!("Extraction task failed during cancellation: {err}");
            }
        }
        None => log::debug!("No active extraction run to cancel"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use recap_bridge::config::Config;
    use recap_core::{CaptionSurface, MediaTransport};
    use tokio::sync::{RwLock, mpsc};

    use super::*;
    use crate::app::AppContext;
    use crate::page::PageProvider;
    use crate::state::State;

    struct ScriptedSurface {
        present: bool,
        line: &'static str,
    }

    impl CaptionSurface for ScriptedSurface {
        fn has_captions(&self) -> bool {
            self.present
        }

        fn visible_text(&self) -> String {
            self.line.to_string()
        }
    }

    struct ScriptedTransport {
        position: f64,
        playing: bool,
    }

    impl MediaTransport for ScriptedTransport {
        fn has_media(&self) -> bool {
            true
        }

        fn position_seconds(&self) -> f64 {
            self.position
        }

        fn seek_to(&mut self, seconds: f64) {
            self.position = seconds;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn set_playing(&mut self, playing: bool) {
            self.playing = playing;
        }
    }

    fn window(duration: f64) -> SamplingWindow {
        SamplingWindow::new(0.0, duration, 1.0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn seek_pages_run_the_polling_strategy() {
        let mut page = PageHandles {
            surface: Box::new(ScriptedSurface {
                present: true,
                line: "same line every tick",
            }),
            acquisition: Acquisition::Seek(Box::new(ScriptedTransport {
                position: 12.0,
                playing: true,
            })),
        };
        let (run, _handle) = sampler::new_run(window(3.0));

        let transcript = run_extraction(run, &mut page).await.unwrap();

        assert!(transcript.complete);
        assert_eq!(transcript.text, "same line every tick");
    }

    #[tokio::test(start_paused = true)]
    async fn notify_pages_run_the_observation_strategy() {
        let (events_tx, events_rx) = mpsc::channel(8);
        let mut page = PageHandles {
            surface: Box::new(ScriptedSurface {
                present: true,
                line: "",
            }),
            acquisition: Acquisition::Notify(events_rx),
        };

        events_tx.send("observed words".to_string()).await.unwrap();
        events_tx.send("observed again".to_string()).await.unwrap();
        drop(events_tx);

        let (run, _handle) = sampler::new_run(window(5.0));
        let transcript = run_extraction(run, &mut page).await.unwrap();

        assert!(transcript.complete);
        assert_eq!(transcript.text, "observed words again");
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_runs_on_a_spawned_task() {
        let mut page = PageHandles {
            surface: Box::new(ScriptedSurface {
                present: true,
                line: "spawned words",
            }),
            acquisition: Acquisition::Seek(Box::new(ScriptedTransport {
                position: 0.0,
                playing: false,
            })),
        };
        let (run, _handle) = sampler::new_run(window(2.0));

        let transcript = tokio::spawn(async move { run_extraction(run, &mut page).await })
            .await
            .unwrap()
            .unwrap();

        assert!(transcript.complete);
        assert_eq!(transcript.text, "spawned words");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_surface_surfaces_the_capture_error() {
        let mut page = PageHandles {
            surface: Box::new(ScriptedSurface {
                present: false,
                line: "",
            }),
            acquisition: Acquisition::Seek(Box::new(ScriptedTransport {
                position: 0.0,
                playing: false,
            })),
        };
        let (run, _handle) = sampler::new_run(window(3.0));

        let error = run_extraction(run, &mut page).await.unwrap_err();
        assert!(matches!(error, CaptureError::NoCaptionSurface));
    }

    /// A playback deck shared by every page the provider connects, so the
    /// interleaving of two consecutive runs is observable.
    #[derive(Debug)]
    struct PlayerLog {
        events: Vec<String>,
        position: f64,
        playing: bool,
    }

    struct SharedPlayer {
        log: Arc<Mutex<PlayerLog>>,
    }

    impl MediaTransport for SharedPlayer {
        fn has_media(&self) -> bool {
            true
        }

        fn position_seconds(&self) -> f64 {
            self.log.lock().unwrap().position
        }

        fn seek_to(&mut self, seconds: f64) {
            let mut log = self.log.lock().unwrap();
            log.position = seconds;
            log.events.push(format!("seek {seconds}"));
        }

        fn is_playing(&self) -> bool {
            self.log.lock().unwrap().playing
        }

        fn set_playing(&mut self, playing: bool) {
            let mut log = self.log.lock().unwrap();
            log.playing = playing;
            log.events
                .push(if playing { "resume" } else { "pause" }.to_string());
        }
    }

    struct SharedPlayerProvider {
        log: Arc<Mutex<PlayerLog>>,
    }

    impl PageProvider for SharedPlayerProvider {
        fn connect(&self) -> PageHandles {
            PageHandles {
                surface: Box::new(ScriptedSurface {
                    present: true,
                    line: "shared words",
                }),
                acquisition: Acquisition::Seek(Box::new(SharedPlayer {
                    log: self.log.clone(),
                })),
            }
        }
    }

    fn test_context(
        provider: Arc<dyn PageProvider>,
    ) -> (Arc<AppContext>, mpsc::Receiver<MessageFromBackend>) {
        let (tx, rx) = mpsc::channel(8);
        let state = State {
            config: Config::default(),
            request_client: reqwest::Client::new(),
            active_run: None,
        };
        (
            Arc::new(AppContext {
                state: Arc::new(RwLock::new(state)),
                tx,
                page_provider: provider,
            }),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_run_starts_only_after_the_previous_one_restored_the_page() {
        let log = Arc::new(Mutex::new(PlayerLog {
            events: Vec::new(),
            position: 10.0,
            playing: true,
        }));
        let (context, mut responses) =
            test_context(Arc::new(SharedPlayerProvider { log: log.clone() }));

        handle_extract_transcript_request(context.clone(), Some(3600.0), Some(1.0)).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle_extract_transcript_request(context.clone(), Some(2.0), Some(1.0)).await;

        let second_run = context.state.write().await.active_run.take().unwrap();
        second_run.task.await.unwrap();

        // The first run's restoration (resume) must come before the second
        // run's pause; any interleaving means the old guard fired on top of
        // the new run's seeks.
        let events = log.lock().unwrap().events.clone();
        let first_resume = events
            .iter()
            .position(|event| event == "resume")
            .expect("first run never resumed playback");
        let second_pause = events
            .iter()
            .enumerate()
            .filter(|(_, event)| *event == "pause")
            .map(|(index, _)| index)
            .nth(1)
            .expect("second run never paused playback");
        assert!(first_resume < second_pause, "events: {events:?}");

        // Both runs put the deck back where the viewer left it.
        {
            let log = log.lock().unwrap();
            assert_eq!(log.position, 10.0);
            assert!(log.playing);
        }

        let first = responses.recv().await.unwrap();
        assert!(matches!(
            first,
            MessageFromBackend::TranscriptResponse { complete: false, .. }
        ));
        let second = responses.recv().await.unwrap();
        assert!(matches!(
            second,
            MessageFromBackend::TranscriptResponse { complete: true, .. }
        ));
    }
}
