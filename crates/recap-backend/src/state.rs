/// The core application state that holds configuration and other shared
/// resources.
///
/// This struct contains all the data that needs to be shared across async
/// tasks in the application.
///
/// It is designed to be wrapped in thread-safe, async-friendly concurrency
/// primitives (see [`SharedState`]) to allow safe concurrent reads and
/// occasional writes from multiple tasks.
#[derive(Debug)]
pub struct State {
    /// The loaded application configuration.
    pub config: recap_bridge::config::Config,
    /// Shared HTTP client for making efficient, pooled requests.
    pub request_client: reqwest::Client,
    /// The extraction run currently in flight, if any. At most one run is
    /// active at a time; starting a new one tears this down first.
    pub active_run: Option<ActiveRun>,
}

/// An extraction run in flight: the cancellation handle plus the join
/// handle of the task driving it.
///
/// Teardown must cancel AND await the task before another run touches the
/// page, so that the old run's transport restoration has finished and
/// cannot land on top of the new run's seeks.
#[derive(Debug)]
pub struct ActiveRun {
    pub handle: recap_core::sampler::RunHandle,
    pub task: tokio::task::JoinHandle<()>,
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
///
/// This is the recommended way to pass state into async handlers, background
/// tasks, or any context where multiple tasks need read access (and occasional
/// write access).
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
