//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, and the message
//! dispatch loop that listens to host bridge requests.

use std::{sync::Arc, thread};

use recap_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::page::PageProvider;
use crate::state::State;

/// Initialize backend state and start processing host messages.
async fn setup_backend(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    page_provider: Arc<dyn PageProvider>,
) {
    let config = crate::config::load_config()
        .await
        .expect("failed to load config");

    let request_client = reqwest::Client::new();
    let state = Arc::new(RwLock::new(State {
        config,
        request_client,
        active_run: None,
    }));

    let context = Arc::new(AppContext {
        state,
        tx,
        page_provider,
    });
    context.consume_bridge_messages(rx).await;
}

/// Spawn the backend runtime and begin processing bridge messages.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    page_provider: Arc<dyn PageProvider>,
) {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async { setup_backend(rx, tx, page_provider).await });
    });
}
