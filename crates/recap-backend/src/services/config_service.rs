use recap_bridge::MessageFromBackend;
use recap_bridge::config::Config;
use recap_bridge::notification::NotificationType;

/// Handles an incoming configuration request (see
/// [`recap_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request(context: super::AppContextHandle) {
    let config = {
        let state = context.state.read().await;
        state.config.clone()
    };
    context
        .send(MessageFromBackend::ConfigurationResponse(config))
        .await;
}

/// Handles a configuration update and persists it to disk, so API keys and
/// sampling defaults are remembered across runs.
pub async fn handle_update_configuration(context: super::AppContextHandle, config: Config) {
    match crate::config::save_config(&config).await {
        Ok(()) => {
            {
                let mut state = context.state.write().await;
                state.config = config.clone();
            }
            context
                .send(MessageFromBackend::ConfigurationResponse(config))
                .await;
            context
                .send_notification(NotificationType::Success, "Configuration saved.")
                .await;
        }
        Err(err) => {
            log::error!("Could not persist the configuration: {err}");
            context
                .send_notification(
                    NotificationType::Error,
                    "Failed to save the configuration to disk.",
                )
                .await;
        }
    }
}
