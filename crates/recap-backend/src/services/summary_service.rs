use recap_bridge::MessageFromBackend;
use recap_bridge::notification::NotificationType;
use serde::Deserialize;

/// One candidate summary as returned by the inference endpoint. The API
/// responds with an array of these; only the first entry is used.
#[derive(Debug, Deserialize)]
struct SummaryCandidate {
    summary_text: String,
}

/// Handles an incoming summarization request (see
/// [`recap_bridge::MessageToBackend::SummarizeRequest`]).
///
/// The transcript is posted to the configured inference endpoint with the
/// user's bearer token. Every failure mode maps to a distinct user-facing
/// notification; nothing is retried here.
pub async fn handle_summarize_request(context: super::AppContextHandle, transcript: String) {
    let (summarizer, request_client) = {
        let state = context.state.read().await;
        (
            state.config.summarizer.clone(),
            state.request_client.clone(),
        )
    };

    if transcript.trim().is_empty() {
        context
            .send_notification(
                NotificationType::Error,
                "Cannot summarize an empty transcript. Make sure the video has captions.",
            )
            .await;
        return;
    }

    let Some(api_key) = summarizer.api_key else {
        context
            .send_notification(
                NotificationType::Error,
                "Set the summarizer API key in the configuration first.",
            )
            .await;
        return;
    };

    let body = serde_json::json!({
        "inputs": transcript,
        "parameters": {
            "max_length": summarizer.max_summary_length,
            "min_length": summarizer.min_summary_length,
        },
    });

    log::info!(
        "Requesting a summary of {} characters from {}",
        transcript.len(),
        summarizer.endpoint,
    );

    let response = match request_client
        .post(&summarizer.endpoint)
        .bearer_auth(&api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            log::error!("Summarization request failed: {err}");
            context
                .send_notification(
                    NotificationType::Error,
                    "The summarization service could not be reached.",
                )
                .await;
            return;
        }
    };

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        context
            .send_notification(
                NotificationType::Error,
                "The summarization service rejected the API key. Check your key and try again.",
            )
            .await;
        return;
    }
    if !status.is_success() {
        let details = response.text().await.unwrap_or_default();
        log::error!("Summarization endpoint returned {status}: {details}");
        context
            .send_notification(
                NotificationType::Error,
                format!("Summarization request failed with status {status}."),
            )
            .await;
        return;
    }

    match response.json::<Vec<SummaryCandidate>>().await {
        Ok(candidates) => match candidates.into_iter().next() {
            Some(candidate) => {
                context
                    .send(MessageFromBackend::SummaryResponse {
                        summary: candidate.summary_text,
                    })
                    .await;
            }
            None => {
                context
                    .send_notification(
                        NotificationType::Error,
                        "The summarization service returned no summary.",
                    )
                    .await;
            }
        },
        Err(err) => {
            log::error!("Could not decode the summarization response: {err}");
            context
                .send_notification(
                    NotificationType::Error,
                    "The summarization service returned an unexpected payload.",
                )
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_inference_payload_shape() {
        let payload = r#"[{"summary_text": "A short recap of the video."}]"#;
        let candidates: Vec<SummaryCandidate> = serde_json::from_str(payload).unwrap();
        assert_eq!(candidates[0].summary_text, "A short recap of the video.");
    }
}
