use recap_bridge::MessageFromBackend;
use recap_bridge::notification::NotificationType;
use serde::Deserialize;

/// Payload shape of the MyMemory-style translation endpoint. The service
/// reports its own status inside the body, independent of the HTTP status.
#[derive(Debug, Deserialize)]
struct TranslationPayload {
    #[serde(rename = "responseStatus")]
    response_status: i64,
    #[serde(rename = "responseData")]
    response_data: Option<TranslatedData>,
    #[serde(rename = "responseMessage")]
    response_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslatedData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Handles an incoming translation request (see
/// [`recap_bridge::MessageToBackend::TranslateRequest`]).
pub async fn handle_translate_request(
    context: super::AppContextHandle,
    text: String,
    target_language: String,
) {
    let (translation, request_client) = {
        let state = context.state.read().await;
        (
            state.config.translation.clone(),
            state.request_client.clone(),
        )
    };

    if text.trim().is_empty() {
        context
            .send_notification(
                NotificationType::Error,
                "There is nothing to translate yet. Generate a summary first.",
            )
            .await;
        return;
    }

    let target_language = if target_language.trim().is_empty() {
        translation.default_target_language.clone()
    } else {
        target_language
    };
    let langpair = format!("{}|{}", translation.source_language, target_language);

    log::info!("Translating {} characters to '{target_language}'", text.len());

    let response = match request_client
        .get(&translation.endpoint)
        .query(&[("q", text.as_str()), ("langpair", langpair.as_str())])
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            log::error!("Translation request failed: {err}");
            context
                .send_notification(
                    NotificationType::Error,
                    "The translation service could not be reached.",
                )
                .await;
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        log::error!("Translation endpoint returned {status}");
        context
            .send_notification(
                NotificationType::Error,
                format!("Translation request failed with status {status}."),
            )
            .await;
        return;
    }

    let payload = match response.json::<TranslationPayload>().await {
        Ok(payload) => payload,
        Err(err) => {
            log::error!("Could not decode the translation response: {err}");
            context
                .send_notification(
                    NotificationType::Error,
                    "The translation service returned an unexpected payload.",
                )
                .await;
            return;
        }
    };

    // The endpoint signals failures in-band with a non-200 body status.
    if payload.response_status != 200 {
        let reason = payload
            .response_message
            .unwrap_or_else(|| "Translation failed.".to_string());
        log::error!(
            "Translation service reported status {}: {reason}",
            payload.response_status,
        );
        context
            .send_notification(NotificationType::Error, reason)
            .await;
        return;
    }

    match payload.response_data {
        Some(data) => {
            context
                .send(MessageFromBackend::TranslationResponse {
                    translated: data.translated_text,
                    target_language,
                })
                .await;
        }
        None => {
            context
                .send_notification(
                    NotificationType::Error,
                    "The translation service returned no translated text.",
                )
                .await;
        }
    }
}
