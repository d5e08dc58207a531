use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use bytes::Bytes;
use sms_core::Headers;
use sms_web_generic::{HeaderConverter, WebhookProcessor};
use tracing::debug;

/// Path the provider is configured to post inbound SMS to.
pub const SMS_ROUTE: &str = "/sms";

#[derive(Clone)]
pub struct AppState {
    pub processor: WebhookProcessor,
}

/// Axum-specific header converter
pub struct AxumHeaderConverter;

impl HeaderConverter for AxumHeaderConverter {
    type HeaderType = HeaderMap;

    fn to_generic_headers(headers: &Self::HeaderType) -> Headers {
        headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

/// Handler for `POST /sms`.
///
/// Always answers with an empty 200, whatever happened to the message.
pub async fn receive_sms(State(state): State<AppState>, headers: HeaderMap, body: Bytes) {
    let generic_headers = AxumHeaderConverter::to_generic_headers(&headers);
    let outcome = state.processor.process_webhook(generic_headers, &body).await;
    debug!(?outcome, "Webhook handled");
}

/// Router exposing the single inbound SMS route.
///
/// No body size limit, so oversized webhooks still get the handler's empty 200.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SMS_ROUTE, post(receive_sms))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
