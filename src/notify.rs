//! Best-effort relay of JSON payloads to configured webhooks.

use crate::errors::AppError;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No webhook configured; the payload was only logged.
    Logged,
}

/// One POST attempt. Non-success replies become upstream errors.
pub async fn relay<T: Serialize + ?Sized>(
    http: &reqwest::Client,
    url: Option<&str>,
    payload: &T,
) -> Result<Delivery, AppError> {
    let Some(url) = url else {
        let body = serde_json::to_string(payload).unwrap_or_default();
        info!("webhook not configured, payload logged: {body}");
        return Ok(Delivery::Logged);
    };

    let response = http.post(url).json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        warn!(%status, "webhook rejected payload: {text}");
        return Err(AppError::upstream(
            status.as_u16(),
            format!("Webhook request failed with status {status}"),
        ));
    }

    info!("webhook payload delivered");
    Ok(Delivery::Sent)
}

/// Like [`relay`], but failures are logged and swallowed.
pub async fn relay_best_effort<T: Serialize + ?Sized>(
    http: &reqwest::Client,
    url: Option<&str>,
    payload: &T,
) -> Option<Delivery> {
    match relay(http, url, payload).await {
        Ok(delivery) => Some(delivery),
        Err(err) => {
            warn!("notification relay failed: {err}");
            None
        }
    }
}
