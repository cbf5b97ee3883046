//! Error handling for the backend API

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Non-2xx status. `message` is the JSON `message` field when the body
    /// carried one; `body` keeps the raw text for the logs.
    #[error("HTTP error with status {status}: {body}")]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// 2xx reply with `success: false`.
    #[error("Rejected by server: {message}")]
    Rejected { message: String },

    /// Lookup by identifier found nothing.
    #[error("Not found: {}", .message.as_deref().unwrap_or("no message"))]
    NotFound { message: Option<String> },

    /// Response body did not match the expected shape.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<unreadable body: {}>", e),
        };
        let message = server_message(&body);

        if status == 404 {
            log::debug!("404 body: {}", body);
            ApiError::NotFound { message }
        } else {
            ApiError::Http {
                status,
                message,
                body,
            }
        }
    }

    /// The message the server supplied, if any. Raw bodies never count.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::Http { message, .. } | ApiError::NotFound { message } => message.as_deref(),
            ApiError::Rejected { message } => Some(message.as_str()),
            ApiError::Reqwest(_) | ApiError::Decode(_) => None,
        };
        message.filter(|m| !m.trim().is_empty())
    }

    /// Text shown to the user: the server message verbatim when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Extracts `message` from a JSON error body such as
/// `{"success": false, "message": "Registro no encontrado"}`.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
