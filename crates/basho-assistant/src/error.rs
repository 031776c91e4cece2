//! Error types for the assistant client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
  /// Transport failure: connection, timeout, or an undecodable body.
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-success status.
  #[error("API error ({status}): {message}")]
  Api { status: u16, message: String },

  /// The model returned no text at all.
  #[error("model returned no text")]
  EmptyResponse,

  /// The model's text was not the JSON document that was asked for.
  #[error("parse error: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Error body returned by the API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
  pub error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorDetail {
  #[serde(default)]
  pub code:    u16,
  pub message: String,
  #[serde(default)]
  pub status:  Option<String>,
}
