//! Conversation types and the `generateContent` wire format.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

// ─── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Model,
}

/// One turn of the chat widget's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: Role,
  pub text: String,
}

impl ChatMessage {
  pub fn user(text: impl Into<String>) -> Self {
    Self {
      role: Role::User,
      text: text.into(),
    }
  }

  pub fn model(text: impl Into<String>) -> Self {
    Self {
      role: Role::Model,
      text: text.into(),
    }
  }
}

/// A photo attached to a custom-order request.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
  pub bytes:     Vec<u8>,
  /// Declared MIME type, e.g. `image/jpeg`.
  pub mime_type: String,
}

impl ReferenceImage {
  /// Guess an image MIME type from a file extension.
  pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
      "jpg" | "jpeg" => Some("image/jpeg"),
      "png" => Some("image/png"),
      "webp" => Some("image/webp"),
      "gif" => Some("image/gif"),
      "heic" => Some("image/heic"),
      _ => None,
    }
  }
}

/// The custom-order page's result: a haiku and a brief for the potter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBrief {
  pub haiku: String,
  pub brief: String,
}

impl CommissionBrief {
  pub fn fallback() -> Self {
    Self {
      haiku: "Clay spins on the wheel,\nSilent hands shape the future,\nError in the code.".into(),
      brief: "Could not generate brief.".into(),
    }
  }

  /// Used when the model answered but not with the requested JSON.
  pub fn unparsed(description: &str) -> Self {
    Self {
      haiku: "Nature's form is hard,\nTo capture in simple code,\nTry again later.".into(),
      brief: description.to_owned(),
    }
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub system_instruction: Option<Content>,
  pub contents:           Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generation_config:  Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:  Option<Role>,
  #[serde(default)]
  pub parts: Vec<Part>,
}

impl Content {
  pub fn text(role: Option<Role>, text: impl Into<String>) -> Self {
    Self {
      role,
      parts: vec![Part::text(text)],
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inline_data: Option<InlineData>,
}

impl Part {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text: Some(text.into()),
      ..Self::default()
    }
  }

  pub fn image(image: &ReferenceImage) -> Self {
    Self {
      inline_data: Some(InlineData {
        mime_type: image.mime_type.clone(),
        data:      STANDARD.encode(&image.bytes),
      }),
      ..Self::default()
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
  pub mime_type: String,
  /// Base64, standard alphabet.
  pub data:      String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature:        Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub response_mime_type: Option<String>,
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
  pub content: Option<Content>,
}

impl GenerateResponse {
  /// Concatenated text parts of the first candidate; `None` when empty.
  pub fn text(&self) -> Option<String> {
    let content = self.candidates.first()?.content.as_ref()?;
    let text: String = content
      .parts
      .iter()
      .filter_map(|p| p.text.as_deref())
      .collect();
    (!text.trim().is_empty()).then_some(text)
  }
}
