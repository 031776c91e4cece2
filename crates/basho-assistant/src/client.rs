//! Async client for the `generateContent` endpoint.

use std::{sync::Arc, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::{
  error::{ApiErrorResponse, AssistantError},
  prompt,
  types::{
    ChatMessage, CommissionBrief, Content, GenerateRequest, GenerateResponse, GenerationConfig,
    Part, ReferenceImage, Role,
  },
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Shown when the model answers with no text.
pub const EMPTY_REPLY: &str = "The kiln is too hot, I cannot think right now. (Error)";
/// Shown when the request fails outright.
pub const FALLBACK_REPLY: &str =
  "I apologize, my connection to the spirit of the clay is interrupted. Please try again.";

const CHAT_TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings. The key is only exposed when building a request.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
  pub api_key:  SecretString,
  pub model:    String,
  pub base_url: String,
}

impl AssistantConfig {
  pub fn new(api_key: SecretString) -> Self {
    Self {
      api_key,
      model: DEFAULT_MODEL.to_owned(),
      base_url: DEFAULT_BASE_URL.to_owned(),
    }
  }
}

/// Cheap to clone; clones share one connection pool. Holds no conversation
/// state, so concurrent calls are independent.
#[derive(Clone)]
pub struct Assistant {
  inner: Arc<AssistantInner>,
}

struct AssistantInner {
  client: reqwest::Client,
  config: AssistantConfig,
}

impl Assistant {
  pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()?;
    Ok(Self {
      inner: Arc::new(AssistantInner { client, config }),
    })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.inner.config.base_url.trim_end_matches('/'),
      self.inner.config.model
    )
  }

  async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, AssistantError> {
    let response = self
      .inner
      .client
      .post(self.url())
      .header("x-goog-api-key", self.inner.config.api_key.expose_secret())
      .json(request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
      return Err(AssistantError::Api {
        status: status.as_u16(),
        message,
      });
    }

    let body: GenerateResponse = response.json().await?;
    Ok(body.text())
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  /// Continue the conversation in `history` with `message`.
  ///
  /// `Ok(None)` means the model produced no text.
  #[instrument(skip_all, fields(model = %self.inner.config.model, turns = history.len()))]
  pub async fn try_reply(
    &self,
    history: &[ChatMessage],
    message: &str,
  ) -> Result<Option<String>, AssistantError> {
    let mut contents: Vec<Content> = history
      .iter()
      .map(|m| Content::text(Some(m.role), m.text.clone()))
      .collect();
    contents.push(Content::text(Some(Role::User), message));

    let request = GenerateRequest {
      system_instruction: Some(Content::text(None, prompt::system_instruction())),
      contents,
      generation_config: Some(GenerationConfig {
        temperature: Some(CHAT_TEMPERATURE),
        ..GenerationConfig::default()
      }),
    };
    self.generate(&request).await
  }

  /// Like [`try_reply`](Self::try_reply), but never fails.
  pub async fn reply(&self, history: &[ChatMessage], message: &str) -> String {
    match self.try_reply(history, message).await {
      Ok(Some(text)) => text,
      Ok(None) => EMPTY_REPLY.to_owned(),
      Err(err) => {
        tracing::error!(error = %err, "chat request failed");
        FALLBACK_REPLY.to_owned()
      }
    }
  }

  // ── Custom orders ─────────────────────────────────────────────────────────

  /// Ask for a haiku and a potter's brief for `description`.
  #[instrument(skip_all, fields(model = %self.inner.config.model, has_image = image.is_some()))]
  pub async fn try_commission_brief(
    &self,
    description: &str,
    image: Option<&ReferenceImage>,
  ) -> Result<CommissionBrief, AssistantError> {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = image {
      parts.push(Part::image(image));
    }
    parts.push(Part::text(prompt::commission_prompt(description, image.is_some())));

    let request = GenerateRequest {
      system_instruction: None,
      contents:           vec![Content {
        role: Some(Role::User),
        parts,
      }],
      generation_config:  Some(GenerationConfig {
        response_mime_type: Some("application/json".to_owned()),
        ..GenerationConfig::default()
      }),
    };

    let text = self
      .generate(&request)
      .await?
      .ok_or(AssistantError::EmptyResponse)?;
    parse_brief(&text)
  }

  /// Like [`try_commission_brief`](Self::try_commission_brief), but never
  /// fails. An answer that is not the expected JSON keeps the visitor's own
  /// description as the brief; any other failure yields
  /// [`CommissionBrief::fallback`].
  pub async fn commission_brief(
    &self,
    description: &str,
    image: Option<&ReferenceImage>,
  ) -> CommissionBrief {
    self
      .try_commission_brief(description, image)
      .await
      .unwrap_or_else(|err| {
        tracing::error!(error = %err, "custom order request failed");
        match err {
          AssistantError::Parse(_) => CommissionBrief::unparsed(description),
          _ => CommissionBrief::fallback(),
        }
      })
  }
}

/// Parse the model's JSON answer, tolerating a Markdown code fence.
pub fn parse_brief(text: &str) -> Result<CommissionBrief, AssistantError> {
  let trimmed = text.trim();
  let body = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .and_then(|rest| rest.trim_end().strip_suffix("```"))
    .unwrap_or(trimmed);
  Ok(serde_json::from_str(body.trim())?)
}

#[cfg(test)]
mod tests {
  use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    net::{TcpListener, TcpStream},
    sync::mpsc,
  };

  use super::*;

  fn assistant(base_url: &str) -> Assistant {
    Assistant::new(AssistantConfig {
      api_key:  SecretString::from("test-key".to_string()),
      model:    "test-model".into(),
      base_url: base_url.into(),
    })
    .unwrap()
  }

  // Nothing listens on the discard port.
  fn unreachable_assistant() -> Assistant { assistant("http://127.0.0.1:9/") }

  async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
      let n = socket.read(&mut chunk).await.unwrap();
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);

      let text = String::from_utf8_lossy(&buf);
      if let Some(end) = text.find("\r\n\r\n") {
        let length = text[..end]
          .lines()
          .filter_map(|line| line.split_once(':'))
          .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
          .and_then(|(_, value)| value.trim().parse::<usize>().ok())
          .unwrap_or(0);
        if buf.len() >= end + 4 + length {
          break;
        }
      }
    }
    String::from_utf8_lossy(&buf).into_owned()
  }

  /// Answer every request with `status` and `body`, passing each raw request
  /// back through the returned channel.
  async fn canned_server(
    status: &'static str,
    body: &'static str,
  ) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      loop {
        let Ok((mut socket, _)) = listener.accept().await else {
          return;
        };
        let request = read_request(&mut socket).await;
        let _ = tx.send(request);
        let response = format!(
          "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
          body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
      }
    });

    (format!("http://{addr}"), rx)
  }

  const NOT_JSON: &str =
    r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"a haiku, not json"}]}}]}"#;
  const BRIEF_JSON: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"haiku\":\"moss\",\"brief\":\"celadon\"}"}]}}]}"#;
  const RATE_LIMITED: &str =
    r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;

  #[test]
  fn url_joins_base_and_model() {
    let assistant = unreachable_assistant();
    assert_eq!(
      assistant.url(),
      "http://127.0.0.1:9/v1beta/models/test-model:generateContent"
    );
  }

  #[test]
  fn config_debug_redacts_key() {
    let config = AssistantConfig::new(SecretString::from("super-secret".to_string()));
    assert!(!format!("{config:?}").contains("super-secret"));
    assert_eq!(config.model, DEFAULT_MODEL);
  }

  #[test]
  fn parse_plain_and_fenced_json() {
    let plain = parse_brief(r#"{"haiku": "moss on stone", "brief": "celadon glaze"}"#).unwrap();
    assert_eq!(plain.haiku, "moss on stone");

    let fenced = parse_brief("```json\n{\"haiku\": \"h\", \"brief\": \"b\"}\n```").unwrap();
    assert_eq!(fenced, CommissionBrief {
      haiku: "h".into(),
      brief: "b".into(),
    });
  }

  #[test]
  fn parse_rejects_incomplete_json() {
    assert!(matches!(parse_brief("{}"), Err(AssistantError::Parse(_))));
    assert!(matches!(parse_brief("a haiku, not json"), Err(AssistantError::Parse(_))));
  }

  #[tokio::test]
  async fn transport_failure_falls_back() {
    let assistant = unreachable_assistant();

    let history = [ChatMessage::model("Welcome to the studio.")];
    assert_eq!(assistant.reply(&history, "hello").await, FALLBACK_REPLY);
    assert!(matches!(
      assistant.try_reply(&history, "hello").await,
      Err(AssistantError::Http(_))
    ));

    let brief = assistant.commission_brief("a tall vase", None).await;
    assert_eq!(brief, CommissionBrief::fallback());
  }

  #[tokio::test]
  async fn reply_sends_history_and_key() {
    let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Try the moss set."}]}}]}"#;
    let (url, mut requests) = canned_server("200 OK", body).await;
    let assistant = assistant(&url);

    let history = [ChatMessage::model("Welcome to the studio.")];
    let reply = assistant.try_reply(&history, "something for tea?").await.unwrap();
    assert_eq!(reply.as_deref(), Some("Try the moss set."));

    let request = requests.recv().await.unwrap();
    assert!(request.starts_with("POST /v1beta/models/test-model:generateContent"));
    assert!(request.contains("x-goog-api-key: test-key"));
    assert!(request.contains(r#""role":"model""#));
    assert!(request.contains("something for tea?"));
    assert!(request.contains(r#""temperature":0.7"#));
  }

  #[tokio::test]
  async fn commission_brief_parses_model_json() {
    let (url, _requests) = canned_server("200 OK", BRIEF_JSON).await;
    let brief = assistant(&url).commission_brief("a moss bowl", None).await;
    assert_eq!(brief, CommissionBrief {
      haiku: "moss".into(),
      brief: "celadon".into(),
    });
  }

  #[tokio::test]
  async fn non_json_answer_keeps_the_description() {
    let (url, _requests) = canned_server("200 OK", NOT_JSON).await;
    let assistant = assistant(&url);

    assert!(matches!(
      assistant.try_commission_brief("a moss bowl", None).await,
      Err(AssistantError::Parse(_))
    ));
    let brief = assistant.commission_brief("a moss bowl", None).await;
    assert_eq!(brief, CommissionBrief::unparsed("a moss bowl"));
    assert_eq!(brief.brief, "a moss bowl");
  }

  #[tokio::test]
  async fn error_status_falls_back() {
    let (url, _requests) = canned_server("429 Too Many Requests", RATE_LIMITED).await;
    let assistant = assistant(&url);

    match assistant.try_commission_brief("a moss bowl", None).await {
      Err(AssistantError::Api { status, message }) => {
        assert_eq!(status, 429);
        assert_eq!(message, "Resource has been exhausted");
      }
      other => panic!("expected an API error, got {other:?}"),
    }
    assert_eq!(
      assistant.commission_brief("a moss bowl", None).await,
      CommissionBrief::fallback()
    );
    assert_eq!(assistant.reply(&[], "hello").await, FALLBACK_REPLY);
  }

  #[tokio::test]
  async fn empty_answer_falls_back() {
    let (url, _requests) = canned_server("200 OK", "{}").await;
    let assistant = assistant(&url);

    assert!(matches!(
      assistant.try_commission_brief("a moss bowl", None).await,
      Err(AssistantError::EmptyResponse)
    ));
    assert_eq!(
      assistant.commission_brief("a moss bowl", None).await,
      CommissionBrief::fallback()
    );
    assert_eq!(assistant.reply(&[], "hello").await, EMPTY_REPLY);
  }
}
