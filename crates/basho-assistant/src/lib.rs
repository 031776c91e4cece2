//! Client for the generative assistant behind the storefront's chat widget
//! and custom-order page.
//!
//! The model is an unreliable collaborator. The `try_*` methods surface
//! failures as [`AssistantError`]; the plain methods log the failure and
//! hand back a fixed fallback the UI can show as-is.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{Assistant, AssistantConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::AssistantError;
pub use types::{ChatMessage, CommissionBrief, ReferenceImage, Role};
