//! Normalised email addresses, the identity key for every account.
//!
//! An [`Email`] is always trimmed and lowercased. Deserialising goes through
//! the same normalisation, so records written with their original casing are
//! canonicalised on read as well as on write.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A trimmed, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
  /// Normalise `raw` and check that it looks like `local@domain`.
  pub fn parse(raw: &str) -> Result<Self> {
    let normalized = normalize(raw);
    let valid = match normalized.split_once('@') {
      Some((local, domain)) => {
        !local.is_empty()
          && !domain.is_empty()
          && !domain.contains('@')
          && !normalized.chars().any(char::is_whitespace)
      }
      None => false,
    };

    if valid {
      Ok(Self(normalized))
    } else {
      Err(Error::InvalidEmail(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

fn normalize(raw: &str) -> String { raw.trim().to_lowercase() }

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for Email {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<Email> for String {
  fn from(email: Email) -> Self { email.0 }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str { &self.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_trims_and_lowercases() {
    let email = Email::parse("  ARTISAN@Example.com ").unwrap();
    assert_eq!(email.as_str(), "artisan@example.com");
  }

  #[test]
  fn case_and_whitespace_variants_are_equal() {
    let a = Email::parse("artisan@example.com").unwrap();
    let b = Email::parse("\tArtisan@EXAMPLE.com\n").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, Email::parse("other@example.com").unwrap());
  }

  #[test]
  fn rejects_malformed_addresses() {
    for raw in ["", "   ", "no-at-sign", "@example.com", "potter@", "a@b@c", "pot ter@x.com"] {
      assert!(
        matches!(Email::parse(raw), Err(Error::InvalidEmail(_))),
        "{raw:?} should be rejected"
      );
    }
  }

  #[test]
  fn deserialising_normalises() {
    let email: Email = serde_json::from_str("\"Mixed@Case.COM\"").unwrap();
    assert_eq!(email.as_str(), "mixed@case.com");
    assert_eq!(serde_json::to_string(&email).unwrap(), "\"mixed@case.com\"");
  }
}
