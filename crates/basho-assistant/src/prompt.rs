//! Prompt text sent to the model.

use basho_core::catalog;

/// Brand voice plus a snapshot of the current catalog.
pub fn system_instruction() -> String {
  let products: Vec<String> = catalog::products()
    .iter()
    .map(|p| format!("{} ({}): ₹{} - {}", p.name, p.category, p.price, p.description))
    .collect();
  let workshops: Vec<String> = catalog::workshops()
    .iter()
    .map(|w| format!("{}: {} - ₹{}", w.title, w.date, w.price))
    .collect();

  let products = serde_json::to_string(&products).unwrap_or_default();
  let workshops = serde_json::to_string(&workshops).unwrap_or_default();

  format!(
    "You are 'Basho', a helpful and poetic assistant for the pottery studio \"Basho by Shivangi\".
The brand is wabi-sabi: Japanese minimalism, earthy and raw.
Speak calmly and a little poetically, but be practical about prices and bookings.

Current product inventory:
{products}

Upcoming workshops:
{workshops}

When asked for recommendations, suggest pieces that match the mood the visitor describes.
For custom pieces, point them to the Custom Order page.
Keep answers under 50 words unless telling a story."
  )
}

/// The request for a haiku-and-brief pair.
pub fn commission_prompt(description: &str, has_image: bool) -> String {
  let image_note = if has_image {
    "The visitor also attached a visual reference image.\n"
  } else {
    ""
  };

  format!(
    "A visitor wants a custom piece of pottery.
Visitor description: \"{description}\"
{image_note}
Study the request (and the image, if any) and answer in JSON with exactly two string fields:
1. \"haiku\": a haiku capturing the essence of the request.
2. \"brief\": a professional brief for the potter covering glaze, clay body, form and firing technique.

Return ONLY valid JSON."
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn system_instruction_lists_catalog() {
    let text = system_instruction();
    for product in catalog::products() {
      assert!(text.contains(product.name), "missing {}", product.name);
    }
    assert!(text.contains("Glazing Masterclass: Nov 05, 2024 - 11:00 AM - ₹3000"));
    assert!(text.contains("Tea Sets"));
  }

  #[test]
  fn commission_prompt_mentions_image_only_when_present() {
    assert!(commission_prompt("a moss bowl", true).contains("reference image"));
    let without = commission_prompt("a moss bowl", false);
    assert!(!without.contains("reference image"));
    assert!(without.contains("\"a moss bowl\""));
  }
}
