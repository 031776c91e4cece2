//! The static product and workshop catalog.
//!
//! Prices are whole rupees. The catalog is immutable for the lifetime of the
//! process; nothing in the store ever refers to a product by more than its
//! display name.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
  Tableware,
  Decor,
  #[serde(rename = "Tea Sets")]
  TeaSets,
}

impl Category {
  pub const ALL: [Category; 3] = [Category::Tableware, Category::Decor, Category::TeaSets];

  pub fn label(self) -> &'static str {
    match self {
      Category::Tableware => "Tableware",
      Category::Decor => "Decor",
      Category::TeaSets => "Tea Sets",
    }
  }

  /// Parse a category label, ignoring case, spaces and dashes.
  pub fn from_label(label: &str) -> Option<Self> {
    let key: String = label
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
      .collect::<String>()
      .to_lowercase();
    match key.as_str() {
      "tableware" => Some(Category::Tableware),
      "decor" => Some(Category::Decor),
      "teasets" | "teaset" => Some(Category::TeaSets),
      _ => None,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.label()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id:          &'static str,
  pub name:        &'static str,
  pub price:       u64,
  pub category:    Category,
  pub image:       &'static str,
  pub description: &'static str,
  pub in_stock:    bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workshop {
  pub id:          &'static str,
  pub title:       &'static str,
  /// Display string; not a sortable timestamp.
  pub date:        &'static str,
  pub price:       u64,
  pub slots:       u32,
  pub image:       &'static str,
  pub description: &'static str,
}

static PRODUCTS: [Product; 6] = [
  Product {
    id:          "p1",
    name:        "Kintsugi Bowl",
    price:       4500,
    category:    Category::Decor,
    image:       "https://images.unsplash.com/photo-1610701596007-11502861dcfa?q=80&w=800&auto=format&fit=crop",
    description: "Hand-thrown stoneware bowl repaired with gold lacquer, celebrating the beauty of imperfection.",
    in_stock:    true,
  },
  Product {
    id:          "p2",
    name:        "Matcha Set - Moss",
    price:       3200,
    category:    Category::TeaSets,
    image:       "https://images.unsplash.com/photo-1563822249548-9a72b6353cd1?q=80&w=800&auto=format&fit=crop",
    description: "A complete ceremonial matcha set glazed in deep moss green tones.",
    in_stock:    true,
  },
  Product {
    id:          "p3",
    name:        "Sabi Serving Platter",
    price:       2800,
    category:    Category::Tableware,
    image:       "https://images.unsplash.com/photo-1610701596061-2ecf227e85b2?q=80&w=800&auto=format&fit=crop",
    description: "Rustic serving platter with raw edges and a matte ash glaze.",
    in_stock:    true,
  },
  Product {
    id:          "p4",
    name:        "Midnight Sake Cup",
    price:       850,
    category:    Category::Tableware,
    image:       "https://images.unsplash.com/photo-1578496479914-8ef92e6d3d91?q=80&w=800&auto=format&fit=crop",
    description: "Small, delicate sake cup fired in a reduction kiln for a deep charcoal finish.",
    in_stock:    true,
  },
  Product {
    id:          "p5",
    name:        "Ikebana Vase",
    price:       5500,
    category:    Category::Decor,
    image:       "https://images.unsplash.com/photo-1581783342308-f792ca11df53?q=80&w=800&auto=format&fit=crop",
    description: "Tall, slender vase designed specifically for Ikebana flower arrangements.",
    in_stock:    false,
  },
  Product {
    id:          "p6",
    name:        "Cloud Teapot",
    price:       4200,
    category:    Category::TeaSets,
    image:       "https://images.unsplash.com/photo-1556679343-c7306c1976bc?q=80&w=800&auto=format&fit=crop",
    description: "Hand-carved handle with a milky white glaze reminiscent of morning fog.",
    in_stock:    true,
  },
];

static WORKSHOPS: [Workshop; 3] = [
  Workshop {
    id:          "w1",
    title:       "Intro to Wheel Throwing",
    date:        "Oct 15, 2024 - 10:00 AM",
    price:       2500,
    slots:       4,
    image:       "https://images.unsplash.com/photo-1493106641515-6b5631de4bb9?q=80&w=800&auto=format&fit=crop",
    description: "Learn the basics of centering clay and pulling walls on the potter's wheel.",
  },
  Workshop {
    id:          "w2",
    title:       "Handbuilding: Coil & Pinch",
    date:        "Oct 22, 2024 - 2:00 PM",
    price:       1800,
    slots:       8,
    image:       "https://images.unsplash.com/photo-1516975080664-ed2fc6a32937?q=80&w=800&auto=format&fit=crop",
    description: "A meditative session focusing on ancient handbuilding techniques.",
  },
  Workshop {
    id:          "w3",
    title:       "Glazing Masterclass",
    date:        "Nov 05, 2024 - 11:00 AM",
    price:       3000,
    slots:       6,
    image:       "https://images.unsplash.com/photo-1565193566173-7a64c27876af?q=80&w=800&auto=format&fit=crop",
    description: "Understand the chemistry of glazes and learn layering techniques.",
  },
];

pub fn products() -> &'static [Product] { &PRODUCTS }

pub fn workshops() -> &'static [Workshop] { &WORKSHOPS }

pub fn product(id: &str) -> Option<&'static Product> { PRODUCTS.iter().find(|p| p.id == id) }

pub fn workshop(id: &str) -> Option<&'static Workshop> { WORKSHOPS.iter().find(|w| w.id == id) }

/// Products in `category`, or every product when `None` (the "All" filter).
pub fn products_in(category: Option<Category>) -> Vec<&'static Product> {
  PRODUCTS
    .iter()
    .filter(|p| category.is_none_or(|c| p.category == c))
    .collect()
}
