// storefront/src/models/plant.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "plant_category_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Decorative,
  Fruit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plant {
  pub id: i64,
  pub name: String,
  /// Whole currency units.
  pub price: i64,
  pub category: Category,
  pub image: String,
  pub description: String,
}

/// Editable fields of a plant, as sent by the admin panel on create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantDraft {
  pub name: String,
  pub price: i64,
  pub category: Category,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub description: String,
}

impl PlantDraft {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("Plant name is required.".to_string()));
    }
    if self.price <= 0 {
      return Err(AppError::Validation("Plant price must be a positive amount.".to_string()));
    }
    Ok(())
  }

  pub fn into_plant(self, id: i64) -> Plant {
    Plant {
      id,
      name: self.name.trim().to_string(),
      price: self.price,
      category: self.category,
      image: self.image,
      description: self.description,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft(name: &str, price: i64) -> PlantDraft {
    PlantDraft {
      name: name.to_string(),
      price,
      category: Category::Fruit,
      image: String::new(),
      description: String::new(),
    }
  }

  #[test]
  fn category_uses_lowercase_wire_names() {
    assert_eq!(serde_json::to_string(&Category::Decorative).unwrap(), "\"decorative\"");
    let parsed: Category = serde_json::from_str("\"fruit\"").unwrap();
    assert_eq!(parsed, Category::Fruit);
    assert!(serde_json::from_str::<Category>("\"succulent\"").is_err());
  }

  #[test]
  fn draft_requires_name_and_positive_price() {
    assert!(draft("Lemon tree", 3500).validate().is_ok());
    assert!(matches!(draft("  ", 3500).validate(), Err(AppError::Validation(_))));
    assert!(matches!(draft("Lemon tree", 0).validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn draft_defaults_optional_text_fields() {
    let parsed: PlantDraft = serde_json::from_str(r#"{"name":"Fig","price":900,"category":"fruit"}"#).unwrap();
    let plant = parsed.into_plant(7);
    assert_eq!(plant.id, 7);
    assert!(plant.image.is_empty());
    assert!(plant.description.is_empty());
  }
}
