// storefront/src/services/catalog.rs

//! Catalog helpers and the demo data used to seed an empty store.

use crate::models::{Category, Plant, PlantDraft, Settings};

pub fn filter_by_category(plants: Vec<Plant>, category: Option<Category>) -> Vec<Plant> {
  match category {
    Some(wanted) => plants.into_iter().filter(|p| p.category == wanted).collect(),
    None => plants,
  }
}

/// The three plants a fresh shop starts with.
pub fn demo_plants() -> Vec<PlantDraft> {
  vec![
    PlantDraft {
      name: "Монстера деликатесная".to_string(),
      price: 2500,
      category: Category::Decorative,
      image: "/img/f94d0d6a-3ce1-4a57-938c-94f91cc55aaf.jpg".to_string(),
      description: "Тропическое растение с крупными резными листьями".to_string(),
    },
    PlantDraft {
      name: "Лимонное дерево".to_string(),
      price: 3500,
      category: Category::Fruit,
      image: "/img/5903317a-1357-4f1b-b75b-1cb758d50a0e.jpg".to_string(),
      description: "Плодовое цитрусовое дерево для дома".to_string(),
    },
    PlantDraft {
      name: "Композиция суккулентов".to_string(),
      price: 1500,
      category: Category::Decorative,
      image: "/img/8445a9c4-74b9-4357-aa67-db08306aae0a.jpg".to_string(),
      description: "Неприхотливая композиция из разных суккулентов".to_string(),
    },
  ]
}

/// Contact settings written alongside the demo catalog.
pub fn default_settings() -> Vec<(String, String)> {
  Settings {
    phone: "+7 (999) 123-45-67".to_string(),
    email: "info@plants.example".to_string(),
    address: "Москва, ул. Садовая, 1".to_string(),
    working_hours: "Пн-Вс 9:00-21:00".to_string(),
    site_name: "Зелёный уголок".to_string(),
    extra: Default::default(),
  }
  .into_pairs()
}
