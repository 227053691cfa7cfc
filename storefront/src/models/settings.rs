// storefront/src/models/settings.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key under which the admin password lives in the settings table.
pub const ADMIN_PASSWORD_KEY: &str = "admin_password";

/// Shop-wide contact and display settings.
///
/// The five named keys always serialize (empty when unset). Any other key the
/// admin stored is carried through `extra`. `admin_password` never appears here:
/// it is dropped on the way in and never loaded on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub working_hours: String,
  #[serde(default)]
  pub site_name: String,
  #[serde(flatten)]
  pub extra: BTreeMap<String, String>,
}

impl Settings {
  /// Builds settings from stored key/value rows.
  pub fn from_pairs<I>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (String, String)>,
  {
    let mut settings = Settings::default();
    for (key, value) in pairs {
      match key.as_str() {
        "phone" => settings.phone = value,
        "email" => settings.email = value,
        "address" => settings.address = value,
        "working_hours" => settings.working_hours = value,
        "site_name" => settings.site_name = value,
        ADMIN_PASSWORD_KEY => {}
        _ => {
          settings.extra.insert(key, value);
        }
      }
    }
    settings
  }

  /// Flattens back to key/value rows, never yielding the admin password.
  pub fn into_pairs(self) -> Vec<(String, String)> {
    let mut pairs = vec![
      ("phone".to_string(), self.phone),
      ("email".to_string(), self.email),
      ("address".to_string(), self.address),
      ("working_hours".to_string(), self.working_hours),
      ("site_name".to_string(), self.site_name),
    ];
    pairs.extend(self.extra.into_iter().filter(|(key, _)| key != ADMIN_PASSWORD_KEY));
    pairs
  }
}

/// A partial settings update: only the supplied keys are upserted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SettingsPatch(pub BTreeMap<String, serde_json::Value>);

impl SettingsPatch {
  /// Supplied keys as stored strings. Non-string scalars are stored in their
  /// JSON text form; the admin password key is skipped.
  pub fn into_pairs(self) -> Vec<(String, String)> {
    self
      .0
      .into_iter()
      .filter(|(key, _)| key != ADMIN_PASSWORD_KEY)
      .map(|(key, value)| {
        let stored = match value {
          serde_json::Value::String(s) => s,
          serde_json::Value::Null => String::new(),
          other => other.to_string(),
        };
        (key, stored)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn admin_password_never_reaches_the_payload() {
    let settings = Settings::from_pairs(vec![
      ("phone".to_string(), "+7 999 123-45-67".to_string()),
      (ADMIN_PASSWORD_KEY.to_string(), "secret".to_string()),
      ("instagram".to_string(), "@plants".to_string()),
    ]);
    let json = serde_json::to_value(&settings).unwrap();
    assert_eq!(json["phone"], "+7 999 123-45-67");
    assert_eq!(json["instagram"], "@plants");
    assert_eq!(json["site_name"], "");
    assert!(json.get(ADMIN_PASSWORD_KEY).is_none());
  }

  #[test]
  fn patch_skips_admin_password_and_stringifies_scalars() {
    let patch: SettingsPatch =
      serde_json::from_str(r#"{"admin_password":"hijack","site_name":"Green","delivery_days":3}"#).unwrap();
    let pairs = patch.into_pairs();
    assert_eq!(
      pairs,
      vec![
        ("delivery_days".to_string(), "3".to_string()),
        ("site_name".to_string(), "Green".to_string()),
      ]
    );
  }
}
