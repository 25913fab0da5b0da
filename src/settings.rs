/// Extension settings stored in chrome.storage.sync

use crate::error::RedirectError;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(value: JsValue) -> Result<(), JsValue>;
}

/// The two-field settings blob. Missing keys read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hostname of the instance hosting the user's account
    pub local_domain: String,
    /// Hostname whose web UI receives redirects; empty means `local_domain`
    pub web_domain: String,
}

impl Settings {
    pub fn new(local_domain: impl Into<String>, web_domain: impl Into<String>) -> Self {
        Settings {
            local_domain: local_domain.into(),
            web_domain: web_domain.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.local_domain.is_empty()
    }

    /// The domain redirects point at
    pub fn effective_web_domain(&self) -> &str {
        if self.web_domain.is_empty() {
            &self.local_domain
        } else {
            &self.web_domain
        }
    }
}

/// Read the settings, falling back to empty values for unset keys
pub async fn load() -> crate::error::Result<Settings> {
    let settings_js = getSettings()
        .await
        .map_err(|e| RedirectError::Storage(format!("Failed to get settings: {:?}", e)))?;

    if settings_js.is_null() || settings_js.is_undefined() {
        return Ok(Settings::default());
    }

    serde_wasm_bindgen::from_value(settings_js)
        .map_err(|e| RedirectError::Storage(format!("Failed to parse settings: {:?}", e)))
}

pub async fn save(settings: &Settings) -> crate::error::Result<()> {
    let settings_js = serde_wasm_bindgen::to_value(settings)
        .map_err(|e| RedirectError::Storage(format!("Failed to serialize settings: {:?}", e)))?;

    setSettings(settings_js)
        .await
        .map_err(|e| RedirectError::Storage(format!("Failed to save settings: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unconfigured() {
        let settings = Settings::default();
        assert!(!settings.is_configured());
        assert_eq!(settings.effective_web_domain(), "");
    }

    #[test]
    fn test_web_domain_falls_back_to_local_domain() {
        let settings = Settings::new("example.social", "");
        assert!(settings.is_configured());
        assert_eq!(settings.effective_web_domain(), "example.social");
    }

    #[test]
    fn test_web_domain_overrides_local_domain() {
        let settings = Settings::new("example.social", "web.example.social");
        assert_eq!(settings.effective_web_domain(), "web.example.social");
    }

    #[test]
    fn test_web_domain_alone_is_not_configured() {
        let settings = Settings::new("", "web.example.social");
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_missing_keys_deserialize_as_empty() {
        let settings: Settings = serde_json::from_str(r#"{"local_domain": "example.social"}"#).unwrap();
        assert_eq!(settings.local_domain, "example.social");
        assert_eq!(settings.web_domain, "");

        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Settings::default());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Settings::new("a.social", "b.social")).unwrap();
        assert_eq!(json["local_domain"], "a.social");
        assert_eq!(json["web_domain"], "b.social");
    }
}
