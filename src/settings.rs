//! Settings of a Spout capture source.
//!
//! The host persists these as a JSON object per source instance. Keys match
//! the ones used by existing scene collections, so saved scenes keep working.

use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceResult;

/// Settings key: bind whatever sender is listed first.
pub const USE_FIRST_AVAILABLE_SENDER: &str = "usefirstavailablesender";
/// Settings key: explicit sender name.
pub const CUSTOM_SPOUT_NAME: &str = "customspoutname";
/// Settings key: selection in the sender list of the properties sheet.
pub const SPOUT_SENDER_LIST: &str = "spoutsenders";

/// Per-source settings as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSettings {
    /// Bind the first sender in the registry (default: true)
    #[serde(rename = "usefirstavailablesender", default = "default_use_first_available")]
    pub use_first_available_sender: bool,

    /// Sender to bind when not using the first available one
    #[serde(rename = "customspoutname", default)]
    pub custom_spout_name: String,

    /// Last entry picked from the sender list; only drives the UI
    #[serde(rename = "spoutsenders", default)]
    pub selected_sender: String,
}

fn default_use_first_available() -> bool {
    true
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            use_first_available_sender: default_use_first_available(),
            custom_spout_name: String::new(),
            selected_sender: String::new(),
        }
    }
}

impl SourceSettings {
    /// Parse the host's settings object, filling in defaults for missing keys.
    pub fn from_json(value: &Value) -> SourceResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(value)?)
    }

    /// Default values handed to the host for new sources.
    pub fn defaults_json() -> Value {
        let mut defaults = serde_json::Map::new();
        defaults.insert(CUSTOM_SPOUT_NAME.to_string(), Value::String(String::new()));
        defaults.insert(USE_FIRST_AVAILABLE_SENDER.to_string(), Value::Bool(true));
        Value::Object(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = SourceSettings::default();
        assert!(settings.use_first_available_sender);
        assert!(settings.custom_spout_name.is_empty());
        assert!(settings.selected_sender.is_empty());
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = SourceSettings::from_json(&json!({})).unwrap();
        assert_eq!(settings, SourceSettings::default());

        let settings = SourceSettings::from_json(&Value::Null).unwrap();
        assert_eq!(settings, SourceSettings::default());
    }

    #[test]
    fn test_parse_custom_name() {
        let settings = SourceSettings::from_json(&json!({
            "usefirstavailablesender": false,
            "customspoutname": "Resolume Output",
        }))
        .unwrap();

        assert!(!settings.use_first_available_sender);
        assert_eq!(settings.custom_spout_name, "Resolume Output");
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = SourceSettings::from_json(&json!({ "usefirstavailablesender": "yes" }));
        assert!(matches!(result, Err(crate::error::SourceError::Settings(_))));
    }

    #[test]
    fn test_defaults_json_matches_default() {
        let defaults = SourceSettings::defaults_json();
        assert_eq!(
            defaults,
            json!({ "usefirstavailablesender": true, "customspoutname": "" })
        );
        let settings = SourceSettings::from_json(&defaults).unwrap();
        assert_eq!(settings, SourceSettings::default());
    }
}
