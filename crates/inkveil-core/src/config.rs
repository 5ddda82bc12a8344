//! Session configuration.

use serde::{Deserialize, Serialize};

/// Settings for an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Maximum number of undo steps kept; `None` keeps every step.
    pub max_undo_history: Option<usize>,
}

impl CanvasConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        assert_eq!(CanvasConfig::default().max_undo_history, None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CanvasConfig::from_json("{}").unwrap();
        assert_eq!(config, CanvasConfig::default());

        let config = CanvasConfig::from_json(r#"{"maxUndoHistory": 50}"#).unwrap();
        assert_eq!(config.max_undo_history, Some(50));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = CanvasConfig {
            max_undo_history: Some(10),
        };
        let json = config.to_json().unwrap();
        assert_eq!(CanvasConfig::from_json(&json).unwrap(), config);
    }
}
