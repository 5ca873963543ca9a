//! User interface preferences.

use serde::{Deserialize, Serialize};

/// Key the dark-mode flag is stored under.
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "darkMode", default)]
    pub dark_mode: bool,
}

impl Preferences {
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        assert!(!Preferences::default().dark_mode);
    }

    #[test]
    fn test_toggle() {
        let mut prefs = Preferences::default();
        assert!(prefs.toggle_dark_mode());
        assert!(!prefs.toggle_dark_mode());
    }

    #[test]
    fn test_stored_under_dark_mode_key() {
        let prefs = Preferences { dark_mode: true };
        let value: serde_json::Value = serde_json::from_str(&prefs.to_json().unwrap()).unwrap();
        assert_eq!(value[DARK_MODE_KEY], true);
        assert_eq!(Preferences::from_json(&prefs.to_json().unwrap()).unwrap(), prefs);
    }

    #[test]
    fn test_missing_key_and_unknown_keys() {
        assert_eq!(Preferences::from_json("{}").unwrap(), Preferences::default());
        let prefs = Preferences::from_json(r#"{"darkMode":true,"fontSize":14}"#).unwrap();
        assert!(prefs.dark_mode);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        assert!(Preferences::from_json("darkMode=true").is_err());
    }
}
