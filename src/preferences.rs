//! Theme preference, persisted across restarts

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::storage::{keys, KeyValueStore, StorageResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// Reads and writes the theme under its fixed storage key
pub struct ThemePreference {
    storage: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Stored theme; absent or unrecognized values mean light
    pub fn load(&self) -> Theme {
        match self.storage.get(keys::THEME) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read theme preference");
                Theme::default()
            }
        }
    }

    pub fn set(&self, theme: Theme) -> StorageResult<()> {
        self.storage.set(keys::THEME, theme.as_str())
    }

    pub fn toggle(&self) -> StorageResult<Theme> {
        let theme = self.load().toggled();
        self.set(theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let prefs = ThemePreference::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.load(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let storage = Arc::new(MemoryStore::new());
        let prefs = ThemePreference::new(storage.clone());

        assert_eq!(prefs.toggle().unwrap(), Theme::Dark);
        assert_eq!(storage.get(keys::THEME).unwrap().as_deref(), Some("dark"));
        assert_eq!(prefs.toggle().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::THEME, "sepia")]));
        let prefs = ThemePreference::new(storage);
        assert_eq!(prefs.load(), Theme::Light);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" Dark ".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
