//! Typed records persisted through [`Storage`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::Storage;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Nature,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Nature];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Nature => "nature",
        }
    }

    pub fn class_name(self) -> String {
        format!("{}-theme", self.as_str())
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Light => "Light theme activated! Clean and minimal design. ☀️",
            Self::Dark => "Dark theme activated! Easy on the eyes for coding. 🌙",
            Self::Nature => "Nature theme activated! Inspired by the outdoors. 🌿",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == value)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown theme: {value}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPreferences {
    pub last_visited: String,
    #[serde(default)]
    pub preferred_theme: Theme,
    #[serde(default)]
    pub viewed_sections: Vec<String>,
}

impl PortfolioPreferences {
    /// `Ok(None)` when nothing is stored; a blob that does not parse is an
    /// `Error::Storage`.
    pub fn load(storage: &dyn Storage, key: &str) -> Result<Option<Self>> {
        let Some(raw) = storage.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| Error::Storage(format!("malformed {key}: {err}")))
    }

    pub fn save(&self, storage: &mut dyn Storage, key: &str) -> Result<()> {
        let raw = serde_json::to_string(self).map_err(|err| Error::Storage(err.to_string()))?;
        storage.set_item(key, &raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
    pub timestamp: String,
}

pub fn load_bookmarks(storage: &dyn Storage, key: &str) -> Result<Vec<Bookmark>> {
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|err| Error::Storage(format!("malformed {key}: {err}"))),
        None => Ok(Vec::new()),
    }
}

/// Appends `bookmark` unless one with the same URL exists. Returns whether
/// the list changed.
pub fn add_bookmark(storage: &mut dyn Storage, key: &str, bookmark: Bookmark) -> Result<bool> {
    let mut bookmarks = load_bookmarks(storage, key)?;
    if bookmarks.iter().any(|existing| existing.url == bookmark.url) {
        return Ok(false);
    }
    bookmarks.push(bookmark);
    let raw = serde_json::to_string(&bookmarks).map_err(|err| Error::Storage(err.to_string()))?;
    storage.set_item(key, &raw)?;
    Ok(true)
}

/// Only the exact string `"true"` enables dark mode.
pub fn load_dark_mode(storage: &dyn Storage, key: &str) -> Result<bool> {
    Ok(storage.get_item(key)?.is_some_and(|raw| raw == "true"))
}

pub fn save_dark_mode(storage: &mut dyn Storage, key: &str, enabled: bool) -> Result<()> {
    storage.set_item(key, if enabled { "true" } else { "false" })
}
