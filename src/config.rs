//! Page configuration. Every field has a default matching the stock pages,
//! so a JSON document only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::highlight::{DEFAULT_MARKER_CLASS, DEFAULT_MARKER_TAG, HighlightOptions, QuerySyntax};
use crate::{Error, Result};

pub const DEFAULT_VIEWPORT_HEIGHT: i64 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub viewport_height: i64,
    pub search: SearchConfig,
    pub navigation: NavigationConfig,
    pub storage_keys: StorageKeys,
    pub share: ShareConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            search: SearchConfig::default(),
            navigation: NavigationConfig::default(),
            storage_keys: StorageKeys::default(),
            share: ShareConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport_height <= 0 {
            return Err(Error::Config("viewport_height must be positive".into()));
        }
        if self.search.marker_tag.trim().is_empty() || self.search.marker_class.trim().is_empty()
        {
            return Err(Error::Config("marker tag and class must be non-empty".into()));
        }
        if self.search.marker_class.split_whitespace().count() != 1 {
            return Err(Error::Config("marker_class must be a single class".into()));
        }
        if self.navigation.scroll_spy_throttle_ms < 0 {
            return Err(Error::Config("scroll_spy_throttle_ms must be >= 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub input_selector: String,
    pub button_selector: String,
    pub root_selector: String,
    pub marker_tag: String,
    pub marker_class: String,
    pub syntax: QuerySyntax,
    /// Live highlighting needs more than this many characters.
    pub min_live_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            input_selector: ".search-input".to_string(),
            button_selector: ".search-btn".to_string(),
            root_selector: ".content-section".to_string(),
            marker_tag: DEFAULT_MARKER_TAG.to_string(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            syntax: QuerySyntax::Literal,
            min_live_chars: 2,
        }
    }
}

impl SearchConfig {
    pub fn highlight_options(&self) -> HighlightOptions {
        HighlightOptions {
            marker_tag: self.marker_tag.clone(),
            marker_class: self.marker_class.clone(),
            syntax: self.syntax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    pub header_offset: i64,
    pub scroll_spy_offset: i64,
    pub scroll_spy_throttle_ms: i64,
    pub back_to_top_threshold: i64,
    pub navbar_threshold: i64,
    /// Sections the article scroll spy tracks.
    pub section_selector: String,
    /// Viewport y a portfolio section must span to be the active one.
    pub active_line_y: i64,
    pub portfolio_sections: Vec<String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            header_offset: 100,
            scroll_spy_offset: 150,
            scroll_spy_throttle_ms: 100,
            back_to_top_threshold: 300,
            navbar_threshold: 50,
            section_selector: ".content-section".to_string(),
            active_line_y: 100,
            portfolio_sections: ["home", "fullstack", "html", "css", "bootstrap", "javascript"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    pub preferences: String,
    pub dark_mode: String,
    pub bookmarks: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            preferences: "eportfolio-preferences".to_string(),
            dark_mode: "darkMode".to_string(),
            bookmarks: "bookmarks".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareConfig {
    pub title: String,
    pub text: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            title: "Nepal - Wikipedia".to_string(),
            text: "Learn about Nepal, the beautiful Himalayan country".to_string(),
        }
    }
}
