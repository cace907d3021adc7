//! Deterministic page-enhancement behaviours over an in-memory DOM:
//! search-and-highlight, navigation, theming and small persisted
//! preferences, driven through a test-friendly page harness.

use std::error::Error as StdError;
use std::fmt;

pub mod behaviors;
pub mod config;
mod date_time;
pub mod dom;
pub mod highlight;
mod html;
mod matcher;
pub mod page;
pub mod preferences;
mod selector;
pub mod storage;

pub use behaviors::{Skill, SkillsCatalog, install_article, install_portfolio, skills_data};
pub use config::{NavigationConfig, PageConfig, SearchConfig, ShareConfig, StorageKeys};
pub use dom::{Dom, NodeId};
pub use highlight::{HighlightOptions, HighlightReport, Highlighter, QuerySyntax, TextNodes};
pub use page::{
    ClientRect, ConsoleEntry, ConsoleLevel, EventKind, LayoutBox, Page, PageBuilder, PendingTimer,
    ScrollBlock, ScrollRequest, SearchOutcome, ShareRequest,
};
pub use preferences::{Bookmark, PortfolioPreferences, Theme};
pub use storage::{FileStorage, MemoryStorage, Storage};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    Dom(String),
    Pattern(String),
    Storage(String),
    Config(String),
    InvalidArgument(String),
    Timer(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Pattern(msg) => write!(f, "search pattern error: {msg}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Timer(msg) => write!(f, "timer error: {msg}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;
