//! Deterministic page runtime: a parsed document plus the listeners, clock,
//! viewport and platform mocks that behaviours run against.

use std::collections::HashSet;

use crate::behaviors::PortfolioSession;
use crate::config::PageConfig;
use crate::date_time;
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::highlight::Highlighter;
use crate::preferences::Theme;
use crate::storage::{MemoryStorage, Storage};
use crate::{Error, Result};

mod events;
mod platform;
mod scheduler;
mod viewport;

pub use events::EventKind;
pub(crate) use events::{EventState, EventTarget, ListenerStore};
pub use platform::{ConsoleEntry, ConsoleLevel, ShareRequest};
pub(crate) use platform::{PlatformMockState, TraceState};
pub use scheduler::PendingTimer;
pub(crate) use scheduler::SchedulerState;
pub use viewport::{ClientRect, LayoutBox, ScrollBlock, ScrollRequest};
pub(crate) use viewport::{ObserverState, ViewportState};

const DEFAULT_RNG_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const DEFAULT_URL: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The folded query was empty; nothing was touched.
    Skipped,
    Found { markers: usize },
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Loaded,
    Unloaded,
}

#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) config: PageConfig,
    pub(crate) url: String,
    storage: Box<dyn Storage>,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: SchedulerState,
    pub(crate) viewport: ViewportState,
    pub(crate) observers: ObserverState,
    pub(crate) platform_mocks: PlatformMockState,
    pub(crate) trace_state: TraceState,
    pub(crate) console: Vec<ConsoleEntry>,
    pub(crate) rng_state: u64,
    pub(crate) error_hook: bool,
    pub(crate) dispatch_depth: usize,
    pub(crate) highlighter: Highlighter,
    pub(crate) portfolio: PortfolioSession,
    clock_origin_ms: i64,
    installed_styles: HashSet<String>,
    lifecycle: Lifecycle,
}

#[derive(Debug)]
pub struct PageBuilder {
    html: String,
    url: String,
    config: PageConfig,
    storage: Option<Box<dyn Storage>>,
    random_seed: u64,
    clock_origin_ms: Option<i64>,
    viewport_height: Option<i64>,
}

impl PageBuilder {
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Wall-clock time, in ms since the epoch, at virtual time zero.
    pub fn clock_origin_ms(mut self, origin_ms: i64) -> Self {
        self.clock_origin_ms = Some(origin_ms);
        self
    }

    pub fn viewport_height(mut self, height: i64) -> Self {
        self.viewport_height = Some(height);
        self
    }

    pub fn build(self) -> Result<Page> {
        self.config.validate()?;
        let dom = Dom::parse(&self.html)?;
        let viewport_height = self.viewport_height.unwrap_or(self.config.viewport_height);
        if viewport_height <= 0 {
            return Err(Error::InvalidArgument(
                "viewport height must be positive".into(),
            ));
        }

        let mut page = Page {
            dom,
            highlighter: Highlighter::new(self.config.search.highlight_options()),
            config: self.config,
            url: self.url,
            storage: self
                .storage
                .unwrap_or_else(|| Box::new(MemoryStorage::new()) as Box<dyn Storage>),
            listeners: ListenerStore::default(),
            scheduler: SchedulerState::default(),
            viewport: ViewportState::new(viewport_height),
            observers: ObserverState::default(),
            platform_mocks: PlatformMockState::default(),
            trace_state: TraceState::default(),
            console: Vec::new(),
            rng_state: DEFAULT_RNG_SEED,
            error_hook: false,
            dispatch_depth: 0,
            portfolio: PortfolioSession::default(),
            clock_origin_ms: self
                .clock_origin_ms
                .unwrap_or_else(date_time::system_now_ms),
            installed_styles: HashSet::new(),
            lifecycle: Lifecycle::Created,
        };
        page.set_random_seed(self.random_seed);
        Ok(page)
    }
}

impl Page {
    pub fn builder(html: &str) -> PageBuilder {
        PageBuilder {
            html: html.to_string(),
            url: DEFAULT_URL.to_string(),
            config: PageConfig::default(),
            storage: None,
            random_seed: DEFAULT_RNG_SEED,
            clock_origin_ms: None,
            viewport_height: None,
        }
    }

    pub fn from_html(html: &str) -> Result<Self> {
        Self::builder(html).build()
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        Self::builder(html).url(url).build()
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    /// Hands the storage back so a later page can pick up where this one
    /// left off.
    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn preferred_theme(&self) -> Theme {
        self.portfolio.preferred_theme
    }

    pub fn viewed_sections(&self) -> &[String] {
        &self.portfolio.viewed_sections
    }

    /// Dispatches `DOMContentLoaded` on the document, then `load` on the
    /// window.
    pub fn load(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Created {
            return Err(Error::InvalidArgument("page was already loaded".into()));
        }
        self.lifecycle = Lifecycle::Loaded;
        self.dispatch(EventTarget::Document, EventKind::DomContentLoaded, None)?;
        self.dispatch(EventTarget::Window, EventKind::Load, None)?;
        Ok(())
    }

    pub fn unload(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Loaded {
            return Err(Error::InvalidArgument("page is not loaded".into()));
        }
        self.dispatch(EventTarget::Window, EventKind::BeforeUnload, None)?;
        self.lifecycle = Lifecycle::Unloaded;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.lifecycle == Lifecycle::Loaded
    }

    /// Current virtual time as an ISO-8601 UTC timestamp.
    pub fn timestamp(&self) -> String {
        date_time::format_iso_8601_utc(self.clock_origin_ms.saturating_add(self.scheduler.now_ms))
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub(crate) fn body(&self) -> Result<NodeId> {
        self.select_one("body")
    }

    /// Appends a `<style>` block to `head` unless rules under `key` are
    /// already present. Returns whether anything was added.
    pub(crate) fn install_style_rules(&mut self, key: &str, css: &str) -> Result<bool> {
        if self.installed_styles.contains(key) {
            return Ok(false);
        }
        let parent = match self.dom.query_selector("head")? {
            Some(head) => head,
            None => self.dom.root(),
        };
        let style = self.dom.create_detached_element("style");
        self.dom.set_attr(style, "data-rules", key)?;
        let text = self.dom.create_detached_text(css);
        self.dom.append_child(style, text)?;
        self.dom.append_child(parent, style)?;
        self.installed_styles.insert(key.to_string());
        Ok(true)
    }

    pub fn style_rules_installed(&self, key: &str) -> bool {
        self.installed_styles.contains(key)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name} present={expected}"),
                actual: format!("class {class_name} present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.index()))
    }
}
