use crate::Result;
use crate::behaviors::Behavior;
use crate::dom::NodeId;
use crate::highlight::{fold_query, is_live_query};
use crate::page::{EventKind, EventState, EventTarget, Page, ScrollBlock, SearchOutcome};

impl Page {
    /// Full search: clears earlier markers, highlights `query` in the
    /// content roots, then scrolls to the first hit or raises an alert.
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        let folded = fold_query(query);
        if folded.is_empty() {
            self.trace_search_line("[search] skipped empty query".into());
            return Ok(SearchOutcome::Skipped);
        }

        let roots = self.search_roots()?;
        let highlighter = self.highlighter.clone();
        let cleared = highlighter.clear(&mut self.dom, &roots)?;
        let report = highlighter.highlight_detailed(&mut self.dom, query.trim(), &roots)?;
        self.trace_search_line(format!(
            "[search] query={folded:?} roots={} cleared={cleared} markers={} split_nodes={}",
            roots.len(),
            report.markers.len(),
            report.split_nodes
        ));

        let Some(first) = report.markers.first().copied() else {
            self.alert(format!("No results found for \"{folded}\""));
            return Ok(SearchOutcome::NotFound);
        };
        self.scroll_into_view(first, ScrollBlock::Center, true)?;
        Ok(SearchOutcome::Found {
            markers: report.markers.len(),
        })
    }

    /// Highlight-as-you-type: short queries only clear. Never scrolls.
    /// Returns whether anything is highlighted afterwards.
    pub fn live_search(&mut self, query: &str) -> Result<bool> {
        let folded = fold_query(query);
        let roots = self.search_roots()?;
        let highlighter = self.highlighter.clone();
        highlighter.clear(&mut self.dom, &roots)?;
        if !is_live_query(&folded, self.config.search.min_live_chars) {
            self.trace_search_line(format!("[search] live query={folded:?} too short"));
            return Ok(false);
        }
        let found = highlighter.highlight(&mut self.dom, query.trim(), &roots)?;
        self.trace_search_line(format!("[search] live query={folded:?} found={found}"));
        Ok(found)
    }

    pub fn clear_highlights(&mut self) -> Result<usize> {
        let roots = self.search_roots()?;
        let highlighter = self.highlighter.clone();
        highlighter.clear(&mut self.dom, &roots)
    }

    /// Markers currently in the content roots, in document order.
    pub fn highlight_markers(&self) -> Result<Vec<NodeId>> {
        let roots = self.search_roots()?;
        Ok(self.highlighter.markers(&self.dom, &roots))
    }

    pub fn search_roots(&self) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(&self.config.search.root_selector)
    }

    fn search_input_value(&self) -> Result<Option<String>> {
        let selector = &self.config.search.input_selector;
        match self.dom.query_selector(selector)? {
            Some(input) => Ok(Some(self.dom.value(input)?)),
            None => Ok(None),
        }
    }
}

pub(super) fn on_search_button(page: &mut Page) -> Result<()> {
    if let Some(query) = page.search_input_value()? {
        page.search(&query)?;
    }
    Ok(())
}

pub(super) fn on_search_keypress(page: &mut Page, event: &EventState) -> Result<()> {
    if event.key_is("Enter") {
        on_search_button(page)?;
    }
    Ok(())
}

pub(super) fn on_search_input(page: &mut Page, event: &EventState) -> Result<()> {
    let Some(input) = event.current_node() else {
        return Ok(());
    };
    let query = page.dom.value(input)?;
    page.live_search(&query)?;
    Ok(())
}

/// Wires the search input and button, if both are present.
pub(super) fn install(page: &mut Page) -> Result<()> {
    let input = page.dom.query_selector(&page.config.search.input_selector)?;
    let button = page.dom.query_selector(&page.config.search.button_selector)?;
    let (Some(input), Some(button)) = (input, button) else {
        return Ok(());
    };
    page.add_listener(EventTarget::Node(button), EventKind::Click, Behavior::SearchButton);
    page.add_listener(EventTarget::Node(input), EventKind::KeyPress, Behavior::SearchOnEnter);
    page.add_listener(EventTarget::Node(input), EventKind::Input, Behavior::LiveSearch);
    Ok(())
}
