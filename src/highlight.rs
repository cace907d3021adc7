//! Search-and-highlight over text nodes.
//!
//! Every match is wrapped in a marker element that is spliced straight into
//! the text node's parent. [`Highlighter::clear`] turns markers back into
//! text and normalizes the parents, so a highlight/clear pair leaves each
//! root's text content unchanged.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId, is_raw_text_tag};
use crate::matcher::QueryMatcher;
use crate::Result;

pub const DEFAULT_MARKER_TAG: &str = "span";
pub const DEFAULT_MARKER_CLASS: &str = "search-highlight";

/// How a query string is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySyntax {
    /// Plain substring; pattern metacharacters match themselves.
    #[default]
    Literal,
    /// Regular expression, always case-insensitive.
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub marker_tag: String,
    pub marker_class: String,
    pub syntax: QuerySyntax,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            marker_tag: DEFAULT_MARKER_TAG.to_string(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            syntax: QuerySyntax::Literal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Inserted markers in document order.
    pub markers: Vec<NodeId>,
    /// Text nodes that were replaced by a fragment.
    pub split_nodes: usize,
}

impl HighlightReport {
    pub fn found(&self) -> bool {
        !self.markers.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    options: HighlightOptions,
}

impl Highlighter {
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    pub fn highlight(&self, dom: &mut Dom, query: &str, roots: &[NodeId]) -> Result<bool> {
        Ok(self.highlight_detailed(dom, query, roots)?.found())
    }

    /// Wraps every case-insensitive occurrence of `query` under `roots`.
    ///
    /// Matching runs over all candidate nodes before the first mutation, so a
    /// pattern error never leaves the document half-highlighted.
    pub fn highlight_detailed(
        &self,
        dom: &mut Dom,
        query: &str,
        roots: &[NodeId],
    ) -> Result<HighlightReport> {
        if query.is_empty() {
            return Ok(HighlightReport::default());
        }
        let matcher = QueryMatcher::new(query, self.options.syntax)?;

        let mut planned = Vec::new();
        for node in self.collect_text_nodes(dom, roots) {
            let Some(text) = dom.text(node) else {
                continue;
            };
            let matches = matcher.find_all(text)?;
            if !matches.is_empty() {
                planned.push((node, text.to_string(), matches));
            }
        }

        let mut report = HighlightReport::default();
        let mut fragments: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut parents = Vec::new();
        let mut seen_parents = HashSet::new();
        for (node, text, matches) in planned {
            let Some(parent) = dom.parent(node) else {
                continue;
            };
            let mut pieces = Vec::with_capacity(matches.len() * 2 + 1);
            let mut cursor = 0usize;
            for matched in matches {
                if matched.start > cursor {
                    pieces.push(dom.create_detached_text(&text[cursor..matched.start]));
                }
                let marker = self.create_marker(dom, &text[matched.start..matched.end])?;
                pieces.push(marker);
                report.markers.push(marker);
                cursor = matched.end;
            }
            if cursor < text.len() {
                pieces.push(dom.create_detached_text(&text[cursor..]));
            }
            fragments.insert(node, pieces);
            if seen_parents.insert(parent) {
                parents.push(parent);
            }
            report.split_nodes += 1;
        }

        for parent in parents {
            let children: Vec<NodeId> = dom
                .children(parent)
                .iter()
                .flat_map(|child| fragments.remove(child).unwrap_or_else(|| vec![*child]))
                .collect();
            dom.replace_children(parent, &children)?;
        }

        Ok(report)
    }

    /// Replaces every marker under `roots` with its text. Returns how many
    /// markers were removed; a second call returns 0.
    pub fn clear(&self, dom: &mut Dom, roots: &[NodeId]) -> Result<usize> {
        let markers = self.markers(dom, roots);
        let mut replacements: HashMap<NodeId, NodeId> = HashMap::new();
        let mut parents = Vec::new();
        let mut seen_parents = HashSet::new();

        for marker in markers {
            let Some(parent) = dom.parent(marker) else {
                continue;
            };
            let text = dom.text_content(marker);
            replacements.insert(marker, dom.create_detached_text(&text));
            if seen_parents.insert(parent) {
                parents.push(parent);
            }
        }

        for parent in parents {
            let children: Vec<NodeId> = dom
                .children(parent)
                .iter()
                .map(|child| replacements.get(child).copied().unwrap_or(*child))
                .collect();
            dom.replace_children(parent, &children)?;
            dom.normalize(parent);
        }
        Ok(replacements.len())
    }

    pub fn markers(&self, dom: &Dom, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for root in roots {
            let mut elements = Vec::new();
            dom.collect_elements_dfs(*root, &mut elements);
            out.extend(
                elements
                    .into_iter()
                    .filter(|node| self.is_marker(dom, *node) && seen.insert(*node)),
            );
        }
        out
    }

    pub fn is_marker(&self, dom: &Dom, node: NodeId) -> bool {
        dom.tag_name(node)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(&self.options.marker_tag))
            && dom
                .class_contains(node, &self.options.marker_class)
                .unwrap_or(false)
    }

    /// Qualifying text nodes under `root`, lazily and in document order.
    pub fn text_nodes<'a>(&'a self, dom: &'a Dom, root: NodeId) -> TextNodes<'a> {
        TextNodes {
            dom,
            highlighter: self,
            stack: vec![root],
        }
    }

    fn collect_text_nodes(&self, dom: &Dom, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        roots
            .iter()
            .flat_map(|root| self.text_nodes(dom, *root))
            .filter(|node| seen.insert(*node))
            .collect()
    }

    fn create_marker(&self, dom: &mut Dom, text: &str) -> Result<NodeId> {
        let marker = dom.create_detached_element(&self.options.marker_tag);
        dom.set_attr(marker, "class", &self.options.marker_class)?;
        let inner = dom.create_detached_text(text);
        dom.append_child(marker, inner)?;
        Ok(marker)
    }
}

/// Depth-first walk yielding text nodes worth searching: non-blank, outside
/// `script`/`style`, and not already inside a marker. Call
/// [`Highlighter::text_nodes`] again to restart the walk.
#[derive(Debug, Clone)]
pub struct TextNodes<'a> {
    dom: &'a Dom,
    highlighter: &'a Highlighter,
    stack: Vec<NodeId>,
}

impl Iterator for TextNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(current) = self.stack.pop() {
            if let Some(text) = self.dom.text(current) {
                if !text.trim().is_empty() {
                    return Some(current);
                }
                continue;
            }
            if let Some(tag) = self.dom.tag_name(current) {
                if is_raw_text_tag(tag) || self.highlighter.is_marker(self.dom, current) {
                    continue;
                }
            }
            self.stack
                .extend(self.dom.children(current).iter().rev().copied());
        }
        None
    }
}

/// Lowercases and trims a user query. This is the form echoed back in
/// alerts and measured for live search; matching uses the trimmed query
/// as typed and lets the matcher ignore case.
pub fn fold_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Whether a folded query is long enough for highlight-as-you-type.
pub fn is_live_query(folded: &str, min_chars: usize) -> bool {
    folded.chars().count() > min_chars
}
