use std::collections::HashMap;

use super::Page;
use crate::behaviors::Behavior;
use crate::dom::NodeId;
use crate::{Error, Result};

const STACK_GROW_SIZE: usize = 32 * 1024 * 1024;
// Programmatic scrolls queue a window `scroll`; a handler that keeps
// scrolling would otherwise loop forever.
const MAX_QUEUED_SCROLL_EVENTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    KeyPress,
    Scroll,
    DomContentLoaded,
    Load,
    BeforeUnload,
    /// An observed element started intersecting the viewport.
    Intersection,
    /// A timer came due.
    Timeout,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::KeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::Load => "load",
            Self::BeforeUnload => "beforeunload",
            Self::Intersection => "intersection",
            Self::Timeout => "timeout",
        }
    }

    fn bubbles(self) -> bool {
        matches!(
            self,
            Self::Click | Self::Input | Self::KeyPress | Self::DomContentLoaded
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventTarget {
    Window,
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) kind: EventKind,
    pub(crate) target: EventTarget,
    pub(crate) current_target: EventTarget,
    pub(crate) key: Option<String>,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(kind: EventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub(crate) fn current_node(&self) -> Option<NodeId> {
        match self.current_target {
            EventTarget::Node(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn key_is(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<EventTarget, HashMap<EventKind, Vec<Behavior>>>,
}

impl ListenerStore {
    /// Registering the same behaviour twice for a target and kind is a no-op.
    pub(crate) fn add(&mut self, target: EventTarget, kind: EventKind, behavior: Behavior) -> bool {
        let listeners = self.map.entry(target).or_default().entry(kind).or_default();
        if listeners.contains(&behavior) {
            return false;
        }
        listeners.push(behavior);
        true
    }

    pub(crate) fn get(&self, target: EventTarget, kind: EventKind) -> Vec<Behavior> {
        self.map
            .get(&target)
            .and_then(|events| events.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, target: EventTarget, kind: EventKind) -> usize {
        self.map
            .get(&target)
            .and_then(|events| events.get(&kind))
            .map_or(0, Vec::len)
    }
}

impl Page {
    pub(crate) fn add_listener(&mut self, target: EventTarget, kind: EventKind, behavior: Behavior) {
        if self.listeners.add(target, kind, behavior) && self.trace_state.enabled {
            let label = self.target_label(target);
            self.trace_event_line(format!("[event] listen {} on {label}", kind.as_str()));
        }
    }

    /// Number of listeners for `kind` on the first element matching
    /// `selector`.
    pub fn listener_count(&self, selector: &str, kind: EventKind) -> Result<usize> {
        let node = self.select_one(selector)?;
        Ok(self.listeners.count(EventTarget::Node(node), kind))
    }

    pub fn window_listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(EventTarget::Window, kind)
    }

    pub(crate) fn dispatch(
        &mut self,
        target: EventTarget,
        kind: EventKind,
        key: Option<&str>,
    ) -> Result<EventState> {
        let mut event = EventState::new(kind, target);
        event.key = key.map(str::to_string);

        self.dispatch_depth += 1;
        let result = self.dispatch_prepared(&mut event);
        self.dispatch_depth -= 1;
        result?;

        if self.dispatch_depth == 0 {
            self.drain_queued_scroll_events()?;
        }
        Ok(event)
    }

    fn dispatch_prepared(&mut self, event: &mut EventState) -> Result<()> {
        let path = self.propagation_path(event.target, event.kind);
        for current in path {
            event.current_target = current;
            self.invoke_listeners(current, event)?;
            if event.propagation_stopped {
                self.trace_event_done(event, "propagation_stopped");
                return Ok(());
            }
        }
        self.trace_event_done(event, "completed");
        Ok(())
    }

    fn propagation_path(&self, target: EventTarget, kind: EventKind) -> Vec<EventTarget> {
        let mut path = vec![target];
        if !kind.bubbles() {
            return path;
        }
        if let EventTarget::Node(node) = target {
            let mut cursor = self.dom.parent(node);
            while let Some(parent) = cursor {
                if parent != self.dom.root() {
                    path.push(EventTarget::Node(parent));
                }
                cursor = self.dom.parent(parent);
            }
            if !self.dom.is_connected(node) {
                return path;
            }
            path.push(EventTarget::Document);
        }
        if target != EventTarget::Window {
            path.push(EventTarget::Window);
        }
        path
    }

    fn invoke_listeners(&mut self, current: EventTarget, event: &mut EventState) -> Result<()> {
        let listeners = self.listeners.get(current, event.kind);
        for behavior in listeners {
            if self.trace_state.enabled {
                let target_label = self.target_label(event.target);
                let current_label = self.target_label(current);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} handler={:?} default_prevented={}",
                    event.kind.as_str(),
                    target_label,
                    current_label,
                    behavior,
                    event.default_prevented
                ));
            }
            self.run_handler(&behavior, event)?;
        }
        Ok(())
    }

    /// Runs one behaviour. With the error hook installed a failure becomes a
    /// console error and the caller carries on.
    pub(crate) fn run_handler(&mut self, behavior: &Behavior, event: &mut EventState) -> Result<()> {
        match behavior.run(self, event) {
            Ok(()) => Ok(()),
            Err(err) if self.error_hook => {
                self.console_error(format!("Unhandled error: {err}"));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !self.trace_state.enabled {
            return;
        }
        let target_label = self.target_label(event.target);
        self.trace_event_line(format!(
            "[event] done {} target={} outcome={} default_prevented={}",
            event.kind.as_str(),
            target_label,
            outcome,
            event.default_prevented
        ));
    }

    pub(crate) fn target_label(&self, target: EventTarget) -> String {
        match target {
            EventTarget::Window => "window".into(),
            EventTarget::Document => "document".into(),
            EventTarget::Node(node) => self.node_label(node),
        }
    }

    pub(crate) fn drain_queued_scroll_events(&mut self) -> Result<()> {
        let mut fired = 0usize;
        while self.viewport.scroll_event_queued {
            if fired >= MAX_QUEUED_SCROLL_EVENTS {
                self.viewport.scroll_event_queued = false;
                self.trace_event_line("[event] scroll queue limit reached".into());
                break;
            }
            self.viewport.scroll_event_queued = false;
            fired += 1;
            self.dispatch(EventTarget::Window, EventKind::Scroll, None)?;
        }
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub fn click_node(&mut self, target: NodeId) -> Result<()> {
        if !self.dom.is_element(target) {
            return Err(Error::Dom("click target is not an element".into()));
        }
        stacker::grow(STACK_GROW_SIZE, || {
            let event = self.dispatch(EventTarget::Node(target), EventKind::Click, None)?;
            if event.default_prevented {
                return Ok(());
            }
            self.follow_fragment_link(target)
        })
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        stacker::grow(STACK_GROW_SIZE, || {
            self.dom.set_value(target, text)?;
            self.dispatch(EventTarget::Node(target), EventKind::Input, None)?;
            Ok(())
        })
    }

    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(STACK_GROW_SIZE, || {
            self.dispatch(EventTarget::Node(target), EventKind::KeyPress, Some(key))?;
            Ok(())
        })
    }

    pub fn press_enter(&mut self, selector: &str) -> Result<()> {
        self.press_key(selector, "Enter")
    }

    // Default action of a click inside `<a href="#...">`.
    fn follow_fragment_link(&mut self, target: NodeId) -> Result<()> {
        let Some(anchor) = self.dom.closest(target, "a[href]")? else {
            return Ok(());
        };
        let href = self.dom.attr(anchor, "href").unwrap_or_default();
        let Some(fragment) = href.strip_prefix('#') else {
            return Ok(());
        };

        let base = self
            .url
            .split_once('#')
            .map_or(self.url.as_str(), |(base, _)| base)
            .to_string();
        self.url = format!("{base}#{fragment}");
        self.trace_event_line(format!("[event] navigate fragment=#{fragment}"));

        if fragment.is_empty() {
            return self.window_scroll_to(0, false);
        }
        if let Some(destination) = self.dom.by_id(fragment) {
            if let Some(top) = self.document_top(destination) {
                self.window_scroll_to(top, false)?;
            }
        }
        Ok(())
    }
}
