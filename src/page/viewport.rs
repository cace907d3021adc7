use std::collections::HashMap;

use super::{EventKind, EventState, EventTarget, Page};
use crate::behaviors::Behavior;
use crate::dom::NodeId;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
}

/// A recorded `window.scrollTo`-style request. Requests apply instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: i64,
    pub smooth: bool,
}

/// Document-relative box assigned to an element by the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBox {
    pub top: i64,
    pub height: i64,
}

/// Viewport-relative rectangle, like `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRect {
    pub top: i64,
    pub bottom: i64,
    pub height: i64,
}

#[derive(Debug)]
pub(crate) struct ViewportState {
    pub(crate) height: i64,
    pub(crate) scroll_y: i64,
    pub(crate) layout: HashMap<NodeId, LayoutBox>,
    pub(crate) scroll_requests: Vec<ScrollRequest>,
    pub(crate) scroll_event_queued: bool,
}

impl ViewportState {
    pub(crate) fn new(height: i64) -> Self {
        Self {
            height,
            scroll_y: 0,
            layout: HashMap::new(),
            scroll_requests: Vec::new(),
            scroll_event_queued: false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Observation {
    id: usize,
    node: NodeId,
    threshold: f64,
    behavior: Behavior,
    once: bool,
    intersecting: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ObserverState {
    next_id: usize,
    observations: Vec<Observation>,
    evaluating: bool,
    dirty: bool,
}

impl Page {
    pub fn viewport_height(&self) -> i64 {
        self.viewport.height
    }

    pub fn scroll_y(&self) -> i64 {
        self.viewport.scroll_y
    }

    pub fn set_viewport_height(&mut self, height: i64) -> Result<()> {
        if height <= 0 {
            return Err(Error::InvalidArgument(
                "viewport height must be positive".into(),
            ));
        }
        self.viewport.height = height;
        self.evaluate_observers()
    }

    /// Gives the first element matching `selector` a document-relative box.
    pub fn set_layout(&mut self, selector: &str, top: i64, height: i64) -> Result<()> {
        let node = self.select_one(selector)?;
        self.set_layout_node(node, top, height)
    }

    pub fn set_layout_node(&mut self, node: NodeId, top: i64, height: i64) -> Result<()> {
        if !self.dom.is_element(node) {
            return Err(Error::Dom("layout target is not an element".into()));
        }
        if height < 0 {
            return Err(Error::InvalidArgument(format!(
                "layout height must be >= 0 (got {height})"
            )));
        }
        self.viewport.layout.insert(node, LayoutBox { top, height });
        self.evaluate_observers()
    }

    pub fn layout_of(&self, node: NodeId) -> Option<LayoutBox> {
        self.viewport.layout.get(&node).copied()
    }

    pub fn bounding_client_rect(&self, node: NodeId) -> Option<ClientRect> {
        let layout = self.layout_of(node)?;
        let top = layout.top.saturating_sub(self.viewport.scroll_y);
        Some(ClientRect {
            top,
            bottom: top.saturating_add(layout.height),
            height: layout.height,
        })
    }

    /// Document-relative top of `node` or, failing that, of its nearest
    /// laid-out ancestor.
    pub(crate) fn document_top(&self, node: NodeId) -> Option<i64> {
        self.nearest_layout(node).map(|layout| layout.top)
    }

    fn nearest_layout(&self, node: NodeId) -> Option<LayoutBox> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(layout) = self.layout_of(current) {
                return Some(layout);
            }
            cursor = self.dom.parent(current);
        }
        None
    }

    /// User scroll: moves the viewport and fires `scroll` on the window.
    pub fn scroll_to(&mut self, y: i64) -> Result<()> {
        self.apply_scroll(y)?;
        self.dispatch(EventTarget::Window, EventKind::Scroll, None)?;
        Ok(())
    }

    pub fn take_scroll_requests(&mut self) -> Vec<ScrollRequest> {
        std::mem::take(&mut self.viewport.scroll_requests)
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.viewport.scroll_requests
    }

    /// Programmatic scroll. The matching `scroll` event is queued and fires
    /// once the current dispatch finishes.
    pub(crate) fn window_scroll_to(&mut self, top: i64, smooth: bool) -> Result<()> {
        let top = top.max(0);
        self.viewport
            .scroll_requests
            .push(ScrollRequest { top, smooth });
        self.trace_event_line(format!("[event] scroll_request top={top} smooth={smooth}"));
        self.apply_scroll(top)?;
        self.viewport.scroll_event_queued = true;
        if self.dispatch_depth == 0 {
            self.drain_queued_scroll_events()?;
        }
        Ok(())
    }

    /// Returns false when neither `node` nor any ancestor has a layout box.
    pub(crate) fn scroll_into_view(
        &mut self,
        node: NodeId,
        block: ScrollBlock,
        smooth: bool,
    ) -> Result<bool> {
        let Some(layout) = self.nearest_layout(node) else {
            return Ok(false);
        };
        let top = match block {
            ScrollBlock::Start => layout.top,
            ScrollBlock::Center => layout
                .top
                .saturating_add(layout.height / 2)
                .saturating_sub(self.viewport.height / 2),
        };
        self.window_scroll_to(top, smooth)?;
        Ok(true)
    }

    fn apply_scroll(&mut self, y: i64) -> Result<()> {
        self.viewport.scroll_y = y.max(0);
        self.evaluate_observers()
    }

    pub(crate) fn observe(
        &mut self,
        node: NodeId,
        threshold: f64,
        behavior: Behavior,
        once: bool,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidArgument(format!(
                "threshold must be within [0, 1] (got {threshold})"
            )));
        }
        let id = self.observers.next_id;
        self.observers.next_id += 1;
        self.observers.observations.push(Observation {
            id,
            node,
            threshold,
            behavior,
            once,
            intersecting: false,
        });
        self.evaluate_observers()
    }

    pub fn observed_count(&self) -> usize {
        self.observers.observations.len()
    }

    fn intersection_ratio(&self, node: NodeId) -> Option<f64> {
        let rect = self.bounding_client_rect(node)?;
        if rect.height == 0 {
            let inside = (0..=self.viewport.height).contains(&rect.top);
            return Some(if inside { 1.0 } else { 0.0 });
        }
        let visible = rect
            .bottom
            .min(self.viewport.height)
            .saturating_sub(rect.top.max(0));
        Some(visible.max(0) as f64 / rect.height as f64)
    }

    fn is_intersecting(&self, observation: &Observation) -> bool {
        self.intersection_ratio(observation.node)
            .is_some_and(|ratio| ratio > 0.0 && ratio >= observation.threshold)
    }

    /// Fires observers whose element has just entered the viewport. Nested
    /// calls from inside an observer callback are folded into the outer pass.
    pub(crate) fn evaluate_observers(&mut self) -> Result<()> {
        if self.observers.evaluating {
            self.observers.dirty = true;
            return Ok(());
        }
        self.observers.evaluating = true;
        let result = self.evaluate_observers_until_stable();
        self.observers.evaluating = false;
        result
    }

    fn evaluate_observers_until_stable(&mut self) -> Result<()> {
        loop {
            self.observers.dirty = false;
            let mut entered = Vec::new();
            let states = self
                .observers
                .observations
                .iter()
                .map(|observation| self.is_intersecting(observation))
                .collect::<Vec<_>>();
            for (observation, now) in self.observers.observations.iter_mut().zip(states) {
                if now && !observation.intersecting {
                    entered.push(observation.clone());
                }
                observation.intersecting = now;
            }

            for observation in entered {
                if observation.once {
                    self.observers
                        .observations
                        .retain(|existing| existing.id != observation.id);
                }
                self.trace_event_line(format!(
                    "[event] intersect target={} threshold={}",
                    self.node_label(observation.node),
                    observation.threshold
                ));
                let mut event =
                    EventState::new(EventKind::Intersection, EventTarget::Node(observation.node));
                self.run_handler(&observation.behavior, &mut event)?;
            }

            if !self.observers.dirty {
                return Ok(());
            }
        }
    }
}
