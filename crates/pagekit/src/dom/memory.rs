//! In-memory host for headless use and tests.
//!
//! [`MemoryDocument`] keeps inserted script tags in a list and holds their
//! settle handlers until [`MemoryDocument::fire`] is called, which stands in
//! for the browser dispatching `load` or `error`.

use super::{Document, Element, Rect, ScriptElement, ScriptEvent, SettleHandler, Viewport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct DocumentState {
    head: Vec<ScriptElement>,
    handlers: HashMap<String, Vec<SettleHandler>>,
}

/// A document whose head lives in memory. Clones share the same head.
#[derive(Clone, Default)]
pub struct MemoryDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a tag that was already in the page, with nothing listening to it.
    pub fn insert_existing(&self, src: &str) {
        self.lock().head.push(ScriptElement {
            src: src.to_string(),
            defer: false,
            async_load: false,
            attributes: Vec::new(),
        });
    }

    /// Dispatch `event` on every tag with this source that has not settled.
    ///
    /// Returns the number of handlers that ran.
    pub fn fire(&self, src: &str, event: ScriptEvent) -> usize {
        let handlers = self.lock().handlers.remove(src).unwrap_or_default();
        let count = handlers.len();
        debug!(src, ?event, handlers = count, "dispatching script event");
        for handler in handlers {
            handler(event);
        }
        count
    }

    /// All script tags in the head, in insertion order.
    pub fn scripts(&self) -> Vec<ScriptElement> {
        self.lock().head.clone()
    }

    /// The first tag with this source.
    pub fn script(&self, src: &str) -> Option<ScriptElement> {
        self.lock().head.iter().find(|s| s.src == src).cloned()
    }

    /// Number of tags with this source.
    pub fn count(&self, src: &str) -> usize {
        self.lock().head.iter().filter(|s| s.src == src).count()
    }

    /// Sources whose tags are still waiting for an event.
    pub fn unsettled(&self) -> Vec<String> {
        let state = self.lock();
        state
            .head
            .iter()
            .filter(|s| state.handlers.contains_key(&s.src))
            .map(|s| s.src.clone())
            .collect()
    }

    /// Empty the head, dropping any unsettled handlers.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.head.clear();
        state.handlers.clear();
    }
}

impl Document for MemoryDocument {
    fn has_script(&self, src: &str) -> bool {
        self.lock().head.iter().any(|s| s.src == src)
    }

    fn append_script(&self, script: ScriptElement, on_settled: SettleHandler) {
        let mut state = self.lock();
        state
            .handlers
            .entry(script.src.clone())
            .or_default()
            .push(on_settled);
        state.head.push(script);
    }
}

/// Fixed window metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryViewport {
    pub inner_width: f64,
    pub inner_height: f64,
    pub client_width: f64,
}

impl MemoryViewport {
    /// A viewport without a vertical scrollbar.
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            inner_width,
            inner_height,
            client_width: inner_width,
        }
    }

    pub fn with_client_width(mut self, client_width: f64) -> Self {
        self.client_width = client_width;
        self
    }
}

impl Default for MemoryViewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl Viewport for MemoryViewport {
    fn inner_width(&self) -> f64 {
        self.inner_width
    }

    fn inner_height(&self) -> f64 {
        self.inner_height
    }

    fn client_width(&self) -> f64 {
        self.client_width
    }
}

/// An element with a fixed bounding rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryElement {
    pub rect: Rect,
}

impl MemoryElement {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Element for MemoryElement {
    fn bounding_client_rect(&self) -> Rect {
        self.rect
    }
}
