//! Dynamic script loading with load deduplication.
//!
//! A script is inserted into the document once per identifier (its `src`),
//! and again only if its tag is removed from the page. Every request for it
//! gets its callback invoked exactly once: after the tag settles when the
//! script is still loading, or immediately when the tag already exists and
//! has settled.
//!
//! Load and error are treated the same way. Callers that need to know
//! whether the script actually ran must check for it out of band. There is
//! no timeout: a tag that never settles keeps its identifier loading and
//! its callbacks queued.

use crate::dom::{Document, ScriptElement, ScriptEvent};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Callback invoked once the requested script has settled.
pub type Callback = Box<dyn FnOnce() + Send>;

/// A value for an extra script attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
}

impl AttrValue {
    fn render(&self) -> String {
        match self {
            AttrValue::Str(s) => s.clone(),
            AttrValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Attributes for a new script tag.
///
/// `defer` and `async` default to `true`. Anything else (`type`,
/// `crossorigin`, `integrity`, `data-*`, ...) is passed through in the order
/// it was added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAttributes {
    pub defer: Option<bool>,
    pub async_load: Option<bool>,
    pub extra: Vec<(String, AttrValue)>,
}

impl ScriptAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(mut self, defer: bool) -> Self {
        self.defer = Some(defer);
        self
    }

    pub fn async_load(mut self, async_load: bool) -> Self {
        self.async_load = Some(async_load);
        self
    }

    /// Add a pass-through attribute. `defer` and `async` set the flags.
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        match (name, &value) {
            ("defer", AttrValue::Bool(b)) => self.defer = Some(*b),
            ("async", AttrValue::Bool(b)) => self.async_load = Some(*b),
            _ => self.extra.push((name.to_string(), value)),
        }
        self
    }

    fn into_element(self, src: &str) -> ScriptElement {
        ScriptElement {
            src: src.to_string(),
            defer: self.defer.unwrap_or(true),
            async_load: self.async_load.unwrap_or(true),
            attributes: self
                .extra
                .into_iter()
                .map(|(name, value)| (name, value.render()))
                .collect(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    loading_queue: Vec<String>,
    callbacks: Vec<(String, Callback)>,
    /// Identifiers whose tag is being handed to the document right now.
    inserting: HashSet<String>,
}

impl RegistryState {
    fn is_queued(&self, id: &str) -> bool {
        self.loading_queue.iter().any(|queued| queued == id)
    }

    fn enqueue(&mut self, id: &str, callback: Option<Callback>) {
        if let Some(callback) = callback {
            self.callbacks.push((id.to_string(), callback));
        }
    }
}

/// Book-keeping of scripts in flight and the callbacks waiting on them.
#[derive(Default)]
pub struct ScriptRegistry {
    state: Mutex<RegistryState>,
}

static GLOBAL_REGISTRY: LazyLock<Arc<ScriptRegistry>> =
    LazyLock::new(|| Arc::new(ScriptRegistry::default()));

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> Arc<ScriptRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether the identifier has an inserted tag that has not settled.
    pub fn is_loading(&self, id: &str) -> bool {
        self.lock().is_queued(id)
    }

    /// Identifiers in flight, in request order.
    pub fn loading_queue(&self) -> Vec<String> {
        self.lock().loading_queue.clone()
    }

    /// Number of callbacks waiting on the identifier.
    pub fn pending_callbacks(&self, id: &str) -> usize {
        self.lock()
            .callbacks
            .iter()
            .filter(|(queued, _)| queued == id)
            .count()
    }

    /// Drop the identifier from the loading set and hand back its callbacks
    /// in registration order.
    fn resolve(&self, id: &str) -> Vec<Callback> {
        let mut state = self.lock();
        state.loading_queue.retain(|queued| queued != id);

        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.callbacks)
            .into_iter()
            .partition(|(queued, _)| queued == id);
        state.callbacks = rest;

        matching.into_iter().map(|(_, callback)| callback).collect()
    }
}

/// What `request` decided to do.
enum Plan {
    Insert,
    Queued,
    Resolved(Option<Callback>),
}

/// Inserts scripts into a [`Document`], once per identifier.
pub struct ScriptLoader<D> {
    document: D,
    registry: Arc<ScriptRegistry>,
}

impl<D: Document> ScriptLoader<D> {
    /// A loader using the process-wide registry.
    pub fn new(document: D) -> Self {
        Self::with_registry(document, ScriptRegistry::global())
    }

    /// A loader with a registry of its own, shared with nothing else.
    pub fn isolated(document: D) -> Self {
        Self::with_registry(document, Arc::new(ScriptRegistry::new()))
    }

    pub fn with_registry(document: D, registry: Arc<ScriptRegistry>) -> Self {
        Self { document, registry }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    /// Request the script at `src`.
    ///
    /// Inserts a tag when the document has none, queues `callback` while
    /// the tag is loading, and runs `callback` before returning once the tag
    /// has settled. A tag removed while loading is inserted again; its
    /// settlement releases every callback queued for the identifier.
    pub fn request(
        &self,
        src: &str,
        callback: Option<Callback>,
        attributes: Option<ScriptAttributes>,
    ) {
        let plan = {
            let mut state = self.registry.lock();
            let has_tag = state.inserting.contains(src) || self.document.has_script(src);
            if !has_tag {
                if !state.is_queued(src) {
                    state.loading_queue.push(src.to_string());
                }
                state.enqueue(src, callback);
                state.inserting.insert(src.to_string());
                Plan::Insert
            } else if state.is_queued(src) {
                state.enqueue(src, callback);
                Plan::Queued
            } else {
                Plan::Resolved(callback)
            }
        };

        match plan {
            Plan::Queued => debug!(src, "script already loading, callback queued"),
            Plan::Resolved(callback) => {
                debug!(src, "script already settled");
                if let Some(callback) = callback {
                    callback();
                }
            }
            Plan::Insert => {
                debug!(src, "inserting script");
                let element = attributes.unwrap_or_default().into_element(src);
                let registry = Arc::clone(&self.registry);
                let id = src.to_string();
                self.document.append_script(
                    element,
                    Box::new(move |event| settle(&registry, &id, event)),
                );
                self.registry.lock().inserting.remove(src);
            }
        }
    }

    /// [`request`](Self::request) with a plain closure.
    pub fn load<F>(&self, src: &str, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.request(src, Some(Box::new(callback)), None);
    }

    /// Resolves once the script has settled.
    pub async fn load_async(&self, src: &str, attributes: Option<ScriptAttributes>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.request(
            src,
            Some(Box::new(move || {
                let _ = tx.send(());
            })),
            attributes,
        );
        let _ = rx.await;
    }
}

fn settle(registry: &ScriptRegistry, id: &str, event: ScriptEvent) {
    match event {
        ScriptEvent::Load => debug!(src = id, "script loaded"),
        ScriptEvent::Error => warn!(src = id, "script failed to load"),
    }

    // Deregister first so a callback that requests the same script again
    // sees it as settled.
    let callbacks = registry.resolve(id);
    for callback in callbacks {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Callback) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let make = move || -> Callback {
            let h = h.clone();
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            })
        };
        (hits, make)
    }

    #[test]
    fn test_inserts_tag_and_tracks_loading() {
        let loader = ScriptLoader::isolated(MemoryDocument::new());
        loader.request("https://example.com/script.js", None, None);

        let tag = loader.document().script("https://example.com/script.js").unwrap();
        assert!(tag.defer);
        assert!(tag.async_load);
        assert!(loader.registry().is_loading("https://example.com/script.js"));
    }

    #[test]
    fn test_passes_attributes_through() {
        let loader = ScriptLoader::isolated(MemoryDocument::new());
        let attrs = ScriptAttributes::new()
            .attr("type", "module")
            .attr("crossorigin", "anonymous")
            .attr("integrity", "sha384-abc123")
            .attr("data-consent", true)
            .defer(false);
        loader.request("a.js", None, Some(attrs));

        let tag = loader.document().script("a.js").unwrap();
        assert!(!tag.defer);
        assert!(tag.async_load);
        assert_eq!(tag.attribute("type"), Some("module"));
        assert_eq!(tag.attribute("crossorigin"), Some("anonymous"));
        assert_eq!(tag.attribute("integrity"), Some("sha384-abc123"));
        assert_eq!(tag.attribute("data-consent"), Some("true"));
        assert_eq!(tag.attributes[0].0, "type");
    }

    #[test]
    fn test_async_flag_via_attr() {
        let loader = ScriptLoader::isolated(MemoryDocument::new());
        loader.request("a.js", None, Some(ScriptAttributes::new().attr("async", false)));

        let tag = loader.document().script("a.js").unwrap();
        assert!(!tag.async_load);
        assert!(tag.attribute("async").is_none());
    }

    #[test]
    fn test_queued_callback_fires_after_load() {
        let (hits, cb) = counter();
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        loader.request("a.js", None, None);
        loader.request("a.js", Some(cb()), None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(loader.registry().pending_callbacks("a.js"), 1);

        loader.document().fire("a.js", ScriptEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!loader.registry().is_loading("a.js"));
        assert_eq!(loader.registry().pending_callbacks("a.js"), 0);
    }

    #[test]
    fn test_single_tag_for_repeated_requests() {
        let (hits, cb) = counter();
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        for _ in 0..5 {
            loader.request("a.js", Some(cb()), None);
        }
        assert_eq!(loader.document().count("a.js"), 1);
        assert_eq!(loader.registry().loading_queue(), vec!["a.js".to_string()]);

        loader.document().fire("a.js", ScriptEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 5);

        loader.request("a.js", Some(cb()), None);
        assert_eq!(loader.document().count("a.js"), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_callbacks_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        for i in 0..4 {
            let order = order.clone();
            loader.load("a.js", move || order.lock().unwrap().push(i));
        }
        loader.document().fire("a.js", ScriptEvent::Load);

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_error_resolves_like_load() {
        let (hits, cb) = counter();
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        loader.request("broken.js", Some(cb()), None);
        loader.document().fire("broken.js", ScriptEvent::Error);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(loader.registry().loading_queue().is_empty());
    }

    #[test]
    fn test_existing_tag_invokes_immediately() {
        let (hits, cb) = counter();
        let doc = MemoryDocument::new();
        doc.insert_existing("b.js");
        let loader = ScriptLoader::isolated(doc);

        loader.request("b.js", Some(cb()), None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(loader.document().count("b.js"), 1);
        assert!(!loader.registry().is_loading("b.js"));
    }

    #[test]
    fn test_only_matching_callbacks_fire() {
        let (hits_a, cb_a) = counter();
        let (hits_b, cb_b) = counter();
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        loader.request("a.js", Some(cb_a()), None);
        loader.request("b.js", Some(cb_b()), None);
        loader.document().fire("a.js", ScriptEvent::Load);

        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 0);
        assert_eq!(loader.registry().loading_queue(), vec!["b.js".to_string()]);
        assert_eq!(loader.registry().pending_callbacks("b.js"), 1);
    }

    #[test]
    fn test_identifiers_are_not_normalized() {
        let loader = ScriptLoader::isolated(MemoryDocument::new());
        loader.request("https://example.com/a.js", None, None);
        loader.request("//example.com/a.js", None, None);
        assert_eq!(loader.document().scripts().len(), 2);
    }

    #[test]
    fn test_callback_rerequest_runs_immediately() {
        let loader = Arc::new(ScriptLoader::isolated(MemoryDocument::new()));
        let (hits, cb) = counter();
        let inner = cb();

        let l = loader.clone();
        loader.load("a.js", move || l.request("a.js", Some(inner), None));
        loader.document().fire("a.js", ScriptEvent::Load);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(loader.document().count("a.js"), 1);
    }

    #[test]
    fn test_removed_tag_is_inserted_again() {
        let (hits, cb) = counter();
        let loader = ScriptLoader::isolated(MemoryDocument::new());

        loader.request("y.js", Some(cb()), None);
        loader.document().clear();
        loader.request("y.js", Some(cb()), None);

        assert_eq!(loader.document().count("y.js"), 1);
        assert_eq!(loader.registry().loading_queue(), vec!["y.js".to_string()]);
        assert_eq!(loader.registry().pending_callbacks("y.js"), 2);

        loader.document().fire("y.js", ScriptEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(!loader.registry().is_loading("y.js"));
    }

    #[test]
    fn test_default_loaders_share_the_global_registry() {
        let doc = MemoryDocument::new();
        let a = ScriptLoader::new(doc.clone());
        let b = ScriptLoader::new(doc.clone());
        let src = "https://example.com/default-loaders.js";
        let (hits, cb) = counter();

        a.request(src, None, None);
        b.request(src, Some(cb()), None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(doc.count(src), 1);
        assert!(b.registry().is_loading(src));

        doc.fire(src, ScriptEvent::Load);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!ScriptRegistry::global().is_loading(src));
    }

    #[tokio::test]
    async fn test_load_async_waits_for_event() {
        let doc = MemoryDocument::new();
        let loader = Arc::new(ScriptLoader::isolated(doc.clone()));

        let l = loader.clone();
        let waiter = tokio::spawn(async move { l.load_async("c.js", None).await });
        while !doc.has_script("c.js") {
            tokio::task::yield_now().await;
        }
        assert!(!waiter.is_finished());

        doc.fire("c.js", ScriptEvent::Load);
        waiter.await.unwrap();
        assert!(!loader.registry().is_loading("c.js"));
    }
}
