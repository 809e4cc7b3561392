//! Host page abstractions.
//!
//! The helpers never touch a browser directly. They go through these
//! traits, which are implemented by the in-memory host in [`memory`] and,
//! with the `web` feature, by the `web-sys` host in `web`.

pub mod memory;
#[cfg(feature = "web")]
pub mod web;

use serde::{Deserialize, Serialize};

/// How an inserted script tag finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptEvent {
    Load,
    Error,
}

/// Called once by the document when an inserted script settles.
pub type SettleHandler = Box<dyn FnOnce(ScriptEvent) + Send>;

/// A script tag ready to be inserted into the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub src: String,
    pub defer: bool,
    pub async_load: bool,
    /// Extra attributes in insertion order.
    pub attributes: Vec<(String, String)>,
}

impl ScriptElement {
    /// Look up an extra attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The document a script loader inserts tags into.
pub trait Document {
    /// Whether a `<script src="...">` tag with exactly this source exists.
    fn has_script(&self, src: &str) -> bool;

    /// Insert the script into the document head.
    ///
    /// Implementations must call `on_settled` exactly once, when the tag
    /// fires `load` or `error`. A tag that cannot be created settles with
    /// [`ScriptEvent::Error`].
    fn append_script(&self, script: ScriptElement, on_settled: SettleHandler);
}

/// Window metrics used by the viewport helpers.
pub trait Viewport {
    /// `window.innerWidth`, scrollbar included.
    fn inner_width(&self) -> f64;
    /// `window.innerHeight`.
    fn inner_height(&self) -> f64;
    /// `document.documentElement.clientWidth`, scrollbar excluded.
    fn client_width(&self) -> f64;
}

/// An element with a layout box.
pub trait Element {
    fn bounding_client_rect(&self) -> Rect;
}

/// A bounding client rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

impl Element for Rect {
    fn bounding_client_rect(&self) -> Rect {
        *self
    }
}
