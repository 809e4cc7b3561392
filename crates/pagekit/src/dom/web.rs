//! Browser host backed by `web-sys`.

use super::{Document, Element, Rect, ScriptElement, ScriptEvent, SettleHandler, Viewport};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

/// The page's `document`.
#[derive(Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    /// The document of the global `window`, if there is one.
    pub fn current() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    fn create_script(&self, script: &ScriptElement) -> Result<HtmlScriptElement, String> {
        let element: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(|e| format!("{e:?}"))?
            .dyn_into()
            .map_err(|_| "created element is not a script".to_string())?;

        element.set_src(&script.src);
        element.set_defer(script.defer);
        element.set_async(script.async_load);
        for (name, value) in &script.attributes {
            element
                .set_attribute(name, value)
                .map_err(|e| format!("setting {name}: {e:?}"))?;
        }
        Ok(element)
    }
}

impl Document for WebDocument {
    fn has_script(&self, src: &str) -> bool {
        let escaped = src.replace('\\', "\\\\").replace('"', "\\\"");
        matches!(
            self.document.query_selector(&format!("script[src=\"{escaped}\"]")),
            Ok(Some(_))
        )
    }

    fn append_script(&self, script: ScriptElement, on_settled: SettleHandler) {
        let element = match self.create_script(&script) {
            Ok(element) => element,
            Err(e) => {
                warn!(src = %script.src, "failed to create script tag: {e}");
                on_settled(ScriptEvent::Error);
                return;
            }
        };

        // load and error share one handler slot; whichever fires first takes it.
        let slot = Rc::new(RefCell::new(Some(on_settled)));
        for (name, event) in [("load", ScriptEvent::Load), ("error", ScriptEvent::Error)] {
            let slot = Rc::clone(&slot);
            let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                if let Some(handler) = slot.borrow_mut().take() {
                    handler(event);
                }
            });
            if let Err(e) =
                element.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            {
                warn!(src = %script.src, "failed to attach {name} listener: {e:?}");
            }
            listener.forget();
        }

        let appended = match self.document.head() {
            Some(head) => head.append_child(&element).map_err(|e| format!("{e:?}")),
            None => Err("document has no head".to_string()),
        };
        if let Err(e) = appended {
            warn!(src = %script.src, "failed to insert script tag: {e}");
            if let Some(handler) = slot.borrow_mut().take() {
                handler(ScriptEvent::Error);
            }
        }
    }
}

/// Metrics of the global `window`.
#[derive(Clone)]
pub struct WebViewport {
    window: web_sys::Window,
}

impl WebViewport {
    pub fn current() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

impl Viewport for WebViewport {
    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn inner_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn client_width(&self) -> f64 {
        self.window
            .document()
            .and_then(|d| d.document_element())
            .map(|e| f64::from(e.client_width()))
            .unwrap_or(0.0)
    }
}

impl Element for web_sys::Element {
    fn bounding_client_rect(&self) -> Rect {
        let rect = self.get_bounding_client_rect();
        Rect::new(rect.top(), rect.left(), rect.bottom(), rect.right())
    }
}
