//! connected_lines_web: the connected-lines effect on HTML pages.
//!
//! On `DOMContentLoaded` every element matching [`DEFAULT_SELECTOR`] gets an overlay
//! canvas. Each element's handle is stored as `element.connectedLines` and exposes
//! `redraw()` and `destroy()`. `initConnectedLines(element, overrides?)` attaches to any
//! other element; `overrides` is a plain object such as `{ maxDist: 42, neonA: "#fff" }`
//! layered over the defaults before the element's `data-*` attributes.
use std::cell::RefCell;
use std::rc::Rc;

use connected_lines::config::Config;
use connected_lines::host::{resolve_config, ConnectedLines, Container, DEFAULT_SELECTOR};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, ResizeObserver};

pub mod canvas;
pub mod dom;
pub mod loader;

pub use canvas::{CanvasSurface, CANVAS_CLASS};
pub use dom::DomContainer;

/// Property under which the handle is stored on its element.
pub const HANDLE_PROPERTY: &str = "connectedLines";

type Renderer = ConnectedLines<DomContainer, CanvasSurface>;

/// Script-facing handle of one attached renderer.
#[wasm_bindgen]
#[derive(Clone)]
pub struct ConnectedLinesHandle {
    renderer: Rc<RefCell<Renderer>>,
    observer: ResizeObserver,
    _on_resize: Rc<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl ConnectedLinesHandle {
    /// Re-runs the full pass.
    pub fn redraw(&self) {
        if let Ok(mut renderer) = self.renderer.try_borrow_mut() {
            renderer.redraw();
        }
    }

    /// Stops observing resizes and removes the canvas.
    pub fn destroy(&self) {
        self.observer.disconnect();
        if let Ok(mut renderer) = self.renderer.try_borrow_mut() {
            renderer.destroy();
        }
    }

    /// Whether the canvas is still in place, i.e. `destroy()` has not run.
    #[wasm_bindgen(getter, js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.renderer
            .try_borrow()
            .map(|renderer| renderer.is_attached())
            .unwrap_or(true)
    }
}

/// Defaults with the caller's overrides applied. Unparsable values are logged and skipped.
pub fn base_config(overrides: Option<&js_sys::Object>) -> Config {
    let mut config = Config::default();
    if let Some(object) = overrides {
        let entries = dom::object_entries(object);
        config.apply_overrides(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    config
}

/// Attaches the effect to `element` and renders the first frame.
#[wasm_bindgen(js_name = initConnectedLines)]
pub async fn init_connected_lines(
    element: HtmlElement,
    overrides: Option<js_sys::Object>,
) -> Result<ConnectedLinesHandle, JsValue> {
    let document = dom::document()?;
    let container = DomContainer::new(element.clone())?;
    let config = resolve_config(&container, &base_config(overrides.as_ref()), &mut ());

    let surface = CanvasSurface::attach(&document, &element)?;
    let image = match container.image_source() {
        Some(src) => loader::load_image(&document, &src).await,
        None => None,
    };

    let renderer = Rc::new(RefCell::new(ConnectedLines::from_parts(
        container, surface, config, image,
    )));
    let on_resize = {
        let renderer = renderer.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut renderer) = renderer.try_borrow_mut() {
                renderer.notify_resize();
            }
        })
    };
    let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
    observer.observe(&element);

    let handle = ConnectedLinesHandle {
        renderer,
        observer,
        _on_resize: Rc::new(on_resize),
    };
    handle.redraw();
    js_sys::Reflect::set(
        &element,
        &JsValue::from_str(HANDLE_PROPERTY),
        &JsValue::from(handle.clone()),
    )?;
    Ok(handle)
}

/// Attaches to every element matching [`DEFAULT_SELECTOR`].
pub fn auto_init() -> Result<(), JsValue> {
    let nodes = dom::document()?.query_selector_all(DEFAULT_SELECTOR)?;
    info!("Auto-init: {} element(s) match '{}'.", nodes.length(), DEFAULT_SELECTOR);
    for i in 0..nodes.length() {
        let Some(element) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = init_connected_lines(element, None).await {
                warn!("Connected lines failed to attach: {:?}", e);
            }
        });
    }
    Ok(())
}

/// Initialises logging and schedules [`auto_init`] for `DOMContentLoaded`.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let _ = console_log::init_with_level(log::Level::Info);
    console_error_panic_hook::set_once();

    let on_ready = Closure::<dyn FnMut()>::new(|| {
        if let Err(e) = auto_init() {
            warn!("Auto-init failed: {:?}", e);
        }
    });
    dom::document()?
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();
    Ok(())
}
