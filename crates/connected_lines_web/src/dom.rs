use connected_lines::host::Container;
use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

const DATA_PREFIX: &str = "data-";

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Creates a detached canvas of the given backing size.
pub fn create_canvas(
    document: &Document,
    width: u32,
    height: u32,
) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()
        .map_err(JsValue::from)
}

/// String form of every own enumerable property of `object`, e.g. `{ maxDist: 42 }`
/// becomes `("maxDist", "42")`. Values that are neither strings, numbers nor booleans
/// are skipped.
pub fn object_entries(object: &js_sys::Object) -> Vec<(String, String)> {
    js_sys::Object::entries(object)
        .iter()
        .filter_map(|entry| {
            let pair: js_sys::Array = entry.dyn_into().ok()?;
            let key = pair.get(0).as_string()?;
            let value = pair.get(1);
            let value = value
                .as_string()
                .or_else(|| value.as_f64().map(|v| v.to_string()))
                .or_else(|| value.as_bool().map(|v| v.to_string()))?;
            Some((key, value))
        })
        .collect()
}

/// A page element hosting the effect.
pub struct DomContainer {
    element: HtmlElement,
    window: Window,
}

impl DomContainer {
    pub fn new(element: HtmlElement) -> Result<Self, JsValue> {
        Ok(Self {
            element,
            window: window()?,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Container for DomContainer {
    fn size(&self) -> Vec2 {
        let rect = self.element.get_bounding_client_rect();
        Vec2::new(rect.width() as f32, rect.height() as f32)
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }

    fn data_attributes(&self) -> Vec<(String, String)> {
        self.element
            .get_attribute_names()
            .iter()
            .filter_map(|name| name.as_string())
            .filter_map(|name| {
                let key = name.strip_prefix(DATA_PREFIX)?.to_owned();
                let value = self.element.get_attribute(&name)?;
                Some((key, value))
            })
            .collect()
    }

    fn style_property(&self, name: &str) -> Option<String> {
        let style = self.window.get_computed_style(&self.element).ok()??;
        let value = style.get_property_value(name).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    }
}
