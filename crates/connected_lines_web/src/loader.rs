use connected_lines::source::SourceImage;
use tracing::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlImageElement};

use crate::dom::{context_2d, create_canvas};

/// Loads and decodes `src`, reading its pixels back through an offscreen canvas.
///
/// Returns `None` when the image fails to load or its pixels cannot be read (e.g. a
/// cross-origin image without CORS headers).
pub async fn load_image(document: &Document, src: &str) -> Option<SourceImage> {
    match decode(document, src).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Image '{}' unavailable ({:?}); using a uniform field.", src, e);
            None
        }
    }
}

async fn decode(document: &Document, src: &str) -> Result<SourceImage, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_src(src);
    JsFuture::from(img.decode()).await?;

    let (w, h) = (img.natural_width(), img.natural_height());
    let canvas = create_canvas(document, w, h)?;
    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_html_image_element(&img, 0.0, 0.0)?;
    let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?.data();
    SourceImage::from_rgba(w, h, data.0).map_err(|e| JsValue::from_str(&e.to_string()))
}
