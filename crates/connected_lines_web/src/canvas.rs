use std::f64::consts::TAU;

use connected_lines::color::Color;
use connected_lines::render::Surface;
use connected_lines::source::SourceImage;
use glam::Vec2;
use image::RgbaImage;
use tracing::warn;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, ImageData};

use crate::dom::{context_2d, create_canvas};

/// Class given to the overlay canvas so pages can position it.
pub const CANVAS_CLASS: &str = "connected-lines";

/// Surface over a `<canvas>` appended to the container.
pub struct CanvasSurface {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    /// Creates the canvas and appends it to `parent`.
    pub fn attach(document: &Document, parent: &HtmlElement) -> Result<Self, JsValue> {
        let canvas = create_canvas(document, 0, 0)?;
        canvas.set_class_name(CANVAS_CLASS);
        let ctx = context_2d(&canvas)?;
        parent.append_child(&canvas)?;
        Ok(Self {
            document: document.clone(),
            canvas,
            ctx,
            width: 0,
            height: 0,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn put_frame(&self, frame: &RgbaImage) -> Result<HtmlCanvasElement, JsValue> {
        let (w, h) = frame.dimensions();
        let offscreen = create_canvas(&self.document, w, h)?;
        let pixels = Clamped(frame.as_raw().as_slice());
        let data = ImageData::new_with_u8_clamped_array_and_sh(pixels, w, h)?;
        context_2d(&offscreen)?.put_image_data(&data, 0.0, 0.0)?;
        Ok(offscreen)
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        let ratio = pixel_ratio as f64;
        self.width = width;
        self.height = height;
        self.canvas.set_width((width as f64 * ratio).floor() as u32);
        self.canvas.set_height((height as f64 * ratio).floor() as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
        let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    /// Fits the image to the canvas backing store so the backdrop keeps device detail,
    /// then draws it 1:1 under the pixel-ratio transform.
    fn draw_backdrop(&mut self, image: &SourceImage, _region: (u32, u32), alpha: f32) {
        let Some(frame) = image.fit_to(self.canvas.width(), self.canvas.height()) else {
            return;
        };
        let offscreen = match self.put_frame(&frame) {
            Ok(canvas) => canvas,
            Err(e) => {
                warn!("Backdrop skipped: {:?}", e);
                return;
            }
        };
        self.ctx.set_global_alpha(alpha as f64);
        let _ = self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            &offscreen,
            0.0,
            0.0,
            self.width as f64,
            self.height as f64,
        );
        self.ctx.set_global_alpha(1.0);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
        self.ctx.fill();
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }
}
