use std::cell::Cell;
use std::collections::HashMap;

use folio_engine::DrawSurface;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// `DrawSurface` over a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    missing_logged: Cell<bool>,
}

impl CanvasSurface {
    /// Wrap `canvas`. Fails when the 2D context is unavailable.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("{:?}", e))?
            .ok_or_else(|| "2d context not supported".to_string())?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "context is not CanvasRenderingContext2d".to_string())?;
        Ok(Self {
            canvas,
            ctx,
            images: HashMap::new(),
            missing_logged: Cell::new(false),
        })
    }

    /// Start loading an image. It is drawn once the browser has decoded it.
    pub fn load_image(&mut self, key: &str, url: &str) {
        match HtmlImageElement::new() {
            Ok(img) => {
                img.set_src(url);
                self.images.insert(key.to_string(), img);
            }
            Err(e) => log::warn!("canvas: cannot create image '{}': {:?}", key, e),
        }
    }

    /// Resize the backing store.
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl DrawSurface for CanvasSurface {
    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f32) {
        self.ctx.set_line_width(width as f64);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.stroke_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        // Negative radius throws
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius.max(0.0) as f64, start as f64, end as f64);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.ctx.translate(x as f64, y as f64);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        let _ = self.ctx.scale(sx as f64, sy as f64);
    }

    fn draw_image(&mut self, key: &str, x: f32, y: f32, w: f32, h: f32) -> bool {
        let img = match self.images.get(key) {
            Some(img) if img.complete() && img.natural_width() > 0 => img,
            _ => {
                if !self.missing_logged.replace(true) {
                    log::warn!("canvas: image '{}' not loaded, drawing placeholder", key);
                }
                return false;
            }
        };
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, x as f64, y as f64, w as f64, h as f64)
            .is_ok()
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}
