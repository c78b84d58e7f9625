use wasm_bindgen::JsCast;
use web_sys as web;

use card_core::{CardError, Color, DrawSurface, Viewport};

/// `DrawSurface` over a 2D canvas. Drawing happens in CSS pixels; the
/// backing store is sized in device pixels and the transform bridges the two.
pub struct CanvasSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: web::HtmlCanvasElement) -> Result<Self, CardError> {
        let unavailable = || CardError::unavailable(format!("2d context for #{}", canvas.id()));
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| unavailable())?
            .ok_or_else(unavailable)?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|_| unavailable())?;
        Ok(Self {
            canvas,
            ctx,
            viewport: Viewport::default(),
        })
    }
}

impl DrawSurface for CanvasSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let (w, h) = viewport.pixel_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let style = self.canvas.style();
        _ = style.set_property("width", &format!("{}px", viewport.width));
        _ = style.set_property("height", &format!("{}px", viewport.height));
        // resizing the backing store resets the context state
        let dpr = viewport.pixel_ratio as f64;
        _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_fill(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn translate(&mut self, x: f32, y: f32) {
        _ = self.ctx.translate(x as f64, y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        _ = self.ctx.rotate(radians as f64);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        _ = self.ctx.scale(sx as f64, sy as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn bezier_curve_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.ctx.bezier_curve_to(
            c1x as f64, c1y as f64, c2x as f64, c2y as f64, x as f64, y as f64,
        );
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32) {
        _ = self
            .ctx
            .arc(x as f64, y as f64, radius.max(0.0) as f64, start as f64, end as f64);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx
            .fill_rect(x as f64, y as f64, w as f64, h as f64);
    }
}
