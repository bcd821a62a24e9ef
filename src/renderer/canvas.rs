//! Canvas 2D field renderer

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::*;
use crate::sim::Field;

const BACKGROUND: &str = "#09090b";
const PADDLE_COLOR: &str = "#38bdf8";
const BALL_COLOR: &str = "#ffffff";
const BRICK_OUTLINE: &str = "rgba(0,0,0,0.3)";
const BRICK_LABEL: &str = "rgba(255,255,255,0.6)";

/// Draws a `Field` onto a canvas in field units
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Bind to `canvas`, sizing its backing store to the play field
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        Ok(Self { ctx })
    }

    /// Empty field, e.g. while a level is generating
    pub fn clear(&self) {
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx
            .fill_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
    }

    pub fn render(&self, field: &Field) {
        let ctx = &self.ctx;
        self.clear();

        // Paddle with glow
        let paddle = &field.paddle;
        ctx.set_fill_style_str(PADDLE_COLOR);
        ctx.set_shadow_blur(10.0);
        ctx.set_shadow_color(PADDLE_COLOR);
        ctx.fill_rect(
            paddle.pos.x as f64,
            paddle.pos.y as f64,
            paddle.width as f64,
            paddle.height as f64,
        );
        ctx.set_shadow_blur(0.0);

        // Ball
        let ball = &field.ball;
        ctx.begin_path();
        ctx.arc(ball.pos.x as f64, ball.pos.y as f64, ball.radius as f64, 0.0, TAU)
            .ok();
        ctx.set_fill_style_str(BALL_COLOR);
        ctx.fill();
        ctx.close_path();

        // Bricks with ticker labels
        ctx.set_font("bold 10px monospace");
        ctx.set_text_align("center");
        ctx.set_line_width(1.0);
        for brick in field.bricks.iter().filter(|b| b.active) {
            let r = &brick.rect;
            let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);

            ctx.set_fill_style_str(brick.color());
            ctx.fill_rect(x, y, w, h);
            ctx.set_stroke_style_str(BRICK_OUTLINE);
            ctx.stroke_rect(x, y, w, h);

            ctx.set_fill_style_str(BRICK_LABEL);
            ctx.fill_text(brick.kind.ticker(), x + w / 2.0, y + h / 2.0 + 4.0)
                .ok();
        }
    }
}
