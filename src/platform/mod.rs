//! Platform helpers shared by the browser shell and the native runner
//!
//! Pointer coordinate conversion and HUD text formatting. Kept free of
//! `web_sys` so it can be tested natively.

use crate::consts::FIELD_WIDTH;

/// Convert a pointer's client x into field units
///
/// The canvas may be scaled by CSS; `rect_left`/`rect_width` come from its
/// bounding client rect. A zero-width rect maps to the field center.
pub fn pointer_to_field_x(client_x: f64, rect_left: f64, rect_width: f64) -> f32 {
    if rect_width <= 0.0 || !rect_width.is_finite() {
        return FIELD_WIDTH / 2.0;
    }
    ((client_x - rect_left) * FIELD_WIDTH as f64 / rect_width) as f32
}

/// `m:ss` clock text
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Score with thousands separators, e.g. `12,500`
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Launch speed boost shown on the victory overlay, e.g. `1.5x`
pub fn format_multiplier(multiplier: f32) -> String {
    format!("{multiplier:.1}x")
}
