//! Idle/demo paddle controller
//!
//! Tracks where a falling ball will meet the paddle line and steers there,
//! with a slow-wandering offset so paddle contacts add some english.

use super::state::Field;

/// Pointer x the autopilot would feed this tick
pub fn autopilot_target(field: &Field) -> f32 {
    let paddle = &field.paddle;
    let ball = &field.ball;

    if !ball.active {
        return paddle.center_x();
    }

    let target = if ball.vel.y > 0.0 {
        let contact_y = paddle.pos.y - ball.radius;
        let ticks = ((contact_y - ball.pos.y) / ball.vel.y).max(0.0);
        fold_between_walls(ball.pos.x + ball.vel.x * ticks, ball.radius, field.width)
    } else {
        ball.pos.x
    };

    // Oscillating offset to avoid perfect loops
    let time_factor = field.time_ticks as f32 * 0.01;
    let wander = time_factor.sin() * 0.6 + (time_factor * 0.7).sin() * 0.3;
    target + wander * paddle.width * 0.25
}

/// Map an unbounded x onto the path of a ball bouncing between the side walls
fn fold_between_walls(x: f32, radius: f32, width: f32) -> f32 {
    let span = width - 2.0 * radius;
    if span <= 0.0 || !x.is_finite() {
        return width / 2.0;
    }
    let mut u = (x - radius).rem_euclid(2.0 * span);
    if u > span {
        u = 2.0 * span - u;
    }
    radius + u
}
