//! Fixed-step simulation tick
//!
//! Advances a `Field` by one frame and reports what happened. Score and lives
//! bookkeeping beyond the field belongs to the session, which consumes the
//! returned events.

use glam::Vec2;

use super::collision::{circle_intersects_rect, reflect_velocity};
use super::level::Sentiment;
use super::state::{Field, FieldStatus, GameEvent};
use crate::consts::*;

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer/touch x in field units, if any
    pub pointer_x: Option<f32>,
}

/// Launch velocity for a level: up and to the right, faster when bullish
pub fn launch_velocity(sentiment: Sentiment) -> Vec2 {
    let speed = BALL_SPEED_BASE * sentiment.launch_multiplier();
    Vec2::new(speed, -speed)
}

/// Launch a resting ball. Returns false if the ball is already in flight or
/// the level is over.
pub fn launch(field: &mut Field, sentiment: Sentiment) -> bool {
    if !field.is_running() {
        return false;
    }
    field.ball.launch(launch_velocity(sentiment))
}

/// Advance the field by one tick
///
/// Order matters: the paddle moves before the ball so paddle contact is
/// tested against this tick's paddle position; the floor is resolved before
/// the paddle and bricks. Returns no events once the field has stopped.
pub fn tick(field: &mut Field, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !field.is_running() {
        return events;
    }

    field.time_ticks += 1;

    if let Some(x) = input.pointer_x {
        field.paddle.follow(x, field.width);
    }

    for brick in &mut field.bricks {
        brick.drift(field.width);
    }

    if !field.ball.active {
        field.ball.rest_on(&field.paddle);
        return events;
    }

    let ball = &mut field.ball;
    ball.pos += ball.vel;
    let r = ball.radius;

    // Side walls
    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = ball.vel.x.abs();
    } else if ball.pos.x + r > field.width {
        ball.pos.x = field.width - r;
        ball.vel.x = -ball.vel.x.abs();
    }

    // Ceiling
    if ball.pos.y - r < 0.0 {
        ball.pos.y = r;
        ball.vel.y = ball.vel.y.abs();
    }

    // Floor
    if ball.pos.y + r > field.height {
        field.lives = field.lives.saturating_sub(1);
        ball.reset(&field.paddle);
        events.push(GameEvent::LifeLost {
            lives_remaining: field.lives,
        });
        log::debug!("Life lost, {} remaining", field.lives);

        if field.lives == 0 {
            field.status = FieldStatus::Lost;
            events.push(GameEvent::GameOver);
        }
        return events;
    }

    // Paddle, only while falling so a grazing ball can't bounce twice
    if ball.vel.y > 0.0 && circle_intersects_rect(ball.pos, r, &field.paddle.rect()) {
        ball.vel = reflect_velocity(ball.vel, Vec2::Y);
        ball.vel.x = (ball.pos.x - field.paddle.center_x()) * PADDLE_ENGLISH;
    }

    // Bricks: first hit in storage order wins, one per tick
    if let Some((index, brick)) = field
        .bricks
        .iter_mut()
        .enumerate()
        .find(|(_, b)| b.active && circle_intersects_rect(ball.pos, r, &b.rect))
    {
        brick.active = false;
        // Flat vertical bounce regardless of which face was struck
        ball.vel = reflect_velocity(ball.vel, Vec2::Y);
        events.push(GameEvent::BrickDestroyed {
            index,
            kind: brick.kind,
            value: brick.value(),
        });
    }

    if !field.bricks.is_empty() && field.bricks.iter().all(|b| !b.active) {
        field.status = FieldStatus::Cleared;
        events.push(GameEvent::LevelCleared);
    }

    events
}
