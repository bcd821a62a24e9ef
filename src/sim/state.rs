//! Entity model and per-level simulation state
//!
//! Plain data plus small mutation helpers. The only owner of a `Field` is the
//! simulation step; the session hands it in by `&mut` once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Brick categories, named after the asset each one represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickKind {
    /// Highest value
    Btc,
    Eth,
    /// Fastest mover once volatile
    Sol,
    /// Stablecoin: never moves
    Usdt,
}

impl BrickKind {
    pub const ALL: [BrickKind; 4] = [
        BrickKind::Btc,
        BrickKind::Eth,
        BrickKind::Sol,
        BrickKind::Usdt,
    ];

    /// Map a layout grid code (1..=4) to a kind. 0 means "empty cell" and
    /// anything else is not a brick.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(BrickKind::Btc),
            2 => Some(BrickKind::Eth),
            3 => Some(BrickKind::Sol),
            4 => Some(BrickKind::Usdt),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            BrickKind::Btc => 1,
            BrickKind::Eth => 2,
            BrickKind::Sol => 3,
            BrickKind::Usdt => 4,
        }
    }

    /// Points awarded when destroyed
    pub fn value(&self) -> u32 {
        match self {
            BrickKind::Btc => 100,
            BrickKind::Eth => 50,
            BrickKind::Sol => 25,
            BrickKind::Usdt => 10,
        }
    }

    /// Level at which this kind starts moving, and its speed (units/tick)
    pub fn volatility(&self) -> Option<(u32, f32)> {
        match self {
            BrickKind::Btc | BrickKind::Eth => Some((2, 0.5)),
            BrickKind::Sol => Some((3, 0.8)),
            BrickKind::Usdt => None,
        }
    }

    /// Horizontal speed magnitude at the given level (0 = stationary)
    pub fn speed_at_level(&self, level: u32) -> f32 {
        match self.volatility() {
            Some((threshold, speed)) if level >= threshold => speed,
            _ => 0.0,
        }
    }

    pub fn ticker(&self) -> &'static str {
        match self {
            BrickKind::Btc => "BTC",
            BrickKind::Eth => "ETH",
            BrickKind::Sol => "SOL",
            BrickKind::Usdt => "USDT",
        }
    }

    /// CSS fill color
    pub fn color(&self) -> &'static str {
        match self {
            BrickKind::Btc => "#f59e0b",  // Amber
            BrickKind::Eth => "#6366f1",  // Indigo
            BrickKind::Sol => "#d946ef",  // Fuchsia
            BrickKind::Usdt => "#10b981", // Emerald
        }
    }
}

/// A brick entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub kind: BrickKind,
    pub active: bool,
    /// Horizontal velocity (units/tick), nonzero only for volatile bricks
    pub vel_x: f32,
}

impl Brick {
    pub fn new(rect: Rect, kind: BrickKind) -> Self {
        Self {
            rect,
            kind,
            active: true,
            vel_x: 0.0,
        }
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn color(&self) -> &'static str {
        self.kind.color()
    }

    /// Advance horizontally, bouncing elastically off the field edges
    pub fn drift(&mut self, field_width: f32) {
        if !self.active || self.vel_x == 0.0 {
            return;
        }
        self.rect.x += self.vel_x;
        if self.rect.x <= 0.0 {
            self.rect.x = 0.0;
            self.vel_x = -self.vel_x;
        } else if self.rect.right() >= field_width {
            self.rect.x = field_width - self.rect.width;
            self.vel_x = -self.vel_x;
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(
                FIELD_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
                FIELD_HEIGHT - PADDLE_HEIGHT - PADDLE_FLOOR_GAP,
            ),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Center the paddle under the pointer, keeping it fully inside the field
    pub fn follow(&mut self, pointer_x: f32, field_width: f32) {
        let max_x = (field_width - self.width).max(0.0);
        let x = pointer_x - self.width / 2.0;
        // NaN pointer samples fall back to the left edge
        self.pos.x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// false = resting on the paddle, waiting for launch
    pub active: bool,
}

impl Ball {
    /// New inactive ball resting on the paddle
    pub fn resting_on(paddle: &Paddle) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            active: false,
        };
        ball.rest_on(paddle);
        ball
    }

    /// Pin the ball just above the paddle center
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(
            paddle.center_x(),
            paddle.pos.y - self.radius - BALL_REST_GAP,
        );
    }

    /// Deactivate and return to the paddle with zero velocity
    pub fn reset(&mut self, paddle: &Paddle) {
        self.active = false;
        self.vel = Vec2::ZERO;
        self.rest_on(paddle);
    }

    /// Launch from rest with the given velocity. No-op if already in flight.
    pub fn launch(&mut self, vel: Vec2) -> bool {
        if self.active {
            return false;
        }
        self.vel = vel;
        self.active = true;
        true
    }
}

/// Where the level's tick stream stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    Running,
    /// All bricks destroyed
    Cleared,
    /// Out of lives
    Lost,
}

/// Something that happened during a tick, for the session to apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickDestroyed {
        index: usize,
        kind: BrickKind,
        value: u32,
    },
    LifeLost {
        lives_remaining: u8,
    },
    GameOver,
    LevelCleared,
}

/// Complete per-level simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Bricks in layout order; destroyed bricks stay in place, inactive
    pub bricks: Vec<Brick>,
    pub lives: u8,
    pub status: FieldStatus,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl Field {
    /// Fresh field for a level: centered paddle, resting ball
    pub fn new(bricks: Vec<Brick>, lives: u8) -> Self {
        let paddle = Paddle::default();
        let ball = Ball::resting_on(&paddle);
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            paddle,
            ball,
            bricks,
            lives,
            status: FieldStatus::Running,
            time_ticks: 0,
        }
    }

    pub fn active_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.active).count()
    }

    pub fn is_running(&self) -> bool {
        self.status == FieldStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        for kind in BrickKind::ALL {
            assert_eq!(BrickKind::from_code(kind.code() as i64), Some(kind));
        }
        assert_eq!(BrickKind::from_code(0), None);
        assert_eq!(BrickKind::from_code(5), None);
        assert_eq!(BrickKind::from_code(-1), None);
    }

    #[test]
    fn test_kind_volatility_thresholds() {
        assert_eq!(BrickKind::Btc.speed_at_level(1), 0.0);
        assert_eq!(BrickKind::Btc.speed_at_level(2), 0.5);
        assert_eq!(BrickKind::Eth.speed_at_level(2), 0.5);
        assert_eq!(BrickKind::Sol.speed_at_level(2), 0.0);
        assert_eq!(BrickKind::Sol.speed_at_level(3), 0.8);
        assert_eq!(BrickKind::Usdt.speed_at_level(99), 0.0);
    }

    #[test]
    fn test_paddle_follow_clamps() {
        let mut paddle = Paddle::default();
        paddle.follow(10.0, FIELD_WIDTH);
        assert_eq!(paddle.pos.x, 0.0);

        paddle.follow(790.0, FIELD_WIDTH);
        assert_eq!(paddle.pos.x, FIELD_WIDTH - PADDLE_WIDTH);

        paddle.follow(400.0, FIELD_WIDTH);
        assert_eq!(paddle.pos.x, 350.0);
        assert_eq!(paddle.center_x(), 400.0);

        paddle.follow(f32::NAN, FIELD_WIDTH);
        assert_eq!(paddle.pos.x, 0.0);
    }

    #[test]
    fn test_default_paddle_geometry() {
        let paddle = Paddle::default();
        assert_eq!(paddle.pos, Vec2::new(350.0, 574.0));
        assert_eq!(paddle.rect().bottom(), 590.0);
    }

    #[test]
    fn test_ball_rests_above_paddle() {
        let paddle = Paddle::default();
        let ball = Ball::resting_on(&paddle);
        assert!(!ball.active);
        assert_eq!(ball.pos, Vec2::new(400.0, 574.0 - BALL_RADIUS - BALL_REST_GAP));
    }

    #[test]
    fn test_ball_launch_once() {
        let paddle = Paddle::default();
        let mut ball = Ball::resting_on(&paddle);
        assert!(ball.launch(Vec2::new(5.0, -5.0)));
        assert!(!ball.launch(Vec2::new(1.0, -1.0)));
        assert_eq!(ball.vel, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn test_brick_drift_bounces() {
        let mut brick = Brick::new(Rect::new(1.0, 50.0, 80.0, 24.0), BrickKind::Btc);
        brick.vel_x = -2.0;
        brick.drift(FIELD_WIDTH);
        assert_eq!(brick.rect.x, 0.0);
        assert_eq!(brick.vel_x, 2.0);

        brick.rect.x = FIELD_WIDTH - 81.0;
        brick.drift(FIELD_WIDTH);
        assert_eq!(brick.rect.x, FIELD_WIDTH - 80.0);
        assert_eq!(brick.vel_x, -2.0);
    }

    #[test]
    fn test_inactive_brick_never_moves() {
        let mut brick = Brick::new(Rect::new(100.0, 50.0, 80.0, 24.0), BrickKind::Sol);
        brick.vel_x = 0.8;
        brick.active = false;
        brick.drift(FIELD_WIDTH);
        assert_eq!(brick.rect.x, 100.0);
    }
}
