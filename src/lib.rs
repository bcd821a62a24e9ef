//! Crypto Breakout - a market-themed brick breaker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, level building, rewards)
//! - `session`: Phase state machine sequencing levels, lives and score
//! - `oracle`: Level-content oracle client with offline fallback
//! - `renderer`: Canvas 2D rendering (wasm only)
//! - `audio`: Procedural level music and cues
//! - `platform`: Pointer scaling and HUD formatting
//! - `persistence`: Best-score storage
//! - `highscores`: Game-over leaderboard
//! - `settings`: Persisted preferences and oracle configuration

pub mod audio;
pub mod highscores;
pub mod oracle;
pub mod persistence;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::Leaderboard;
pub use session::{GamePhase, Session};
pub use settings::Settings;

/// Game configuration constants
///
/// All distances are play-field units (the canvas is 800x600 logical pixels),
/// all speeds are units per tick.
pub mod consts {
    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    /// Gap between the paddle bottom edge and the floor
    pub const PADDLE_FLOOR_GAP: f32 = 10.0;
    /// Horizontal velocity per unit of offset from paddle center
    pub const PADDLE_ENGLISH: f32 = 0.15;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    pub const BALL_SPEED_BASE: f32 = 5.0;
    /// Launch speed multiplier for bullish levels
    pub const BULLISH_SPEED_MULTIPLIER: f32 = 1.5;
    /// Space between a resting ball and the paddle top
    pub const BALL_REST_GAP: f32 = 2.0;

    /// Brick grid layout
    pub const BRICK_COLS: u32 = 10;
    pub const BRICK_ROWS: u32 = 8;
    pub const BRICK_PADDING: f32 = 8.0;
    pub const BRICK_HEIGHT: f32 = 24.0;
    /// Room left above the grid for the status header
    pub const BRICK_TOP_MARGIN: f32 = 50.0;

    /// Session rules
    pub const INITIAL_LIVES: u8 = 3;
    pub const TIME_BONUS_PER_SECOND: u64 = 50;
    pub const DEFAULT_PAR_SECONDS: u32 = 120;

    /// Nominal display refresh rate (native runner only)
    pub const FRAMES_PER_SECOND: u32 = 60;
}
