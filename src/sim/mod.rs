//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per display frame)
//! - Seeded RNG only, injected by the caller
//! - Stable iteration order (brick storage order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod level;
pub mod reward;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_target;
pub use collision::{Rect, circle_intersects_rect, reflect_velocity};
pub use level::{LevelDescriptor, LevelError, Sentiment, build_bricks, fallback_descriptor};
pub use reward::{LevelReward, level_reward, time_bonus};
pub use state::{Ball, Brick, BrickKind, Field, FieldStatus, GameEvent, Paddle};
pub use tick::{TickInput, launch, launch_velocity, tick};
