//! Game session state machine
//!
//! Sequences levels around the simulation:
//! `Menu -> Generating -> Playing -> {Victory, GameOver}`, then
//! `Victory -> Generating` (next level or restart) and
//! `GameOver -> Generating` (restart at level 1).
//!
//! The session never talks to the outside world directly. Level content is
//! requested through a `LevelRequest` the host resolves asynchronously, and
//! audio/persistence side effects are queued as `SessionEffect`s for the host
//! to drain. Two clocks drive it: `frame()` once per display frame and
//! `second_elapsed()` from a 1 Hz timer. Both are no-ops outside `Playing`.

use core::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{
    Brick, Field, GameEvent, LevelDescriptor, LevelReward, TickInput, build_bricks,
    fallback_descriptor, launch, level_reward, tick,
};

/// Shown while fallback content stands in for the oracle's
pub const OFFLINE_ADVISORY: &str = "Oracle disconnected. Using local genesis block.";

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Menu,
    /// Waiting on level content
    Generating,
    /// Physics running
    Playing,
    /// Out of lives
    GameOver,
    /// Level cleared, waiting for next level
    Victory,
}

/// An outstanding request for level content
///
/// Only the most recent request is honored; responses to older ones are
/// dropped when delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRequest {
    pub level: u32,
    ticket: u64,
}

/// Side effects for the host to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Start the ambient theme for a level
    StartMusic { level: u32 },
    StopMusic,
    /// One-shot level-clear cue
    VictoryCue,
    /// Persist a new best score
    SaveBestScore(u64),
}

/// Whole-run state
pub struct Session {
    phase: GamePhase,
    level: u32,
    score: u64,
    lives: u8,
    /// Seconds played this run
    total_time_secs: u64,
    /// Seconds played this level
    level_time_secs: u64,
    /// Brick points earned this level
    level_base: u64,
    last_reward: Option<LevelReward>,
    best_score: u64,
    descriptor: Option<LevelDescriptor>,
    field: Option<Field>,
    input: TickInput,
    pending: Option<LevelRequest>,
    next_ticket: u64,
    advisory: Option<String>,
    rng: Pcg32,
    effects: Vec<SessionEffect>,
}

impl Session {
    /// New session at the menu. `best_score` is the persisted best, if any.
    pub fn new(seed: u64, best_score: Option<u64>) -> Self {
        Self {
            phase: GamePhase::Menu,
            level: 1,
            score: 0,
            lives: INITIAL_LIVES,
            total_time_secs: 0,
            level_time_secs: 0,
            level_base: 0,
            last_reward: None,
            best_score: best_score.unwrap_or(0),
            descriptor: None,
            field: None,
            input: TickInput::default(),
            pending: None,
            next_ticket: 1,
            advisory: None,
            rng: Pcg32::seed_from_u64(seed),
            effects: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn total_time_secs(&self) -> u64 {
        self.total_time_secs
    }

    pub fn level_time_secs(&self) -> u64 {
        self.level_time_secs
    }

    /// Breakdown of the most recently cleared level
    pub fn last_reward(&self) -> Option<LevelReward> {
        self.last_reward
    }

    pub fn descriptor(&self) -> Option<&LevelDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn pending_request(&self) -> Option<LevelRequest> {
        self.pending
    }

    /// Transient message about degraded level content
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// True once the level clock has run past par
    pub fn is_over_par(&self) -> bool {
        self.descriptor
            .as_ref()
            .is_some_and(|d| self.level_time_secs > d.target_time_secs as u64)
    }

    /// Take queued side effects
    pub fn drain_effects(&mut self) -> Vec<SessionEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Menu -> Generating level 1
    pub fn start(&mut self) -> Option<LevelRequest> {
        if self.phase != GamePhase::Menu {
            return None;
        }
        Some(self.request_level(1))
    }

    /// Victory -> Generating the following level
    pub fn next_level(&mut self) -> Option<LevelRequest> {
        if self.phase != GamePhase::Victory {
            return None;
        }
        Some(self.request_level(self.level + 1))
    }

    /// Victory/GameOver -> Generating level 1 (full reset on entering play)
    pub fn restart(&mut self) -> Option<LevelRequest> {
        match self.phase {
            GamePhase::Victory | GamePhase::GameOver => Some(self.request_level(1)),
            _ => None,
        }
    }

    /// Drop back to the menu from anywhere, cancelling any pending request
    pub fn quit_to_menu(&mut self) {
        if self.phase == GamePhase::Playing {
            self.effects.push(SessionEffect::StopMusic);
        }
        self.pending = None;
        self.field = None;
        self.phase = GamePhase::Menu;
        log::info!("Returned to menu");
    }

    fn request_level(&mut self, level: u32) -> LevelRequest {
        let request = LevelRequest {
            level,
            ticket: self.next_ticket,
        };
        self.next_ticket += 1;
        self.pending = Some(request);
        self.field = None;
        self.advisory = None;
        self.phase = GamePhase::Generating;
        log::info!("Requesting level {}", level);
        request
    }

    /// Hand in the oracle's answer for `request`
    ///
    /// Failures and malformed descriptors are replaced by the local fallback
    /// level so play always continues. Returns false if the response is stale
    /// (the session has since moved on) and was ignored.
    pub fn deliver_level<E: fmt::Display>(
        &mut self,
        request: LevelRequest,
        result: Result<LevelDescriptor, E>,
    ) -> bool {
        if self.phase != GamePhase::Generating || self.pending != Some(request) {
            log::warn!("Ignoring stale level {} response", request.level);
            return false;
        }
        self.pending = None;
        let level = request.level;

        let (descriptor, bricks) = match result {
            Ok(descriptor) => match build_bricks(&descriptor, level, &mut self.rng) {
                Ok(bricks) => (descriptor, bricks),
                Err(e) => {
                    log::warn!("Level {} descriptor rejected: {}", level, e);
                    self.fallback_level(level)
                }
            },
            Err(e) => {
                log::warn!("Oracle failed for level {}: {}", level, e);
                self.fallback_level(level)
            }
        };

        self.enter_playing(level, descriptor, bricks);
        true
    }

    fn fallback_level(&mut self, level: u32) -> (LevelDescriptor, Vec<Brick>) {
        self.advisory = Some(OFFLINE_ADVISORY.to_string());
        let descriptor = fallback_descriptor(level);
        // The fallback grid is always valid
        let bricks = build_bricks(&descriptor, level, &mut self.rng).unwrap_or_default();
        (descriptor, bricks)
    }

    fn enter_playing(&mut self, level: u32, descriptor: LevelDescriptor, bricks: Vec<Brick>) {
        if level == 1 {
            self.score = 0;
            self.lives = INITIAL_LIVES;
            self.total_time_secs = 0;
        }
        self.level = level;
        self.level_time_secs = 0;
        self.level_base = 0;
        self.last_reward = None;

        log::info!(
            "Level {} '{}' ({}, par {}s, {} bricks)",
            level,
            descriptor.name,
            descriptor.sentiment.as_str(),
            descriptor.target_time_secs,
            bricks.len()
        );

        self.field = Some(Field::new(bricks, self.lives));
        self.descriptor = Some(descriptor);
        self.phase = GamePhase::Playing;
        self.effects.push(SessionEffect::StartMusic { level });
    }

    /// Latest pointer/touch sample in field units
    pub fn set_pointer_x(&mut self, x: f32) {
        self.input.pointer_x = Some(x);
    }

    /// Launch trigger (click/tap). Only honored while playing with the ball at rest.
    pub fn launch(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        match (self.field.as_mut(), self.descriptor.as_ref()) {
            (Some(field), Some(descriptor)) => launch(field, descriptor.sentiment),
            _ => false,
        }
    }

    /// Physics clock: one simulation tick per display frame
    pub fn frame(&mut self) -> Vec<GameEvent> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        let Some(field) = self.field.as_mut() else {
            return Vec::new();
        };

        let events = tick(field, &self.input);
        for event in &events {
            match *event {
                GameEvent::BrickDestroyed { value, .. } => {
                    self.score = self.score.saturating_add(value as u64);
                    self.level_base = self.level_base.saturating_add(value as u64);
                    self.update_best();
                }
                GameEvent::LifeLost { lives_remaining } => {
                    self.lives = lives_remaining;
                }
                GameEvent::GameOver => self.enter_game_over(),
                GameEvent::LevelCleared => self.enter_victory(),
            }
        }
        events
    }

    /// Wall clock: called once per second
    pub fn second_elapsed(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.total_time_secs += 1;
        self.level_time_secs += 1;
    }

    fn enter_victory(&mut self) {
        // Uses whatever the 1 Hz clock reads right now
        let par = self
            .descriptor
            .as_ref()
            .map_or(DEFAULT_PAR_SECONDS, |d| d.target_time_secs);
        let reward = level_reward(par as i64, self.level_time_secs as i64, self.level_base);

        // Brick points were banked as they fell; only the bonus is new
        self.score = self.score.saturating_add(reward.bonus);
        self.last_reward = Some(reward);
        self.update_best();

        self.phase = GamePhase::Victory;
        self.effects.push(SessionEffect::StopMusic);
        self.effects.push(SessionEffect::VictoryCue);
        log::info!(
            "Level {} cleared in {}s: {} + {} bonus, score {}",
            self.level,
            self.level_time_secs,
            reward.base,
            reward.bonus,
            self.score
        );
    }

    fn enter_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.effects.push(SessionEffect::StopMusic);
        log::info!("Game over at level {} with score {}", self.level, self.score);
    }

    fn update_best(&mut self) {
        if self.score > self.best_score {
            self.best_score = self.score;
            self.effects.push(SessionEffect::SaveBestScore(self.score));
        }
    }
}
