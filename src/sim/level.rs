//! Level descriptors and the brick layout builder
//!
//! Descriptors come from an external generator and may be malformed, so they
//! are validated before any brick is placed.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::{Brick, BrickKind};
use crate::consts::*;

/// Level-wide market mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    /// Upward market: faster launches
    Bullish,
    Bearish,
    Volatile,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Bearish => "BEARISH",
            Sentiment::Volatile => "VOLATILE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BULLISH" => Some(Sentiment::Bullish),
            "BEARISH" => Some(Sentiment::Bearish),
            "VOLATILE" => Some(Sentiment::Volatile),
            _ => None,
        }
    }

    /// Multiplier applied to the base launch speed
    pub fn launch_multiplier(&self) -> f32 {
        match self {
            Sentiment::Bullish => BULLISH_SPEED_MULTIPLIER,
            Sentiment::Bearish | Sentiment::Volatile => 1.0,
        }
    }
}

/// Content for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    pub description: String,
    pub sentiment: Sentiment,
    /// Row-major grid of kind codes, 0 = empty. Unknown nonzero codes build
    /// as USDT.
    pub grid: Vec<i64>,
    pub columns: u32,
    pub rows: u32,
    /// Par time in seconds
    pub target_time_secs: u32,
}

/// Why a descriptor can't be turned into bricks
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelError {
    ZeroDimension { columns: u32, rows: u32 },
    GridLengthMismatch { expected: usize, actual: usize },
    NoBricks,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { columns, rows } => {
                write!(f, "grid dimensions must be nonzero (got {columns}x{rows})")
            }
            Self::GridLengthMismatch { expected, actual } => {
                write!(f, "grid has {actual} cells, expected {expected}")
            }
            Self::NoBricks => write!(f, "grid contains no bricks"),
        }
    }
}

impl std::error::Error for LevelError {}

impl LevelDescriptor {
    /// Check the grid shape. A level with no bricks could never be cleared,
    /// so it is rejected too.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LevelError::ZeroDimension {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let expected = self.columns as usize * self.rows as usize;
        if self.grid.len() != expected {
            return Err(LevelError::GridLengthMismatch {
                expected,
                actual: self.grid.len(),
            });
        }
        if self.grid.iter().all(|&code| code == 0) {
            return Err(LevelError::NoBricks);
        }
        Ok(())
    }

    /// Number of cells that will become bricks
    pub fn brick_count(&self) -> usize {
        self.grid.iter().filter(|&&code| code != 0).count()
    }
}

/// Local stand-in used whenever the oracle can't deliver a usable level
pub fn fallback_descriptor(level: u32) -> LevelDescriptor {
    let cells = (BRICK_COLS * BRICK_ROWS) as usize;
    LevelDescriptor {
        name: format!("Offline Genesis Block L{level}"),
        description: "Network disconnected. Using local genesis block.".to_string(),
        sentiment: Sentiment::Volatile,
        grid: (0..cells)
            .map(|i| {
                if i % 2 == 0 {
                    BrickKind::Btc.code() as i64
                } else {
                    BrickKind::Usdt.code() as i64
                }
            })
            .collect(),
        columns: BRICK_COLS,
        rows: BRICK_ROWS,
        target_time_secs: DEFAULT_PAR_SECONDS,
    }
}

/// Width of one brick so that `columns` bricks plus padding span the field
pub fn brick_width(columns: u32, field_width: f32) -> f32 {
    (field_width - BRICK_PADDING * (columns as f32 + 1.0)) / columns as f32
}

/// Build the brick set for a level
///
/// Bricks come out in row-major grid order with empty cells skipped. Kinds
/// that are volatile at `level` get their speed with a random direction.
/// Only a grid that doesn't match `columns x rows` (or has no bricks) fails.
pub fn build_bricks<R: Rng>(
    descriptor: &LevelDescriptor,
    level: u32,
    rng: &mut R,
) -> Result<Vec<Brick>, LevelError> {
    descriptor.validate()?;

    let width = brick_width(descriptor.columns, FIELD_WIDTH);
    let mut bricks = Vec::with_capacity(descriptor.brick_count());

    for (index, &code) in descriptor.grid.iter().enumerate() {
        if code == 0 {
            continue;
        }
        let kind = BrickKind::from_code(code).unwrap_or(BrickKind::Usdt);
        let col = (index % descriptor.columns as usize) as f32;
        let row = (index / descriptor.columns as usize) as f32;

        let x = BRICK_PADDING + col * (width + BRICK_PADDING);
        let y = BRICK_PADDING + row * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_TOP_MARGIN;

        let mut brick = Brick::new(Rect::new(x, y, width, BRICK_HEIGHT), kind);
        let speed = kind.speed_at_level(level);
        if speed > 0.0 {
            brick.vel_x = if rng.random_bool(0.5) { speed } else { -speed };
        }
        bricks.push(brick);
    }

    let moving = bricks.iter().filter(|b| b.vel_x != 0.0).count();
    log::debug!(
        "Level {} '{}': {} bricks ({} volatile)",
        level,
        descriptor.name,
        bricks.len(),
        moving
    );

    Ok(bricks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn descriptor(grid: Vec<i64>, columns: u32, rows: u32) -> LevelDescriptor {
        LevelDescriptor {
            name: "Test".to_string(),
            description: String::new(),
            sentiment: Sentiment::Bearish,
            grid,
            columns,
            rows,
            target_time_secs: 120,
        }
    }

    #[test]
    fn test_brick_width_matches_layout() {
        let w = brick_width(10, FIELD_WIDTH);
        assert!((w - 71.2).abs() < 0.001);
    }

    #[test]
    fn test_build_positions_row_major() {
        let mut grid = vec![0; 80];
        grid[0] = 1;
        grid[11] = 4; // row 1, col 1
        let mut rng = Pcg32::seed_from_u64(1);
        let bricks = build_bricks(&descriptor(grid, 10, 8), 1, &mut rng).unwrap();

        assert_eq!(bricks.len(), 2);
        assert_eq!(bricks[0].kind, BrickKind::Btc);
        assert_eq!(bricks[0].rect.x, 8.0);
        assert_eq!(bricks[0].rect.y, 58.0);
        assert_eq!(bricks[1].kind, BrickKind::Usdt);
        assert!((bricks[1].rect.x - (8.0 + 71.2 + 8.0)).abs() < 0.001);
        assert_eq!(bricks[1].rect.y, 8.0 + 32.0 + 50.0);
    }

    #[test]
    fn test_level_one_is_static() {
        let mut rng = Pcg32::seed_from_u64(7);
        let bricks = build_bricks(&descriptor(vec![1, 2, 3, 4], 4, 1), 1, &mut rng).unwrap();
        assert!(bricks.iter().all(|b| b.vel_x == 0.0));
    }

    #[test]
    fn test_volatility_by_level() {
        let d = descriptor(vec![1, 2, 3, 4], 4, 1);

        let mut rng = Pcg32::seed_from_u64(7);
        let level2 = build_bricks(&d, 2, &mut rng).unwrap();
        assert_eq!(level2[0].vel_x.abs(), 0.5);
        assert_eq!(level2[1].vel_x.abs(), 0.5);
        assert_eq!(level2[2].vel_x, 0.0);
        assert_eq!(level2[3].vel_x, 0.0);

        let level3 = build_bricks(&d, 3, &mut rng).unwrap();
        assert_eq!(level3[2].vel_x.abs(), 0.8);
        assert_eq!(level3[3].vel_x, 0.0);
    }

    #[test]
    fn test_direction_is_seeded() {
        let d = fallback_descriptor(4);
        let a = build_bricks(&d, 4, &mut Pcg32::seed_from_u64(42)).unwrap();
        let b = build_bricks(&d, 4, &mut Pcg32::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        // Both directions show up across 40 volatile bricks
        assert!(a.iter().any(|b| b.vel_x > 0.0));
        assert!(a.iter().any(|b| b.vel_x < 0.0));
    }

    #[test]
    fn test_grid_length_mismatch() {
        let mut rng = Pcg32::seed_from_u64(1);
        let result = build_bricks(&descriptor(vec![1; 79], 10, 8), 1, &mut rng);
        assert_eq!(
            result,
            Err(LevelError::GridLengthMismatch {
                expected: 80,
                actual: 79
            })
        );
    }

    #[test]
    fn test_invalid_descriptors() {
        assert_eq!(
            descriptor(vec![], 0, 8).validate(),
            Err(LevelError::ZeroDimension { columns: 0, rows: 8 })
        );
        assert_eq!(
            descriptor(vec![0; 4], 2, 2).validate(),
            Err(LevelError::NoBricks)
        );
    }

    #[test]
    fn test_unknown_codes_build_as_usdt() {
        let mut grid = vec![1; 80];
        grid[5] = 5;
        grid[6] = -1;
        let d = descriptor(grid, 10, 8);
        assert!(d.validate().is_ok());

        let mut rng = Pcg32::seed_from_u64(1);
        let bricks = build_bricks(&d, 1, &mut rng).unwrap();
        assert_eq!(bricks.len(), 80);
        assert_eq!(bricks[5].kind, BrickKind::Usdt);
        assert_eq!(bricks[5].value(), 10);
        assert_eq!(bricks[6].kind, BrickKind::Usdt);
        assert_eq!(bricks[7].kind, BrickKind::Btc);
    }

    #[test]
    fn test_fallback_descriptor() {
        let d = fallback_descriptor(3);
        assert_eq!(d.name, "Offline Genesis Block L3");
        assert_eq!(d.sentiment, Sentiment::Volatile);
        assert_eq!(d.grid.len(), 80);
        assert_eq!(&d.grid[..4], &[1, 4, 1, 4]);
        assert_eq!(d.target_time_secs, 120);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_sentiment_parse() {
        assert_eq!(Sentiment::parse("bullish"), Some(Sentiment::Bullish));
        assert_eq!(Sentiment::parse(" BEARISH "), Some(Sentiment::Bearish));
        assert_eq!(Sentiment::parse("sideways"), None);
        assert_eq!(Sentiment::Bullish.launch_multiplier(), 1.5);
        assert_eq!(Sentiment::Volatile.launch_multiplier(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_build_count_and_layout(
            columns in 1u32..14,
            rows in 1u32..10,
            cells in proptest::collection::vec(0i64..=4, 130),
            level in 1u32..6,
            seed in any::<u64>(),
        ) {
            let len = (columns * rows) as usize;
            let mut grid = cells[..len].to_vec();
            grid[0] = 1;
            let d = descriptor(grid, columns, rows);
            let bricks = build_bricks(&d, level, &mut Pcg32::seed_from_u64(seed)).unwrap();

            prop_assert_eq!(bricks.len(), d.brick_count());
            for (i, a) in bricks.iter().enumerate() {
                prop_assert!(a.rect.x >= 0.0);
                prop_assert!(a.rect.right() <= FIELD_WIDTH + 0.001);
                for b in &bricks[i + 1..] {
                    prop_assert!(!a.rect.overlaps(&b.rect));
                }
            }
        }
    }
}
