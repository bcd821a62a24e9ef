//! Collision detection and response for axis-aligned geometry
//!
//! Everything in the play field is either the ball (a circle) or an
//! axis-aligned rectangle (paddle, bricks), so one overlap test covers all
//! ball contacts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True if the interiors of both rectangles overlap (shared edges don't count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Check whether a circle overlaps a rectangle
///
/// Works on the distance between the circle center and the rectangle center,
/// folded into one quadrant. A center inside the rectangle is always a hit;
/// otherwise the nearest edge or corner must be within `radius`.
/// Tangent contact (distance exactly `radius`) counts as a hit.
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let dist_x = (center.x - rect.x - half_w).abs();
    let dist_y = (center.y - rect.y - half_h).abs();

    if dist_x > half_w + radius || dist_y > half_h + radius {
        return false;
    }

    if dist_x <= half_w || dist_y <= half_h {
        return true;
    }

    // Corner region
    let dx = dist_x - half_w;
    let dy = dist_y - half_h;
    dx * dx + dy * dy <= radius * radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_rect_edge_hit() {
        let rect = Rect::new(100.0, 100.0, 80.0, 24.0);

        // Just above the top edge, overlapping by 1 unit
        assert!(circle_intersects_rect(Vec2::new(140.0, 95.0), 6.0, &rect));
        // Clear of the top edge
        assert!(!circle_intersects_rect(Vec2::new(140.0, 93.0), 6.0, &rect));
    }

    #[test]
    fn test_circle_rect_tangent_counts() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_intersects_rect(Vec2::new(16.0, 5.0), 6.0, &rect));
    }

    #[test]
    fn test_circle_rect_corner() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        // 3-4-5 triangle off the bottom-right corner
        assert!(circle_intersects_rect(Vec2::new(13.0, 14.0), 5.0, &rect));
        // Inside the bounding box of the expanded rect but outside the rounded corner
        assert!(!circle_intersects_rect(Vec2::new(14.0, 14.0), 5.0, &rect));
    }

    #[test]
    fn test_circle_center_inside() {
        let rect = Rect::new(0.0, 50.0, 80.0, 24.0);
        assert!(circle_intersects_rect(Vec2::new(40.0, 62.0), 0.0, &rect));
    }

    #[test]
    fn test_rect_overlap_ignores_shared_edge() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    // Integer-valued inputs keep the mirrored arithmetic exact in f32
    proptest! {
        #[test]
        fn prop_mirror_symmetry(
            cx in -500i32..500, cy in -500i32..500, r in 1i32..40,
            x in -400i32..400, y in -400i32..400, w in 1i32..200, h in 1i32..200,
        ) {
            let (cx, cy, r) = (cx as f32, cy as f32, r as f32);
            let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
            let hit = circle_intersects_rect(Vec2::new(cx, cy), r, &rect);

            let mirrored_x = Rect::new(-rect.x - rect.width, rect.y, rect.width, rect.height);
            prop_assert_eq!(hit, circle_intersects_rect(Vec2::new(-cx, cy), r, &mirrored_x));

            let mirrored_y = Rect::new(rect.x, -rect.y - rect.height, rect.width, rect.height);
            prop_assert_eq!(hit, circle_intersects_rect(Vec2::new(cx, -cy), r, &mirrored_y));
        }

        #[test]
        fn prop_center_inside_always_hits(
            x in -400i32..400, y in -400i32..400, w in 2i32..200, h in 2i32..200,
            fx in 0.01f32..0.99, fy in 0.01f32..0.99, r in 0.0f32..50.0,
        ) {
            let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
            let center = Vec2::new(rect.x + rect.width * fx, rect.y + rect.height * fy);
            prop_assert!(circle_intersects_rect(center, r, &rect));
        }
    }
}
