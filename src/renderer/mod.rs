//! Browser rendering module
//!
//! Draws the play field with the Canvas 2D API. The HUD and overlays are DOM
//! elements managed by the entry point.

pub mod canvas;

pub use canvas::CanvasRenderer;
