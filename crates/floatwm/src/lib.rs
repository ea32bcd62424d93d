//! Window-surface layer for floating overlay widgets.
//!
//! Floating views live in their own top-level surfaces positioned in screen space. This crate
//! holds the geometry types shared by everything that moves those surfaces around, the
//! [`wm::WindowManager`] seam a host implements for its platform, and an in-memory
//! implementation used for headless hosts and tests.

pub mod display;
pub mod macros;
pub mod wm;

pub use display::DisplayMetrics;
pub use wm::{InMemoryWindowManager, Point, Rect, RectF, Size, SurfaceError, SurfaceName, WindowManager};
