use derive_more::{AsRef, Deref, Display, From, Into};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Integer rectangle, edges truncated toward zero when built from float coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_f64(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left as i32, top as i32, right as i32, bottom as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> i32 {
        (self.left + self.right) >> 1
    }

    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) >> 1
    }

    /// Half-open containment: left/top edges are inside, right/bottom are not.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && x >= self.left
            && x < self.right
            && y >= self.top
            && y < self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectF {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Point) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && point.x >= self.left
            && point.x < self.right
            && point.y >= self.top
            && point.y < self.bottom
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SurfaceName(String);

crate::impl_string_newtype!(SurfaceName);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface '{0}' is not attached to the window manager")]
    NotAttached(SurfaceName),
    #[error("surface '{0}' is already attached to the window manager")]
    AlreadyAttached(SurfaceName),
}

/// Platform window manager the floating surfaces are attached to.
///
/// Every operation can race with the platform tearing a surface down, so callers treat
/// [`SurfaceError`] as a benign condition rather than a fault.
pub trait WindowManager {
    fn add_surface(&mut self, name: &SurfaceName, origin: Point) -> Result<(), SurfaceError>;

    fn update_surface(&mut self, name: &SurfaceName, origin: Point) -> Result<(), SurfaceError>;

    fn remove_surface(&mut self, name: &SurfaceName) -> Result<(), SurfaceError>;

    fn is_attached(&self, name: &SurfaceName) -> bool;
}

/// Window manager that only records where surfaces are. Stacking order is insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWindowManager {
    surfaces: IndexMap<SurfaceName, Point>,
    updates: usize,
}

impl InMemoryWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self, name: &SurfaceName) -> Option<Point> {
        self.surfaces.get(name).copied()
    }

    pub fn attached(&self) -> impl Iterator<Item = (&SurfaceName, &Point)> {
        self.surfaces.iter()
    }

    /// Total number of successful position updates, useful to assert frame traffic.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Drops a surface behind the widget's back, as the platform may do at any time.
    pub fn detach(&mut self, name: &SurfaceName) {
        self.surfaces.shift_remove(name);
    }
}

impl WindowManager for InMemoryWindowManager {
    fn add_surface(&mut self, name: &SurfaceName, origin: Point) -> Result<(), SurfaceError> {
        if self.surfaces.contains_key(name) {
            return Err(SurfaceError::AlreadyAttached(name.clone()));
        }
        log::trace!("add surface {} at ({}, {})", name, origin.x, origin.y);
        self.surfaces.insert(name.clone(), origin);
        Ok(())
    }

    fn update_surface(&mut self, name: &SurfaceName, origin: Point) -> Result<(), SurfaceError> {
        let slot = self
            .surfaces
            .get_mut(name)
            .ok_or_else(|| SurfaceError::NotAttached(name.clone()))?;
        *slot = origin;
        self.updates += 1;
        Ok(())
    }

    fn remove_surface(&mut self, name: &SurfaceName) -> Result<(), SurfaceError> {
        self.surfaces
            .shift_remove(name)
            .map(|_| log::trace!("remove surface {}", name))
            .ok_or_else(|| SurfaceError::NotAttached(name.clone()))
    }

    fn is_attached(&self, name: &SurfaceName) -> bool {
        self.surfaces.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(9, 9));
        assert!(!rect.contains(10, 5));
        assert!(!Rect::new(5, 5, 5, 5).contains(5, 5));
    }

    #[test]
    fn test_rect_from_f64_truncates_toward_zero() {
        let rect = Rect::from_f64(1.9, -1.9, 10.5, 3.99);
        assert_eq!(rect, Rect::new(1, -1, 10, 3));
    }

    #[test]
    fn test_in_memory_lifecycle() {
        let mut wm = InMemoryWindowManager::new();
        let name = SurfaceName::new("button");

        assert_eq!(
            wm.update_surface(&name, Point::default()),
            Err(SurfaceError::NotAttached(name.clone()))
        );
        wm.add_surface(&name, Point::new(1.0, 2.0)).unwrap();
        assert_eq!(
            wm.add_surface(&name, Point::default()),
            Err(SurfaceError::AlreadyAttached(name.clone()))
        );
        wm.update_surface(&name, Point::new(3.0, 4.0)).unwrap();
        assert_eq!(wm.origin(&name), Some(Point::new(3.0, 4.0)));
        assert_eq!(wm.update_count(), 1);

        wm.remove_surface(&name).unwrap();
        assert!(!wm.is_attached(&name));
        assert!(wm.remove_surface(&name).is_err());
    }
}
