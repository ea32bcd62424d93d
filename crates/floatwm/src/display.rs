use crate::wm::Size;
use serde::{Deserialize, Serialize};

/// Raw display dimensions plus the system bars that eat into them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub status_bar_height: f64,
    #[serde(default)]
    pub navigation_bar_height: f64,
}

impl DisplayMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            status_bar_height: 0.0,
            navigation_bar_height: 0.0,
        }
    }

    pub fn with_bars(mut self, status_bar_height: f64, navigation_bar_height: f64) -> Self {
        self.status_bar_height = status_bar_height;
        self.navigation_bar_height = navigation_bar_height;
        self
    }

    pub fn has_navigation_bar(&self) -> bool {
        self.navigation_bar_height > 0.0
    }

    /// Area floating surfaces may dock into.
    pub fn usable(&self) -> Size {
        Size::new(
            self.width,
            self.height - self.status_bar_height - self.navigation_bar_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_area_excludes_bars() {
        let metrics = DisplayMetrics::new(1080.0, 1920.0).with_bars(60.0, 120.0);
        assert!(metrics.has_navigation_bar());
        assert_eq!(metrics.usable(), Size::new(1080.0, 1740.0));
    }
}
