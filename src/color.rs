use palette::rgb::FromHexError;
use palette::{FromColor, Hsva, Srgb, Srgba, WithAlpha};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

pub type Color = Srgba<f64>;
type HsvaF = Hsva<palette::encoding::Srgb, f64>;

/// HSV value above which a cover is considered bright enough to need a placeholder tint.
pub const BRIGHT_VALUE_THRESHOLD: f64 = 0.65;

pub fn opaque(r: u8, g: u8, b: u8) -> Color {
    Srgb::new(r, g, b).into_format::<f64>().with_alpha(1.0)
}

pub fn is_bright(color: Color) -> bool {
    HsvaF::from_color(color).value > BRIGHT_VALUE_THRESHOLD
}

/// Interpolates between two colors channel-wise in HSV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorChanger {
    from: Color,
    to: Color,
}

impl ColorChanger {
    pub fn new(from: Color, to: Color) -> Self {
        Self { from, to }
    }

    pub fn next_color(&self, t: f64) -> Color {
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }
        let a = HsvaF::from_color(self.from);
        let b = HsvaF::from_color(self.to);
        let lerp = |x: f64, y: f64| x + (y - x) * t;
        let mixed = HsvaF::new(
            lerp(
                a.hue.into_positive_degrees(),
                b.hue.into_positive_degrees(),
            ),
            lerp(a.saturation, b.saturation),
            lerp(a.value, b.value),
            lerp(a.alpha, b.alpha),
        );
        Srgba::from_color(mixed)
    }
}

impl Default for ColorChanger {
    fn default() -> Self {
        let black = opaque(0, 0, 0);
        Self::new(black, black)
    }
}

/// `#rrggbb` / `#rgb` colour as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct HexColor(pub Srgb<u8>);

impl HexColor {
    pub fn to_color(self) -> Color {
        self.0.into_format::<f64>().with_alpha(1.0)
    }
}

impl FromStr for HexColor {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::<u8>::from_str(s.trim()).map(HexColor)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}
