//! Color types.
//!
//! [`Color`] is the small named set the plot engine speaks to a
//! [`DrawingSurface`](crate::surface::DrawingSurface); backends that need
//! actual channel values resolve it through [`Color::to_rgba`].

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }
}

/// Named colors understood by every drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Color {
    Black,
    White,
    Gray,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
}

/// Palette used for curves until a plot is given another one.
pub const DEFAULT_PALETTE: [Color; 12] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
];

impl Color {
    /// Resolve to channel values (Qt's global color table).
    #[must_use]
    pub const fn to_rgba(self) -> Rgba {
        match self {
            Self::Black => Rgba::BLACK,
            Self::White => Rgba::WHITE,
            Self::Gray => Rgba::rgb(160, 160, 164),
            Self::Red => Rgba::rgb(255, 0, 0),
            Self::Green => Rgba::rgb(0, 255, 0),
            Self::Yellow => Rgba::rgb(255, 255, 0),
            Self::Blue => Rgba::rgb(0, 0, 255),
            Self::Magenta => Rgba::rgb(255, 0, 255),
            Self::Cyan => Rgba::rgb(0, 255, 255),
            Self::DarkRed => Rgba::rgb(128, 0, 0),
            Self::DarkGreen => Rgba::rgb(0, 128, 0),
            Self::DarkYellow => Rgba::rgb(128, 128, 0),
            Self::DarkBlue => Rgba::rgb(0, 0, 128),
            Self::DarkMagenta => Rgba::rgb(128, 0, 128),
            Self::DarkCyan => Rgba::rgb(0, 128, 128),
        }
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        color.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_array_roundtrip() {
        let color = Rgba::new(10, 20, 30, 40);
        assert_eq!(Rgba::from_array(color.to_array()), color);
    }

    #[test]
    fn test_default_palette_has_no_black_or_white() {
        assert!(!DEFAULT_PALETTE.contains(&Color::Black));
        assert!(!DEFAULT_PALETTE.contains(&Color::White));
        assert_eq!(DEFAULT_PALETTE[0], Color::Red);
    }

    #[test]
    fn test_named_colors_resolve() {
        assert_eq!(Color::Black.to_rgba(), Rgba::BLACK);
        assert_eq!(Rgba::from(Color::Blue), Rgba::rgb(0, 0, 255));
        assert_ne!(Color::Red.to_rgba(), Color::DarkRed.to_rgba());
    }
}
