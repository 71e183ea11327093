use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::Rgb;

/// Number of brand colors at the head of [`DEFAULT_PALETTE`].
pub const BASE_COLOR_COUNT: usize = 6;

/// The default chart palette: 6 brand colors followed by 18 extension colors.
///
/// Categories are assigned palette slots in first-seen order, so the brand colors are always
/// used before any of the extension colors.
pub const DEFAULT_PALETTE: [Rgb; 24] = [
    // Brand.
    Rgb::from_u32(0x1F3864),
    Rgb::from_u32(0x2E75B6),
    Rgb::from_u32(0xC55A11),
    Rgb::from_u32(0x548235),
    Rgb::from_u32(0xBF9000),
    Rgb::from_u32(0x7030A0),
    // Extension.
    Rgb::from_u32(0x843C0C),
    Rgb::from_u32(0x385723),
    Rgb::from_u32(0x0070C0),
    Rgb::from_u32(0xA5A5A5),
    Rgb::from_u32(0xFFC000),
    Rgb::from_u32(0x4472C4),
    Rgb::from_u32(0xED7D31),
    Rgb::from_u32(0x70AD47),
    Rgb::from_u32(0x264478),
    Rgb::from_u32(0x9E480E),
    Rgb::from_u32(0x636363),
    Rgb::from_u32(0x997300),
    Rgb::from_u32(0x255E91),
    Rgb::from_u32(0x43682B),
    Rgb::from_u32(0x698ED0),
    Rgb::from_u32(0xF1975A),
    Rgb::from_u32(0xB7B7B7),
    Rgb::from_u32(0xFFCD33),
];

/// Look up a color in [`DEFAULT_PALETTE`]; see [`Palette::color_at`].
pub fn color_at(index: i64) -> Rgb {
    DEFAULT_PALETTE[index.rem_euclid(DEFAULT_PALETTE.len() as i64) as usize]
}

/// An ordered, non-empty list of base colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Color for `index`, wrapping (Euclidean modulo) so every integer maps to an entry,
    /// including negative indices.
    pub fn color_at(&self, index: i64) -> Rgb {
        let len = self.colors.len() as i64;
        self.colors[index.rem_euclid(len) as usize]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = ConfigError;

    fn try_from(value: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(value: Palette) -> Self {
        value.colors
    }
}
