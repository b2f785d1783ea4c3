use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Display color attached to an exercise.
///
/// Opaque to the engine: it is copied onto every step the exercise produces
/// and handed back to the presentation layer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Inherit the presentation default.
    #[default]
    Unset,
    /// `0xRRGGBB`.
    Rgb(u32),
}

impl Color {
    pub const RED: Color = Color::Rgb(0xFF0000);
    pub const GREEN: Color = Color::Rgb(0x00FF00);
    pub const BLUE: Color = Color::Rgb(0x0000FF);
    pub const YELLOW: Color = Color::Rgb(0xFFFF00);
    pub const CYAN: Color = Color::Rgb(0x00FFFF);
    pub const MAGENTA: Color = Color::Rgb(0xFF00FF);
    pub const GRAY: Color = Color::Rgb(0x888888);
    pub const WHITE: Color = Color::Rgb(0xFFFFFF);
    pub const BLACK: Color = Color::Rgb(0x000000);
    pub const ORANGE: Color = Color::Rgb(0xFFA500);
    pub const PURPLE: Color = Color::Rgb(0x800080);
    pub const PINK: Color = Color::Rgb(0xFFC0CB);

    /// Colors offered by the authoring surface, by name.
    pub const PALETTE: [(&'static str, Color); 12] = [
        ("red", Color::RED),
        ("green", Color::GREEN),
        ("blue", Color::BLUE),
        ("yellow", Color::YELLOW),
        ("cyan", Color::CYAN),
        ("magenta", Color::MAGENTA),
        ("gray", Color::GRAY),
        ("white", Color::WHITE),
        ("black", Color::BLACK),
        ("orange", Color::ORANGE),
        ("purple", Color::PURPLE),
        ("pink", Color::PINK),
    ];

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Color::Unset)
    }

    /// Red, green, and blue channels, or `None` when unset.
    pub fn channels(&self) -> Option<(u8, u8, u8)> {
        match *self {
            Color::Unset => None,
            Color::Rgb(v) => Some(((v >> 16) as u8, (v >> 8) as u8, v as u8)),
        }
    }

    /// Integer form used by the SQLite store; `-1` is unset.
    pub(crate) fn to_db(self) -> i64 {
        match self {
            Color::Unset => -1,
            Color::Rgb(v) => i64::from(v & 0xFF_FFFF),
        }
    }

    pub(crate) fn from_db(value: i64) -> Self {
        if value < 0 {
            Color::Unset
        } else {
            Color::Rgb((value as u32) & 0xFF_FFFF)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Unset => f.write_str("unset"),
            Color::Rgb(v) => write!(f, "#{:06x}", v & 0xFF_FFFF),
        }
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower == "unset" || lower == "default" || lower.is_empty() {
            return Ok(Color::Unset);
        }
        if let Some((_, color)) = Color::PALETTE.iter().find(|(name, _)| *name == lower) {
            return Ok(*color);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor(trimmed.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color::Rgb)
            .map_err(|_| ValidationError::InvalidColor(trimmed.to_string()))
    }
}
