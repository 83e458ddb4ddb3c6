//! Fill colors accepted in map requests.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const NAMED_COLORS: &[(&str, FillColor)] = &[
    ("red", FillColor::rgb(0xff, 0x00, 0x00)),
    ("green", FillColor::rgb(0x00, 0x80, 0x00)),
    ("blue", FillColor::rgb(0x00, 0x00, 0xff)),
    ("orange", FillColor::rgb(0xff, 0xa5, 0x00)),
    ("yellow", FillColor::rgb(0xff, 0xff, 0x00)),
    ("purple", FillColor::rgb(0x80, 0x00, 0x80)),
    ("gray", FillColor::rgb(0x80, 0x80, 0x80)),
    ("grey", FillColor::rgb(0x80, 0x80, 0x80)),
    ("black", FillColor::rgb(0x00, 0x00, 0x00)),
    ("white", FillColor::rgb(0xff, 0xff, 0xff)),
    ("pink", FillColor::rgb(0xff, 0xc0, 0xcb)),
    ("brown", FillColor::rgb(0xa5, 0x2a, 0x2a)),
    ("cyan", FillColor::rgb(0x00, 0xff, 0xff)),
    ("magenta", FillColor::rgb(0xff, 0x00, 0xff)),
    ("lightblue", FillColor::rgb(0xad, 0xd8, 0xe6)),
    ("lightgreen", FillColor::rgb(0x90, 0xee, 0x90)),
];

impl FillColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0.0..=1.0 for PDF color operators
    pub fn components(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl Default for FillColor {
    fn default() -> Self {
        FillColor::rgb(0xff, 0xa5, 0x00)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported color '{0}', expected #rgb, #rrggbb or a basic color name")]
pub struct ParseColorError(String);

impl FromStr for FillColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(err());
            }
            return match hex.len() {
                3 => {
                    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                    Ok(FillColor::rgb(
                        digit(0).map_err(|_| err())?,
                        digit(1).map_err(|_| err())?,
                        digit(2).map_err(|_| err())?,
                    ))
                }
                6 => {
                    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                    Ok(FillColor::rgb(
                        pair(0).map_err(|_| err())?,
                        pair(2).map_err(|_| err())?,
                        pair(4).map_err(|_| err())?,
                    ))
                }
                _ => Err(err()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
            .ok_or_else(err)
    }
}

impl fmt::Display for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
