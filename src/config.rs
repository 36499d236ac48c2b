//! Session configuration

use std::fmt;
use std::str::FromStr;

/// Output shades used for the four DMG colour indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// White to black.
    #[default]
    Grayscale,
    /// The classic DMG green LCD.
    Green,
}

impl Palette {
    /// RGBA bytes for a 2-bit shade (0 = lightest, 3 = darkest).
    pub fn rgba(self, shade: u8) -> [u8; 4] {
        match self {
            Palette::Grayscale => match shade & 0x03 {
                0 => [0xFF, 0xFF, 0xFF, 0xFF],
                1 => [0xAA, 0xAA, 0xAA, 0xFF],
                2 => [0x55, 0x55, 0x55, 0xFF],
                _ => [0x00, 0x00, 0x00, 0xFF],
            },
            Palette::Green => match shade & 0x03 {
                0 => [0x9B, 0xBC, 0x0F, 0xFF],
                1 => [0x8B, 0xAC, 0x0F, 0xFF],
                2 => [0x30, 0x62, 0x30, 0xFF],
                _ => [0x0F, 0x38, 0x0F, 0xFF],
            },
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Palette::Grayscale),
            "green" | "dmg" => Ok(Palette::Green),
            other => Err(format!("unknown palette '{other}'")),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Grayscale => f.write_str("grayscale"),
            Palette::Green => f.write_str("green"),
        }
    }
}

/// Options fixed for the lifetime of an emulator session.
#[derive(Debug, Clone, Default)]
pub struct EmulatorConfig {
    pub palette: Palette,
}
