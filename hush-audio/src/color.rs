//! Noise color selection

use std::fmt;
use std::str::FromStr;

/// Which noise filter path is active
///
/// `None` means nothing is selected and renders silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NoiseColor {
    #[default]
    None = 0,
    White = 1,
    Pink = 2,
    Brown = 3,
    Purple = 4,
}

impl NoiseColor {
    /// All selectable colors, in button order
    pub const ALL: [NoiseColor; 4] = [
        NoiseColor::White,
        NoiseColor::Pink,
        NoiseColor::Brown,
        NoiseColor::Purple,
    ];

    /// Encode for the atomic color selector
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Decode from the atomic color selector. Unknown values fall back to silence.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::White,
            2 => Self::Pink,
            3 => Self::Brown,
            4 => Self::Purple,
            _ => Self::None,
        }
    }

    /// Capitalized name used in status text ("Pink")
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::White => "White",
            Self::Pink => "Pink",
            Self::Brown => "Brown",
            Self::Purple => "Purple",
        }
    }

    /// Lowercase key used in config files and commands
    pub fn key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::White => "white",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Purple => "purple",
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a color name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown noise color: {0}")]
pub struct ParseColorError(pub String);

impl FromStr for NoiseColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "pink" => Ok(Self::Pink),
            "brown" | "brownian" | "red" => Ok(Self::Brown),
            "purple" | "violet" => Ok(Self::Purple),
            "none" | "off" => Ok(Self::None),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}
