//! Styled text runs and the fixed presentation palette

use serde::{Deserialize, Serialize};
use std::fmt;

/// 24-bit RGB colour, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid colour: {}", value))
    }
}

pub mod palette {
    use super::Color;

    pub const MAIN_TEXT: Color = Color::rgb(0xee, 0xee, 0xee);
    pub const SECONDARY_TEXT: Color = Color::rgb(0x99, 0x99, 0x99);
    /// Level-2 headings
    pub const ACCENT: Color = Color::rgb(0xc4, 0xa7, 0xff);
    pub const CODE_BACKGROUND: Color = Color::rgb(0x16, 0x16, 0x25);
    pub const INLINE_CODE_TEXT: Color = Color::rgb(0xe8, 0xc8, 0x7a);
    pub const CODE_BLOCK_TEXT: Color = Color::rgb(0xa8, 0xd8, 0xa8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Medium,
    Semibold,
    Bold,
}

/// Presentation attributes of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Point size
    pub size: u8,
    pub weight: FontWeight,
    pub monospaced: bool,
    pub italic: bool,
    pub foreground: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl TextStyle {
    pub const BODY_SIZE: u8 = 14;
    pub const CODE_SIZE: u8 = 13;

    pub const fn body() -> Self {
        Self {
            size: Self::BODY_SIZE,
            weight: FontWeight::Regular,
            monospaced: false,
            italic: false,
            foreground: palette::MAIN_TEXT,
            background: None,
        }
    }

    /// Levels past 4 share the level-4 style
    pub const fn heading(level: u8) -> Self {
        let (size, weight, foreground) = match level {
            0 | 1 => (24, FontWeight::Bold, palette::MAIN_TEXT),
            2 => (20, FontWeight::Semibold, palette::ACCENT),
            3 => (18, FontWeight::Semibold, palette::MAIN_TEXT),
            _ => (16, FontWeight::Medium, palette::MAIN_TEXT),
        };
        Self {
            size,
            weight,
            foreground,
            ..Self::body()
        }
    }

    pub const fn code_block() -> Self {
        Self {
            size: Self::CODE_SIZE,
            weight: FontWeight::Regular,
            monospaced: true,
            italic: false,
            foreground: palette::CODE_BLOCK_TEXT,
            background: Some(palette::CODE_BACKGROUND),
        }
    }

    pub const fn inline_code() -> Self {
        Self {
            size: Self::CODE_SIZE,
            weight: FontWeight::Medium,
            monospaced: true,
            italic: false,
            foreground: palette::INLINE_CODE_TEXT,
            background: Some(palette::CODE_BACKGROUND),
        }
    }

    pub const fn bullet() -> Self {
        Self {
            foreground: palette::SECONDARY_TEXT,
            ..Self::body()
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::body()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub style: TextStyle,
}

/// Ordered runs of styled text, ready for any presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledDocument {
    pub runs: Vec<StyledRun>,
}

impl StyledDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, merging into the last run when the style matches
    pub fn push(&mut self, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.runs.push(StyledRun {
                text: text.to_string(),
                style,
            }),
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
