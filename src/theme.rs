//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use sandfall::ColorId;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme keys for the seven piece colours, in `ShapeKind` order.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_j", "piece_l", "piece_o", "piece_s", "piece_t", "piece_z",
];

/// Classic piece colours: cyan, blue, orange, yellow, green, magenta, red.
const CLASSIC: [Color; 7] = [
    Color::Rgb(0x56, 0xB6, 0xC2),
    Color::Rgb(0x61, 0xAF, 0xEF),
    Color::Rgb(0xD1, 0x9A, 0x66),
    Color::Rgb(0xE5, 0xC0, 0x7B),
    Color::Rgb(0x98, 0xC3, 0x79),
    Color::Rgb(0xC6, 0x78, 0xDD),
    Color::Rgb(0xE0, 0x6C, 0x75),
];

#[derive(Debug, Clone)]
pub struct Theme {
    /// Sand colour per piece kind.
    pub sand: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark UI colours with the classic piece palette.
    pub const fn onedark_default() -> Self {
        Self {
            sand: CLASSIC,
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }

    /// Load theme from a btop-style file. Missing path gives the defaults;
    /// unknown or malformed keys keep their default colour.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default_for_palette(palette));
        };
        let s = std::fs::read_to_string(path)?;
        let mut theme = Self::from_map(&parse_theme_file(&s));
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override sand colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.sand = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0x00, 0x55, 0xFF),
                    Color::Rgb(0xFF, 0x80, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0x00),
                ];
            }
            Palette::Colorblind => {
                // Okabe-Ito
                self.sand = [
                    Color::Rgb(0x56, 0xB4, 0xE9),
                    Color::Rgb(0x00, 0x72, 0xB2),
                    Color::Rgb(0xE6, 0x9F, 0x00),
                    Color::Rgb(0xF0, 0xE4, 0x42),
                    Color::Rgb(0x00, 0x9E, 0x73),
                    Color::Rgb(0xCC, 0x79, 0xA7),
                    Color::Rgb(0xD5, 0x5E, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let mut theme = Self::onedark_default();
        for (slot, key) in theme.sand.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(key) {
                *slot = c;
            }
        }
        theme.bg = get("main_bg").or_else(|| get("meter_bg")).unwrap_or(theme.bg);
        theme.div_line = get("div_line").unwrap_or(theme.div_line);
        theme.main_fg = get("main_fg").unwrap_or(theme.main_fg);
        theme.title = get("title").unwrap_or(theme.title);
        theme
    }

    #[inline]
    pub fn sand_color(&self, color: ColorId) -> Color {
        self.sand[usize::from(color.0) % self.sand.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match s.len() {
        6 if s.is_ascii() => Ok(Color::Rgb(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
        )),
        3 if s.is_ascii() => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(invalid()),
    }
}
