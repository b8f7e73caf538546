//! 颜色与配色方案

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 非预乘 RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// 解析 `#RRGGBB` / `#RRGGBBAA`，`#` 可省略
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| Error::Input(format!("Invalid color: {s}")))
    }
}

/// 预设配色方案
#[derive(Debug, Clone, Copy, Default)]
pub enum ColorScheme {
    #[default]
    Ocean,
    Sunset,
    Forest,
    Berry,
    Monochrome,
    Rainbow,
}

impl ColorScheme {
    fn hex(&self) -> &'static [&'static str] {
        match self {
            ColorScheme::Ocean => &["#264653", "#287271", "#2a9d8f", "#8ab17d", "#e9c46a"],
            ColorScheme::Sunset => &["#f94144", "#f3722c", "#f8961e", "#f9844a", "#f9c74f"],
            ColorScheme::Forest => &["#2d6a4f", "#40916c", "#52b788", "#74c69d", "#95d5b2"],
            ColorScheme::Berry => &["#7b2cbf", "#9d4edd", "#c77dff", "#e0aaff", "#ff6d00"],
            ColorScheme::Monochrome => &["#212529", "#495057", "#6c757d", "#adb5bd", "#ced4da"],
            ColorScheme::Rainbow => &[
                "#e63946", "#f4a261", "#e9c46a", "#2a9d8f", "#457b9d", "#7b2cbf",
            ],
        }
    }

    pub fn colors(&self) -> Vec<Rgba> {
        self.hex().iter().filter_map(|h| Rgba::from_hex(h)).collect()
    }
}
