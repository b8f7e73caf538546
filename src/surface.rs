//! 光栅绘图面能力接口
//!
//! 布局核心只依赖这里的 trait：文本测量、平移/旋转/保存/恢复变换、
//! 填充文本与路径、按区域读回 alpha、导出图片。

use std::path::Path;
use std::str::FromStr;

use tiny_skia::Path as SkPath;

use crate::color::Rgba;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// 读回像素的矩形区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?
            .parse()
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" | "image/jpeg" => Ok(ImageFormat::Jpeg),
            "svg" | "image/svg+xml" => Ok(ImageFormat::Svg),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn measure_text(&self, text: &str, font_size: f32) -> TextMetrics;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    /// 角度制
    fn rotate(&mut self, degrees: f32);

    /// 以整个画布填充背景，不受当前变换影响
    fn clear(&mut self, color: Rgba);
    /// 以 (x, y) 为中心绘制文本（水平居中、垂直居中）
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Rgba);
    fn fill_path(&mut self, path: &SkPath, color: Rgba);

    /// 按行优先返回区域内每个像素的 alpha，越界部分为 0
    fn read_alpha(&self, region: Region) -> Vec<u8>;
    /// 编码为位图格式；SVG 由渲染器自己序列化
    fn to_image(&self, format: ImageFormat) -> Result<Vec<u8>>;
}

pub trait RasterBackend {
    type Surface: RasterSurface;

    /// 阻塞直到字体就绪
    fn await_fonts(&mut self) -> Result<()>;
    fn create_surface(&mut self, width: u32, height: u32) -> Result<Self::Surface>;
    /// 当前字体族名，用于 SVG 导出
    fn font_family(&self) -> Option<String>;
}
