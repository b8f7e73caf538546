//! 蒙版光栅化：把形状画到离屏画布上，再取出所有不透明像素

use std::f32::consts::PI;

use image::GenericImageView;
use tiny_skia::{Path, PathBuilder, Pixmap, Transform};
use tracing::{debug, warn};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::surface::{RasterBackend, RasterSurface, Region};

// =============================================================================
// Mask Types
// =============================================================================

/// 内置蒙版形状
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MaskShape {
    #[default]
    Circle,
    Cloud,
    Heart,
    Star,
    Triangle,
    /// 用当前字体渲染的单个字符
    Glyph(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaskSource {
    Shape(MaskShape),
    /// SVG 或位图 (PNG / JPEG)，深色不透明区域可放置
    Image(Vec<u8>),
}

impl From<MaskShape> for MaskSource {
    fn from(shape: MaskShape) -> Self {
        MaskSource::Shape(shape)
    }
}

/// 蒙版像素集合，每次布局生成一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<(u32, u32)>,
}

impl MaskData {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

// =============================================================================
// Rasterizer
// =============================================================================

pub fn rasterize_mask<B: RasterBackend>(
    backend: &mut B,
    source: &MaskSource,
    size: u32,
) -> Result<MaskData> {
    let size = size.max(1);
    let mask = match source {
        MaskSource::Shape(MaskShape::Glyph(ch)) => {
            // 字体未就绪时采样会得到空蒙版
            backend.await_fonts()?;
            let mut surface = backend.create_surface(size, size)?;
            let half = size as f32 / 2.0;
            surface.fill_text(&ch.to_string(), half, half, size as f32 * 0.8, Rgba::BLACK);
            collect_opaque(&surface)
        }
        MaskSource::Shape(shape) => {
            let mut surface = backend.create_surface(size, size)?;
            let path = shape_path(*shape, size as f32)
                .ok_or_else(|| Error::Render(format!("Failed to build {shape:?} mask path")))?;
            surface.fill_path(&path, Rgba::BLACK);
            collect_opaque(&surface)
        }
        MaskSource::Image(bytes) => rasterize_image(bytes, size)?,
    };

    if mask.is_empty() {
        warn!(size, "mask has no opaque pixels, nothing can be placed");
    } else {
        debug!(pixels = mask.pixels.len(), size, "mask rasterized");
    }
    Ok(mask)
}

fn collect_opaque<S: RasterSurface>(surface: &S) -> MaskData {
    let (width, height) = (surface.width(), surface.height());
    let alpha = surface.read_alpha(Region::new(0, 0, width, height));
    let pixels = alpha
        .iter()
        .enumerate()
        .filter(|(_, &a)| a > 0)
        .map(|(i, _)| ((i as u32) % width, (i as u32) / width))
        .collect();
    MaskData {
        width,
        height,
        pixels,
    }
}

fn shape_path(shape: MaskShape, size: f32) -> Option<Path> {
    let half = size / 2.0;
    match shape {
        MaskShape::Circle => PathBuilder::from_circle(half, half, half),
        MaskShape::Heart => heart_path(size),
        MaskShape::Star => star_path(half, half, half, half * 0.4),
        MaskShape::Cloud => {
            // 若干相互重叠的圆
            let puffs = [
                (0.50, 0.42, 0.24),
                (0.30, 0.55, 0.19),
                (0.70, 0.52, 0.21),
                (0.50, 0.64, 0.20),
                (0.16, 0.67, 0.13),
                (0.84, 0.66, 0.13),
            ];
            let mut pb = PathBuilder::new();
            for (cx, cy, r) in puffs {
                pb.push_circle(cx * size, cy * size, r * size);
            }
            pb.finish()
        }
        MaskShape::Triangle => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.5 * size, 0.05 * size);
            pb.line_to(0.95 * size, 0.9 * size);
            pb.line_to(0.05 * size, 0.9 * size);
            pb.close();
            pb.finish()
        }
        MaskShape::Glyph(_) => None,
    }
}

/// 经典的贝塞尔爱心，原始坐标范围 x∈[20,130]、y∈[25,120]
fn heart_path(size: f32) -> Option<Path> {
    let scale = size / 110.0;
    let dy = (size - 95.0 * scale) / 2.0;
    let p = |x: f32, y: f32| ((x - 20.0) * scale, (y - 25.0) * scale + dy);

    let mut pb = PathBuilder::new();
    let (x, y) = p(75.0, 40.0);
    pb.move_to(x, y);
    let curves = [
        [(75.0, 37.0), (70.0, 25.0), (50.0, 25.0)],
        [(20.0, 25.0), (20.0, 62.5), (20.0, 62.5)],
        [(20.0, 80.0), (40.0, 102.0), (75.0, 120.0)],
        [(110.0, 102.0), (130.0, 80.0), (130.0, 62.5)],
        [(130.0, 62.5), (130.0, 25.0), (100.0, 25.0)],
        [(85.0, 25.0), (75.0, 37.0), (75.0, 40.0)],
    ];
    for [c1, c2, end] in curves {
        let (x1, y1) = p(c1.0, c1.1);
        let (x2, y2) = p(c2.0, c2.1);
        let (x, y) = p(end.0, end.1);
        pb.cubic_to(x1, y1, x2, y2, x, y);
    }
    pb.close();
    pb.finish()
}

/// 五角星：外半径与内半径交替的极坐标闭环
fn star_path(cx: f32, cy: f32, outer: f32, inner: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for i in 0..10 {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = -PI / 2.0 + i as f32 * PI / 5.0;
        let (x, y) = (cx + r * angle.cos(), cy + r * angle.sin());
        if i == 0 {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
    pb.close();
    pb.finish()
}

// =============================================================================
// Image Masks
// =============================================================================

fn rasterize_image(bytes: &[u8], size: u32) -> Result<MaskData> {
    // alpha < 128 (透明) 或 r + g + b >= 750 (接近白色) 的像素不可放置
    let collect = |get_pixel: &dyn Fn(u32, u32) -> Option<(u8, u8, u8, u8)>| {
        let mut pixels = Vec::new();
        for y in 0..size {
            for x in 0..size {
                if let Some((r, g, b, a)) = get_pixel(x, y) {
                    let sum = r as u16 + g as u16 + b as u16;
                    if a >= 128 && sum < 750 {
                        pixels.push((x, y));
                    }
                }
            }
        }
        MaskData {
            width: size,
            height: size,
            pixels,
        }
    };

    // 尝试 1: 解析 SVG
    let opt = usvg::Options::default();
    if let Ok(tree) = usvg::Tree::from_data(bytes, &opt) {
        let tree_size = tree.size().to_int_size();
        let scale_x = size as f32 / tree_size.width() as f32;
        let scale_y = size as f32 / tree_size.height() as f32;

        let mut pixmap = Pixmap::new(size, size)
            .ok_or(Error::Surface { width: size, height: size })?;
        // 白色背景，防止透明部分被误判
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            Transform::from_scale(scale_x, scale_y),
            &mut pixmap.as_mut(),
        );

        return Ok(collect(&|x, y| {
            pixmap
                .pixel(x, y)
                .map(|p| p.demultiply())
                .map(|p| (p.red(), p.green(), p.blue(), p.alpha()))
        }));
    }

    // 尝试 2: 解析光栅图片
    if let Ok(img) = image::load_from_memory(bytes) {
        let resized = img.resize_exact(size, size, image::imageops::FilterType::Nearest);
        return Ok(collect(&|x, y| {
            if x < resized.width() && y < resized.height() {
                let p = resized.get_pixel(x, y);
                Some((p[0], p[1], p[2], p[3]))
            } else {
                None
            }
        }));
    }

    Err(Error::Image("The mask format could not be determined".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFace;
    use crate::skia::SkiaBackend;
    use std::sync::Arc;

    fn backend() -> SkiaBackend {
        SkiaBackend::with_face(Arc::new(BuiltinFace))
    }

    fn contains(mask: &MaskData, x: u32, y: u32) -> bool {
        mask.pixels.contains(&(x, y))
    }

    #[test]
    fn circle_covers_center_not_corners() {
        let mask = rasterize_mask(&mut backend(), &MaskShape::Circle.into(), 100).unwrap();
        assert_eq!((mask.width, mask.height), (100, 100));
        assert!(contains(&mask, 50, 50));
        assert!(!contains(&mask, 1, 1));
        assert!(!contains(&mask, 98, 98));
        // π/4 ≈ 0.785 的面积比
        let ratio = mask.pixels.len() as f32 / 10_000.0;
        assert!((0.75..0.84).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn star_has_empty_notch_between_points() {
        let mask = rasterize_mask(&mut backend(), &MaskShape::Star.into(), 200).unwrap();
        assert!(contains(&mask, 100, 100));
        assert!(contains(&mask, 100, 10));
        // 顶部尖角两侧的凹口
        assert!(!contains(&mask, 60, 30));
        assert!(!contains(&mask, 140, 30));
    }

    #[test]
    fn heart_has_cleft_on_top() {
        let mask = rasterize_mask(&mut backend(), &MaskShape::Heart.into(), 220).unwrap();
        assert!(contains(&mask, 110, 120));
        assert!(contains(&mask, 60, 60));
        assert!(contains(&mask, 160, 60));
        assert!(!contains(&mask, 110, 30));
        assert!(!contains(&mask, 5, 200));
    }

    #[test]
    fn cloud_and_triangle_are_nonempty() {
        for shape in [MaskShape::Cloud, MaskShape::Triangle] {
            let mask = rasterize_mask(&mut backend(), &shape.into(), 120).unwrap();
            assert!(!mask.is_empty(), "{shape:?}");
            assert!(contains(&mask, 60, 70), "{shape:?}");
        }
    }

    #[test]
    fn glyph_mask_uses_font() {
        let mask = rasterize_mask(&mut backend(), &MaskShape::Glyph('W').into(), 100).unwrap();
        assert!(!mask.is_empty());
        assert!(contains(&mask, 50, 50));
    }

    #[test]
    fn svg_mask_keeps_dark_regions() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
            <rect x="0" y="0" width="5" height="10" fill="black"/>
        </svg>"#;
        let mask = rasterize_mask(&mut backend(), &MaskSource::Image(svg.to_vec()), 20).unwrap();
        assert!(contains(&mask, 2, 10));
        assert!(!contains(&mask, 15, 10));
    }

    #[test]
    fn png_mask_rejects_white_and_transparent() {
        let img = image::RgbaImage::from_fn(4, 4, |x, _| match x {
            0 => image::Rgba([0, 0, 0, 255]),
            1 => image::Rgba([255, 255, 255, 255]),
            _ => image::Rgba([0, 0, 0, 0]),
        });
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let mask = rasterize_mask(&mut backend(), &MaskSource::Image(png), 4).unwrap();
        assert_eq!(mask.pixels, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn garbage_mask_is_an_image_error() {
        let err = rasterize_mask(&mut backend(), &MaskSource::Image(b"nope".to_vec()), 10);
        assert!(matches!(err, Err(Error::Image(_))));
    }
}
