//! 字形足迹：把单词按指定字号和角度画到草稿画布上，再按网格粗化

use tracing::trace;

use crate::color::Rgba;
use crate::error::Result;
use crate::surface::{RasterBackend, RasterSurface, Region};

/// 旋转包围盒额外留出的像素
pub const FOOTPRINT_MARGIN: f32 = 2.0;

/// 某个单词在某个字号、角度下会占用的格子
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphFootprint {
    /// 相对足迹左上角的格子偏移，行优先
    pub cells: Vec<(i32, i32)>,
    pub pixel_width: f32,
    pub pixel_height: f32,
    pub cols: i32,
    pub rows: i32,
}

/// 旋转后的轴对齐包围盒尺寸（不含边距）
pub fn rotated_bounds(width: f32, height: f32, degrees: f32) -> (f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (
        (width * cos).abs() + (height * sin).abs(),
        (width * sin).abs() + (height * cos).abs(),
    )
}

pub fn measure_footprint<B: RasterBackend>(
    backend: &mut B,
    measurer: &B::Surface,
    text: &str,
    font_size: f32,
    rotation: f32,
    cell_size: u32,
) -> Result<GlyphFootprint> {
    let cell = cell_size.max(1);
    let metrics = measurer.measure_text(text, font_size);
    let (w, h) = rotated_bounds(metrics.width, metrics.height, rotation);
    let pixel_width = (w + FOOTPRINT_MARGIN).ceil().max(1.0) as u32;
    let pixel_height = (h + FOOTPRINT_MARGIN).ceil().max(1.0) as u32;

    let mut scratch = backend.create_surface(pixel_width, pixel_height)?;
    scratch.save();
    scratch.translate(pixel_width as f32 / 2.0, pixel_height as f32 / 2.0);
    scratch.rotate(rotation);
    scratch.fill_text(text, 0.0, 0.0, font_size, Rgba::BLACK);
    scratch.restore();

    let alpha = scratch.read_alpha(Region::new(0, 0, pixel_width, pixel_height));
    let cols = pixel_width.div_ceil(cell) as usize;
    let rows = pixel_height.div_ceil(cell) as usize;

    // 块内任意一个像素不透明即视为占用
    let mut blocks = vec![false; cols * rows];
    for (i, &a) in alpha.iter().enumerate() {
        if a == 0 {
            continue;
        }
        let x = i % pixel_width as usize;
        let y = i / pixel_width as usize;
        blocks[(y / cell as usize) * cols + x / cell as usize] = true;
    }

    let cells: Vec<(i32, i32)> = blocks
        .iter()
        .enumerate()
        .filter(|(_, &occupied)| occupied)
        .map(|(i, _)| ((i % cols) as i32, (i / cols) as i32))
        .collect();

    trace!(
        text,
        font_size,
        rotation,
        cells = cells.len(),
        cols,
        rows,
        "footprint"
    );

    Ok(GlyphFootprint {
        cells,
        pixel_width: pixel_width as f32,
        pixel_height: pixel_height as f32,
        cols: cols as i32,
        rows: rows as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFace;
    use crate::skia::{SkiaBackend, SkiaSurface};
    use std::sync::Arc;

    fn setup() -> (SkiaBackend, SkiaSurface) {
        let mut backend = SkiaBackend::with_face(Arc::new(BuiltinFace));
        let surface = backend.create_surface(1, 1).unwrap();
        (backend, surface)
    }

    #[test]
    fn rotated_bounds_swaps_at_right_angles() {
        let (w, h) = rotated_bounds(40.0, 10.0, 90.0);
        assert!((w - 10.0).abs() < 1e-3 && (h - 40.0).abs() < 1e-3);
        let (w, h) = rotated_bounds(40.0, 10.0, 0.0);
        assert!((w - 40.0).abs() < 1e-3 && (h - 10.0).abs() < 1e-3);
        let (w, h) = rotated_bounds(10.0, 10.0, 45.0);
        assert!((w - 14.142).abs() < 1e-2 && (h - 14.142).abs() < 1e-2);
    }

    #[test]
    fn horizontal_word_footprint() {
        let (mut backend, measurer) = setup();
        // "abcd" @ 20px: 48x20，加边距 50x22
        let fp = measure_footprint(&mut backend, &measurer, "abcd", 20.0, 0.0, 5).unwrap();
        assert_eq!((fp.pixel_width, fp.pixel_height), (50.0, 22.0));
        assert_eq!((fp.cols, fp.rows), (10, 5));
        assert!(!fp.cells.is_empty());
        assert!(fp
            .cells
            .iter()
            .all(|&(x, y)| x >= 0 && x < fp.cols && y >= 0 && y < fp.rows));
    }

    #[test]
    fn vertical_word_is_taller_than_wide() {
        let (mut backend, measurer) = setup();
        let fp = measure_footprint(&mut backend, &measurer, "vertical", 16.0, 90.0, 4).unwrap();
        assert!(fp.pixel_height > fp.pixel_width);
        assert!(fp.rows > fp.cols);
        let max_y = fp.cells.iter().map(|c| c.1).max().unwrap_or(0);
        let max_x = fp.cells.iter().map(|c| c.0).max().unwrap_or(0);
        assert!(max_y > max_x);
    }

    #[test]
    fn coarser_cells_give_fewer_offsets() {
        let (mut backend, measurer) = setup();
        let fine = measure_footprint(&mut backend, &measurer, "grid", 24.0, 0.0, 2).unwrap();
        let coarse = measure_footprint(&mut backend, &measurer, "grid", 24.0, 0.0, 8).unwrap();
        assert!(coarse.cells.len() < fine.cells.len());
        assert_eq!(fine.pixel_width, coarse.pixel_width);
    }

    #[test]
    fn single_cell_footprint_for_tiny_text() {
        let (mut backend, measurer) = setup();
        let fp = measure_footprint(&mut backend, &measurer, "a", 4.0, 0.0, 10).unwrap();
        assert_eq!((fp.cols, fp.rows), (1, 1));
        assert_eq!(fp.cells, vec![(0, 0)]);
    }
}
