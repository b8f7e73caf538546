//! 粗粒度占用网格
//!
//! `true` 表示格子可放置：既没有被已放置单词覆盖，也落在蒙版允许的区域内。
//! 越界的格子一律视为放不下。

use tracing::debug;

use crate::footprint::GlyphFootprint;
use crate::mask::MaskData;

/// 蒙版投影到画布时留出的边距比例
const MASK_FILL_RATIO: f32 = 0.9;
/// 投影边界恰好落在格线上时的浮点容差（格子单位）
const EDGE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cols: usize,
    rows: usize,
    cell_size: u32,
    free: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(width: u32, height: u32, cell_size: u32, default_free: bool) -> Self {
        let cell_size = cell_size.max(1);
        let cols = width.div_ceil(cell_size) as usize;
        let rows = height.div_ceil(cell_size) as usize;
        Self {
            cols,
            rows,
            cell_size,
            free: vec![default_free; cols * rows],
        }
    }

    /// 全部占用，再把蒙版像素等比缩放、居中；每个像素投影成边长 `scale` 的方块，
    /// 方块碰到的格子都标记为可放置
    pub fn from_mask(width: u32, height: u32, cell_size: u32, mask: &MaskData) -> Self {
        let mut grid = Self::new(width, height, cell_size, false);
        if mask.width == 0 || mask.height == 0 {
            return grid;
        }

        let scale = (width as f32 / mask.width as f32).min(height as f32 / mask.height as f32)
            * MASK_FILL_RATIO;
        let offset_x = (width as f32 - mask.width as f32 * scale) / 2.0;
        let offset_y = (height as f32 - mask.height as f32 * scale) / 2.0;
        let cell = grid.cell_size as f32;

        // 方块 [p, p + scale) 覆盖的格子下标范围
        let span = |p: f32| {
            let first = (p / cell + EDGE_EPSILON).floor() as i32;
            let last = ((p + scale) / cell - EDGE_EPSILON).ceil() as i32 - 1;
            first..=last.max(first)
        };

        for &(x, y) in &mask.pixels {
            let xs = span(x as f32 * scale + offset_x);
            for gy in span(y as f32 * scale + offset_y) {
                for gx in xs.clone() {
                    if let Some(idx) = grid.index(gx, gy) {
                        grid.free[idx] = true;
                    }
                }
            }
        }

        debug!(
            eligible = grid.free_count(),
            total = grid.free.len(),
            scale,
            "grid initialised from mask"
        );
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn free_count(&self) -> usize {
        self.free.iter().filter(|&&f| f).count()
    }

    fn index(&self, gx: i32, gy: i32) -> Option<usize> {
        if gx < 0 || gy < 0 || gx as usize >= self.cols || gy as usize >= self.rows {
            return None;
        }
        Some(gy as usize * self.cols + gx as usize)
    }

    pub fn is_free(&self, gx: i32, gy: i32) -> bool {
        self.index(gx, gy).is_some_and(|idx| self.free[idx])
    }

    pub fn occupy<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (gx, gy) in cells {
            if let Some(idx) = self.index(gx, gy) {
                self.free[idx] = false;
            }
        }
    }

    /// 足迹的每个占用格平移到 (x, y) 后都必须在界内且空闲；空足迹放不下
    pub fn fits(&self, footprint: &GlyphFootprint, x: i32, y: i32) -> bool {
        !footprint.cells.is_empty()
            && footprint
                .cells
                .iter()
                .all(|&(dx, dy)| self.is_free(x + dx, y + dy))
    }

    /// 一次性写入整个足迹
    pub fn place(&mut self, footprint: &GlyphFootprint, x: i32, y: i32) {
        self.occupy(footprint.cells.iter().map(|&(dx, dy)| (x + dx, y + dy)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(cells: &[(i32, i32)]) -> GlyphFootprint {
        GlyphFootprint {
            cells: cells.to_vec(),
            pixel_width: 8.0,
            pixel_height: 8.0,
            cols: 2,
            rows: 2,
        }
    }

    #[test]
    fn dimensions_round_up() {
        let grid = OccupancyGrid::new(101, 40, 10, true);
        assert_eq!((grid.cols(), grid.rows()), (11, 4));
        assert_eq!(grid.free_count(), 44);
    }

    #[test]
    fn zero_cell_size_is_clamped() {
        let grid = OccupancyGrid::new(3, 2, 0, true);
        assert_eq!((grid.cols(), grid.rows(), grid.cell_size()), (3, 2, 1));
    }

    #[test]
    fn out_of_bounds_is_never_free() {
        let grid = OccupancyGrid::new(40, 40, 10, true);
        assert!(grid.is_free(0, 0));
        assert!(grid.is_free(3, 3));
        assert!(!grid.is_free(-1, 0));
        assert!(!grid.is_free(4, 0));
        assert!(!grid.is_free(0, 4));
    }

    #[test]
    fn occupy_ignores_out_of_bounds() {
        let mut grid = OccupancyGrid::new(20, 20, 10, true);
        grid.occupy([(0, 0), (5, 5), (-1, 1)]);
        assert!(!grid.is_free(0, 0));
        assert_eq!(grid.free_count(), 3);
    }

    #[test]
    fn fits_checks_only_occupied_offsets() {
        let mut grid = OccupancyGrid::new(30, 30, 10, true);
        let fp = footprint(&[(0, 0), (1, 1)]);
        assert!(grid.fits(&fp, 0, 0));
        // 右下角越界
        assert!(!grid.fits(&fp, 2, 2));

        grid.occupy([(1, 0)]);
        assert!(grid.fits(&fp, 0, 0));
        grid.place(&fp, 0, 0);
        assert!(!grid.fits(&fp, 0, 0));
        assert!(!grid.is_free(1, 1));
        assert!(!grid.fits(&fp, 1, 1));
    }

    #[test]
    fn mask_projection_is_centred_and_scaled() {
        // 10x10 的全满蒙版投影到 100x100，缩放 9 倍，居中偏移 5px
        let pixels = (0..10).flat_map(|y| (0..10).map(move |x| (x, y))).collect();
        let mask = MaskData {
            width: 10,
            height: 10,
            pixels,
        };
        let grid = OccupancyGrid::from_mask(100, 100, 1, &mask);
        assert!(grid.is_free(5, 5));
        assert!(grid.is_free(94, 94));
        assert!(grid.is_free(50, 50));
        assert!(!grid.is_free(4, 4));
        assert!(!grid.is_free(95, 50));
        // 投影区域 [5, 95) 连成一片，没有空洞
        assert_eq!(grid.free_count(), 90 * 90);
    }

    #[test]
    fn upscaled_mask_pixel_frees_a_solid_block() {
        // 单个像素放大 9 倍后碰到 4x4 个 3px 格子
        let mask = MaskData {
            width: 10,
            height: 10,
            pixels: vec![(5, 5)],
        };
        let grid = OccupancyGrid::from_mask(100, 100, 3, &mask);
        // 投影到 [50, 59)：格子 16..=19
        for gy in 16..=19 {
            for gx in 16..=19 {
                assert!(grid.is_free(gx, gy), "({gx},{gy})");
            }
        }
        assert_eq!(grid.free_count(), 16);
    }

    #[test]
    fn downscaled_mask_pixels_share_cells() {
        let pixels = (0..100).flat_map(|y| (0..100).map(move |x| (x, y))).collect();
        let mask = MaskData {
            width: 100,
            height: 100,
            pixels,
        };
        // 缩放 0.9，投影到 [5, 95)，5px 格子 1..=18
        let grid = OccupancyGrid::from_mask(100, 100, 5, &mask);
        assert!(grid.is_free(1, 1) && grid.is_free(18, 18));
        assert!(!grid.is_free(0, 0) && !grid.is_free(19, 19));
        assert_eq!(grid.free_count(), 18 * 18);
    }

    #[test]
    fn empty_footprint_never_fits() {
        let grid = OccupancyGrid::new(30, 30, 10, true);
        assert!(!grid.fits(&footprint(&[]), 1, 1));
    }

    #[test]
    fn empty_mask_blocks_everything() {
        let mask = MaskData {
            width: 10,
            height: 10,
            pixels: Vec::new(),
        };
        let grid = OccupancyGrid::from_mask(50, 50, 5, &mask);
        assert_eq!(grid.free_count(), 0);
    }
}
