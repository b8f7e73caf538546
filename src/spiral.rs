//! 螺旋放置搜索
//!
//! 从网格中心开始按同心环向外生成候选点，第一个能放下足迹的位置即被采用；
//! 整圈都放不下时按 0.7 倍缩小字号重试，直到最小字号。

use std::f32::consts::TAU;

use rand::{Rng, RngCore};
use tracing::{debug, trace};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::footprint::{measure_footprint, GlyphFootprint};
use crate::grid::OccupancyGrid;
use crate::surface::RasterBackend;
use crate::word::{PlacedItem, WordItem};

/// 每次缩小字号的比例
pub const SHRINK_FACTOR: f32 = 0.7;

/// 按最大权重线性映射到 [min, max]
pub fn initial_font_size(weight: f32, max_weight: f32, min: f32, max: f32) -> f32 {
    let ratio = if max_weight > 0.0 {
        (weight / max_weight).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (min + ratio * (max - min)).clamp(min, max.max(min))
}

pub fn shrink_font_size(size: f32, min: f32) -> f32 {
    (size * SHRINK_FACTOR).floor().max(min)
}

// =============================================================================
// Spiral Cache
// =============================================================================

/// 环距离 → 该环上的候选偏移；在一次布局内所有单词共享
#[derive(Debug, Default)]
pub struct SpiralCache {
    rings: Vec<Vec<(i32, i32)>>,
}

impl SpiralCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 d 环：`max(1, 8d)` 个按角度均分的点，第 0 环只有中心
    pub fn ring(&mut self, distance: u32) -> &[(i32, i32)] {
        let d = distance as usize;
        while self.rings.len() <= d {
            let next = self.rings.len() as u32;
            self.rings.push(Self::build_ring(next));
        }
        &self.rings[d]
    }

    pub fn cached_rings(&self) -> usize {
        self.rings.len()
    }

    fn build_ring(distance: u32) -> Vec<(i32, i32)> {
        if distance == 0 {
            return vec![(0, 0)];
        }
        let count = 8 * distance;
        let radius = distance as f32;
        (0..count)
            .map(|i| {
                let angle = TAU * i as f32 / count as f32;
                (
                    (radius * angle.cos()).round() as i32,
                    (radius * angle.sin()).round() as i32,
                )
            })
            .collect()
    }
}

/// 按环由内向外、环内按生成顺序扫描，返回第一个可放置的左上角格子
pub fn find_position(
    grid: &OccupancyGrid,
    cache: &mut SpiralCache,
    footprint: &GlyphFootprint,
) -> Option<(i32, i32)> {
    let cx = grid.cols() as i32 / 2;
    let cy = grid.rows() as i32 / 2;
    let half_w = footprint.cols / 2;
    let half_h = footprint.rows / 2;
    let max_ring = grid.cols().max(grid.rows()) as u32;

    for distance in 0..=max_ring {
        for &(dx, dy) in cache.ring(distance) {
            let x = cx + dx - half_w;
            let y = cy + dy - half_h;
            if grid.fits(footprint, x, y) {
                return Some((x, y));
            }
        }
    }
    None
}

// =============================================================================
// Placer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementOutcome {
    pub placed: Option<PlacedItem>,
    /// 尝试过的字号个数（含首次）
    pub attempts: u32,
}

/// 一次布局过程中的放置状态：网格、螺旋缓存、随机源
pub struct Placer<'a, B: RasterBackend> {
    backend: &'a mut B,
    measurer: &'a B::Surface,
    config: &'a LayoutConfig,
    rng: &'a mut dyn RngCore,
    pub grid: OccupancyGrid,
    cache: SpiralCache,
    max_weight: f32,
}

impl<'a, B: RasterBackend> Placer<'a, B> {
    pub fn new(
        backend: &'a mut B,
        measurer: &'a B::Surface,
        config: &'a LayoutConfig,
        rng: &'a mut dyn RngCore,
        grid: OccupancyGrid,
        max_weight: f32,
    ) -> Self {
        Self {
            backend,
            measurer,
            config,
            rng,
            grid,
            cache: SpiralCache::new(),
            max_weight,
        }
    }

    fn pick_rotation(&mut self) -> f32 {
        let angles = &self.config.rotation_angles;
        if !self.config.rotation_enabled || angles.is_empty() {
            return 0.0;
        }
        angles[self.rng.random_range(0..angles.len())]
    }

    pub fn place(&mut self, item: &WordItem) -> Result<PlacementOutcome> {
        let min = self.config.min_font_size;
        let mut font_size = initial_font_size(
            item.weight,
            self.max_weight,
            min,
            self.config.max_font_size,
        );
        let rotation = self.pick_rotation();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let footprint = measure_footprint(
                self.backend,
                self.measurer,
                &item.text,
                font_size,
                rotation,
                self.grid.cell_size(),
            )?;

            if let Some((x, y)) = find_position(&self.grid, &mut self.cache, &footprint) {
                self.grid.place(&footprint, x, y);
                let placed = self.accept(item, &footprint, x, y, font_size, rotation);
                trace!(
                    text = %item.text,
                    font_size,
                    rotation,
                    x = placed.center.0,
                    y = placed.center.1,
                    attempts,
                    "placed"
                );
                return Ok(PlacementOutcome {
                    placed: Some(placed),
                    attempts,
                });
            }

            if !self.config.shrink_to_fit || font_size <= min {
                break;
            }
            font_size = shrink_font_size(font_size, min);
        }

        debug!(text = %item.text, attempts, "word dropped, no room left");
        Ok(PlacementOutcome {
            placed: None,
            attempts,
        })
    }

    fn accept(
        &mut self,
        item: &WordItem,
        footprint: &GlyphFootprint,
        x: i32,
        y: i32,
        font_size: f32,
        rotation: f32,
    ) -> PlacedItem {
        let cell = self.grid.cell_size() as f32;
        let top_left = (x as f32 * cell, y as f32 * cell);
        let size = (footprint.pixel_width, footprint.pixel_height);
        let palette = &self.config.palette;
        let color = match item.color {
            Some(color) => color,
            None if palette.is_empty() => crate::color::Rgba::BLACK,
            None => palette[self.rng.random_range(0..palette.len())],
        };
        PlacedItem {
            text: item.text.clone(),
            weight: item.weight,
            top_left,
            size,
            center: (top_left.0 + size.0 / 2.0, top_left.1 + size.1 / 2.0),
            font_size,
            color,
            rotation,
        }
    }
}
