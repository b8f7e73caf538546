//! 布局引擎句柄
//!
//! 每次 `set_words` / `refresh` / `set_config` 都是一次完整的重新布局：
//! 蒙版、网格、螺旋缓存、已放置列表全部重建，上一次的结果先被丢弃。

use std::fmt;
use std::path::Path;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::font::FontSource;
use crate::grid::OccupancyGrid;
use crate::mask::rasterize_mask;
use crate::render::Renderer;
use crate::skia::SkiaBackend;
use crate::spiral::Placer;
use crate::surface::{ImageFormat, RasterBackend};
use crate::word::{PlacedItem, WordItem};

// =============================================================================
// Randomness & Events
// =============================================================================

/// 角度与颜色的随机来源
pub enum RandomSource {
    Entropy,
    /// 每次布局都用同一个种子重新开始
    Seeded(u64),
    /// 外部注入，状态跨布局延续
    Custom(Box<dyn RngCore + Send>),
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomSource::Entropy => f.write_str("Entropy"),
            RandomSource::Seeded(seed) => f.debug_tuple("Seeded").field(seed).finish(),
            RandomSource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl RandomSource {
    fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(RandomSource::Entropy, RandomSource::Seeded)
    }
}

/// 一次布局的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutReport {
    pub placed: usize,
    /// 即使缩到最小字号也放不下、被丢弃的单词数
    pub dropped: usize,
    /// 所有单词尝试过的字号总数
    pub attempts: u32,
    /// 没有有效单词，渲染了占位图
    pub placeholder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Click,
}

/// 画布坐标系下的指针事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
        }
    }

    pub fn click(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Click,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerResponse {
    Hover { item: PlacedItem, tooltip: String },
    Clicked(PlacedItem),
}

type PlacedCallback = Box<dyn FnMut(&PlacedItem)>;
type ClickCallback = Box<dyn FnMut(&PlacedItem, &PointerEvent)>;
type TooltipFormatter = Box<dyn Fn(&PlacedItem) -> String>;

fn default_tooltip(item: &PlacedItem) -> String {
    format!("{}: {}", item.text, item.weight)
}

// =============================================================================
// Engine
// =============================================================================

pub struct LayoutEngine<B: RasterBackend = SkiaBackend> {
    config: LayoutConfig,
    backend: B,
    words: Vec<WordItem>,
    renderer: Option<Renderer<B::Surface>>,
    random: RandomSource,
    on_word_placed: Option<PlacedCallback>,
    on_click: Option<ClickCallback>,
    tooltip: TooltipFormatter,
    destroyed: bool,
}

impl LayoutEngine<SkiaBackend> {
    /// 字体在后台线程开始加载，首次布局时等待就绪
    pub fn new(config: LayoutConfig) -> Self {
        let backend = SkiaBackend::new(config.font.clone());
        Self::with_backend(config, backend)
    }
}

impl<B: RasterBackend> LayoutEngine<B> {
    pub fn with_backend(config: LayoutConfig, backend: B) -> Self {
        let random = RandomSource::from_seed(config.seed);
        Self {
            config,
            backend,
            words: Vec::new(),
            renderer: None,
            random,
            on_word_placed: None,
            on_click: None,
            tooltip: Box::new(default_tooltip),
            destroyed: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn words(&self) -> &[WordItem] {
        &self.words
    }

    pub fn set_random_source(&mut self, random: RandomSource) {
        self.random = random;
    }

    pub fn on_word_placed(&mut self, callback: impl FnMut(&PlacedItem) + 'static) {
        self.on_word_placed = Some(Box::new(callback));
    }

    pub fn on_click(&mut self, callback: impl FnMut(&PlacedItem, &PointerEvent) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn tooltip(&mut self, formatter: impl Fn(&PlacedItem) -> String + 'static) {
        self.tooltip = Box::new(formatter);
    }

    /// 替换配置并重新布局；字体来源只在构造时读取
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<LayoutReport> {
        self.ensure_alive()?;
        if config.seed.is_some() {
            self.random = RandomSource::from_seed(config.seed);
        }
        self.config = config;
        self.refresh()
    }

    pub fn set_words<I>(&mut self, items: I) -> Result<LayoutReport>
    where
        I: IntoIterator,
        I::Item: Into<WordItem>,
    {
        self.ensure_alive()?;
        self.words = items.into_iter().map(Into::into).collect();
        self.refresh()
    }

    /// 用当前单词与配置重新完整布局
    pub fn refresh(&mut self) -> Result<LayoutReport> {
        self.ensure_alive()?;
        // 先丢弃旧结果，失败时不会留下过期的放置列表
        self.renderer = None;

        let config = &self.config;
        let surface = self.backend.create_surface(config.width, config.height)?;
        let mut renderer = Renderer::new(surface, config.background);

        let mut words: Vec<WordItem> = self
            .words
            .iter()
            .filter(|w| w.is_valid())
            .cloned()
            .collect();

        if words.is_empty() {
            renderer.draw_placeholder();
            self.renderer = Some(renderer);
            return Ok(LayoutReport {
                placeholder: true,
                ..LayoutReport::default()
            });
        }

        let grid = match &config.mask {
            Some(source) => {
                let mask = rasterize_mask(&mut self.backend, source, config.mask_size)?;
                OccupancyGrid::from_mask(config.width, config.height, config.grid_cell_size, &mask)
            }
            None => OccupancyGrid::new(config.width, config.height, config.grid_cell_size, true),
        };

        // 权重从大到小，稳定排序保留同权重的输入顺序
        words.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        let max_weight = words.first().map(|w| w.weight).unwrap_or(1.0);

        let measurer = self.backend.create_surface(1, 1)?;
        let mut pass_rng;
        let rng: &mut dyn RngCore = match &mut self.random {
            RandomSource::Seeded(seed) => {
                pass_rng = ChaCha8Rng::seed_from_u64(*seed);
                &mut pass_rng
            }
            RandomSource::Entropy => {
                pass_rng = ChaCha8Rng::from_os_rng();
                &mut pass_rng
            }
            RandomSource::Custom(rng) => rng.as_mut(),
        };

        let mut placer = Placer::new(
            &mut self.backend,
            &measurer,
            config,
            rng,
            grid,
            max_weight,
        );
        let mut report = LayoutReport::default();

        for word in &words {
            let outcome = placer.place(word)?;
            report.attempts += outcome.attempts;
            match outcome.placed {
                Some(placed) => {
                    if let Some(callback) = self.on_word_placed.as_mut() {
                        callback(&placed);
                    }
                    renderer.draw(placed);
                    report.placed += 1;
                }
                None => report.dropped += 1,
            }
        }

        info!(
            placed = report.placed,
            dropped = report.dropped,
            attempts = report.attempts,
            "layout finished"
        );
        self.renderer = Some(renderer);
        Ok(report)
    }

    /// 本次布局的结果，按放置顺序
    pub fn placed(&self) -> &[PlacedItem] {
        self.renderer.as_ref().map(|r| r.placed()).unwrap_or(&[])
    }

    pub fn surface(&self) -> Option<&B::Surface> {
        self.renderer.as_ref().map(|r| r.surface())
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<&PlacedItem> {
        self.renderer.as_ref()?.hit_test(x, y)
    }

    /// 移动返回提示信息，点击触发 `on_click`
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<PointerResponse> {
        if self.destroyed {
            return None;
        }
        let item = self.hit_test(event.x, event.y)?.clone();
        match event.kind {
            PointerKind::Move => {
                let tooltip = (self.tooltip)(&item);
                Some(PointerResponse::Hover { item, tooltip })
            }
            PointerKind::Click => {
                if let Some(callback) = self.on_click.as_mut() {
                    callback(&item, &event);
                }
                Some(PointerResponse::Clicked(item))
            }
        }
    }

    pub fn export_image(&self, format: ImageFormat) -> Result<Vec<u8>> {
        self.ensure_alive()?;
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| Error::Render("Nothing has been laid out yet".into()))?;
        renderer.export_image(format, &self.font_family())
    }

    /// 按扩展名推断格式并写入文件
    pub fn download(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let bytes = self.export_image(format)?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), ?format, "image written");
        Ok(())
    }

    /// 释放画布、解除回调、清空结果；之后的操作都会返回 `Error::Destroyed`
    pub fn destroy(&mut self) {
        self.renderer = None;
        self.words.clear();
        self.on_word_placed = None;
        self.on_click = None;
        self.tooltip = Box::new(default_tooltip);
        self.destroyed = true;
        debug!("layout engine destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::Destroyed)
        } else {
            Ok(())
        }
    }

    fn font_family(&self) -> String {
        self.backend
            .font_family()
            .unwrap_or_else(|| match &self.config.font {
                FontSource::System { family, .. } => family.clone(),
                _ => "sans-serif".to_string(),
            })
    }
}
