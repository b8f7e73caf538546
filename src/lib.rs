/*!
 * Araea WordCloud Layout
 *
 * 词云布局引擎：按权重从大到小，沿同心环螺旋在粗粒度占用网格上寻找位置，
 * 放不下时缩小字号重试；支持形状蒙版、旋转、渲染导出与命中测试。
 *
 * ```no_run
 * use araea_wordcloud_layout::{ImageFormat, LayoutConfig, LayoutEngine, MaskShape, WordItem};
 *
 * let mut engine = LayoutEngine::new(LayoutConfig::new().size(600, 600).mask_preset(MaskShape::Heart));
 * let report = engine.set_words(vec![WordItem::new("Rust", 10.0), WordItem::new("Cargo", 6.0)])?;
 * println!("placed {} / dropped {}", report.placed, report.dropped);
 * std::fs::write("cloud.png", engine.export_image(ImageFormat::Png)?)?;
 * # Ok::<(), Box<dyn std::error::Error>>(())
 * ```
 */

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod font;
pub mod footprint;
pub mod grid;
pub mod mask;
pub mod render;
pub mod skia;
pub mod spiral;
pub mod surface;
pub mod word;

pub use color::{ColorScheme, Rgba};
pub use config::LayoutConfig;
pub use engine::{
    LayoutEngine, LayoutReport, PointerEvent, PointerKind, PointerResponse, RandomSource,
};
pub use error::{Error, Result};
pub use font::{BuiltinFace, FontReady, FontSource, GlyphSource};
pub use footprint::GlyphFootprint;
pub use grid::OccupancyGrid;
pub use mask::{MaskData, MaskShape, MaskSource};
pub use skia::{SkiaBackend, SkiaSurface};
pub use surface::{ImageFormat, RasterBackend, RasterSurface, Region, TextMetrics};
pub use word::{PlacedItem, WordItem};

/// 用默认配置一次性生成词云
pub fn generate(words: &[(&str, f32)]) -> Result<LayoutEngine> {
    let mut engine = LayoutEngine::new(LayoutConfig::default());
    engine.set_words(words.iter().map(|&(text, weight)| WordItem::new(text, weight)))?;
    Ok(engine)
}
