//! 字体加载与字形光栅化
//!
//! 字体在后台线程加载，[`FontReady`] 是对应的一次性就绪信号：
//! 任何需要采样字形像素的步骤（测量、字形蒙版）都必须先 `wait()`。

use std::sync::Arc;
use std::thread::JoinHandle;

use fontdue::{Font, FontSettings};
use tracing::{debug, warn};
use usvg::fontdb;

use crate::error::{Error, Result};

// =============================================================================
// Glyph Source
// =============================================================================

/// 单个字形的覆盖率位图，坐标系与 fontdue 一致（ymin 向上为正）
#[derive(Debug, Clone, Default)]
pub struct Glyph {
    pub xmin: i32,
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    pub coverage: Vec<u8>,
}

/// 行度量，descent 取正值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl LineMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

pub trait GlyphSource: Send + Sync {
    fn family_name(&self) -> &str;
    fn line_metrics(&self, size: f32) -> LineMetrics;
    fn rasterize(&self, ch: char, size: f32) -> Glyph;

    fn advance(&self, ch: char, size: f32) -> f32 {
        self.rasterize(ch, size).advance
    }
}

pub struct FontdueFace {
    font: Font,
    family: String,
}

impl FontdueFace {
    pub fn from_bytes(data: &[u8], collection_index: u32) -> Result<Self> {
        let settings = FontSettings {
            collection_index,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(data, settings).map_err(|e| Error::Font(e.to_string()))?;
        let family = extract_font_family_name(data).unwrap_or_else(|| "sans-serif".to_string());
        Ok(Self { font, family })
    }
}

impl GlyphSource for FontdueFace {
    fn family_name(&self) -> &str {
        &self.family
    }

    fn line_metrics(&self, size: f32) -> LineMetrics {
        let metrics = self
            .font
            .horizontal_line_metrics(size)
            .unwrap_or(fontdue::LineMetrics {
                ascent: size * 0.8,
                descent: size * -0.2,
                line_gap: 0.0,
                new_line_size: size,
            });
        LineMetrics {
            ascent: metrics.ascent,
            descent: metrics.descent.abs(),
        }
    }

    fn rasterize(&self, ch: char, size: f32) -> Glyph {
        let (metrics, coverage) = self.font.rasterize(ch, size);
        Glyph {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        }
    }

    fn advance(&self, ch: char, size: f32) -> f32 {
        self.font.metrics(ch, size).advance_width
    }
}

/// 程序化生成的方块字形，没有可用字体时的兜底，也是确定性测试用的字体
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFace;

impl BuiltinFace {
    pub const FAMILY: &'static str = "Builtin Blocks";
}

impl GlyphSource for BuiltinFace {
    fn family_name(&self) -> &str {
        Self::FAMILY
    }

    fn line_metrics(&self, size: f32) -> LineMetrics {
        LineMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
        }
    }

    fn rasterize(&self, ch: char, size: f32) -> Glyph {
        let advance = size * 0.6;
        if ch.is_whitespace() || ch.is_control() {
            return Glyph {
                advance,
                ..Glyph::default()
            };
        }
        let width = (size * 0.5).round().max(1.0) as usize;
        let height = (size * 0.7).round().max(1.0) as usize;
        Glyph {
            xmin: (size * 0.05).round() as i32,
            ymin: 0,
            width,
            height,
            advance,
            coverage: vec![255; width * height],
        }
    }
}

// =============================================================================
// Font Source
// =============================================================================

#[derive(Debug, Clone)]
pub enum FontSource {
    /// TTF / OTF 原始数据
    Bytes(Vec<u8>),
    /// 按族名与字重查询系统字体，找不到时退回内置字体
    System { family: String, weight: u16 },
    Builtin,
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::System {
            family: "sans-serif".into(),
            weight: 700,
        }
    }
}

pub fn load_font(source: &FontSource) -> Result<Arc<dyn GlyphSource>> {
    match source {
        FontSource::Bytes(data) => Ok(Arc::new(FontdueFace::from_bytes(data, 0)?)),
        FontSource::System { family, weight } => match load_system_font(family, *weight)? {
            Some(face) => Ok(Arc::new(face)),
            None => {
                warn!(family = %family, "no matching system font, using builtin face");
                Ok(Arc::new(BuiltinFace))
            }
        },
        FontSource::Builtin => Ok(Arc::new(BuiltinFace)),
    }
}

fn load_system_font(family: &str, weight: u16) -> Result<Option<FontdueFace>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let requested = match family {
        "sans-serif" => fontdb::Family::SansSerif,
        "serif" => fontdb::Family::Serif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        name => fontdb::Family::Name(name),
    };
    let query = fontdb::Query {
        families: &[requested, fontdb::Family::SansSerif],
        weight: fontdb::Weight(weight),
        ..fontdb::Query::default()
    };

    let Some(id) = db.query(&query) else {
        return Ok(None);
    };
    let family_name = db
        .face(id)
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()));

    let face = db
        .with_face_data(id, |data, index| FontdueFace::from_bytes(data, index))
        .transpose()?;

    Ok(face.map(|mut face| {
        if let Some(name) = family_name {
            face.family = name;
        }
        debug!(family = %face.family, "loaded system font");
        face
    }))
}

pub(crate) fn extract_font_family_name(font_data: &[u8]) -> Option<String> {
    let mut db = fontdb::Database::new();
    db.load_font_source(fontdb::Source::Binary(Arc::new(font_data.to_vec())));
    for face in db.faces() {
        if let Some((name, _)) = face.families.first() {
            return Some(name.clone());
        }
    }
    None
}

// =============================================================================
// Font Readiness
// =============================================================================

enum ReadyState {
    Pending(JoinHandle<Result<Arc<dyn GlyphSource>>>),
    Ready(Arc<dyn GlyphSource>),
    Failed(String),
}

/// 字体就绪信号，只触发一次
pub struct FontReady {
    state: ReadyState,
}

impl FontReady {
    /// 在后台线程加载字体
    pub fn spawn(source: FontSource) -> Self {
        let handle = std::thread::spawn(move || load_font(&source));
        Self {
            state: ReadyState::Pending(handle),
        }
    }

    pub fn ready(face: Arc<dyn GlyphSource>) -> Self {
        Self {
            state: ReadyState::Ready(face),
        }
    }

    pub fn is_ready(&self) -> bool {
        match &self.state {
            ReadyState::Pending(handle) => handle.is_finished(),
            ReadyState::Ready(_) | ReadyState::Failed(_) => true,
        }
    }

    /// 阻塞直到字体可用；结果会被缓存
    pub fn wait(&mut self) -> Result<Arc<dyn GlyphSource>> {
        let state = std::mem::replace(&mut self.state, ReadyState::Failed(String::new()));
        self.state = match state {
            ReadyState::Pending(handle) => match handle.join() {
                Ok(Ok(face)) => {
                    debug!(family = face.family_name(), "font ready");
                    ReadyState::Ready(face)
                }
                Ok(Err(e)) => ReadyState::Failed(e.to_string()),
                Err(_) => ReadyState::Failed("font loader panicked".into()),
            },
            other => other,
        };
        match &self.state {
            ReadyState::Ready(face) => Ok(face.clone()),
            ReadyState::Failed(msg) => Err(Error::Font(msg.clone())),
            ReadyState::Pending(_) => Err(Error::Font("font still loading".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_face_blocks_scale_with_size() {
        let face = BuiltinFace;
        let small = face.rasterize('A', 10.0);
        let large = face.rasterize('A', 40.0);
        assert_eq!((small.width, small.height), (5, 7));
        assert_eq!((large.width, large.height), (20, 28));
        assert!(large.coverage.iter().all(|&c| c == 255));
    }

    #[test]
    fn builtin_whitespace_only_advances() {
        let glyph = BuiltinFace.rasterize(' ', 20.0);
        assert_eq!(glyph.width, 0);
        assert!(glyph.coverage.is_empty());
        assert!(glyph.advance > 0.0);
    }

    #[test]
    fn invalid_font_bytes_are_a_font_error() {
        let err = load_font(&FontSource::Bytes(vec![0, 1, 2, 3])).err();
        assert!(matches!(err, Some(Error::Font(_))));
    }

    #[test]
    fn ready_signal_resolves_once_and_caches() {
        let mut ready = FontReady::spawn(FontSource::Builtin);
        let first = ready.wait().map(|f| f.family_name().to_string()).ok();
        assert!(ready.is_ready());
        let second = ready.wait().map(|f| f.family_name().to_string()).ok();
        assert_eq!(first.as_deref(), Some(BuiltinFace::FAMILY));
        assert_eq!(first, second);
    }

    #[test]
    fn family_name_of_garbage_bytes_is_none() {
        assert_eq!(extract_font_family_name(&[0u8; 16]), None);
        assert_eq!(extract_font_family_name(&[]), None);
    }

    #[test]
    fn ready_face_is_returned_without_loading() {
        let mut ready = FontReady::ready(Arc::new(BuiltinFace));
        assert!(ready.is_ready());
        let face = ready.wait().map(|f| f.family_name().to_string()).ok();
        assert_eq!(face.as_deref(), Some(BuiltinFace::FAMILY));
    }

    #[test]
    fn failed_load_is_reported_on_every_wait() {
        let mut ready = FontReady::spawn(FontSource::Bytes(Vec::new()));
        assert!(ready.wait().is_err());
        assert!(ready.wait().is_err());
    }
}
