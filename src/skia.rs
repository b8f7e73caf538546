//! 基于 tiny-skia + fontdue 的绘图后端

use std::io::Cursor;
use std::sync::Arc;

use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, Path, Pixmap, PixmapPaint, Transform,
};
use tracing::trace;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::font::{FontReady, FontSource, Glyph, GlyphSource};
use crate::surface::{ImageFormat, RasterBackend, RasterSurface, Region, TextMetrics};

pub struct SkiaBackend {
    fonts: FontReady,
    face: Option<Arc<dyn GlyphSource>>,
}

impl SkiaBackend {
    /// 字体在后台加载，首次创建画布时等待就绪
    pub fn new(source: FontSource) -> Self {
        Self {
            fonts: FontReady::spawn(source),
            face: None,
        }
    }

    pub fn with_face(face: Arc<dyn GlyphSource>) -> Self {
        Self {
            fonts: FontReady::ready(face.clone()),
            face: Some(face),
        }
    }

    pub fn fonts_ready(&self) -> bool {
        self.face.is_some() || self.fonts.is_ready()
    }
}

impl RasterBackend for SkiaBackend {
    type Surface = SkiaSurface;

    fn await_fonts(&mut self) -> Result<()> {
        if self.face.is_none() {
            self.face = Some(self.fonts.wait()?);
        }
        Ok(())
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<SkiaSurface> {
        self.await_fonts()?;
        let face = self
            .face
            .clone()
            .ok_or_else(|| Error::Font("font not loaded".into()))?;
        let pixmap = Pixmap::new(width, height).ok_or(Error::Surface { width, height })?;
        Ok(SkiaSurface::new(pixmap, face))
    }

    fn font_family(&self) -> Option<String> {
        self.face.as_ref().map(|f| f.family_name().to_string())
    }
}

// =============================================================================
// Surface
// =============================================================================

pub struct SkiaSurface {
    pixmap: Pixmap,
    face: Arc<dyn GlyphSource>,
    transform: Transform,
    stack: Vec<Transform>,
}

impl SkiaSurface {
    pub fn new(pixmap: Pixmap, face: Arc<dyn GlyphSource>) -> Self {
        Self {
            pixmap,
            face,
            transform: Transform::identity(),
            stack: Vec::new(),
        }
    }

    /// 从 PNG 数据重建画布
    pub fn from_png(data: &[u8], face: Arc<dyn GlyphSource>) -> Result<Self> {
        let pixmap = Pixmap::decode_png(data).map_err(|e| Error::Image(e.to_string()))?;
        Ok(Self::new(pixmap, face))
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// 把整行文本光栅化为独立的 pixmap，基线位于 ascent 处
    fn render_run(&self, run: &TextRun, color: Rgba) -> Option<Pixmap> {
        let w = run.width.ceil().max(1.0) as u32;
        let h = run.height.ceil().max(1.0) as u32;
        let mut pixmap = Pixmap::new(w, h)?;
        let stride = w as usize;
        let pixels = pixmap.pixels_mut();

        for (pen_x, glyph) in &run.glyphs {
            let left = (pen_x + glyph.xmin as f32).round() as i32;
            let top = (run.ascent - glyph.ymin as f32 - glyph.height as f32).round() as i32;
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = glyph.coverage[gy * glyph.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let x = left + gx as i32;
                    let y = top + gy as i32;
                    if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                        continue;
                    }
                    let alpha = (coverage as u16 * color.a as u16 / 255) as u8;
                    pixels[y as usize * stride + x as usize] =
                        ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
                }
            }
        }
        Some(pixmap)
    }
}

struct TextRun {
    width: f32,
    ascent: f32,
    height: f32,
    glyphs: Vec<(f32, Glyph)>,
}

fn layout_run(face: &dyn GlyphSource, text: &str, size: f32) -> TextRun {
    let metrics = face.line_metrics(size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut pen_x = 0.0f32;
    for ch in text.chars() {
        let glyph = face.rasterize(ch, size);
        let advance = glyph.advance;
        glyphs.push((pen_x, glyph));
        pen_x += advance;
    }
    TextRun {
        width: pen_x,
        ascent: metrics.ascent,
        height: metrics.height(),
        glyphs,
    }
}

impl RasterSurface for SkiaSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn measure_text(&self, text: &str, font_size: f32) -> TextMetrics {
        let metrics = self.face.line_metrics(font_size);
        let width = text
            .chars()
            .map(|ch| self.face.advance(ch, font_size))
            .sum();
        TextMetrics {
            width,
            height: metrics.height(),
        }
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, degrees: f32) {
        self.transform = self.transform.pre_rotate(degrees);
    }

    fn clear(&mut self, color: Rgba) {
        self.pixmap.fill(color.to_skia());
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Rgba) {
        let run = layout_run(self.face.as_ref(), text, font_size);
        let Some(sprite) = self.render_run(&run, color) else {
            trace!(text, font_size, "empty text run");
            return;
        };
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = self
            .transform
            .pre_translate(x - run.width / 2.0, y - run.height / 2.0);
        self.pixmap
            .draw_pixmap(0, 0, sprite.as_ref(), &paint, transform, None);
    }

    fn fill_path(&mut self, path: &Path, color: Rgba) {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform, None);
    }

    fn read_alpha(&self, region: Region) -> Vec<u8> {
        let mut out = Vec::with_capacity(region.width as usize * region.height as usize);
        for y in region.y..region.y.saturating_add(region.height) {
            for x in region.x..region.x.saturating_add(region.width) {
                out.push(self.pixmap.pixel(x, y).map(|p| p.alpha()).unwrap_or(0));
            }
        }
        out
    }

    fn to_image(&self, format: ImageFormat) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Png => self
                .pixmap
                .encode_png()
                .map_err(|e| Error::Render(e.to_string())),
            ImageFormat::Jpeg => {
                let pixmap = &self.pixmap;
                let rgb = image::RgbImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
                    let c = pixmap
                        .pixel(x, y)
                        .map(|p| p.demultiply())
                        .unwrap_or_else(|| ColorU8::from_rgba(0, 0, 0, 0));
                    image::Rgb([c.red(), c.green(), c.blue()])
                });
                let mut bytes = Vec::new();
                rgb.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
                    .map_err(|e| Error::Image(e.to_string()))?;
                Ok(bytes)
            }
            ImageFormat::Svg => Err(Error::UnsupportedFormat(
                "svg is not a raster format".into(),
            )),
        }
    }
}
