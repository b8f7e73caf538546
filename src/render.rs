//! 渲染与命中测试

use tracing::debug;

use crate::color::Rgba;
use crate::error::Result;
use crate::surface::{ImageFormat, RasterSurface};
use crate::word::PlacedItem;

pub const PLACEHOLDER_TEXT: &str = "No data";
const PLACEHOLDER_COLOR: Rgba = Rgba::rgb(0x9e, 0x9e, 0x9e);

/// 持有输出画布和只追加的已放置列表
pub struct Renderer<S: RasterSurface> {
    surface: S,
    background: Rgba,
    placed: Vec<PlacedItem>,
    placeholder: bool,
}

impl<S: RasterSurface> Renderer<S> {
    pub fn new(mut surface: S, background: Rgba) -> Self {
        surface.clear(background);
        Self {
            surface,
            background,
            placed: Vec::new(),
            placeholder: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn placed(&self) -> &[PlacedItem] {
        &self.placed
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// 平移到中心、旋转、居中绘制文本、恢复
    pub fn draw(&mut self, item: PlacedItem) {
        self.surface.save();
        self.surface.translate(item.center.0, item.center.1);
        self.surface.rotate(item.rotation);
        self.surface
            .fill_text(&item.text, 0.0, 0.0, item.font_size, item.color);
        self.surface.restore();
        self.placed.push(item);
    }

    /// 没有任何单词时的占位图
    pub fn draw_placeholder(&mut self) {
        self.surface.clear(self.background);
        let size = (self.surface.width().min(self.surface.height()) as f32 / 10.0).max(8.0);
        let (cx, cy) = (
            self.surface.width() as f32 / 2.0,
            self.surface.height() as f32 / 2.0,
        );
        self.surface
            .fill_text(PLACEHOLDER_TEXT, cx, cy, size, PLACEHOLDER_COLOR);
        self.placeholder = true;
        debug!("rendered empty placeholder");
    }

    /// 线性扫描，返回第一个包围盒包含该点的单词
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&PlacedItem> {
        self.placed.iter().find(|item| item.contains(x, y))
    }

    pub fn export_image(&self, format: ImageFormat, font_family: &str) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Svg => Ok(self.to_svg(font_family).into_bytes()),
            raster => self.surface.to_image(raster),
        }
    }

    pub fn to_svg(&self, font_family: &str) -> String {
        let (width, height) = (self.surface.width(), self.surface.height());
        let mut svg = String::with_capacity(256 + self.placed.len() * 160);

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        ));
        svg.push_str(&format!(
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            self.background
        ));
        svg.push_str(&format!(
            r#"<style>text{{font-family:'{}',Arial,sans-serif}}</style>"#,
            escape_xml(font_family)
        ));

        if self.placeholder {
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                width as f32 / 2.0,
                height as f32 / 2.0,
                PLACEHOLDER_COLOR,
                PLACEHOLDER_TEXT
            ));
        }

        for word in &self.placed {
            let (x, y) = word.center;
            svg.push_str(&format!(
                r#"<text x="{x:.1}" y="{y:.1}" fill="{}" font-size="{:.1}" text-anchor="middle" dominant-baseline="central" transform="rotate({:.1} {x:.1} {y:.1})">{}</text>"#,
                word.color,
                word.font_size,
                word.rotation,
                escape_xml(&word.text)
            ));
        }

        svg.push_str("</svg>");
        svg
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFace;
    use crate::skia::{SkiaBackend, SkiaSurface};
    use crate::surface::{RasterBackend, Region};
    use std::sync::Arc;

    fn renderer(w: u32, h: u32) -> Renderer<SkiaSurface> {
        let mut backend = SkiaBackend::with_face(Arc::new(BuiltinFace));
        Renderer::new(backend.create_surface(w, h).unwrap(), Rgba::WHITE)
    }

    fn item(text: &str, top_left: (f32, f32), size: (f32, f32)) -> PlacedItem {
        PlacedItem {
            text: text.into(),
            weight: 1.0,
            top_left,
            size,
            center: (top_left.0 + size.0 / 2.0, top_left.1 + size.1 / 2.0),
            font_size: 12.0,
            color: Rgba::BLACK,
            rotation: 0.0,
        }
    }

    #[test]
    fn hit_test_returns_first_match() {
        let mut r = renderer(100, 100);
        r.draw(item("a", (0.0, 0.0), (50.0, 20.0)));
        r.draw(item("b", (40.0, 10.0), (50.0, 20.0)));
        assert_eq!(r.hit_test(45.0, 15.0).map(|i| i.text.as_str()), Some("a"));
        assert_eq!(r.hit_test(80.0, 25.0).map(|i| i.text.as_str()), Some("b"));
        assert!(r.hit_test(5.0, 90.0).is_none());
    }

    #[test]
    fn draw_paints_inside_bounding_box() {
        let mut r = renderer(100, 100);
        r.draw(item("hello", (20.0, 40.0), (40.0, 20.0)));
        let alpha = r.surface().read_alpha(Region::new(20, 40, 40, 20));
        let pixmap = r.surface().pixmap();
        let dark = (20..60)
            .flat_map(|x| (40..60).map(move |y| (x, y)))
            .filter(|&(x, y)| pixmap.pixel(x, y).is_some_and(|p| p.red() < 128))
            .count();
        assert!(alpha.iter().all(|&a| a == 255));
        assert!(dark > 0);
    }

    #[test]
    fn placeholder_draws_text() {
        let mut r = renderer(200, 100);
        r.draw_placeholder();
        assert!(r.is_placeholder());
        assert!(r.placed().is_empty());
        let svg = r.to_svg("Test");
        assert!(svg.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn svg_escapes_text_and_rotates() {
        let mut r = renderer(100, 100);
        let mut word = item("<R&D>", (10.0, 10.0), (30.0, 30.0));
        word.rotation = -90.0;
        r.draw(word);
        let svg = String::from_utf8(r.export_image(ImageFormat::Svg, "Fam").unwrap()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("&lt;R&amp;D&gt;"));
        assert!(svg.contains("rotate(-90.0 25.0 25.0)"));
        assert!(svg.contains("font-family:'Fam'"));
    }
}
