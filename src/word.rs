use crate::color::Rgba;

/// 单词输入项
#[derive(Debug, Clone, PartialEq)]
pub struct WordItem {
    pub text: String,
    pub weight: f32,
    pub color: Option<Rgba>,
}

impl WordItem {
    pub fn new(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight: weight.max(0.0),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// 空白文本或非正权重的单词不参与布局
    pub(crate) fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && self.weight > 0.0 && self.weight.is_finite()
    }
}

impl<S: Into<String>> From<(S, f32)> for WordItem {
    fn from((text, weight): (S, f32)) -> Self {
        WordItem::new(text, weight)
    }
}

/// 已布局的单词，坐标均为画布像素
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub text: String,
    pub weight: f32,
    /// 轴对齐包围盒左上角
    pub top_left: (f32, f32),
    /// 旋转后的包围盒尺寸
    pub size: (f32, f32),
    pub center: (f32, f32),
    pub font_size: f32,
    pub color: Rgba,
    /// 角度制
    pub rotation: f32,
}

impl PlacedItem {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (left, top) = self.top_left;
        let (w, h) = self.size;
        x >= left && x < left + w && y >= top && y < top + h
    }
}
