//! 布局配置

use crate::color::{ColorScheme, Rgba};
use crate::font::FontSource;
use crate::mask::{MaskShape, MaskSource};

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub palette: Vec<Rgba>,
    pub font: FontSource,
    pub min_font_size: f32,
    pub max_font_size: f32,
    pub rotation_enabled: bool,
    /// 角度制
    pub rotation_angles: Vec<f32>,
    /// 占用网格的格子边长 (px)
    pub grid_cell_size: u32,
    pub mask: Option<MaskSource>,
    pub mask_size: u32,
    pub shrink_to_fit: bool,
    /// 固定种子时，相同输入的两次布局结果完全一致
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Rgba::WHITE,
            palette: ColorScheme::Ocean.colors(),
            font: FontSource::default(),
            min_font_size: 14.0,
            max_font_size: 120.0,
            rotation_enabled: false,
            rotation_angles: vec![0.0, -90.0],
            grid_cell_size: 4,
            mask: None,
            mask_size: 400,
            shrink_to_fit: true,
            seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.palette = scheme.colors();
        self
    }

    /// 空调色板会退回默认配色
    pub fn colors(mut self, colors: impl IntoIterator<Item = Rgba>) -> Self {
        self.palette = colors.into_iter().collect();
        if self.palette.is_empty() {
            self.palette = ColorScheme::Ocean.colors();
        }
        self
    }

    pub fn font(mut self, font_data: Vec<u8>) -> Self {
        self.font = FontSource::Bytes(font_data);
        self
    }

    pub fn system_font(mut self, family: impl Into<String>, weight: u16) -> Self {
        self.font = FontSource::System {
            family: family.into(),
            weight,
        };
        self
    }

    pub fn builtin_font(mut self) -> Self {
        self.font = FontSource::Builtin;
        self
    }

    pub fn font_size_range(mut self, min: f32, max: f32) -> Self {
        self.min_font_size = min.max(1.0);
        self.max_font_size = max.max(self.min_font_size);
        self
    }

    /// 设置候选角度并开启旋转；空列表等价于关闭旋转
    pub fn angles(mut self, angles: Vec<f32>) -> Self {
        self.rotation_enabled = !angles.is_empty();
        self.rotation_angles = if angles.is_empty() { vec![0.0] } else { angles };
        self
    }

    pub fn rotation(mut self, enabled: bool) -> Self {
        self.rotation_enabled = enabled;
        self
    }

    pub fn grid_cell_size(mut self, cell: u32) -> Self {
        self.grid_cell_size = cell.max(1);
        self
    }

    pub fn mask(mut self, mask: impl Into<MaskSource>) -> Self {
        self.mask = Some(mask.into());
        self
    }

    pub fn mask_preset(self, shape: MaskShape) -> Self {
        self.mask(shape)
    }

    pub fn mask_image(self, image_data: Vec<u8>) -> Self {
        self.mask(MaskSource::Image(image_data))
    }

    pub fn mask_size(mut self, size: u32) -> Self {
        self.mask_size = size.max(1);
        self
    }

    pub fn shrink_to_fit(mut self, enabled: bool) -> Self {
        self.shrink_to_fit = enabled;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
