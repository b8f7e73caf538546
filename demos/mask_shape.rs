use araea_wordcloud_layout::{ColorScheme, LayoutConfig, LayoutEngine, MaskShape, WordItem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut words = Vec::new();
    for i in 0..60 {
        words.push(WordItem::new("Love", 100.0));
        words.push(WordItem::new("Rust", 80.0));
        words.push(WordItem::new("Heart", 60.0 + (i as f32 % 40.0)));
        words.push(WordItem::new("Mask", 40.0));
    }

    for shape in [MaskShape::Heart, MaskShape::Star, MaskShape::Cloud, MaskShape::Glyph('R')] {
        let config = LayoutConfig::new()
            .size(800, 800)
            .mask_preset(shape)
            .color_scheme(ColorScheme::Berry)
            .font_size_range(10.0, 80.0)
            .angles(vec![0.0, -90.0])
            .seed(7);

        let mut engine = LayoutEngine::new(config);
        let report = engine.set_words(words.clone())?;

        let name = format!("output_mask_{shape:?}.png").to_lowercase().replace(['(', ')', '\''], "");
        engine.download(&name)?;
        println!(
            "{shape:?}: placed {}, dropped {} -> {name}",
            report.placed, report.dropped
        );
    }

    Ok(())
}
