use araea_wordcloud_layout::{LayoutConfig, LayoutEngine, Rgba, WordItem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let words = vec![
        WordItem::new("Custom", 90.0).with_color(Rgba::rgb(255, 255, 255)),
        WordItem::new("Colors", 80.0),
        WordItem::new("Seed", 70.0),
        WordItem::new("Fixed", 60.0),
        WordItem::new("Layout", 50.0),
    ];

    let config = LayoutConfig::new()
        .size(600, 400)
        .background("#1a1a1a".parse()?)
        .colors(
            ["#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#00FFFF"]
                .iter()
                .filter_map(|c| Rgba::from_hex(c)),
        )
        .seed(42)
        .grid_cell_size(2)
        .font_size_range(20.0, 100.0);

    let mut engine = LayoutEngine::new(config);
    engine.set_words(words)?;
    engine.download("output_advanced.png")?;
    engine.download("output_advanced.jpg")?;
    println!("Generated output_advanced.png and output_advanced.jpg");

    Ok(())
}
