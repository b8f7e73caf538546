use araea_wordcloud_layout::{generate, ImageFormat};
use std::fs;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let start = Instant::now();

    let words = vec![
        ("Rust", 100.0),
        ("Performance", 80.0),
        ("Safety", 70.0),
        ("Concurrency", 60.0),
        ("Fast", 50.0),
        ("Memory", 45.0),
        ("Efficient", 40.0),
        ("Reliable", 35.0),
        ("Community", 30.0),
        ("Cargo", 25.0),
        ("Crates", 20.0),
        ("Macro", 15.0),
    ];

    println!("Laying out {} words...", words.len());

    let engine = generate(&words)?;

    fs::write("output_simple.png", engine.export_image(ImageFormat::Png)?)?;
    fs::write("output_simple.svg", engine.export_image(ImageFormat::Svg)?)?;

    println!(
        "Done! {} words placed, saved to output_simple.png and output_simple.svg",
        engine.placed().len()
    );
    println!("Time elapsed: {:?}", start.elapsed());

    Ok(())
}
