//! 模拟指针事件：悬停显示提示，点击触发回调

use araea_wordcloud_layout::{
    LayoutConfig, LayoutEngine, PointerEvent, PointerResponse, WordItem,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut engine = LayoutEngine::new(LayoutConfig::new().size(500, 300).seed(1));
    engine.on_word_placed(|item| println!("placed {:>12} at {:?}", item.text, item.center));
    engine.on_click(|item, event| println!("clicked {} at ({}, {})", item.text, event.x, event.y));
    engine.tooltip(|item| format!("{} (weight {:.0}, {:.0}px)", item.text, item.weight, item.font_size));

    let report = engine.set_words([
        WordItem::new("hover", 10.0),
        WordItem::new("click", 8.0),
        WordItem::new("tooltip", 6.0),
        WordItem::new("pointer", 4.0),
    ])?;
    println!("{report:?}");

    // 沿水平中线扫描
    for x in (0..500).step_by(25) {
        if let Some(PointerResponse::Hover { tooltip, .. }) =
            engine.handle_pointer(PointerEvent::moved(x as f32, 150.0))
        {
            println!("x={x:>3}: {tooltip}");
        }
    }

    let centers: Vec<_> = engine.placed().iter().map(|p| p.center).collect();
    for (x, y) in centers {
        engine.handle_pointer(PointerEvent::click(x, y));
    }

    engine.destroy();
    Ok(())
}
