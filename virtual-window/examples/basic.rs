// Example: minimal usage, scrolling and scroll-to-index on a huge list.
use virtual_window::{Engine, EngineOptions};

fn main() {
    // 1M rows of 40px in a 400px viewport; the host scrollbar tops out at 10M px.
    let options =
        EngineOptions::new(1_000_000, Some(400.0), Some(40.0)).with_platform_max(10_000_000.0);
    let mut engine = Engine::headless(options);
    println!(
        "total_size={} real_total={} window={:?}",
        engine.total_size(),
        engine.real_total(),
        engine.window()
    );

    let window = engine.on_scroll(123_456.0);
    let mut items = Vec::new();
    engine.collect_virtual_items(&mut items);
    println!("window={window:?} first_item={:?}", items.first());
    println!("translation={}", engine.content_translation());

    // The adapter moves its scrollbar to the returned real offset.
    if let Some(real) = engine.scroll_to_index(999_999) {
        println!(
            "scroll_to_index: real={real} virtual={} window={:?}",
            engine.virtual_offset(),
            engine.window()
        );
        // The echo from the scrollbar is recognised and ignored.
        engine.on_scroll(real);
    }
}
