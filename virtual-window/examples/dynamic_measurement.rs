// Example: reporting measured extents inside and outside the window.
use virtual_window::{Engine, EngineOptions};

fn main() {
    let mut engine = Engine::headless(EngineOptions::new(100, Some(30.0), Some(10.0)));
    engine.on_scroll(200.0);
    println!(
        "before: window={:?} total={}",
        engine.window(),
        engine.total_size()
    );

    // Inside the window: applied right away and the window is recomputed.
    engine.report_measured_extent(21, 25.0);
    println!(
        "measured 21: window={:?} total={}",
        engine.window(),
        engine.total_size()
    );

    // Outside the window: kept until the item scrolls into view.
    engine.report_measured_extent(80, 50.0);
    println!(
        "measured 80: deferred={} total={}",
        engine.deferred_len(),
        engine.total_size()
    );

    engine.on_scroll(790.0);
    println!(
        "after scroll: deferred={} total={} extent_at(80)={}",
        engine.deferred_len(),
        engine.total_size(),
        engine.extent_at(80)
    );
}
