use virtual_window::{Engine, EngineOptions};
use virtual_window_adapter::{apply_anchor, capture_first_visible_anchor};

fn main() {
    // Example: preserve visual scroll position across "prepend" (chat/timeline load older messages).
    //
    // The adapter flow is typically:
    // 1) capture an anchor (key + offset_in_viewport) before data changes
    // 2) apply data changes (count/key mapping)
    // 3) apply the anchor so the same item stays in the same place
    let mut engine = Engine::headless(EngineOptions::new_with_key(
        100,
        Some(100.0),
        Some(10.0),
        |i| 1000u64 + i as u64,
    ));
    engine.on_scroll(505.0);

    let anchor =
        capture_first_visible_anchor(&engine).expect("visible range must not be empty");
    println!(
        "before prepend: off={} anchor={anchor:?}",
        engine.virtual_offset()
    );

    // Prepend 10 items; old items shift by +10 indexes.
    engine.replace_data(110);
    engine.set_track_by(|i| {
        if i < 10 {
            2000u64 + i as u64
        } else {
            1000u64 + (i - 10) as u64
        }
    });

    // Provide a key -> index mapping for the current dataset (owned by your adapter).
    let ok = apply_anchor(&mut engine, &anchor, |k| {
        if (1000..1100).contains(k) {
            Some((*k as usize - 1000) + 10)
        } else if (2000..2010).contains(k) {
            Some(*k as usize - 2000)
        } else {
            None
        }
    });

    println!(
        "after prepend: ok={ok} off={} window={:?}",
        engine.virtual_offset(),
        engine.window()
    );
}
