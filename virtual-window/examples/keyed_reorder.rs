// Example: measurements follow `track_by` keys across a reorder.
use virtual_window::{Engine, EngineOptions};

fn main() {
    let mut engine = Engine::headless(EngineOptions::new_with_key(
        5,
        Some(100.0),
        Some(10.0),
        |i| ["a", "b", "c", "d", "e"][i],
    ));
    engine.report_measured_extent(1, 30.0);
    println!(
        "before: key(1)={} extent(1)={} extent(3)={}",
        engine.key_for(1),
        engine.extent_at(1),
        engine.extent_at(3)
    );

    // "b" moves to index 3.
    engine.set_track_by(|i| ["a", "c", "d", "b", "e"][i]);
    println!(
        "after: key(3)={} extent(1)={} extent(3)={}",
        engine.key_for(3),
        engine.extent_at(1),
        engine.extent_at(3)
    );
}
