// Example: a remote collection that loads pages on `Preload` events.
use std::sync::{Arc, Mutex};

use virtual_window::{Engine, EngineEvent, EngineOptions};

fn main() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requests);

    // 50 rows are loaded; the server reports 1M in total.
    let options = EngineOptions::new(50, Some(400.0), Some(40.0))
        .with_total_item_count(Some(1_000_000))
        .with_on_event(Some(move |event: &EngineEvent| {
            if let EngineEvent::Preload {
                start_index,
                chunk_size,
            } = *event
            {
                sink.lock().unwrap().push(start_index..start_index + chunk_size);
            }
        }));
    let mut engine = Engine::headless(options);
    println!(
        "count={} materialized={} total_size={}",
        engine.count(),
        engine.materialized_count(),
        engine.total_size()
    );

    engine.scroll_to_index(900_000);
    engine.on_scroll(20_000_000.0);
    for range in requests.lock().unwrap().drain(..) {
        println!("fetch {range:?}");
    }

    // The server shrinks the collection; the window is pulled back inside it.
    let window = engine.set_total_item_count(Some(100));
    println!("after shrink: window={window:?}");
}
