// Example: export and import the measurement cache.
use virtual_window::{Engine, EngineOptions};

fn main() {
    // Persisting measurements (key -> measured extent) lets a new engine start with exact
    // extents instead of estimates.
    let mut v1 = Engine::headless(EngineOptions::new(10, Some(100.0), Some(10.0)));
    v1.report_measured_extent(2, 12.0);
    v1.report_measured_extent(5, 42.0);

    let snapshot = v1.export_measurement_cache();
    println!("exported_cache_len={}", snapshot.len());

    let mut v2 = Engine::headless(EngineOptions::new(10, Some(100.0), Some(10.0)));
    println!(
        "before import: extent2={} extent5={}",
        v2.extent_at(2),
        v2.extent_at(5)
    );

    v2.import_measurement_cache(snapshot);
    println!(
        "after import: cache_len={} extent2={} extent5={} total={}",
        v2.measurement_cache_len(),
        v2.extent_at(2),
        v2.extent_at(5),
        v2.total_size()
    );
}
