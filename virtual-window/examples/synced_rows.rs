// Example: two lists sharing one scroll axis (e.g. a frozen column beside a table body).
use virtual_window::{Engine, EngineOptions, NullSlots, SyncGroup, SyncPolicy};

fn main() {
    let group = SyncGroup::new();
    let options =
        EngineOptions::new(1000, Some(480.0), Some(40.0)).with_sync_policy(SyncPolicy::Shared);

    let mut body = Engine::new_synced(options.clone(), NullSlots, &group);
    let mut frozen = Engine::new_synced(options, NullSlots, &group);
    println!("body={:?} frozen={:?}", body.role(), frozen.role());

    body.on_scroll(400.0);
    println!(
        "body={:?} frozen={:?}",
        body.window(),
        frozen.follow_master()
    );

    // A taller row measured in the frozen column grows the shared axis.
    frozen.report_measured_extent(12, 80.0);
    body.apply_reported_extents();
    println!(
        "after report: total={} frozen={:?}",
        body.total_size(),
        frozen.follow_master()
    );

    // Dropping the master hands the axis to the remaining engine.
    drop(body);
    frozen.follow_master();
    println!("frozen is now {:?}", frozen.role());
}
