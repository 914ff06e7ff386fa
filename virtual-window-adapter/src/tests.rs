use crate::*;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use std::collections::HashMap;

use virtual_window::{Engine, EngineOptions, NullSlots, SyncGroup, SyncPolicy, Window};

#[derive(Debug, Default)]
struct HostState {
    next_id: u64,
    subscribed: Vec<SubscriptionId>,
    offset: f64,
    extent: Option<f64>,
    scroll_extent: f64,
    moves: Vec<f64>,
}

/// A fake host container acting as both scrollbar and resize source.
#[derive(Clone, Debug, Default)]
struct FakeHost(Rc<RefCell<HostState>>);

impl FakeHost {
    fn new(extent: Option<f64>) -> Self {
        let host = Self::default();
        host.0.borrow_mut().extent = extent;
        host
    }
}

impl Source for FakeHost {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut s = self.0.borrow_mut();
        let id = SubscriptionId(s.next_id);
        s.next_id += 1;
        s.subscribed.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.0.borrow_mut().subscribed.retain(|&s| s != id);
    }
}

impl ScrollSource for FakeHost {
    fn scroll_offset(&self) -> f64 {
        self.0.borrow().offset
    }

    fn set_scroll_offset(&mut self, real_offset: f64) {
        let mut s = self.0.borrow_mut();
        s.offset = real_offset;
        s.moves.push(real_offset);
    }

    fn set_scroll_extent(&mut self, real_total: f64) {
        self.0.borrow_mut().scroll_extent = real_total;
    }
}

impl ResizeSource for FakeHost {
    fn container_extent(&self) -> Option<f64> {
        self.0.borrow().extent
    }
}

fn controller(host: &FakeHost, options: EngineOptions) -> Controller {
    Controller::new(
        options,
        NullSlots,
        Some(Box::new(host.clone())),
        Some(Box::new(host.clone())),
    )
}

#[test]
fn anchor_can_preserve_scroll_across_prepend() {
    let mut v1 = Engine::headless(EngineOptions::new_with_key(
        100,
        Some(100.0),
        Some(10.0),
        |i| 1000u64 + i as u64,
    ));
    v1.on_scroll(505.0);

    let anchor = capture_first_visible_anchor(&v1).unwrap();
    assert_eq!(anchor.key, 1050);
    assert_eq!(anchor.offset_in_viewport, 5.0);

    // Prepend 10 items: old items shift by +10 indexes.
    let mut v2 = Engine::headless(EngineOptions::new_with_key(
        110,
        Some(100.0),
        Some(10.0),
        |i| {
            if i < 10 {
                2000u64 + i as u64
            } else {
                1000u64 + (i - 10) as u64
            }
        },
    ));
    v2.on_scroll(505.0);

    let mut map = HashMap::<u64, usize>::new();
    for i in 0..110usize {
        map.insert(v2.key_for(i), i);
    }

    assert!(apply_anchor(&mut v2, &anchor, |k| map.get(k).copied()));
    assert_eq!(v2.virtual_offset(), 605.0);
    assert_eq!(v2.visible_range().start_index, 60);

    // Unknown keys leave the position alone.
    let lost = ScrollAnchor {
        key: 7u64,
        offset_in_viewport: 0.0,
    };
    assert!(!apply_anchor(&mut v2, &lost, |k| map.get(k).copied()));
    assert_eq!(v2.virtual_offset(), 605.0);
}

#[test]
fn controller_subscribes_for_its_lifetime() {
    let host = FakeHost::new(Some(400.0));
    let mut c = controller(&host, EngineOptions::new(1000, None, Some(40.0)));
    assert!(!c.is_static());
    assert_eq!(host.0.borrow().subscribed.len(), 2);
    assert_eq!(host.0.borrow().scroll_extent, 40_000.0);
    assert_eq!(c.window(), Window::new(0, 10));

    c.dispose();
    assert!(host.0.borrow().subscribed.is_empty());
    assert!(c.engine().is_disposed());

    let c = controller(&host, EngineOptions::new(10, None, Some(40.0)));
    assert_eq!(host.0.borrow().subscribed.len(), 2);
    drop(c);
    assert!(host.0.borrow().subscribed.is_empty());
}

#[test]
fn controller_without_sources_renders_everything() {
    let host = FakeHost::new(Some(400.0));
    let mut c: Controller = Controller::new(
        EngineOptions::new(30, Some(400.0), Some(40.0)),
        NullSlots,
        Some(Box::new(host.clone())),
        None,
    );
    assert!(c.is_static());
    assert_eq!(c.window(), Window::new(0, 30));
    assert_eq!(c.on_resize_event(), Window::new(0, 30));
    // Only the scroll source was subscribed.
    assert_eq!(host.0.borrow().subscribed.len(), 1);
}

#[test]
fn controller_follows_scroll_and_resize_events() {
    let host = FakeHost::new(Some(400.0));
    let mut c = controller(&host, EngineOptions::new(1000, None, Some(40.0)));

    host.0.borrow_mut().offset = 2000.0;
    assert_eq!(c.on_scroll_event(), Window::new(50, 10));

    host.0.borrow_mut().extent = Some(800.0);
    assert_eq!(c.on_resize_event(), Window::new(50, 20));
}

#[test]
fn controller_pushes_programmatic_scrolls_to_the_scrollbar() {
    let host = FakeHost::new(Some(400.0));
    let mut c = controller(
        &host,
        EngineOptions::new(1_000_000, None, Some(40.0)).with_platform_max(10_000_000.0),
    );
    assert_eq!(host.0.borrow().scroll_extent, 10_000_000.0);

    let window = c.scroll_to_index(900_000);
    assert!(window.contains(900_000));
    assert_eq!(host.0.borrow().moves, [8_999_910.0]);

    // The echo arrives as a scroll event and changes nothing.
    assert_eq!(c.on_scroll_event(), window);
    assert!(!c.engine().is_programmatic_scroll_pending());
    assert_eq!(host.0.borrow().moves.len(), 1);
}

#[test]
fn recheck_sizes_reports_changed_extents_once() {
    let host = FakeHost::new(Some(400.0));
    let mut c = controller(&host, EngineOptions::new(1000, None, Some(40.0)));

    let mut measured = Vec::new();
    let changed = c.recheck_sizes(|i| {
        measured.push(i);
        Some(if i == 4 { 60.0 } else { 40.0 })
    });
    assert!(changed);
    assert_eq!(measured, (0..10).collect::<Vec<_>>());
    assert_eq!(c.engine().total_size(), 40_020.0);
    assert_eq!(c.window().start_index, 0);
    assert_eq!(host.0.borrow().scroll_extent, 40_020.0);

    // Nothing differs the second time.
    assert!(!c.recheck_sizes(|i| Some(if i == 4 { 60.0 } else { 40.0 })));
}

#[test]
fn controller_anchor_at_offset_in_viewport() {
    let host = FakeHost::new(Some(100.0));
    let mut c = controller(&host, EngineOptions::new(100, None, Some(10.0)));
    c.on_scroll(505.0);

    let anchor = c.capture_anchor_at_offset_in_viewport(20.0).unwrap();
    assert_eq!(anchor.key, 52);
    assert_eq!(anchor.offset_in_viewport, -15.0);

    // Drop the first 20 items; the anchored item moves to index 32.
    c.replace_data(80);
    c.engine_mut().set_track_by(|i| i as u64 + 20);
    assert!(c.apply_anchor(&anchor, |k| k.checked_sub(20).map(|i| i as usize)));
    assert_eq!(c.engine().virtual_offset(), 305.0);
    assert_eq!(host.0.borrow().offset, 305.0);
}

#[test]
fn synced_controllers_share_the_axis() {
    let group = SyncGroup::new();
    let host = FakeHost::new(Some(480.0));
    let options = EngineOptions::new(1000, None, Some(40.0)).with_sync_policy(SyncPolicy::Shared);
    let mut master = Controller::new_synced(
        options.clone(),
        NullSlots,
        Some(Box::new(host.clone())),
        Some(Box::new(host.clone())),
        &group,
    );
    let side = FakeHost::new(Some(480.0));
    let mut slave = Controller::new_synced(
        options,
        NullSlots,
        Some(Box::new(side.clone())),
        Some(Box::new(side.clone())),
        &group,
    );
    assert!(master.engine().is_master());
    assert_eq!(slave.engine().chunk_size_for(480.0), 12);

    host.0.borrow_mut().offset = 400.0;
    master.on_scroll_event();
    assert_eq!(slave.follow_master(), Window::new(10, 12));
    assert_eq!(slave.engine().virtual_offset(), 400.0);
}

#[test]
fn shrinking_a_remote_collection_moves_the_scrollbar() {
    let host = FakeHost::new(Some(400.0));
    let mut c = controller(
        &host,
        EngineOptions::new(50, None, Some(40.0)).with_total_item_count(Some(1000)),
    );
    host.0.borrow_mut().offset = 39_600.0;
    assert_eq!(c.on_scroll_event(), Window::new(990, 10));

    assert_eq!(c.set_total_item_count(Some(100)), Window::new(90, 10));
    assert_eq!(host.0.borrow().moves, [3_600.0]);
    assert_eq!(host.0.borrow().scroll_extent, 4_000.0);

    assert_eq!(c.on_scroll_event(), Window::new(90, 10));
    assert!(!c.engine().is_programmatic_scroll_pending());
}
