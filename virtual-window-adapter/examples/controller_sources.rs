use std::cell::RefCell;
use std::rc::Rc;

use virtual_window::{EngineOptions, NullSlots};
use virtual_window_adapter::{
    Controller, ResizeSource, ScrollSource, Source, SubscriptionId,
};

// Example: a controller wired to a simulated host container.
//
// A real adapter forwards its toolkit's scroll and resize notifications to
// `on_scroll_event` / `on_resize_event`, renders the returned window, then calls
// `recheck_sizes` with the measured row extents.

#[derive(Default)]
struct Host {
    offset: f64,
    extent: f64,
    scroll_extent: f64,
    listeners: usize,
}

#[derive(Clone, Default)]
struct SharedHost(Rc<RefCell<Host>>);

impl Source for SharedHost {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut host = self.0.borrow_mut();
        host.listeners += 1;
        SubscriptionId(host.listeners as u64)
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        self.0.borrow_mut().listeners -= 1;
    }
}

impl ScrollSource for SharedHost {
    fn scroll_offset(&self) -> f64 {
        self.0.borrow().offset
    }

    fn set_scroll_offset(&mut self, real_offset: f64) {
        println!("  host scrollbar -> {real_offset}");
        self.0.borrow_mut().offset = real_offset;
    }

    fn set_scroll_extent(&mut self, real_total: f64) {
        self.0.borrow_mut().scroll_extent = real_total;
    }
}

impl ResizeSource for SharedHost {
    fn container_extent(&self) -> Option<f64> {
        Some(self.0.borrow().extent)
    }
}

fn main() {
    let host = SharedHost::default();
    host.0.borrow_mut().extent = 400.0;

    let mut c: Controller = Controller::new(
        EngineOptions::new(10_000, None, Some(40.0)),
        NullSlots,
        Some(Box::new(host.clone())),
        Some(Box::new(host.clone())),
    );
    println!(
        "listeners={} scroll_extent={} window={:?}",
        host.0.borrow().listeners,
        host.0.borrow().scroll_extent,
        c.window()
    );

    // The user drags the scrollbar.
    host.0.borrow_mut().offset = 12_345.0;
    println!("scrolled: window={:?}", c.on_scroll_event());

    // Every third row renders taller than estimated.
    c.recheck_sizes(|i| Some(if i % 3 == 0 { 56.0 } else { 40.0 }));
    println!(
        "rechecked: window={:?} scroll_extent={}",
        c.window(),
        host.0.borrow().scroll_extent
    );

    // Programmatic navigation moves the host scrollbar; its echo is ignored.
    c.scroll_to_index(5_000);
    println!("scroll_to_index: window={:?}", c.on_scroll_event());

    // The container is resized.
    host.0.borrow_mut().extent = 800.0;
    println!("resized: window={:?}", c.on_resize_event());

    drop(c);
    println!("listeners after drop={}", host.0.borrow().listeners);
}
