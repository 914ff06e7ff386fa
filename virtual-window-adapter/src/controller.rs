use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use virtual_window::{
    Engine, EngineOptions, ItemKey, NullSlots, SlotProvider, SyncGroup, TrackKey, Window,
};

use crate::{
    ResizeSource, ScrollAnchor, ScrollSource, Subscription, apply_anchor,
    capture_first_visible_anchor,
};

/// A framework-neutral controller that wraps a [`virtual_window::Engine`] and wires it to the
/// host.
///
/// This type does not hold any UI objects. It owns:
/// - a subscription to the host scrollbar and one to the viewport resize source, both
///   released on [`Self::dispose`] or drop
/// - the engine, which it keeps in step with the scrollbar: programmatic scrolls and
///   scrollable-extent changes are pushed to the [`ScrollSource`]
///
/// Without a scroll source or a resize source there is nothing to window against, and the
/// engine runs in static mode (every item rendered).
///
/// Adapters drive it by calling:
/// - `on_scroll_event` / `on_resize_event` when the subscribed sources fire
/// - `recheck_sizes` after rendering, with the host's measured item extents
pub struct Controller<K = ItemKey, P: SlotProvider = NullSlots> {
    engine: Engine<K, P>,
    scroll: Option<Subscription<dyn ScrollSource>>,
    resize: Option<Subscription<dyn ResizeSource>>,
    // Last scrollable extent pushed to the scroll source.
    real_total: Option<f64>,
}

impl<K: TrackKey, P: SlotProvider> Controller<K, P> {
    pub fn new(
        options: EngineOptions<K>,
        provider: P,
        scroll: Option<Box<dyn ScrollSource>>,
        resize: Option<Box<dyn ResizeSource>>,
    ) -> Self {
        Self::build(options, provider, scroll, resize, None)
    }

    /// Like [`Self::new`], with the engine registered in `group`.
    pub fn new_synced(
        options: EngineOptions<K>,
        provider: P,
        scroll: Option<Box<dyn ScrollSource>>,
        resize: Option<Box<dyn ResizeSource>>,
        group: &SyncGroup,
    ) -> Self {
        Self::build(options, provider, scroll, resize, Some(group))
    }

    fn build(
        mut options: EngineOptions<K>,
        provider: P,
        scroll: Option<Box<dyn ScrollSource>>,
        resize: Option<Box<dyn ResizeSource>>,
        group: Option<&SyncGroup>,
    ) -> Self {
        let scroll = scroll.map(Subscription::new);
        let resize = resize.map(Subscription::new);
        options.container_extent = match (&scroll, &resize) {
            (Some(_), Some(resize)) => resize.source().container_extent(),
            _ => None,
        };
        let engine = match group {
            Some(group) => Engine::new_synced(options, provider, group),
            None => Engine::new(options, provider),
        };
        let mut c = Self {
            engine,
            scroll,
            resize,
            real_total: None,
        };
        c.sync_scrollbar();
        c
    }

    pub fn engine(&self) -> &Engine<K, P> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<K, P> {
        &mut self.engine
    }

    /// Releases the subscriptions and returns the engine.
    pub fn into_engine(self) -> Engine<K, P> {
        self.engine
    }

    /// Whether the engine renders every item because a source is missing.
    pub fn is_static(&self) -> bool {
        self.scroll.is_none() || self.resize.is_none()
    }

    pub fn window(&self) -> Window {
        self.engine.window()
    }

    fn sync_scrollbar(&mut self) {
        let Some(scroll) = &mut self.scroll else {
            return;
        };
        let real_total = self.engine.real_total();
        if self.real_total != Some(real_total) {
            scroll.source_mut().set_scroll_extent(real_total);
            self.real_total = Some(real_total);
        }
        if self.engine.is_programmatic_scroll_pending() {
            let target = self.engine.real_offset();
            if scroll.source().scroll_offset() != target {
                scroll.source_mut().set_scroll_offset(target);
            }
        }
    }

    /// Call this when the scroll source fires.
    pub fn on_scroll_event(&mut self) -> Window {
        let Some(scroll) = &self.scroll else {
            return self.engine.window();
        };
        let real_offset = scroll.source().scroll_offset();
        self.on_scroll(real_offset)
    }

    /// Handles a scroll to `real_offset` (scrollbar units).
    pub fn on_scroll(&mut self, real_offset: f64) -> Window {
        let window = self.engine.on_scroll(real_offset);
        self.sync_scrollbar();
        window
    }

    /// Call this when the resize source fires.
    pub fn on_resize_event(&mut self) -> Window {
        let (Some(_), Some(resize)) = (&self.scroll, &self.resize) else {
            return self.engine.window();
        };
        let extent = resize.source().container_extent();
        let window = self.engine.set_container_extent(extent);
        self.sync_scrollbar();
        window
    }

    /// Mirrors the master of the engine's sync group.
    pub fn follow_master(&mut self) -> Window {
        let window = self.engine.follow_master();
        self.sync_scrollbar();
        window
    }

    pub fn replace_data(&mut self, count: usize) -> Window {
        let window = self.engine.replace_data(count);
        self.sync_scrollbar();
        window
    }

    pub fn set_total_item_count(&mut self, total_item_count: Option<usize>) -> Window {
        let window = self.engine.set_total_item_count(total_item_count);
        self.sync_scrollbar();
        window
    }

    /// Runs the size-recheck pass over the rendered window.
    ///
    /// `measure` returns the host's measured extent of a rendered index, or `None` when it is
    /// not laid out yet. Extents that differ from the cache are reported in one batch, so the
    /// engine re-applies the window at most once. Returns whether any extent changed.
    pub fn recheck_sizes(&mut self, mut measure: impl FnMut(usize) -> Option<f64>) -> bool {
        let window = self.engine.window();
        let mut changed = Vec::new();
        for index in window.start_index..window.end_index() {
            if let Some(extent) = measure(index) {
                if extent != self.engine.extent_at(index) {
                    changed.push((index, extent));
                }
            }
        }
        if changed.is_empty() {
            return false;
        }
        let patched = self.engine.report_measured_extents(changed);
        self.sync_scrollbar();
        patched
    }

    /// Scrolls to a virtual offset and moves the scrollbar if needed.
    pub fn scroll_to(&mut self, virtual_offset: f64) -> Window {
        self.engine.scroll_to(virtual_offset);
        self.sync_scrollbar();
        self.engine.window()
    }

    /// Brings `index` fully into view.
    pub fn scroll_to_index(&mut self, index: usize) -> Window {
        self.engine.scroll_to_index(index);
        self.sync_scrollbar();
        self.engine.window()
    }

    pub fn scroll_next(&mut self) -> Window {
        self.engine.scroll_next();
        self.sync_scrollbar();
        self.engine.window()
    }

    pub fn scroll_prev(&mut self) -> Window {
        self.engine.scroll_prev();
        self.sync_scrollbar();
        self.engine.window()
    }

    pub fn scroll_next_page(&mut self) -> Window {
        self.engine.scroll_next_page();
        self.sync_scrollbar();
        self.engine.window()
    }

    pub fn scroll_prev_page(&mut self) -> Window {
        self.engine.scroll_prev_page();
        self.sync_scrollbar();
        self.engine.window()
    }

    pub fn capture_first_visible_anchor(&self) -> Option<ScrollAnchor<K>> {
        capture_first_visible_anchor(&self.engine)
    }

    /// Captures an anchor for the item at a given offset in the viewport.
    ///
    /// For example, `offset_in_viewport = 0.0` anchors the item at the top of the viewport.
    pub fn capture_anchor_at_offset_in_viewport(
        &self,
        offset_in_viewport: f64,
    ) -> Option<ScrollAnchor<K>> {
        if self.engine.count() == 0 {
            return None;
        }
        let top = self.engine.virtual_offset();
        let index = self.engine.index_at(top + offset_in_viewport);
        Some(ScrollAnchor {
            key: self.engine.key_for(index),
            offset_in_viewport: top - self.engine.offset_of(index),
        })
    }

    /// Applies a previously captured anchor and moves the scrollbar if needed.
    pub fn apply_anchor(
        &mut self,
        anchor: &ScrollAnchor<K>,
        key_to_index: impl FnMut(&K) -> Option<usize>,
    ) -> bool {
        let applied = apply_anchor(&mut self.engine, anchor, key_to_index);
        self.sync_scrollbar();
        applied
    }

    /// Releases both subscriptions and disposes the engine. Later events are ignored.
    pub fn dispose(&mut self) {
        self.scroll = None;
        self.resize = None;
        self.engine.dispose();
    }
}

impl<K, P: SlotProvider + fmt::Debug> fmt::Debug for Controller<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("engine", &self.engine)
            .field("scroll", &self.scroll)
            .field("resize", &self.resize)
            .finish()
    }
}
