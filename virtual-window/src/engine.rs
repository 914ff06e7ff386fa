use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::extent::sanitize_extent;
use crate::key::{KeyExtentMap, TrackKey};
use crate::{
    AxisSnapshot, EngineEvent, EngineOptions, ExtentCache, FrameState, ItemKey, MemberId,
    NullSlots, RecyclingUpdater, RemoteCount, ScrollDirection, ScrollSpaceMapper, ScrollState,
    SlotProvider, SyncGroup, SyncPolicy, VirtualItem, Window, WindowCalculator,
};

/// How an engine currently relates to its [`SyncGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Standalone,
    /// Owns the authoritative extent cache and scroll state of its axis.
    Master,
    /// Mirrors the master of its axis.
    Slave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    /// Scrolling: the chunk size never shrinks, so a stable pool keeps moving incrementally.
    Scroll,
    /// Extents or viewport changed: the chunk size is recomputed from scratch.
    Recalc,
    /// Like `Recalc`, and every slot is rebound because the data behind the indexes changed.
    Rebind,
}

#[derive(Clone, Debug)]
struct Membership {
    group: SyncGroup,
    member: MemberId,
}

/// A windowing engine for one scroll axis.
///
/// The engine keeps the extent cache, maps the host scrollbar onto the virtual content,
/// decides which contiguous window of items is materialized and drives a [`SlotProvider`] to
/// show it. It never touches UI objects itself: the caller feeds it scroll offsets, viewport
/// extents and measured item extents, and reacts to [`EngineEvent`]s.
///
/// Engines are single-threaded. Every method runs one event to completion; events are
/// surfaced through `options.on_event` before the method returns.
pub struct Engine<K = ItemKey, P: SlotProvider = NullSlots> {
    options: EngineOptions<K>,
    materialized: usize,
    cache: Arc<ExtentCache>,
    mapper: ScrollSpaceMapper,
    window: Window,
    chunk_size: usize,
    recycler: RecyclingUpdater<P>,
    remote: RemoteCount,
    key_extents: KeyExtentMap<K>,
    // Measurements for items outside the window, applied once the item enters it.
    deferred: BTreeMap<usize, f64>,
    sync: Option<Membership>,
    was_master: bool,
    scroll_direction: Option<ScrollDirection>,
    scrollbar_visible: bool,
    disposed: bool,
}

impl<K: TrackKey> Engine<K, NullSlots> {
    /// An engine without render slots, for hosts that only read windows and events.
    pub fn headless(options: EngineOptions<K>) -> Self {
        Self::new(options, NullSlots)
    }
}

impl<K: TrackKey, P: SlotProvider> Engine<K, P> {
    /// Creates a stand-alone engine and computes its first window.
    pub fn new(options: EngineOptions<K>, provider: P) -> Self {
        Self::build(options, provider, None)
    }

    /// Creates an engine registered in `group` on `options.orientation`.
    ///
    /// The first engine with data becomes the master of the axis. With
    /// [`SyncPolicy::None`] the group is ignored.
    pub fn new_synced(options: EngineOptions<K>, provider: P, group: &SyncGroup) -> Self {
        Self::build(options, provider, Some(group.clone()))
    }

    fn build(options: EngineOptions<K>, provider: P, group: Option<SyncGroup>) -> Self {
        let mapper = ScrollSpaceMapper::from_limits(options.platform.as_ref());
        let recycler = RecyclingUpdater::with_threshold(provider, options.small_delta_threshold);
        let sync = match (group, options.sync_policy) {
            (Some(group), SyncPolicy::Shared | SyncPolicy::UniqueCache) => {
                let member = group.join(options.orientation);
                Some(Membership { group, member })
            }
            _ => None,
        };
        vdebug!(
            count = options.count,
            total_item_count = ?options.total_item_count,
            container_extent = ?options.container_extent,
            sync_policy = ?options.sync_policy,
            "Engine::new"
        );
        let mut engine = Self {
            materialized: options.count,
            cache: Arc::new(ExtentCache::new()),
            mapper,
            window: Window::EMPTY,
            chunk_size: 0,
            recycler,
            remote: RemoteCount::new(options.total_item_count),
            key_extents: KeyExtentMap::default(),
            deferred: BTreeMap::new(),
            sync,
            was_master: false,
            scroll_direction: None,
            scrollbar_visible: false,
            disposed: false,
            options,
        };
        engine.claim_on_data();
        engine.was_master = engine.role() == Role::Master;
        engine.rebuild_cache();
        engine.relayout(Pass::Recalc);
        engine
    }

    pub fn options(&self) -> &EngineOptions<K> {
        &self.options
    }

    // ----- sync roles -----

    pub fn role(&self) -> Role {
        match &self.sync {
            None => Role::Standalone,
            Some(m) if m.group.is_master(m.member) => Role::Master,
            Some(_) => Role::Slave,
        }
    }

    pub fn is_master(&self) -> bool {
        self.role() == Role::Master
    }

    /// This engine's id in its sync group.
    pub fn member(&self) -> Option<MemberId> {
        self.sync.as_ref().map(|m| m.member)
    }

    /// The sync group this engine belongs to.
    pub fn sync_group(&self) -> Option<&SyncGroup> {
        self.sync.as_ref().map(|m| &m.group)
    }

    fn uses_shared_cache(&self) -> bool {
        self.options.sync_policy == SyncPolicy::Shared && self.role() == Role::Slave
    }

    fn snapshot(&self) -> Option<AxisSnapshot> {
        let m = self.sync.as_ref()?;
        m.group.snapshot_for(m.member).ok()
    }

    // Shared slaves read the snapshot; so does a shared heir until it adopts it.
    fn reads_snapshot(&self) -> bool {
        if self.options.sync_policy != SyncPolicy::Shared {
            return false;
        }
        match self.role() {
            Role::Slave => true,
            Role::Master => !self.was_master,
            Role::Standalone => false,
        }
    }

    /// The extent cache windows are computed from: the master's for shared slaves, our own
    /// otherwise.
    fn active_cache(&self) -> Arc<ExtentCache> {
        if self.reads_snapshot() {
            if let Some(snapshot) = self.snapshot() {
                return snapshot.cache;
            }
        }
        Arc::clone(&self.cache)
    }

    // Picks up a mastership handed over by a departing master.
    fn refresh_role(&mut self) {
        let is_master = self.role() == Role::Master;
        if is_master && !self.was_master {
            vdebug!(member = ?self.member(), "Engine: promoted to master");
            match self.snapshot() {
                Some(snapshot) if self.options.sync_policy == SyncPolicy::Shared => {
                    self.cache = snapshot.cache;
                }
                _ => self.rebuild_cache(),
            }
            self.chunk_size = 0;
        }
        self.was_master = is_master;
    }

    // A member with data claims an axis that has no master; a member whose data went away
    // releases it.
    fn claim_on_data(&mut self) {
        let Some(m) = &self.sync else {
            return;
        };
        let has_data = self.remote.effective_count(self.materialized) > 0;
        if !has_data {
            if m.group.is_master(m.member) {
                m.group.reset_master(self.options.orientation);
            }
            return;
        }
        if let Err(_err) = m.group.set_master(m.member, false) {
            vwarn!(error = %_err, "Engine: failed to claim mastership");
        }
    }

    /// Claims mastership of the axis.
    ///
    /// With `reset` the claim succeeds even if another member is master; use it when the
    /// shared collection changed identity. Returns whether this engine is master afterwards.
    pub fn claim_master(&mut self, reset: bool) -> bool {
        if self.disposed {
            return false;
        }
        let Some(m) = &self.sync else {
            return false;
        };
        if let Err(_err) = m.group.set_master(m.member, reset) {
            vwarn!(error = %_err, "Engine::claim_master");
            return false;
        }
        self.refresh_role();
        self.relayout(Pass::Recalc);
        self.is_master()
    }

    /// Clears the master of this engine's axis so the next engine with data takes over.
    pub fn reset_master(&mut self) {
        if let Some(m) = &self.sync {
            m.group.reset_master(self.options.orientation);
        }
        self.was_master = false;
    }

    fn publish(&self) {
        let Some(m) = &self.sync else {
            return;
        };
        if !m.group.is_master(m.member) {
            return;
        }
        if let Err(_err) = m.group.publish(
            m.member,
            Arc::clone(&self.cache),
            self.chunk_size,
            self.window,
            self.mapper.state(),
        ) {
            vwarn!(error = %_err, "Engine: failed to publish axis state");
        }
    }

    /// Mirrors the master's latest published state.
    ///
    /// Shared slaves copy the master's window and scroll state as-is. Slaves with their own
    /// cache follow the master's virtual offset and compute their own window. Masters and
    /// stand-alone engines are unaffected.
    pub fn follow_master(&mut self) -> Window {
        if self.disposed {
            return self.window;
        }
        self.refresh_role();
        if self.role() != Role::Slave {
            return self.relayout(Pass::Scroll);
        }
        if self.options.sync_policy == SyncPolicy::Shared {
            return self.relayout(Pass::Recalc);
        }
        if let Some(snapshot) = self.snapshot() {
            let prev = self.mapper.virtual_offset();
            self.mapper.follow(snapshot.scroll.virtual_offset);
            self.note_direction(prev, self.mapper.virtual_offset());
        }
        self.relayout(Pass::Scroll)
    }

    /// Applies extents that slaves reported to this master. Returns whether any changed.
    pub fn apply_reported_extents(&mut self) -> bool {
        let Some(m) = &self.sync else {
            return false;
        };
        let Ok(reports) = m.group.take_reports(m.member) else {
            return false;
        };
        if reports.is_empty() {
            return false;
        }
        vtrace!(reports = reports.len(), "Engine::apply_reported_extents");
        self.patch_extents(reports)
    }

    // ----- window computation -----

    fn rebuild_cache(&mut self) {
        if self.uses_shared_cache() {
            self.cache = Arc::new(ExtentCache::new());
            return;
        }
        let count = self.remote.effective_count(self.materialized);
        let materialized = self.materialized;
        let options = &self.options;
        let keys = &self.key_extents;
        let cache = ExtentCache::from_fn(count, |i| {
            if i >= materialized {
                return options.default_extent();
            }
            keys.get(&(options.track_by)(i))
                .copied()
                .unwrap_or_else(|| options.estimated_extent(i))
        });
        self.cache = Arc::new(cache);
    }

    fn relayout(&mut self, pass: Pass) -> Window {
        if self.disposed {
            return self.window;
        }
        if self.uses_shared_cache() {
            return self.relayout_from_master(pass);
        }

        self.sync_extents(self.cache.total());
        let mut next = self.compute_window(pass);
        if self.flush_deferred(next) {
            self.sync_extents(self.cache.total());
            next = self.compute_window(Pass::Recalc);
        }
        self.apply_window(next, pass == Pass::Rebind);
        self.publish();
        next
    }

    fn relayout_from_master(&mut self, pass: Pass) -> Window {
        let Some(snapshot) = self.snapshot() else {
            // Nothing published yet: show nothing rather than guessing.
            self.sync_extents(0.0);
            self.apply_window(Window::EMPTY, pass == Pass::Rebind);
            return Window::EMPTY;
        };
        let count = snapshot.cache.len();
        self.sync_extents(snapshot.cache.total());
        let prev = self.mapper.virtual_offset();
        self.mapper.follow(snapshot.scroll.virtual_offset);
        self.note_direction(prev, self.mapper.virtual_offset());

        let next = match self.options.container_extent {
            None => Window::new(0, count),
            Some(_) => snapshot.window.clamped(count),
        };
        self.chunk_size = snapshot.chunk_size;
        self.apply_window(next, pass == Pass::Rebind);
        next
    }

    fn compute_window(&mut self, pass: Pass) -> Window {
        let cache = &self.cache;
        let count = cache.len();
        let Some(viewport) = self.options.container_extent else {
            self.chunk_size = count;
            return Window::new(0, count);
        };
        let offset = self.mapper.virtual_offset();
        let anchor = cache.index_at(offset);
        if !(viewport > 0.0) {
            self.chunk_size = 0;
            return Window::new(anchor, 0).clamped(count);
        }
        // The anchor may be partly scrolled out; the chunk still has to reach the viewport end.
        let hidden = (offset - cache.offset_of(anchor)).max(0.0);
        let needed = WindowCalculator::chunk_size_for(viewport + hidden, cache, anchor);
        let chunk = match pass {
            Pass::Scroll => needed.max(self.chunk_size),
            Pass::Recalc | Pass::Rebind => needed,
        };
        self.chunk_size = chunk.min(count);
        WindowCalculator::window_for(offset, cache, chunk)
    }

    fn sync_extents(&mut self, total: f64) {
        let viewport = self.options.container_extent.unwrap_or(0.0);
        let total_changed = total != self.mapper.virtual_total();
        if total_changed || viewport != self.mapper.viewport() {
            self.mapper.set_extents(total, viewport);
        }
        if total_changed {
            vtrace!(total, "Engine: content extent changed");
            self.emit(EngineEvent::ContentExtentChanged { total });
        }
        let visible = self
            .options
            .container_extent
            .is_some_and(|viewport| total > viewport);
        if visible != self.scrollbar_visible {
            self.scrollbar_visible = visible;
            self.emit(EngineEvent::ScrollbarVisibilityChanged { visible });
        }
    }

    // Applies deferred measurements for items inside `window`. Returns whether any extent
    // changed.
    fn flush_deferred(&mut self, window: Window) -> bool {
        if self.deferred.is_empty() || window.is_empty() {
            return false;
        }
        let pending: Vec<(usize, f64)> = self
            .deferred
            .range(window.start_index..window.end_index())
            .map(|(&i, &e)| (i, e))
            .collect();
        if pending.is_empty() {
            return false;
        }
        let cache = Arc::make_mut(&mut self.cache);
        let mut changed = false;
        for (index, extent) in pending {
            self.deferred.remove(&index);
            changed |= cache.patch(index, extent) != 0.0;
        }
        vtrace!(changed, "Engine: flushed deferred measurements");
        changed
    }

    fn apply_window(&mut self, next: Window, rebind: bool) {
        let prev = self.window;
        let _change = self.recycler.apply(next);
        if rebind {
            self.recycler.refresh();
        }
        self.window = next;
        if prev == next {
            return;
        }
        vtrace!(
            start_index = next.start_index,
            chunk_size = next.chunk_size,
            change = ?_change,
            "Engine: window changed"
        );
        self.emit(EngineEvent::window_changed(next));
        if prev.start_index != next.start_index {
            self.emit(EngineEvent::preload(next));
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(cb) = &self.options.on_event {
            cb(&event);
        }
    }

    fn note_direction(&mut self, prev: f64, next: f64) {
        if next > prev {
            self.scroll_direction = Some(ScrollDirection::Forward);
        } else if next < prev {
            self.scroll_direction = Some(ScrollDirection::Backward);
        }
    }

    // ----- events -----

    /// Handles a scroll reported by the host scrollbar.
    ///
    /// `real_offset` is in scrollbar units. The echo of a programmatic scroll is recognized
    /// and does not move the content again. Slaves ignore their own scrollbar and follow the
    /// master instead.
    pub fn on_scroll(&mut self, real_offset: f64) -> Window {
        if self.disposed {
            return self.window;
        }
        self.refresh_role();
        if self.role() == Role::Slave {
            return self.follow_master();
        }
        self.apply_reported_extents();
        let prev = self.mapper.virtual_offset();
        let next = self.mapper.on_real_scroll(real_offset);
        self.note_direction(prev, next);
        vtrace!(real_offset, virtual_offset = next, "Engine::on_scroll");
        self.relayout(Pass::Scroll)
    }

    /// Scrolls to a virtual offset.
    ///
    /// Returns the real offset the host scrollbar must be moved to, or `None` when the
    /// scrollbar stays where it is (the move is below one scrollbar unit, or this engine is a
    /// slave).
    pub fn scroll_to(&mut self, virtual_offset: f64) -> Option<f64> {
        if self.disposed {
            return None;
        }
        self.refresh_role();
        if self.role() == Role::Slave {
            return None;
        }
        let prev = self.mapper.virtual_offset();
        let real = self.mapper.scroll_virtual_to(virtual_offset);
        self.note_direction(prev, self.mapper.virtual_offset());
        vtrace!(virtual_offset, real = ?real, "Engine::scroll_to");
        self.relayout(Pass::Scroll);
        real
    }

    /// Scrolls by `delta` virtual units.
    pub fn scroll_by(&mut self, delta: f64) -> Option<f64> {
        self.scroll_to(self.mapper.virtual_offset() + delta)
    }

    /// Scrolls the minimum distance that makes `index` fully visible.
    ///
    /// An item above the viewport is aligned to the top, one below it to the bottom. Indexes
    /// past the end are clamped to the last item. Returns the real offset to move the
    /// scrollbar to, as for [`Self::scroll_to`].
    pub fn scroll_to_index(&mut self, index: usize) -> Option<f64> {
        let cache = self.active_cache();
        let count = cache.len();
        if count == 0 || self.options.container_extent.is_none() {
            return None;
        }
        let index = index.min(count - 1);
        let viewport = self.mapper.viewport();
        let current = self.mapper.virtual_offset();
        let start = cache.offset_of(index);
        let end = cache.offset_of(index + 1);
        if start >= current && end <= current + viewport {
            return None;
        }
        let target = if index < self.window.start_index || start < current {
            start
        } else {
            end - viewport
        };
        self.scroll_to(target.max(0.0))
    }

    /// Scrolls so that the item just below the viewport becomes fully visible.
    pub fn scroll_next(&mut self) -> Option<f64> {
        let cache = self.active_cache();
        if cache.is_empty() {
            return None;
        }
        let bottom = self.mapper.virtual_offset() + self.mapper.viewport();
        self.scroll_to_index(cache.index_at(bottom))
    }

    /// Scrolls so that the item just above the viewport becomes fully visible.
    pub fn scroll_prev(&mut self) -> Option<f64> {
        let cache = self.active_cache();
        if cache.is_empty() {
            return None;
        }
        let top = self.mapper.virtual_offset();
        let index = cache.index_at(top);
        let index = if cache.offset_of(index) < top {
            index
        } else if index > 0 {
            index - 1
        } else {
            return None;
        };
        self.scroll_to_index(index)
    }

    /// Scrolls one viewport forward.
    pub fn scroll_next_page(&mut self) -> Option<f64> {
        self.scroll_by(self.mapper.viewport())
    }

    /// Scrolls one viewport backward.
    pub fn scroll_prev_page(&mut self) -> Option<f64> {
        self.scroll_by(-self.mapper.viewport())
    }

    /// Handles a viewport resize. `None` turns virtualization off: every item is rendered.
    pub fn set_container_extent(&mut self, container_extent: Option<f64>) -> Window {
        if self.disposed {
            return self.window;
        }
        self.refresh_role();
        let container_extent =
            container_extent.map(|e| if e.is_finite() && e > 0.0 { e } else { 0.0 });
        if self.options.container_extent == container_extent {
            return self.window;
        }
        vdebug!(container_extent = ?container_extent, "Engine::set_container_extent");
        self.options.container_extent = container_extent;
        self.relayout(Pass::Recalc)
    }

    /// Replaces the materialized data with `count` items.
    ///
    /// The extent cache is rebuilt (measurements survive through `track_by` keys), every slot
    /// is rebound and the scroll position is kept where the new content allows it.
    pub fn replace_data(&mut self, count: usize) -> Window {
        if self.disposed {
            return self.window;
        }
        self.refresh_role();
        vdebug!(count, "Engine::replace_data");
        self.materialized = count;
        self.options.count = count;
        self.deferred.clear();
        self.claim_on_data();
        self.was_master = self.role() == Role::Master;
        self.rebuild_cache();
        self.relayout(Pass::Rebind)
    }

    /// Declares the total item count of a remote collection.
    ///
    /// Items past the materialized data take the default extent. If the current window would
    /// run past the new total it is pulled back to end there. When that moves the scroll
    /// position, the new real offset is left pending like a programmatic scroll: the host reads
    /// it from [`Self::real_offset`] while [`Self::is_programmatic_scroll_pending`] holds.
    pub fn set_total_item_count(&mut self, total_item_count: Option<usize>) -> Window {
        if self.disposed {
            return self.window;
        }
        self.refresh_role();
        if !self.remote.set_declared(total_item_count) {
            return self.window;
        }
        vdebug!(total_item_count = ?total_item_count, "Engine::set_total_item_count");
        self.options.total_item_count = total_item_count;
        self.claim_on_data();
        self.refresh_role();
        if self.uses_shared_cache() {
            return self.relayout(Pass::Recalc);
        }

        let prev = self.window;
        let real_before = self.mapper.real_offset();
        let count = self.remote.effective_count(self.materialized);
        let default_extent = self.options.default_extent();
        Arc::make_mut(&mut self.cache).resize(count, |_| default_extent);
        self.deferred.retain(|&i, _| i < count);
        self.sync_extents(self.cache.total());
        let clamped = self.remote.clamp_window(prev, count);
        if clamped != prev {
            self.mapper.follow(self.cache.offset_of(clamped.start_index));
        }
        let window = self.relayout(Pass::Recalc);
        if let Some(_real) = self.mapper.expect_echo_from(real_before) {
            vtrace!(real = _real, "Engine::set_total_item_count: scrollbar moved");
        }
        window
    }

    /// Records the measured extent of one rendered item. See
    /// [`Self::report_measured_extents`].
    pub fn report_measured_extent(&mut self, index: usize, extent: f64) -> bool {
        self.report_measured_extents([(index, extent)])
    }

    /// Records measured extents of rendered items and runs one corrective relayout.
    ///
    /// Items inside the window are patched immediately; measurements of items outside it are
    /// deferred until they enter it. Shared slaves forward measurements to their master.
    /// Returns whether the extent cache changed.
    pub fn report_measured_extents(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, f64)>,
    ) -> bool {
        if self.disposed {
            return false;
        }
        self.refresh_role();
        if !self.uses_shared_cache() {
            return self.patch_extents(measurements);
        }

        let Some(m) = &self.sync else {
            return false;
        };
        let mut unreported = Vec::new();
        for (index, extent) in measurements {
            if m.group.report_extent(m.member, index, extent).is_err() {
                unreported.push((index, extent));
            }
        }
        if unreported.is_empty() {
            return false;
        }
        // Nobody to report to: take over the axis.
        vdebug!(member = ?self.member(), "Engine: no master to report to, claiming");
        if let Err(_err) = m.group.set_master(m.member, false) {
            vwarn!(error = %_err, "Engine: failed to claim mastership");
            return false;
        }
        self.refresh_role();
        self.relayout(Pass::Recalc);
        self.patch_extents(unreported)
    }

    fn patch_extents(&mut self, measurements: impl IntoIterator<Item = (usize, f64)>) -> bool {
        let count = self.cache.len();
        let virtualized = self.options.container_extent.is_some();
        let mut changed = false;
        for (index, extent) in measurements {
            if index >= count {
                continue;
            }
            let extent = sanitize_extent(Some(index), extent);
            if index < self.materialized {
                self.key_extents.insert((self.options.track_by)(index), extent);
            }
            if !virtualized || self.window.contains(index) {
                changed |= Arc::make_mut(&mut self.cache).patch(index, extent) != 0.0;
                self.deferred.remove(&index);
            } else {
                self.deferred.insert(index, extent);
            }
        }
        if changed {
            self.relayout(Pass::Recalc);
        }
        changed
    }

    /// Forgets every measurement and rebuilds the cache from the configured extents.
    pub fn reset_measurements(&mut self) -> Window {
        if self.disposed {
            return self.window;
        }
        vdebug!("Engine::reset_measurements");
        self.key_extents.clear();
        self.deferred.clear();
        self.rebuild_cache();
        self.relayout(Pass::Recalc)
    }

    /// Number of items with a recorded measurement.
    pub fn measurement_cache_len(&self) -> usize {
        self.key_extents.len()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        index < self.materialized && self.key_extents.contains_key(&self.key_for(index))
    }

    /// Number of measurements waiting for their item to enter the window.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.track_by)(index)
    }

    /// Replaces the `track_by` identity, e.g. after the data was reordered in place.
    ///
    /// Measurements follow their keys to the new indexes.
    pub fn set_track_by(&mut self, track_by: impl Fn(usize) -> K + Send + Sync + 'static) -> Window {
        if self.disposed {
            return self.window;
        }
        self.options.track_by = Arc::new(track_by);
        self.deferred.clear();
        self.rebuild_cache();
        self.relayout(Pass::Rebind)
    }

    /// Exports measured extents keyed by `track_by` identity.
    pub fn export_measurement_cache(&self) -> Vec<(K, f64)>
    where
        K: Clone,
    {
        self.key_extents
            .iter()
            .map(|(k, &extent)| (k.clone(), extent))
            .collect()
    }

    /// Imports measured extents (e.g. saved with [`Self::export_measurement_cache`]) and
    /// rebuilds the cache.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, f64)>) -> Window {
        if self.disposed {
            return self.window;
        }
        for (key, extent) in entries {
            self.key_extents.insert(key, sanitize_extent(None, extent));
        }
        vdebug!(
            measured = self.key_extents.len(),
            "Engine::import_measurement_cache"
        );
        self.rebuild_cache();
        self.relayout(Pass::Recalc)
    }

    pub fn set_small_delta_threshold(&mut self, threshold: usize) {
        self.options.small_delta_threshold = threshold;
        self.recycler.set_small_delta_threshold(threshold);
    }

    pub fn set_on_event(
        &mut self,
        on_event: Option<impl Fn(&EngineEvent) + Send + Sync + 'static>,
    ) {
        self.options.on_event = on_event.map(|f| Arc::new(f) as _);
    }

    // ----- queries -----

    /// Number of items windowed over, including remote placeholders.
    pub fn count(&self) -> usize {
        self.active_cache().len()
    }

    pub fn materialized_count(&self) -> usize {
        self.materialized
    }

    pub fn remote(&self) -> RemoteCount {
        self.remote
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn chunk_size(&self) -> usize {
        self.window.chunk_size
    }

    /// Number of items needed to fill `viewport` from the current window start.
    ///
    /// Shared slaves return the master's chunk size without computing one.
    pub fn chunk_size_for(&self, viewport: f64) -> usize {
        if self.reads_snapshot() {
            if let Some(snapshot) = self.snapshot() {
                return snapshot.chunk_size;
            }
        }
        WindowCalculator::chunk_size_for(viewport, &self.active_cache(), self.window.start_index)
    }

    pub fn is_virtualized(&self) -> bool {
        self.options.container_extent.is_some()
    }

    pub fn is_scrollbar_visible(&self) -> bool {
        self.scrollbar_visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn total_size(&self) -> f64 {
        self.active_cache().total()
    }

    pub fn index_at(&self, offset: f64) -> usize {
        self.active_cache().index_at(offset)
    }

    pub fn offset_of(&self, index: usize) -> f64 {
        self.active_cache().offset_of(index)
    }

    pub fn extent_at(&self, index: usize) -> f64 {
        self.active_cache().extent_at(index)
    }

    pub fn virtual_offset(&self) -> f64 {
        self.mapper.virtual_offset()
    }

    pub fn real_offset(&self) -> f64 {
        self.mapper.real_offset()
    }

    /// Size of the scrollable region the host should render for its scrollbar.
    pub fn real_total(&self) -> f64 {
        self.mapper.real_total()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.mapper.state()
    }

    /// Whether a programmatic scroll is waiting for the scrollbar to report back.
    pub fn is_programmatic_scroll_pending(&self) -> bool {
        self.mapper.is_programmatic_pending()
    }

    /// How far the rendered window must be shifted back so that the virtual offset lines up
    /// with the top of the viewport.
    pub fn content_translation(&self) -> f64 {
        if self.options.container_extent.is_none() {
            return 0.0;
        }
        let cache = self.active_cache();
        (self.mapper.virtual_offset() - cache.offset_of(self.window.start_index)).max(0.0)
    }

    /// The items at least partly inside the viewport.
    pub fn visible_range(&self) -> Window {
        let cache = self.active_cache();
        let count = cache.len();
        let Some(viewport) = self.options.container_extent else {
            return Window::new(0, count);
        };
        if count == 0 {
            return Window::EMPTY;
        }
        let offset = self.mapper.virtual_offset();
        let start = cache.index_at(offset);
        if !(viewport > 0.0) {
            return Window::new(start, 0);
        }
        let end = cache.count_starting_before(offset + viewport).max(start + 1);
        Window::new(start, end - start)
    }

    /// Calls `f` for each item of the current window, in index order.
    pub fn for_each_virtual_item(&self, mut f: impl FnMut(VirtualItem)) {
        let cache = self.active_cache();
        for index in self.window.start_index..self.window.end_index() {
            f(VirtualItem {
                index,
                start: cache.offset_of(index),
                extent: cache.extent_at(index),
            });
        }
    }

    /// Collects the current window's items into `out` (cleared first).
    pub fn collect_virtual_items(&self, out: &mut Vec<VirtualItem>) {
        out.clear();
        self.for_each_virtual_item(|item| out.push(item));
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            container_extent: self.options.container_extent,
            scroll: self.mapper.state(),
            window: self.window,
        }
    }

    /// Restores viewport and scroll position. Returns the real offset to move the scrollbar
    /// to, as for [`Self::scroll_to`].
    pub fn restore_frame_state(&mut self, frame: FrameState) -> Option<f64> {
        self.set_container_extent(frame.container_extent);
        self.scroll_to(frame.scroll.virtual_offset)
    }

    pub fn recycler(&self) -> &RecyclingUpdater<P> {
        &self.recycler
    }

    pub fn provider(&self) -> &P {
        self.recycler.provider()
    }

    pub fn provider_mut(&mut self) -> &mut P {
        self.recycler.provider_mut()
    }

    /// Rebinds every slot without changing the window, e.g. after item content changed in
    /// place.
    pub fn refresh(&mut self) {
        if !self.disposed {
            self.recycler.refresh();
        }
    }
}

impl<K, P: SlotProvider> Engine<K, P> {
    /// Destroys every slot, leaves the sync group and drops the event callback.
    ///
    /// Every later call is a no-op. Dropping the engine disposes it as well.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        vdebug!("Engine::dispose");
        self.recycler.clear();
        self.leave_group();
        self.options.on_event = None;
        self.window = Window::EMPTY;
        self.disposed = true;
    }

    fn leave_group(&mut self) {
        let Some(m) = self.sync.take() else {
            return;
        };
        match m.group.leave(m.member) {
            Ok(_heir) => {
                vtrace!(heir = ?_heir, "Engine: left sync group");
            }
            Err(_err) => {
                vwarn!(error = %_err, "Engine: failed to leave sync group");
            }
        }
    }
}

impl<K, P: SlotProvider> Drop for Engine<K, P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<K, P: SlotProvider + fmt::Debug> fmt::Debug for Engine<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("materialized", &self.materialized)
            .field("count", &self.cache.len())
            .field("window", &self.window)
            .field("scroll", &self.mapper.state())
            .field("remote", &self.remote)
            .field("sync", &self.sync)
            .field("recycler", &self.recycler)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
