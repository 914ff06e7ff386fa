use alloc::sync::Arc;

use crate::{
    EngineEvent, FixedPlatformLimits, ItemKey, Orientation, PlatformLimits, SyncPolicy,
    WindowChange,
};

/// Per-item extent accessor.
pub type ExtentFn = Arc<dyn Fn(usize) -> f64 + Send + Sync>;

/// Identity of the item at an index, used to carry measurements across data replacement.
pub type TrackByFn<K> = Arc<dyn Fn(usize) -> K + Send + Sync>;

/// A callback receiving every [`EngineEvent`].
pub type EventCallback = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Configuration for [`crate::Engine`].
///
/// Cheap to clone: closures and the platform provider are behind `Arc`s.
pub struct EngineOptions<K = ItemKey> {
    /// Materialized item count.
    pub count: usize,
    pub orientation: Orientation,
    /// Viewport extent along the scroll axis. `None` disables virtualization: every item is
    /// rendered.
    pub container_extent: Option<f64>,
    /// Constant extent for every item, and the default for items without data.
    pub item_extent: Option<f64>,
    /// Per-item extent; takes precedence over `item_extent` for materialized items.
    pub extent_of: Option<ExtentFn>,
    /// Declared total for remote data (see [`crate::RemoteCount`]).
    pub total_item_count: Option<usize>,
    pub track_by: TrackByFn<K>,
    pub sync_policy: SyncPolicy,
    /// `|Δstart|` above which slots are fully reassigned instead of moved.
    pub small_delta_threshold: usize,
    pub platform: Arc<dyn PlatformLimits + Send + Sync>,
    pub on_event: Option<EventCallback>,
}

impl<K> Clone for EngineOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            orientation: self.orientation,
            container_extent: self.container_extent,
            item_extent: self.item_extent,
            extent_of: self.extent_of.clone(),
            total_item_count: self.total_item_count,
            track_by: Arc::clone(&self.track_by),
            sync_policy: self.sync_policy,
            small_delta_threshold: self.small_delta_threshold,
            platform: Arc::clone(&self.platform),
            on_event: self.on_event.clone(),
        }
    }
}

impl EngineOptions<ItemKey> {
    /// Options for `count` items of a constant `item_extent`, keyed by index.
    pub fn new(count: usize, container_extent: Option<f64>, item_extent: Option<f64>) -> Self {
        Self::new_with_key(count, container_extent, item_extent, |i| i as u64)
    }
}

impl<K> EngineOptions<K> {
    /// Options with a custom `track_by` identity.
    pub fn new_with_key(
        count: usize,
        container_extent: Option<f64>,
        item_extent: Option<f64>,
        track_by: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            orientation: Orientation::default(),
            container_extent,
            item_extent,
            extent_of: None,
            total_item_count: None,
            track_by: Arc::new(track_by),
            sync_policy: SyncPolicy::None,
            small_delta_threshold: WindowChange::DEFAULT_SMALL_DELTA_THRESHOLD,
            platform: Arc::new(FixedPlatformLimits::default()),
            on_event: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_container_extent(mut self, container_extent: Option<f64>) -> Self {
        self.container_extent = container_extent;
        self
    }

    pub fn with_item_extent(mut self, item_extent: Option<f64>) -> Self {
        self.item_extent = item_extent;
        self
    }

    pub fn with_extent_of(mut self, extent_of: impl Fn(usize) -> f64 + Send + Sync + 'static) -> Self {
        self.extent_of = Some(Arc::new(extent_of));
        self
    }

    pub fn with_total_item_count(mut self, total_item_count: Option<usize>) -> Self {
        self.total_item_count = total_item_count;
        self
    }

    pub fn with_track_by(mut self, track_by: impl Fn(usize) -> K + Send + Sync + 'static) -> Self {
        self.track_by = Arc::new(track_by);
        self
    }

    pub fn with_sync_policy(mut self, sync_policy: SyncPolicy) -> Self {
        self.sync_policy = sync_policy;
        self
    }

    pub fn with_small_delta_threshold(mut self, threshold: usize) -> Self {
        self.small_delta_threshold = threshold;
        self
    }

    pub fn with_platform(mut self, platform: impl PlatformLimits + Send + Sync + 'static) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    /// Shorthand for a [`FixedPlatformLimits`] provider.
    pub fn with_platform_max(self, platform_max: f64) -> Self {
        self.with_platform(FixedPlatformLimits(platform_max))
    }

    pub fn with_on_event(
        mut self,
        on_event: Option<impl Fn(&EngineEvent) + Send + Sync + 'static>,
    ) -> Self {
        self.on_event = on_event.map(|f| Arc::new(f) as _);
        self
    }

    /// Extent of a materialized item before any measurement.
    pub(crate) fn estimated_extent(&self, index: usize) -> f64 {
        match &self.extent_of {
            Some(f) => f(index),
            None => self.default_extent(),
        }
    }

    /// Extent of items without data (remote placeholders) or without any extent source.
    pub(crate) fn default_extent(&self) -> f64 {
        self.item_extent.unwrap_or(0.0)
    }
}

impl<K> core::fmt::Debug for EngineOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("count", &self.count)
            .field("orientation", &self.orientation)
            .field("container_extent", &self.container_extent)
            .field("item_extent", &self.item_extent)
            .field("total_item_count", &self.total_item_count)
            .field("sync_policy", &self.sync_policy)
            .field("small_delta_threshold", &self.small_delta_threshold)
            .field(
                "platform_max",
                &self.platform.platform_max_scrollable_extent(),
            )
            .finish_non_exhaustive()
    }
}
