/// The scroll axis an engine virtualizes.
///
/// This is also the key a [`crate::SyncGroup`] uses to pair engines that share one scrollbar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// How an engine participates in a [`crate::SyncGroup`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncPolicy {
    /// Stand-alone engine; never joins a group.
    #[default]
    None,
    /// Slaves read the master's extent cache and chunk size.
    Shared,
    /// Follows the master's scroll position but keeps its own extent cache.
    UniqueCache,
}

/// The contiguous index range currently materialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start_index: usize,
    pub chunk_size: usize,
}

impl Window {
    pub const EMPTY: Self = Self {
        start_index: 0,
        chunk_size: 0,
    };

    pub fn new(start_index: usize, chunk_size: usize) -> Self {
        Self {
            start_index,
            chunk_size,
        }
    }

    /// Exclusive end index.
    pub fn end_index(&self) -> usize {
        self.start_index.saturating_add(self.chunk_size)
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_size == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index()
    }

    /// Clamps the window so that `start_index + chunk_size <= count`.
    ///
    /// The chunk size wins over the start index: the window slides back rather than shrinking,
    /// and only shrinks when the collection itself is shorter than the chunk.
    pub fn clamped(self, count: usize) -> Self {
        let chunk_size = self.chunk_size.min(count);
        let start_index = self.start_index.min(count - chunk_size);
        Self {
            start_index,
            chunk_size,
        }
    }
}

/// A transition between two windows, computed once per event and matched by the
/// [`crate::RecyclingUpdater`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowChange {
    Unchanged,
    /// Every slot is (re)bound; the pool is resized to the new chunk size.
    Full,
    /// The window slid forward by `n` items with the same chunk size.
    MoveForward(usize),
    /// The window slid backward by `n` items with the same chunk size.
    MoveBackward(usize),
}

impl WindowChange {
    /// Default `|Δstart|` above which recycling falls back to full reassignment.
    pub const DEFAULT_SMALL_DELTA_THRESHOLD: usize = 4;

    pub fn between(prev: Window, next: Window, small_delta_threshold: usize) -> Self {
        if prev == next {
            return Self::Unchanged;
        }
        if prev.chunk_size != next.chunk_size {
            return Self::Full;
        }
        if next.start_index > prev.start_index {
            let n = next.start_index - prev.start_index;
            if n <= small_delta_threshold {
                return Self::MoveForward(n);
            }
        } else {
            let n = prev.start_index - next.start_index;
            if n <= small_delta_threshold {
                return Self::MoveBackward(n);
            }
        }
        Self::Full
    }
}

/// Notifications surfaced to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineEvent {
    WindowChanged { start_index: usize, chunk_size: usize },
    /// Emitted whenever `start_index` changes, so remote callers can fetch the range.
    Preload { start_index: usize, chunk_size: usize },
    ScrollbarVisibilityChanged { visible: bool },
    ContentExtentChanged { total: f64 },
}

impl EngineEvent {
    pub(crate) fn window_changed(w: Window) -> Self {
        Self::WindowChanged {
            start_index: w.start_index,
            chunk_size: w.chunk_size,
        }
    }

    pub(crate) fn preload(w: Window) -> Self {
        Self::Preload {
            start_index: w.start_index,
            chunk_size: w.chunk_size,
        }
    }
}

pub type ItemKey = u64;

/// An item of the current window with its position in virtual space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualItem {
    pub index: usize,
    pub start: f64,
    pub extent: f64,
}

impl VirtualItem {
    pub fn end(&self) -> f64 {
        self.start + self.extent
    }
}
