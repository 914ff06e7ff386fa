use crate::{ExtentCache, Window};

/// Chunk sizing and window placement over an [`ExtentCache`].
///
/// Stateless: the engine owns the viewport extent and the current window and passes them in.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowCalculator;

impl WindowCalculator {
    /// Number of items needed to cover `viewport` when the window starts at `anchor`.
    ///
    /// Items are accumulated forward from `anchor` until their summed extent reaches the
    /// viewport. If the collection ends first, preceding items are added (back-fill) until the
    /// viewport is covered or index `0` is reached, so the final chunk near the end is never
    /// smaller than the viewport requires.
    ///
    /// An absent, zero or non-finite viewport yields `0`.
    pub fn chunk_size_for(viewport: f64, cache: &ExtentCache, anchor: usize) -> usize {
        let n = cache.len();
        if n == 0 || !viewport.is_finite() || viewport <= 0.0 {
            return 0;
        }
        let anchor = anchor.min(n - 1);

        let mut sum = 0.0;
        let mut chunk = 0usize;
        for i in anchor..n {
            if sum >= viewport {
                return chunk;
            }
            sum += cache.extent_at(i);
            chunk += 1;
        }

        // Reached the end without filling the viewport: grow backward.
        let mut i = anchor;
        while sum < viewport && i > 0 {
            i -= 1;
            sum += cache.extent_at(i);
            chunk += 1;
        }
        chunk
    }

    /// The window of `chunk_size` items for a virtual scroll offset.
    ///
    /// `start_index` is the item under `virtual_offset`, pulled back so the window never runs
    /// past the end of the collection.
    pub fn window_for(virtual_offset: f64, cache: &ExtentCache, chunk_size: usize) -> Window {
        Window::new(cache.index_at(virtual_offset), chunk_size).clamped(cache.len())
    }

    /// The incremental window `delta` items away from `window` (negative = backward).
    pub fn shift(window: Window, delta: isize, count: usize) -> Window {
        let start_index = if delta >= 0 {
            window.start_index.saturating_add(delta.unsigned_abs())
        } else {
            window.start_index.saturating_sub(delta.unsigned_abs())
        };
        Window::new(start_index, window.chunk_size).clamped(count)
    }

    /// Returns `true` when the items of `window` cover `viewport`, or the whole collection is
    /// shorter than it.
    pub fn covers(window: Window, cache: &ExtentCache, viewport: f64) -> bool {
        let covered = cache.offset_of(window.end_index()) - cache.offset_of(window.start_index);
        covered >= viewport || cache.total() < viewport
    }
}
