use alloc::vec::Vec;

/// Replaces extents the cache cannot hold (negative, NaN, infinite) with `0`.
///
/// `index` is `None` for measurements known only by key.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn sanitize_extent(index: Option<usize>, extent: f64) -> f64 {
    if extent.is_finite() && extent >= 0.0 {
        return extent;
    }
    vwarn!(index = ?index, extent, "invalid item extent, treating as 0");
    0.0
}

/// Prefix sums over item extents along one scroll axis.
///
/// `offsets` always holds `len() + 1` entries: `offsets[0] == 0.0` and
/// `offsets[i + 1] == offsets[i] + extent(i)`, so `offsets[len()]` is the total size.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtentCache {
    offsets: Vec<f64>,
}

impl Default for ExtentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtentCache {
    pub fn new() -> Self {
        Self {
            offsets: alloc::vec![0.0],
        }
    }

    /// Creates a cache of `count` items with `extent_of(i)` each.
    pub fn from_fn(count: usize, extent_of: impl FnMut(usize) -> f64) -> Self {
        let mut cache = Self::new();
        cache.build(count, extent_of);
        cache
    }

    /// Rebuilds the whole table in `O(n)` and returns the total size.
    pub fn build(&mut self, count: usize, mut extent_of: impl FnMut(usize) -> f64) -> f64 {
        self.offsets.clear();
        self.offsets.reserve_exact(count + 1);
        let mut acc = 0.0;
        self.offsets.push(acc);
        for i in 0..count {
            acc += sanitize_extent(Some(i), extent_of(i));
            self.offsets.push(acc);
        }
        vdebug!(count, total = acc, "ExtentCache::build");
        acc
    }

    /// Grows or shrinks the table to `count` items, keeping existing entries.
    ///
    /// New items get `extent_of(i)`.
    pub fn resize(&mut self, count: usize, mut extent_of: impl FnMut(usize) -> f64) {
        let cur = self.len();
        if count <= cur {
            self.offsets.truncate(count + 1);
            return;
        }
        self.offsets.reserve_exact(count - cur);
        let mut acc = self.total();
        for i in cur..count {
            acc += sanitize_extent(Some(i), extent_of(i));
            self.offsets.push(acc);
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> f64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// The raw cumulative offsets (`len() + 1` entries).
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Start offset of `index`; indexes past the end map to the total size.
    pub fn offset_of(&self, index: usize) -> f64 {
        self.offsets[index.min(self.len())]
    }

    pub fn extent_at(&self, index: usize) -> f64 {
        if index >= self.len() {
            return 0.0;
        }
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Maps an offset to the index of the item covering it.
    ///
    /// An offset that lands exactly on a boundary belongs to the item starting there. Offsets
    /// before the start map to `0`, offsets at or past the end map to the last item. An empty
    /// cache returns `0`.
    pub fn index_at(&self, offset: f64) -> usize {
        let n = self.len();
        if n == 0 || !(offset > 0.0) {
            return 0;
        }
        // First boundary strictly after `offset`; the covering item is the one before it.
        let after = self.offsets[1..].partition_point(|&end| end <= offset);
        after.min(n - 1)
    }

    /// Number of items starting strictly before `offset`.
    pub fn count_starting_before(&self, offset: f64) -> usize {
        let n = self.len();
        self.offsets[..n].partition_point(|&start| start < offset)
    }

    /// Sets the extent of `index`, shifting every later offset. Returns the applied delta.
    pub fn patch(&mut self, index: usize, extent: f64) -> f64 {
        if index >= self.len() {
            return 0.0;
        }
        let extent = sanitize_extent(Some(index), extent);
        let delta = extent - self.extent_at(index);
        if delta == 0.0 {
            return 0.0;
        }
        for off in &mut self.offsets[index + 1..] {
            *off += delta;
        }
        vtrace!(index, extent, delta, "ExtentCache::patch");
        delta
    }
}
