#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Measured extents keyed by `track_by` identity, so they follow items across data
/// replacement and reorder.
#[cfg(feature = "std")]
pub(crate) type KeyExtentMap<K> = HashMap<K, f64>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyExtentMap<K> = BTreeMap<K, f64>;

/// Bound for `track_by` keys: hashable with `std`, ordered without it.
#[cfg(feature = "std")]
pub trait TrackKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> TrackKey for K {}

#[cfg(not(feature = "std"))]
pub trait TrackKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> TrackKey for K {}
