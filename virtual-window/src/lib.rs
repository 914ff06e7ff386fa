//! A headless viewport virtualization (windowing) engine.
//!
//! For host-side plumbing (scroll/resize subscriptions, anchoring), see the
//! `virtual-window-adapter` crate.
//!
//! Only a contiguous window of items is materialized at any time: enough to fill the viewport.
//! The crate provides the pieces needed for that at interactive frame rates on collections of
//! millions of items:
//! - prefix sums over item extents with `O(log n)` offset → index lookup ([`ExtentCache`])
//! - chunk sizing and window placement ([`WindowCalculator`])
//! - a scrollbar mapping for content larger than the platform can scroll
//!   ([`ScrollSpaceMapper`])
//! - render-slot recycling with incremental moves for small scrolls ([`RecyclingUpdater`])
//! - scroll sharing between engines on the same axis ([`SyncGroup`])
//! - remote data with a declared total count ([`RemoteCount`])
//!
//! It is UI-agnostic. A host is expected to provide:
//! - the viewport extent along the scroll axis
//! - scrollbar offsets
//! - item extents (constant, per item, and/or measured after rendering)
//! - a [`SlotProvider`] that creates, binds and places render slots
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod extent;
mod key;
mod mapper;
mod options;
mod recycler;
mod remote;
mod state;
mod sync;
mod types;
mod window;


pub use engine::{Engine, Role};
pub use extent::ExtentCache;
pub use mapper::{
    DEFAULT_PLATFORM_MAX_EXTENT, FixedPlatformLimits, PlatformLimits, ScrollSpaceMapper,
};
pub use options::{EngineOptions, EventCallback, ExtentFn, TrackByFn};
pub use recycler::{NullSlots, RecyclingUpdater, SlotProvider};
pub use remote::RemoteCount;
pub use state::{FrameState, ScrollState};
pub use sync::{AxisSnapshot, MemberId, SyncError, SyncGroup};
pub use types::{
    EngineEvent, ItemKey, Orientation, ScrollDirection, SyncPolicy, VirtualItem, Window,
    WindowChange,
};
pub use window::WindowCalculator;

#[doc(hidden)]
pub use key::TrackKey;
