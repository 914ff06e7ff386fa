//! Adapter utilities for the `virtual-window` crate.
//!
//! The `virtual-window` crate is UI-agnostic and focuses on windowing math and state. This
//! crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - A [`Controller`] that subscribes to the host's scroll and resize sources for its lifetime,
//!   keeps the scrollbar in step with the engine and drives the size-recheck pass
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod anchor;
mod controller;
mod source;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::Controller;
pub use source::{ResizeSource, ScrollSource, Source, Subscription, SubscriptionId};
