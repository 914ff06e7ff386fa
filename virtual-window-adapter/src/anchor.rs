use core::fmt;

use virtual_window::{Engine, SlotProvider, TrackKey};

/// A scroll anchor that can be used to preserve visual position across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - any reorder/replace where you want the viewport to stay anchored to an item identity
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// The viewport's scroll offset minus the anchor item's start. Negative when the item
    /// starts below the top of the viewport.
    pub offset_in_viewport: f64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the first visible item (by `track_by` key).
///
/// Returns `None` if the visible range is empty.
pub fn capture_first_visible_anchor<K: TrackKey, P: SlotProvider>(
    engine: &Engine<K, P>,
) -> Option<ScrollAnchor<K>> {
    let visible = engine.visible_range();
    if visible.is_empty() {
        return None;
    }
    let index = visible.start_index;
    let offset_in_viewport = (engine.virtual_offset() - engine.offset_of(index)).max(0.0);
    Some(ScrollAnchor {
        key: engine.key_for(index),
        offset_in_viewport,
    })
}

/// Applies a previously captured anchor by scrolling the engine.
///
/// The adapter must provide a `key_to_index` mapping for the *current* dataset. When the
/// scrollbar has to move, [`Engine::scroll_state`] holds the new real offset.
///
/// Returns `true` when the anchor was applied.
pub fn apply_anchor<K: TrackKey, P: SlotProvider>(
    engine: &mut Engine<K, P>,
    anchor: &ScrollAnchor<K>,
    mut key_to_index: impl FnMut(&K) -> Option<usize>,
) -> bool {
    let Some(index) = key_to_index(&anchor.key) else {
        return false;
    };
    if index >= engine.count() {
        return false;
    }
    let target = engine.offset_of(index) + anchor.offset_in_viewport;
    engine.scroll_to(target);
    true
}
