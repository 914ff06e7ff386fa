use alloc::collections::VecDeque;
use core::fmt;

use crate::{Window, WindowChange};

/// Render-slot operations the host provides.
///
/// The engine decides which index each slot shows and in which order slots sit in their
/// container; the provider does the actual element work.
pub trait SlotProvider {
    type Slot;

    /// Creates a slot already bound to `index`. It is placed with [`Self::insert`] afterwards.
    fn create_slot(&mut self, index: usize) -> Self::Slot;

    /// Rebinds an existing slot to show `index`.
    fn bind(&mut self, slot: &mut Self::Slot, index: usize);

    /// Removes the slot from its container without destroying it.
    fn detach(&mut self, slot: Self::Slot) -> Self::Slot;

    /// Places the slot at `position` among the container's current children.
    fn insert(&mut self, slot: &mut Self::Slot, position: usize);

    fn destroy(&mut self, slot: Self::Slot);

    /// Whether the slot holds input focus or an active text cursor.
    fn has_focus(&self, _slot: &Self::Slot) -> bool {
        false
    }

    /// Clears focus held by the slot. Called before the slot is detached or destroyed.
    fn clear_focus(&mut self, _slot: &mut Self::Slot) {}
}

/// A provider with no render work, for headless engines.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSlots;

impl SlotProvider for NullSlots {
    type Slot = ();

    fn create_slot(&mut self, _index: usize) {}
    fn bind(&mut self, _slot: &mut (), _index: usize) {}
    fn detach(&mut self, _slot: ()) {}
    fn insert(&mut self, _slot: &mut (), _position: usize) {}
    fn destroy(&mut self, _slot: ()) {}
}

struct BoundSlot<S> {
    slot: S,
    index: usize,
}

/// Applies windows to a pool of render slots.
///
/// Small same-size shifts move only the slots that leave the window to the opposite end;
/// everything else is a full reassignment. Slot order always matches index order.
pub struct RecyclingUpdater<P: SlotProvider> {
    provider: P,
    slots: VecDeque<BoundSlot<P::Slot>>,
    window: Window,
    small_delta_threshold: usize,
}

impl<P: SlotProvider> RecyclingUpdater<P> {
    pub fn new(provider: P) -> Self {
        Self::with_threshold(provider, WindowChange::DEFAULT_SMALL_DELTA_THRESHOLD)
    }

    pub fn with_threshold(provider: P, small_delta_threshold: usize) -> Self {
        Self {
            provider,
            slots: VecDeque::new(),
            window: Window::EMPTY,
            small_delta_threshold,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// The window the slots currently show.
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn small_delta_threshold(&self) -> usize {
        self.small_delta_threshold
    }

    pub fn set_small_delta_threshold(&mut self, threshold: usize) {
        self.small_delta_threshold = threshold;
    }

    /// Bound indexes in slot order.
    pub fn bound_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map(|s| s.index)
    }

    pub fn plan(&self, next: Window) -> WindowChange {
        let change = WindowChange::between(self.window, next, self.small_delta_threshold);
        match change {
            // A shift of a whole chunk or more leaves no slot in place to keep.
            WindowChange::MoveForward(n) | WindowChange::MoveBackward(n)
                if self.slots.len() != next.chunk_size || n >= next.chunk_size =>
            {
                WindowChange::Full
            }
            WindowChange::Unchanged if self.slots.len() != next.chunk_size => WindowChange::Full,
            other => other,
        }
    }

    /// Brings the slots to `next` and returns the strategy used.
    pub fn apply(&mut self, next: Window) -> WindowChange {
        let change = self.plan(next);
        match change {
            WindowChange::Unchanged => {}
            WindowChange::Full => self.apply_full(next),
            WindowChange::MoveForward(n) => self.move_forward(n, next),
            WindowChange::MoveBackward(n) => self.move_backward(n, next),
        }
        if change != WindowChange::Unchanged {
            vtrace!(
                start_index = next.start_index,
                chunk_size = next.chunk_size,
                ?change,
                "RecyclingUpdater::apply"
            );
        }
        self.window = next;
        change
    }

    /// Rebinds every slot to its current index (content behind the indexes changed).
    pub fn refresh(&mut self) {
        for entry in self.slots.iter_mut() {
            self.provider.bind(&mut entry.slot, entry.index);
        }
    }

    /// Destroys every slot.
    pub fn clear(&mut self) {
        while let Some(entry) = self.slots.pop_back() {
            self.destroy_slot(entry.slot);
        }
        self.window = Window::EMPTY;
    }

    fn destroy_slot(&mut self, mut slot: P::Slot) {
        if self.provider.has_focus(&slot) {
            self.provider.clear_focus(&mut slot);
        }
        self.provider.destroy(slot);
    }

    fn detach_slot(&mut self, mut slot: P::Slot) -> P::Slot {
        if self.provider.has_focus(&slot) {
            self.provider.clear_focus(&mut slot);
        }
        self.provider.detach(slot)
    }

    fn apply_full(&mut self, next: Window) {
        while self.slots.len() > next.chunk_size {
            if let Some(entry) = self.slots.pop_back() {
                self.destroy_slot(entry.slot);
            }
        }
        for (pos, entry) in self.slots.iter_mut().enumerate() {
            let index = next.start_index + pos;
            if entry.index != index {
                self.provider.bind(&mut entry.slot, index);
                entry.index = index;
            }
        }
        while self.slots.len() < next.chunk_size {
            let pos = self.slots.len();
            let index = next.start_index + pos;
            let mut slot = self.provider.create_slot(index);
            self.provider.insert(&mut slot, pos);
            self.slots.push_back(BoundSlot { slot, index });
        }
    }

    fn move_forward(&mut self, n: usize, next: Window) {
        let first_new = next.end_index() - n;
        for k in 0..n {
            let Some(entry) = self.slots.pop_front() else {
                break;
            };
            let mut slot = self.detach_slot(entry.slot);
            let index = first_new + k;
            self.provider.bind(&mut slot, index);
            let pos = self.slots.len();
            self.provider.insert(&mut slot, pos);
            self.slots.push_back(BoundSlot { slot, index });
        }
    }

    fn move_backward(&mut self, n: usize, next: Window) {
        // Entering indexes are placed last-first so each lands at position 0.
        for k in 0..n {
            let Some(entry) = self.slots.pop_back() else {
                break;
            };
            let mut slot = self.detach_slot(entry.slot);
            let index = next.start_index + n - 1 - k;
            self.provider.bind(&mut slot, index);
            self.provider.insert(&mut slot, 0);
            self.slots.push_front(BoundSlot { slot, index });
        }
    }
}

impl<P: SlotProvider + fmt::Debug> fmt::Debug for RecyclingUpdater<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclingUpdater")
            .field("provider", &self.provider)
            .field("slots", &self.slots.len())
            .field("window", &self.window)
            .field("small_delta_threshold", &self.small_delta_threshold)
            .finish()
    }
}
