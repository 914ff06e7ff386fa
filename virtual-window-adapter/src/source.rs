use alloc::boxed::Box;
use core::fmt;

/// Handle returned by [`Source::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(pub u64);

/// A host event source the controller registers with for its whole lifetime.
pub trait Source {
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// The host scrollbar of the virtualized axis.
pub trait ScrollSource: Source {
    /// Current scrollbar position in real (scrollbar) units.
    fn scroll_offset(&self) -> f64;

    /// Moves the scrollbar. The echo comes back as a regular scroll event.
    fn set_scroll_offset(&mut self, real_offset: f64);

    /// Sets the extent of the scrollable region, in real units.
    fn set_scroll_extent(&mut self, _real_total: f64) {}
}

/// Reports the viewport extent along the virtualized axis.
pub trait ResizeSource: Source {
    fn container_extent(&self) -> Option<f64>;
}

/// A registration with a [`Source`], released when the guard is dropped.
pub struct Subscription<S: Source + ?Sized> {
    source: Box<S>,
    id: SubscriptionId,
}

impl<S: Source + ?Sized> Subscription<S> {
    pub fn new(mut source: Box<S>) -> Self {
        let id = source.subscribe();
        Self { source, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: Source + ?Sized> Drop for Subscription<S> {
    fn drop(&mut self) {
        self.source.unsubscribe(self.id);
    }
}

impl<S: Source + ?Sized> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
