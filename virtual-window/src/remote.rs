use crate::Window;

/// A declared item count larger than the data the caller has materialized.
///
/// Unmaterialized items take the configured default extent; the caller is asked to fetch them
/// through `Preload` events and replies with more data whenever it is ready.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteCount {
    declared_total_count: Option<usize>,
}

impl RemoteCount {
    pub fn new(declared_total_count: Option<usize>) -> Self {
        Self {
            declared_total_count,
        }
    }

    pub fn declared(&self) -> Option<usize> {
        self.declared_total_count
    }

    pub fn is_remote(&self) -> bool {
        self.declared_total_count.is_some()
    }

    /// Returns `true` when the declared count changed.
    pub fn set_declared(&mut self, declared_total_count: Option<usize>) -> bool {
        if self.declared_total_count == declared_total_count {
            return false;
        }
        self.declared_total_count = declared_total_count;
        true
    }

    /// The item count used for windowing.
    pub fn effective_count(&self, materialized: usize) -> usize {
        match self.declared_total_count {
            Some(n) if n > materialized => n,
            _ => materialized,
        }
    }

    /// Pulls a window that overruns `count` back so it ends at `count`.
    pub fn clamp_window(&self, window: Window, count: usize) -> Window {
        if window.end_index() <= count {
            return window;
        }
        Window::new(
            count.saturating_sub(window.chunk_size),
            window.chunk_size,
        )
        .clamped(count)
    }
}
