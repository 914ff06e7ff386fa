use crate::ScrollState;

/// Largest scrollable extent assumed when no platform query is available.
pub const DEFAULT_PLATFORM_MAX_EXTENT: f64 = 10_000_000.0;

/// One real-axis unit: programmatic moves smaller than this never reach the scrollbar.
const REAL_UNIT: f64 = 1.0;

/// Environment capability query for the largest scrollable region the host supports.
pub trait PlatformLimits {
    fn platform_max_scrollable_extent(&self) -> f64;
}

/// A [`PlatformLimits`] provider returning a constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPlatformLimits(pub f64);

impl Default for FixedPlatformLimits {
    fn default() -> Self {
        Self(DEFAULT_PLATFORM_MAX_EXTENT)
    }
}

impl PlatformLimits for FixedPlatformLimits {
    fn platform_max_scrollable_extent(&self) -> f64 {
        self.0
    }
}

fn abs(x: f64) -> f64 {
    if x < 0.0 { -x } else { x }
}

/// Converts between the bounded scrollbar offset ("real") and the true offset into the
/// content ("virtual").
///
/// When the content is larger than the platform allows, the scrollbar spans at most
/// `platform_max` units and every real unit stands for `ratio` virtual units.
#[derive(Clone, Debug)]
pub struct ScrollSpaceMapper {
    platform_max: f64,
    virtual_total: f64,
    viewport: f64,
    ratio: f64,
    real_offset: f64,
    virtual_offset: f64,
    // Real offset we asked the scrollbar to move to; its echo must not remap `virtual_offset`.
    pending_echo: Option<f64>,
}

impl ScrollSpaceMapper {
    pub fn new(platform_max: f64) -> Self {
        Self {
            platform_max: sanitize_max(platform_max),
            virtual_total: 0.0,
            viewport: 0.0,
            ratio: 1.0,
            real_offset: 0.0,
            virtual_offset: 0.0,
            pending_echo: None,
        }
    }

    pub fn from_limits(limits: &dyn PlatformLimits) -> Self {
        Self::new(limits.platform_max_scrollable_extent())
    }

    pub fn platform_max(&self) -> f64 {
        self.platform_max
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn real_offset(&self) -> f64 {
        self.real_offset
    }

    pub fn virtual_offset(&self) -> f64 {
        self.virtual_offset
    }

    pub fn virtual_total(&self) -> f64 {
        self.virtual_total
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// Size of the scrollable region the host should render.
    pub fn real_total(&self) -> f64 {
        self.virtual_total / self.ratio
    }

    pub fn max_virtual_offset(&self) -> f64 {
        (self.virtual_total - self.viewport).max(0.0)
    }

    pub fn max_real_offset(&self) -> f64 {
        (self.real_total() - self.viewport).max(0.0)
    }

    pub fn state(&self) -> ScrollState {
        ScrollState {
            real_offset: self.real_offset,
            virtual_offset: self.virtual_offset,
            ratio: self.ratio,
        }
    }

    /// Whether a programmatic scroll is waiting for its real-offset echo.
    pub fn is_programmatic_pending(&self) -> bool {
        self.pending_echo.is_some()
    }

    pub fn to_virtual(&self, real: f64) -> f64 {
        real * self.ratio
    }

    pub fn to_real(&self, virtual_offset: f64) -> f64 {
        (virtual_offset / self.ratio).clamp(0.0, self.platform_max)
    }

    pub fn set_platform_max(&mut self, platform_max: f64) {
        self.platform_max = sanitize_max(platform_max);
        self.recompute();
    }

    /// Updates the content and viewport extents.
    ///
    /// The virtual offset stays authoritative: it is clamped to the new range and the real
    /// offset is re-derived from it.
    pub fn set_extents(&mut self, virtual_total: f64, viewport: f64) {
        self.virtual_total = if virtual_total.is_finite() {
            virtual_total.max(0.0)
        } else {
            0.0
        };
        self.viewport = if viewport.is_finite() {
            viewport.max(0.0)
        } else {
            0.0
        };
        self.recompute();
    }

    fn recompute(&mut self) {
        self.ratio = if self.virtual_total > self.platform_max {
            self.virtual_total / self.platform_max
        } else {
            1.0
        };
        if !self.ratio.is_finite() || self.ratio < 1.0 {
            self.ratio = 1.0;
        }
        self.virtual_offset = self.virtual_offset.clamp(0.0, self.max_virtual_offset());
        self.real_offset = self.real_for(self.virtual_offset);
        self.pending_echo = None;
    }

    fn real_for(&self, virtual_offset: f64) -> f64 {
        let max_real = self.max_real_offset();
        if virtual_offset <= 0.0 {
            0.0
        } else if virtual_offset >= self.max_virtual_offset() {
            max_real
        } else {
            self.to_real(virtual_offset).min(max_real)
        }
    }

    fn virtual_for(&self, real: f64) -> f64 {
        let max_virtual = self.max_virtual_offset();
        if real <= 0.0 {
            0.0
        } else if real >= self.max_real_offset() {
            max_virtual
        } else {
            self.to_virtual(real).min(max_virtual)
        }
    }

    /// Handles a scroll reported by the host scrollbar and returns the new virtual offset.
    ///
    /// The echo of a programmatic scroll keeps the virtual offset that caused it.
    pub fn on_real_scroll(&mut self, real: f64) -> f64 {
        let real = if real.is_finite() {
            real.clamp(0.0, self.max_real_offset())
        } else {
            self.real_offset
        };
        if let Some(expected) = self.pending_echo.take() {
            if abs(real - expected) < REAL_UNIT {
                self.real_offset = real;
                return self.virtual_offset;
            }
        }
        self.real_offset = real;
        self.virtual_offset = self.virtual_for(real);
        self.virtual_offset
    }

    /// Mirrors a virtual offset owned elsewhere (a sync-group master). No scrollbar echo is
    /// expected.
    pub fn follow(&mut self, virtual_offset: f64) {
        if !virtual_offset.is_finite() {
            return;
        }
        self.virtual_offset = virtual_offset.clamp(0.0, self.max_virtual_offset());
        self.real_offset = self.real_for(self.virtual_offset);
        self.pending_echo = None;
    }

    /// Expects a scrollbar echo when the real offset moved at least one unit away from
    /// `previous_real`, e.g. after the content shrank under it. Returns the offset the host
    /// scrollbar must be moved to.
    pub fn expect_echo_from(&mut self, previous_real: f64) -> Option<f64> {
        if abs(self.real_offset - previous_real) < REAL_UNIT {
            return None;
        }
        self.pending_echo = Some(self.real_offset);
        Some(self.real_offset)
    }

    /// Moves to a virtual offset programmatically.
    ///
    /// Returns the real offset the host scrollbar must be moved to, or `None` when the move is
    /// smaller than one real unit. In that case only the rendered content shifts.
    pub fn scroll_virtual_to(&mut self, virtual_offset: f64) -> Option<f64> {
        let virtual_offset = if virtual_offset.is_finite() {
            virtual_offset.clamp(0.0, self.max_virtual_offset())
        } else {
            self.virtual_offset
        };
        self.virtual_offset = virtual_offset;

        let target = self.real_for(virtual_offset);
        let at_boundary = virtual_offset <= 0.0 || virtual_offset >= self.max_virtual_offset();
        if target == self.real_offset || (!at_boundary && abs(target - self.real_offset) < REAL_UNIT)
        {
            return None;
        }
        self.real_offset = target;
        self.pending_echo = Some(target);
        Some(target)
    }
}

fn sanitize_max(platform_max: f64) -> f64 {
    if platform_max.is_finite() && platform_max > 0.0 {
        platform_max
    } else {
        vwarn!(platform_max, "invalid platform max extent, using default");
        DEFAULT_PLATFORM_MAX_EXTENT
    }
}
