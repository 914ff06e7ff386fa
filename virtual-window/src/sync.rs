use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{ExtentCache, Orientation, ScrollState, Window};

/// Identifies an engine registered in a [`SyncGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("member {0:?} is not registered in this sync group")]
    UnknownMember(MemberId),
    #[error("no master is elected for the {0:?} axis")]
    NoMaster(Orientation),
    #[error("member {member:?} is not the master of the {axis:?} axis")]
    NotMaster {
        member: MemberId,
        axis: Orientation,
    },
}

/// Axis state published by a master once it has finished handling an event.
///
/// Slaves only ever see whole snapshots; the cache behind the `Arc` is never mutated after
/// publication.
#[derive(Clone, Debug)]
pub struct AxisSnapshot {
    pub cache: Arc<ExtentCache>,
    pub chunk_size: usize,
    pub window: Window,
    pub scroll: ScrollState,
    /// Bumped on every publication.
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Axis {
    // Join order; the oldest remaining member inherits mastership.
    members: Vec<MemberId>,
    master: Option<MemberId>,
    snapshot: Option<AxisSnapshot>,
    reports: Vec<(usize, f64)>,
    generation: u64,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    axes: BTreeMap<Orientation, Axis>,
    member_axis: BTreeMap<MemberId, Orientation>,
}

impl Registry {
    fn axis_of(&self, member: MemberId) -> Result<Orientation, SyncError> {
        self.member_axis
            .get(&member)
            .copied()
            .ok_or(SyncError::UnknownMember(member))
    }

    fn axis_mut(&mut self, member: MemberId) -> Result<(Orientation, &mut Axis), SyncError> {
        let axis = self.axis_of(member)?;
        let state = self
            .axes
            .get_mut(&axis)
            .ok_or(SyncError::UnknownMember(member))?;
        Ok((axis, state))
    }

    fn master_axis_mut(&mut self, member: MemberId) -> Result<&mut Axis, SyncError> {
        let (axis, state) = self.axis_mut(member)?;
        if state.master != Some(member) {
            return Err(SyncError::NotMaster { member, axis });
        }
        Ok(state)
    }
}

/// Registry of engines that mirror one scroll axis.
///
/// One member per axis is the master: it owns the authoritative extent cache and window and
/// publishes them as an [`AxisSnapshot`]. The others (slaves) read that snapshot and keep only
/// their own render slots.
///
/// The handle is cheap to clone; clones share the same registry. Engines are single-threaded,
/// so the registry is too.
#[derive(Clone, Debug, Default)]
pub struct SyncGroup {
    inner: Rc<RefCell<Registry>>,
}

impl SyncGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new member on `axis`. It starts as a slave.
    pub fn join(&self, axis: Orientation) -> MemberId {
        let mut reg = self.inner.borrow_mut();
        let id = MemberId(reg.next_id);
        reg.next_id += 1;
        reg.member_axis.insert(id, axis);
        reg.axes.entry(axis).or_default().members.push(id);
        vdebug!(member = id.0, ?axis, "SyncGroup::join");
        id
    }

    /// Deregisters `member`.
    ///
    /// If it was the master, mastership passes to the oldest remaining member, which is
    /// returned. When nobody is left the axis is cleared.
    pub fn leave(&self, member: MemberId) -> Result<Option<MemberId>, SyncError> {
        let mut reg = self.inner.borrow_mut();
        let axis = reg.axis_of(member)?;
        reg.member_axis.remove(&member);

        let Some(state) = reg.axes.get_mut(&axis) else {
            return Ok(None);
        };
        state.members.retain(|&m| m != member);
        if state.members.is_empty() {
            reg.axes.remove(&axis);
            vdebug!(member = member.0, ?axis, "SyncGroup::leave: axis cleared");
            return Ok(None);
        }
        if state.master != Some(member) {
            return Ok(None);
        }
        let heir = state.members[0];
        state.master = Some(heir);
        vdebug!(
            member = member.0,
            heir = heir.0,
            ?axis,
            "SyncGroup::leave: mastership handed off"
        );
        Ok(Some(heir))
    }

    /// Claims mastership of the member's axis.
    ///
    /// Succeeds when no master is elected, or unconditionally with `reset` (the shared
    /// collection changed identity; the previous snapshot is dropped). Returns whether
    /// `member` is the master afterwards.
    pub fn set_master(&self, member: MemberId, reset: bool) -> Result<bool, SyncError> {
        let mut reg = self.inner.borrow_mut();
        let (_axis, state) = reg.axis_mut(member)?;
        if reset && state.master != Some(member) {
            state.snapshot = None;
            state.reports.clear();
        }
        if state.master.is_none() || reset {
            if state.master != Some(member) {
                vdebug!(member = member.0, axis = ?_axis, reset, "SyncGroup::set_master");
            }
            state.master = Some(member);
        }
        Ok(state.master == Some(member))
    }

    pub fn is_master(&self, member: MemberId) -> bool {
        let reg = self.inner.borrow();
        let Ok(axis) = reg.axis_of(member) else {
            return false;
        };
        reg.axes
            .get(&axis)
            .is_some_and(|state| state.master == Some(member))
    }

    pub fn master(&self, axis: Orientation) -> Option<MemberId> {
        self.inner.borrow().axes.get(&axis).and_then(|s| s.master)
    }

    /// Number of members registered on `axis`.
    pub fn member_count(&self, axis: Orientation) -> usize {
        self.inner
            .borrow()
            .axes
            .get(&axis)
            .map_or(0, |s| s.members.len())
    }

    /// Clears the elected master of `axis` so the next claimant wins.
    ///
    /// Used when the shared collection becomes empty.
    pub fn reset_master(&self, axis: Orientation) {
        let mut reg = self.inner.borrow_mut();
        if let Some(state) = reg.axes.get_mut(&axis) {
            vdebug!(?axis, "SyncGroup::reset_master");
            state.master = None;
            state.snapshot = None;
            state.reports.clear();
        }
    }

    /// Publishes the master's state. Returns the new generation.
    pub fn publish(
        &self,
        member: MemberId,
        cache: Arc<ExtentCache>,
        chunk_size: usize,
        window: Window,
        scroll: ScrollState,
    ) -> Result<u64, SyncError> {
        let mut reg = self.inner.borrow_mut();
        let state = reg.master_axis_mut(member)?;
        state.generation += 1;
        state.snapshot = Some(AxisSnapshot {
            cache,
            chunk_size,
            window,
            scroll,
            generation: state.generation,
        });
        Ok(state.generation)
    }

    /// The latest snapshot published on the member's axis.
    pub fn snapshot_for(&self, member: MemberId) -> Result<AxisSnapshot, SyncError> {
        let reg = self.inner.borrow();
        let axis = reg.axis_of(member)?;
        reg.axes
            .get(&axis)
            .and_then(|s| s.snapshot.clone())
            .ok_or(SyncError::NoMaster(axis))
    }

    /// Forwards a measured extent discovered by a slave to the master of its axis.
    pub fn report_extent(
        &self,
        member: MemberId,
        index: usize,
        extent: f64,
    ) -> Result<(), SyncError> {
        let mut reg = self.inner.borrow_mut();
        let (axis, state) = reg.axis_mut(member)?;
        if state.master.is_none() {
            return Err(SyncError::NoMaster(axis));
        }
        state.reports.push((index, extent));
        Ok(())
    }

    /// Drains the extents slaves reported to `member`, in report order.
    pub fn take_reports(&self, member: MemberId) -> Result<Vec<(usize, f64)>, SyncError> {
        let mut reg = self.inner.borrow_mut();
        let state = reg.master_axis_mut(member)?;
        Ok(core::mem::take(&mut state.reports))
    }
}
