use super::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Prev,
}

/// Tracks which single window (if any) occupies fullscreen and walks the
/// ordered set of eligible windows on cycle requests.
///
/// Eligibility is recomputed by the caller on every cycle: the open set
/// changes through minimize/close actions that never pass through the
/// arbiter, so caching it here would go stale.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullscreenArbiter {
    active: Option<WindowId>,
}

impl FullscreenArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<WindowId> {
        self.active
    }

    pub fn is_active(&self, id: WindowId) -> bool {
        self.active == Some(id)
    }

    /// Unconditional overwrite. Only one previous owner can exist, but a
    /// direct switch between windows must be tolerated.
    pub fn enter(&mut self, id: WindowId) {
        self.active = Some(id);
    }

    /// Clears fullscreen only when `id` is the current owner, so a stale
    /// exit cannot race a newer enter for a different window.
    pub fn exit(&mut self, id: WindowId) {
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Advances to the neighboring eligible window with wraparound and
    /// returns the new owner. No-op (returns `None`) when nothing is
    /// fullscreen, fewer than two windows are eligible, or the active
    /// window has dropped out of the eligible set since it entered.
    pub fn cycle(
        &mut self,
        direction: CycleDirection,
        eligible: &[WindowId],
    ) -> Option<WindowId> {
        let active = self.active?;
        if eligible.len() < 2 {
            return None;
        }
        let idx = eligible.iter().position(|id| *id == active)?;
        let step = match direction {
            CycleDirection::Next => 1isize,
            CycleDirection::Prev => -1isize,
        };
        let next = ((idx as isize + step).rem_euclid(eligible.len() as isize)) as usize;
        self.active = Some(eligible[next]);
        self.active
    }
}
