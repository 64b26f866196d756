//! Notification pause state.
//!
//! Pausing silences notifications for [`PAUSE_DURATION`]. Scanning keeps
//! running while paused. Each pause gets a fresh generation number so a
//! stale auto-resume timer from an earlier pause is ignored.

use std::time::Duration;

use serde::Serialize;

/// How long a pause lasts before notifications resume on their own.
pub const PAUSE_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Menu label while notifications are active.
pub const PAUSE_LABEL: &str = "Pause Notifications for 24 Hours";
/// Menu label while notifications are paused.
pub const RESUME_LABEL: &str = "Unpause Notifications";

/// Whether notifications are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseState {
    /// Notifications are delivered.
    #[default]
    Active,
    /// Notifications are suppressed until resumed.
    Paused,
}

/// Tracks the pause state and the generation of the current pause.
#[derive(Debug, Default)]
pub struct PauseController {
    state: PauseState,
    generation: u64,
}

impl PauseController {
    /// A controller with notifications active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> PauseState {
        self.state
    }

    /// Whether notifications are currently suppressed.
    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    /// Pause notifications.
    ///
    /// Returns the generation to hand to the auto-resume timer, or `None`
    /// when already paused (the running timer is kept as is).
    pub fn pause(&mut self) -> Option<u64> {
        if self.is_paused() {
            return None;
        }
        self.generation += 1;
        self.state = PauseState::Paused;
        Some(self.generation)
    }

    /// Resume notifications. Returns `false` if they were already active.
    pub fn resume(&mut self) -> bool {
        if !self.is_paused() {
            return false;
        }
        self.generation += 1;
        self.state = PauseState::Active;
        true
    }

    /// Resume because the timer for `generation` fired.
    ///
    /// Ignored unless it belongs to the current pause.
    pub fn auto_resume(&mut self, generation: u64) -> bool {
        if self.is_paused() && generation == self.generation {
            self.resume()
        } else {
            false
        }
    }

    /// Label for the pause menu item.
    pub fn menu_label(&self) -> &'static str {
        match self.state {
            PauseState::Active => PAUSE_LABEL,
            PauseState::Paused => RESUME_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_then_resume() {
        let mut pause = PauseController::new();
        assert_eq!(pause.menu_label(), PAUSE_LABEL);

        assert!(pause.pause().is_some());
        assert!(pause.is_paused());
        assert_eq!(pause.menu_label(), RESUME_LABEL);

        assert!(pause.resume());
        assert_eq!(pause.state(), PauseState::Active);
        assert_eq!(pause.menu_label(), PAUSE_LABEL);
    }

    #[test]
    fn test_pause_while_paused_is_noop() {
        let mut pause = PauseController::new();
        let first = pause.pause();
        assert!(first.is_some());
        assert_eq!(pause.pause(), None);

        // The original timer still resumes.
        assert!(pause.auto_resume(first.unwrap()));
    }

    #[test]
    fn test_resume_while_active_is_noop() {
        let mut pause = PauseController::new();
        assert!(!pause.resume());
        assert!(!pause.is_paused());
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut pause = PauseController::new();
        let old = pause.pause().unwrap();
        pause.resume();
        let current = pause.pause().unwrap();

        assert!(!pause.auto_resume(old));
        assert!(pause.is_paused());
        assert!(pause.auto_resume(current));
        assert!(!pause.is_paused());
    }

    #[test]
    fn test_auto_resume_fires_once() {
        let mut pause = PauseController::new();
        let generation = pause.pause().unwrap();
        assert!(pause.auto_resume(generation));
        assert!(!pause.auto_resume(generation));
    }
}
