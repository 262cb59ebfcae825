//! Core domain types for Curtain.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. The readiness vector, progress projection, and gate
//! snapshot live here so every layer can consume them without pulling in
//! the orchestrator.

use serde::{Deserialize, Serialize};

// ============================================================================
// Progress
// ============================================================================

/// Loading progress as an integer percentage in `0..=100`.
///
/// Monotonic within a gating session: [`Progress::raise_to`] only ever moves
/// the value upward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub struct Progress(u8);

impl Progress {
    /// No readiness signal determined yet.
    pub const ZERO: Self = Self(0);
    /// Floor reached once the font signal settles.
    pub const FONTS_READY: Self = Self(50);
    /// All tracked assets accounted for.
    pub const COMPLETE: Self = Self(100);

    /// Clamps to `0..=100`.
    #[must_use]
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Raise to `floor` if currently below it. Never lowers.
    pub fn raise_to(&mut self, floor: Self) {
        if floor.0 > self.0 {
            self.0 = floor.0;
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= 100
    }
}

impl From<u8> for Progress {
    fn from(percent: u8) -> Self {
        Self::new(percent)
    }
}

impl From<Progress> for u8 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

// ============================================================================
// Readiness signals
// ============================================================================

/// The three independent readiness signals gating the reveal.
///
/// Each component flips false-to-true at most once per session; the gate
/// opens on the conjunction of all three, regardless of arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadinessVector {
    fonts_ready: bool,
    images_ready: bool,
    min_dwell_elapsed: bool,
}

impl ReadinessVector {
    pub fn set_fonts_ready(&mut self) {
        self.fonts_ready = true;
    }

    pub fn set_images_ready(&mut self) {
        self.images_ready = true;
    }

    pub fn set_min_dwell_elapsed(&mut self) {
        self.min_dwell_elapsed = true;
    }

    /// Force every component satisfied (the bounded-wait fallback).
    pub fn satisfy_all(&mut self) {
        self.fonts_ready = true;
        self.images_ready = true;
        self.min_dwell_elapsed = true;
    }

    #[must_use]
    pub fn fonts_ready(&self) -> bool {
        self.fonts_ready
    }

    #[must_use]
    pub fn images_ready(&self) -> bool {
        self.images_ready
    }

    #[must_use]
    pub fn min_dwell_elapsed(&self) -> bool {
        self.min_dwell_elapsed
    }

    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.fonts_ready && self.images_ready && self.min_dwell_elapsed
    }

    /// Projection onto the progress scale.
    ///
    /// Images dominate fonts; the dwell timer never moves the bar on its
    /// own. Callers apply the result through [`Progress::raise_to`] so the
    /// bar stays monotonic.
    #[must_use]
    pub fn projected_progress(&self) -> Progress {
        if self.images_ready {
            Progress::COMPLETE
        } else if self.fonts_ready {
            Progress::FONTS_READY
        } else {
            Progress::ZERO
        }
    }
}

// ============================================================================
// Visitor classification
// ============================================================================

/// Visitor classification, resolved once per session from the persisted
/// visit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorClass {
    /// No visit flag found (or storage unavailable).
    First,
    /// The visit flag is present; the gate never closes.
    Returning,
}

impl VisitorClass {
    #[must_use]
    pub fn is_first(self) -> bool {
        matches!(self, Self::First)
    }
}

// ============================================================================
// Image census
// ============================================================================

/// Counts of image elements present on the render surface at one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCensus {
    /// Images currently present on the surface.
    pub present: usize,
    /// How many of those have finished decoding.
    pub complete: usize,
}

impl ImageCensus {
    /// Every currently-present image is decode-complete.
    ///
    /// An empty surface counts as complete. Images inserted after a census
    /// are picked up by the next poll, or never if the gate already opened.
    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.complete >= self.present
    }
}

// ============================================================================
// Gate output
// ============================================================================

/// Orchestrator output consumed by the reveal surface, re-emitted on every
/// observable state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    /// Whether the reveal surface should still cover the content.
    pub is_loading: bool,
    /// Current loading progress.
    pub progress: Progress,
    /// Whether this session belongs to a first-time visitor.
    pub is_first_visit: bool,
}

impl GateSnapshot {
    /// Snapshot of an already-open gate: a returning visitor, or a surface
    /// that has not been classified yet.
    #[must_use]
    pub fn open() -> Self {
        Self {
            is_loading: false,
            progress: Progress::COMPLETE,
            is_first_visit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_to_scale() {
        assert_eq!(Progress::new(250).percent(), 100);
        assert_eq!(Progress::new(42).percent(), 42);
    }

    #[test]
    fn progress_only_rises() {
        let mut progress = Progress::ZERO;
        progress.raise_to(Progress::FONTS_READY);
        assert_eq!(progress.percent(), 50);
        progress.raise_to(Progress::new(30));
        assert_eq!(progress.percent(), 50);
        progress.raise_to(Progress::COMPLETE);
        assert!(progress.is_complete());
    }

    #[test]
    fn vector_requires_all_three_signals() {
        let mut vector = ReadinessVector::default();
        assert!(!vector.all_satisfied());
        vector.set_fonts_ready();
        vector.set_images_ready();
        assert!(!vector.all_satisfied());
        vector.set_min_dwell_elapsed();
        assert!(vector.all_satisfied());
    }

    #[test]
    fn projection_ignores_dwell_timer() {
        let mut vector = ReadinessVector::default();
        assert_eq!(vector.projected_progress(), Progress::ZERO);
        vector.set_min_dwell_elapsed();
        assert_eq!(vector.projected_progress(), Progress::ZERO);
        vector.set_fonts_ready();
        assert_eq!(vector.projected_progress(), Progress::FONTS_READY);
        vector.set_images_ready();
        assert_eq!(vector.projected_progress(), Progress::COMPLETE);
    }

    #[test]
    fn projection_with_images_but_no_fonts_is_complete() {
        let mut vector = ReadinessVector::default();
        vector.set_images_ready();
        assert_eq!(vector.projected_progress(), Progress::COMPLETE);
    }

    #[test]
    fn satisfy_all_forces_every_signal() {
        let mut vector = ReadinessVector::default();
        vector.satisfy_all();
        assert!(vector.fonts_ready());
        assert!(vector.images_ready());
        assert!(vector.min_dwell_elapsed());
    }

    #[test]
    fn empty_census_is_complete() {
        assert!(ImageCensus::default().all_complete());
    }

    #[test]
    fn pending_images_are_not_complete() {
        let census = ImageCensus {
            present: 3,
            complete: 2,
        };
        assert!(!census.all_complete());
        let census = ImageCensus {
            present: 3,
            complete: 3,
        };
        assert!(census.all_complete());
    }

    #[test]
    fn open_snapshot_reports_full_progress() {
        let snapshot = GateSnapshot::open();
        assert!(!snapshot.is_loading);
        assert!(snapshot.progress.is_complete());
        assert!(!snapshot.is_first_visit);
    }
}
