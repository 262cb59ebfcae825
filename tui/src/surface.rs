//! Reveal surface lifecycle: visible indicator, exit fade, unmount.

use std::time::Duration;

use curtain_types::{GateSnapshot, Progress};

use crate::animation::{FadeClock, ease_out_cubic};

#[derive(Debug, Clone)]
enum SurfacePhase {
    Visible,
    FadingOut(FadeClock),
    Unmounted,
}

/// The loading overlay: a pure function of applied gate snapshots plus
/// elapsed frame time.
///
/// Mounted while the gate reports loading, fades out once it opens, and
/// never mounts again afterwards. If the very first snapshot already shows
/// an open gate (a returning visitor), the overlay runs its exit clock at
/// zero opacity so the completion report still fires, but nothing is drawn.
#[derive(Debug, Clone)]
pub struct RevealSurface {
    fade: Duration,
    phase: SurfacePhase,
    progress: Progress,
    seen_loading: bool,
}

impl RevealSurface {
    /// `fade` is the exit transition length; pass [`Duration::ZERO`] to
    /// unmount on the first frame after the gate opens (reduced motion).
    #[must_use]
    pub fn new(fade: Duration) -> Self {
        Self {
            fade,
            phase: SurfacePhase::Visible,
            progress: Progress::ZERO,
            seen_loading: false,
        }
    }

    /// Apply the latest gate snapshot.
    ///
    /// Progress can only move forward, and snapshots applied after the
    /// surface unmounted are ignored.
    pub fn apply(&mut self, snapshot: GateSnapshot) {
        if matches!(self.phase, SurfacePhase::Unmounted) {
            return;
        }
        self.progress.raise_to(snapshot.progress);
        if snapshot.is_loading {
            self.seen_loading = true;
        } else if matches!(self.phase, SurfacePhase::Visible) {
            self.phase = SurfacePhase::FadingOut(FadeClock::new(self.fade));
        }
    }

    /// Advance the exit fade by one frame delta.
    ///
    /// Returns true exactly once, on the frame the fade completes and the
    /// surface unmounts.
    pub fn advance(&mut self, delta: Duration) -> bool {
        let SurfacePhase::FadingOut(clock) = &mut self.phase else {
            return false;
        };
        clock.advance(delta);
        if clock.is_finished() {
            self.phase = SurfacePhase::Unmounted;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !matches!(self.phase, SurfacePhase::Unmounted)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Overlay opacity in `[0, 1]`: 1 while visible, eased toward 0 during
    /// the exit fade, 0 once unmounted or if the overlay was never shown.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        if !self.seen_loading {
            return 0.0;
        }
        match &self.phase {
            SurfacePhase::Visible => 1.0,
            SurfacePhase::FadingOut(clock) => 1.0 - ease_out_cubic(clock.completion()),
            SurfacePhase::Unmounted => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn loading(progress: u8) -> GateSnapshot {
        GateSnapshot {
            is_loading: true,
            progress: Progress::new(progress),
            is_first_visit: true,
        }
    }

    fn open(progress: u8) -> GateSnapshot {
        GateSnapshot {
            is_loading: false,
            progress: Progress::new(progress),
            is_first_visit: true,
        }
    }

    #[test]
    fn progress_never_moves_backwards() {
        let mut surface = RevealSurface::new(Duration::from_millis(500));
        surface.apply(loading(50));
        surface.apply(loading(20));
        assert_eq!(surface.progress().percent(), 50);
    }

    #[test]
    fn fade_runs_for_its_full_duration() {
        let mut surface = RevealSurface::new(Duration::from_millis(500));
        surface.apply(loading(0));
        assert!((surface.opacity() - 1.0).abs() < f32::EPSILON);

        surface.apply(open(100));
        assert!(surface.is_mounted());

        let mut completed = 0;
        for _ in 0..49 {
            if surface.advance(10 * MS) {
                completed += 1;
            }
        }
        assert!(surface.is_mounted());
        assert!(surface.opacity() < 1.0);

        if surface.advance(10 * MS) {
            completed += 1;
        }
        assert_eq!(completed, 1);
        assert!(!surface.is_mounted());
        assert!(surface.opacity().abs() < f32::EPSILON);
    }

    #[test]
    fn completion_reports_exactly_once() {
        let mut surface = RevealSurface::new(Duration::from_millis(100));
        surface.apply(loading(0));
        surface.apply(open(100));
        assert!(surface.advance(Duration::from_millis(150)));
        assert!(!surface.advance(Duration::from_millis(150)));
    }

    #[test]
    fn never_remounts_after_unmount() {
        let mut surface = RevealSurface::new(Duration::from_millis(100));
        surface.apply(loading(0));
        surface.apply(open(100));
        assert!(surface.advance(Duration::from_millis(100)));

        surface.apply(loading(10));
        assert!(!surface.is_mounted());
        assert!(surface.opacity().abs() < f32::EPSILON);
    }

    #[test]
    fn zero_fade_unmounts_on_next_advance() {
        let mut surface = RevealSurface::new(Duration::ZERO);
        surface.apply(loading(0));
        surface.apply(open(100));
        assert!(surface.advance(Duration::ZERO));
        assert!(!surface.is_mounted());
    }

    #[test]
    fn returning_visitor_overlay_is_never_visible() {
        let mut surface = RevealSurface::new(Duration::from_millis(500));
        // First observed snapshot is already open: no loading was ever shown.
        surface.apply(open(100));
        assert!(surface.opacity().abs() < f32::EPSILON);
        assert!(surface.is_mounted());

        // The exit clock still runs so the completion report fires.
        assert!(surface.advance(Duration::from_millis(500)));
        assert!(!surface.is_mounted());
    }

    #[test]
    fn opacity_decreases_during_fade() {
        let mut surface = RevealSurface::new(Duration::from_millis(400));
        surface.apply(loading(100));
        surface.apply(open(100));
        let mut previous = surface.opacity();
        for _ in 0..4 {
            surface.advance(Duration::from_millis(80));
            let current = surface.opacity();
            assert!(current <= previous);
            previous = current;
        }
    }
}
