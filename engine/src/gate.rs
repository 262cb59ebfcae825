//! The readiness gate: when may primary content be revealed?
//!
//! [`ReadinessGate`] combines three independent readiness signals with a
//! visit-history check. It is a synchronous state machine: callers feed it
//! signals and clock readings, and it never blocks, spawns, or sleeps. The
//! async half lives in [`crate::driver`].

use std::time::{Duration, Instant};

use curtain_types::{GateSnapshot, ImageCensus, Progress, ReadinessVector, VisitorClass};

use crate::store::{VISITED_KEY, VISITED_VALUE, VisitStore};
use crate::surface::FontFault;

/// Timing knobs for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Minimum time the reveal is delayed, so fast loads do not flash.
    pub min_display: Duration,
    /// Upper bound after which the gate opens no matter what.
    pub max_display: Duration,
    /// Pause at 100% before the gate opens, so the full bar is seen.
    pub settle: Duration,
    /// Census cadence while waiting on images.
    pub image_poll: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_display: Duration::from_millis(1000),
            max_display: Duration::from_millis(5000),
            settle: Duration::from_millis(200),
            image_poll: Duration::from_millis(100),
        }
    }
}

#[derive(Debug)]
enum Phase {
    /// Not yet activated; reports an open gate.
    Inert,
    /// First visit, gathering readiness signals.
    Gathering {
        started: Instant,
        signals: ReadinessVector,
        /// Set once the conjunction holds; the gate opens when it expires.
        settle_at: Option<Instant>,
    },
    /// Terminal: the gate never closes again this session.
    Open,
}

/// The readiness-gating state machine.
///
/// Lifecycle: construct, [`activate`](Self::activate) once the surface is
/// interactive, then feed it signals and clock readings until
/// [`is_loading`](Self::is_loading) turns false. Only one instance exists
/// per session, so the write-once visit flag cannot race with itself.
pub struct ReadinessGate {
    config: GateConfig,
    store: Box<dyn VisitStore>,
    phase: Phase,
    progress: Progress,
    visitor: VisitorClass,
    flag_written: bool,
}

impl ReadinessGate {
    #[must_use]
    pub fn new(config: GateConfig, store: Box<dyn VisitStore>) -> Self {
        Self {
            config,
            store,
            phase: Phase::Inert,
            progress: Progress::COMPLETE,
            visitor: VisitorClass::Returning,
            flag_written: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Classify the visitor and start the gating session.
    ///
    /// Deliberately separate from construction: classification must not run
    /// until the surface is interactive, so the first rendered frame and
    /// the first classified frame agree. Idempotent after the first call.
    pub fn activate(&mut self, now: Instant) {
        if !matches!(self.phase, Phase::Inert) {
            return;
        }
        let visited = match self.store.get(VISITED_KEY) {
            Ok(entry) => entry.is_some(),
            Err(err) => {
                tracing::warn!("Visit store unavailable, treating session as first visit: {err}");
                false
            }
        };
        if visited {
            self.visitor = VisitorClass::Returning;
            self.progress = Progress::COMPLETE;
            self.phase = Phase::Open;
            tracing::debug!("Returning visitor, gate open immediately");
        } else {
            self.visitor = VisitorClass::First;
            self.progress = Progress::ZERO;
            self.phase = Phase::Gathering {
                started: now,
                signals: ReadinessVector::default(),
                settle_at: None,
            };
            tracing::debug!("First visit, gathering readiness signals");
        }
    }

    /// Outcome of the font readiness signal.
    ///
    /// Failure is logged and then treated exactly like success; fonts can
    /// delay the reveal but never block it.
    pub fn fonts_settled(&mut self, outcome: Result<(), FontFault>) {
        if let Err(fault) = outcome {
            tracing::warn!("Font loading failed: {fault}");
        }
        if let Phase::Gathering { signals, .. } = &mut self.phase {
            signals.set_fonts_ready();
            self.progress.raise_to(signals.projected_progress());
        }
    }

    /// Feed an image census.
    ///
    /// Monotonic: once the signal is satisfied, later censuses are ignored.
    /// Images inserted after that point are deliberately not awaited.
    pub fn observe_images(&mut self, census: ImageCensus) {
        if let Phase::Gathering { signals, .. } = &mut self.phase
            && !signals.images_ready()
            && census.all_complete()
        {
            signals.set_images_ready();
            self.progress.raise_to(signals.projected_progress());
        }
    }

    /// Whether the image signal is still being waited on.
    #[must_use]
    pub fn awaiting_images(&self) -> bool {
        matches!(&self.phase, Phase::Gathering { signals, .. } if !signals.images_ready())
    }

    /// Advance the clock-driven transitions: minimum dwell, the bounded-wait
    /// fallback, and the settle delay that finally opens the gate.
    pub fn tick(&mut self, now: Instant) {
        let open_now = match &mut self.phase {
            Phase::Gathering {
                started,
                signals,
                settle_at,
            } => {
                if !signals.min_dwell_elapsed() && now >= *started + self.config.min_display {
                    signals.set_min_dwell_elapsed();
                }

                if !signals.all_satisfied() && now >= *started + self.config.max_display {
                    tracing::warn!(
                        "Readiness signals incomplete at max display time, forcing gate open"
                    );
                    signals.satisfy_all();
                }

                self.progress.raise_to(signals.projected_progress());

                if signals.all_satisfied() && settle_at.is_none() {
                    self.progress.raise_to(Progress::COMPLETE);
                    *settle_at = Some(now + self.config.settle);
                }

                matches!(*settle_at, Some(deadline) if now >= deadline)
            }
            Phase::Inert | Phase::Open => false,
        };

        if open_now {
            self.phase = Phase::Open;
            tracing::debug!("Gate open");
            self.write_visit_flag();
        }
    }

    /// Earliest pending clock deadline, if any.
    ///
    /// While signals are outstanding this is the sooner of the dwell and
    /// bounded-wait deadlines; once the conjunction holds it is the settle
    /// deadline; an open (or inert) gate has none.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let Phase::Gathering {
            started,
            signals,
            settle_at,
        } = &self.phase
        else {
            return None;
        };
        if let Some(deadline) = settle_at {
            return Some(*deadline);
        }
        let mut next = *started + self.config.max_display;
        if !signals.min_dwell_elapsed() {
            next = next.min(*started + self.config.min_display);
        }
        Some(next)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Gathering { .. })
    }

    #[must_use]
    pub fn visitor_class(&self) -> VisitorClass {
        self.visitor
    }

    /// Current output triple.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            is_loading: self.is_loading(),
            progress: self.progress,
            is_first_visit: self.visitor.is_first(),
        }
    }

    // Write-once, and only after the gate has opened.
    fn write_visit_flag(&mut self) {
        if self.flag_written || !self.visitor.is_first() {
            return;
        }
        self.flag_written = true;
        if let Err(err) = self.store.set(VISITED_KEY, VISITED_VALUE) {
            tracing::warn!("Failed to persist visit flag: {err}");
        }
    }
}
