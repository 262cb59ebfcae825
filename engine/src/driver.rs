//! Async orchestration of the readiness gate.
//!
//! One spawned task owns the gate and multiplexes its three wake sources:
//! the font future, the image census poll, and the next clock deadline.
//! Every wake updates the gate and emits a snapshot iff it changed, so the
//! receiver sees exactly one message per observable transition. Aborting
//! the task (or dropping [`RevealTask`]) cancels every pending timer and
//! the poll, and suppresses the visit-flag write.

use std::future::Future;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use curtain_types::GateSnapshot;

use crate::gate::ReadinessGate;
use crate::surface::{FontFault, ImageSurface};

/// Handle to a running gate task.
///
/// Receives one [`GateSnapshot`] per observable change. Dropping the handle
/// aborts the task.
pub struct RevealTask {
    events: mpsc::UnboundedReceiver<GateSnapshot>,
    abort: AbortHandle,
}

impl RevealTask {
    /// Non-blocking poll for the next snapshot (frame-loop friendly).
    pub fn try_next(&mut self) -> Option<GateSnapshot> {
        self.events.try_recv().ok()
    }

    /// Await the next snapshot; `None` once the task has finished (or was
    /// aborted) and the channel drained.
    pub async fn next(&mut self) -> Option<GateSnapshot> {
        self.events.recv().await
    }

    /// Cancel the orchestration immediately.
    pub fn abort(&self) {
        self.abort.abort();
    }
}

impl Drop for RevealTask {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Spawn the orchestration task on the current tokio runtime.
///
/// `fonts` is the render surface's "fonts ready" signal; rejection is
/// treated as success. `images` is sampled immediately after activation and
/// then on every poll tick until all present images are complete.
pub fn spawn<S, F>(gate: ReadinessGate, images: S, fonts: F) -> RevealTask
where
    S: ImageSurface + 'static,
    F: Future<Output = Result<(), FontFault>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (abort, registration) = AbortHandle::new_pair();
    let task = Abortable::new(run(gate, images, fonts, tx), registration);
    tokio::spawn(async move {
        // Err(Aborted) is the expected teardown path.
        let _ = task.await;
    });
    RevealTask { events: rx, abort }
}

async fn run<S, F>(
    mut gate: ReadinessGate,
    images: S,
    fonts: F,
    tx: mpsc::UnboundedSender<GateSnapshot>,
) where
    S: ImageSurface,
    F: Future<Output = Result<(), FontFault>>,
{
    gate.activate(Instant::now().into_std());
    let mut last = gate.snapshot();
    let _ = tx.send(last);

    // Returning visitors skip gathering entirely: no timers, no polling.
    if !last.is_loading {
        return;
    }

    tokio::pin!(fonts);
    let mut fonts_pending = true;

    // interval() rejects a zero period; clamp a degenerate config instead.
    let poll_every = gate.config().image_poll.max(Duration::from_millis(1));
    let mut poll = time::interval(poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while gate.is_loading() {
        let deadline = gate.next_deadline().map(Instant::from_std);

        tokio::select! {
            outcome = &mut fonts, if fonts_pending => {
                fonts_pending = false;
                gate.fonts_settled(outcome);
            }
            _ = poll.tick(), if gate.awaiting_images() => {
                gate.observe_images(images.image_census());
            }
            () = sleep_until_deadline(deadline) => {}
        }

        gate.tick(Instant::now().into_std());

        let snapshot = gate.snapshot();
        if snapshot != last {
            last = snapshot;
            if tx.send(snapshot).is_err() {
                // Nobody is watching; stop driving timers.
                return;
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
