//! Simulated render-surface assets for the demo.
//!
//! Stands in for a real asset pipeline: a fixed set of images that finish
//! decoding on a staggered schedule, and a font warm-up that resolves
//! shortly after startup.

use std::time::Duration;

use tokio::time::Instant;

use curtain_engine::{FontFault, ImageCensus, ImageSurface};

/// How many images the simulated page carries.
const IMAGE_COUNT: usize = 4;
/// Delay before the first image completes.
const FIRST_IMAGE_AT: Duration = Duration::from_millis(400);
/// Gap between image completions.
const IMAGE_STAGGER: Duration = Duration::from_millis(350);
/// Font warm-up time.
const FONT_WARMUP: Duration = Duration::from_millis(300);

/// Image set completing on a deterministic schedule.
#[derive(Debug, Clone)]
pub struct DemoImages {
    started: Instant,
}

impl DemoImages {
    #[must_use]
    pub fn begin() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl ImageSurface for DemoImages {
    fn image_census(&self) -> ImageCensus {
        let elapsed = self.started.elapsed();
        let complete = (0..IMAGE_COUNT)
            .filter(|slot| elapsed >= FIRST_IMAGE_AT + IMAGE_STAGGER * (*slot as u32))
            .count();
        ImageCensus {
            present: IMAGE_COUNT,
            complete,
        }
    }
}

/// Resolves once the simulated fonts are warm.
pub async fn font_warmup() -> Result<(), FontFault> {
    tokio::time::sleep(FONT_WARMUP).await;
    Ok(())
}
