use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Arc,
};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use tracing::debug;

use crate::{
    error::StageError,
    pipeline::segment::Segmenter,
    pipeline::traits::{Stage, StageContext, StageResult},
};

use super::CUTOUT;

/// Upper bound on segmenter threads alive at once, abandoned ones included
pub const MAX_WORKERS: usize = 4;

/// Runs the injected segmenter on a worker thread and gives up after
/// `cutout_timeout_ms`. Any failure falls back to grading the original photo.
///
/// A timed-out worker cannot be cancelled and runs to completion in the
/// background. Once `MAX_WORKERS` are alive, new photos skip the cutout
/// instead of spawning more.
pub struct CutoutStage {
    segmenter: Arc<dyn Segmenter>,
    workers: Arc<AtomicUsize>,
}

/// Releases a worker slot when the thread finishes, panics included
struct WorkerSlot(Arc<AtomicUsize>);

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CutoutStage {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            segmenter,
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Segmenter threads currently running
    pub fn active_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    fn claim_worker(&self) -> Option<WorkerSlot> {
        self.workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < MAX_WORKERS).then_some(n + 1))
            .ok()
            .map(|_| WorkerSlot(Arc::clone(&self.workers)))
    }

    fn segment_with_timeout(&self, image: &RgbaImage, timeout: Duration) -> StageResult {
        let slot = self.claim_worker().ok_or_else(|| {
            StageError::recoverable(
                CUTOUT,
                format!("{} segmenter workers still busy", MAX_WORKERS),
            )
        })?;

        let (sender, receiver) = mpsc::channel();
        let segmenter = Arc::clone(&self.segmenter);
        let photo = image.clone();

        thread::Builder::new()
            .name("cutout".to_string())
            .spawn(move || {
                let _slot = slot;
                // The receiver may be gone after a timeout
                let _ = sender.send(segmenter.segment(&photo));
            })
            .map_err(|e| StageError::recoverable(CUTOUT, format!("could not spawn worker: {}", e)))?;

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(StageError::recoverable(
                CUTOUT,
                format!("segmenter timed out after {} ms", timeout.as_millis()),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(StageError::recoverable(
                CUTOUT,
                "segmenter worker exited without a result",
            )),
        }
    }
}

impl Stage for CutoutStage {
    fn name(&self) -> &str {
        CUTOUT
    }

    fn description(&self) -> &str {
        "Foreground cutout with a transparent background"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        context.placement.use_cutout
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let timeout = Duration::from_millis(context.config.cutout_timeout_ms);
        debug!("Segmenting with '{}' (timeout {:?})", self.segmenter.name(), timeout);

        let cutout = self
            .segment_with_timeout(image, timeout)
            .map_err(|err| match err {
                StageError::Fatal { reason, .. } => StageError::recoverable(CUTOUT, reason),
                recoverable => recoverable,
            })?;

        if cutout.dimensions() != image.dimensions() {
            return Err(StageError::recoverable(
                CUTOUT,
                format!(
                    "segmenter returned {:?} for a {:?} photo",
                    cutout.dimensions(),
                    image.dimensions()
                ),
            ));
        }

        context.is_cutout = true;
        Ok(cutout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::pipeline::segment::{BorderKeySegmenter, NoSegmenter};
    use crate::template::Placement;
    use image::Rgba;
    use rand::{rngs::StdRng, SeedableRng};

    struct SlowSegmenter;

    impl Segmenter for SlowSegmenter {
        fn name(&self) -> &str {
            "slow"
        }

        fn segment(&self, photo: &RgbaImage) -> Result<RgbaImage, StageError> {
            thread::sleep(Duration::from_millis(500));
            Ok(photo.clone())
        }
    }

    fn run(segmenter: Arc<dyn Segmenter>, timeout_ms: u64) -> (StageResult, bool) {
        run_stage(&CutoutStage::new(segmenter), timeout_ms)
    }

    fn run_stage(stage: &CutoutStage, timeout_ms: u64) -> (StageResult, bool) {
        let placement = Placement::new(0, 0, 40, 40).cutout();
        let config = PipelineConfig {
            cutout_timeout_ms: timeout_ms,
            ..PipelineConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut context = StageContext {
            placement: &placement,
            config: &config,
            rng: &mut rng,
            is_cutout: false,
            origin_shift: (0, 0),
        };

        let photo = RgbaImage::from_fn(40, 40, |x, y| {
            if (12..28).contains(&x) && (12..28).contains(&y) {
                Rgba([20, 90, 200, 255])
            } else {
                Rgba([250, 250, 250, 255])
            }
        });
        let result = stage.apply(&photo, &mut context);
        (result, context.is_cutout)
    }

    #[test]
    fn test_successful_cutout_marks_context() {
        let (result, is_cutout) = run(Arc::new(BorderKeySegmenter::default()), 5_000);
        assert!(result.is_ok());
        assert!(is_cutout);
    }

    #[test]
    fn test_missing_segmenter_is_recoverable() {
        let (result, is_cutout) = run(Arc::new(NoSegmenter), 5_000);
        assert!(!result.unwrap_err().is_fatal());
        assert!(!is_cutout);
    }

    #[test]
    fn test_slow_segmenter_times_out() {
        let (result, is_cutout) = run(Arc::new(SlowSegmenter), 20);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(!is_cutout);
    }

    #[test]
    fn test_abandoned_workers_are_bounded() {
        let stage = CutoutStage::new(Arc::new(SlowSegmenter));
        for _ in 0..MAX_WORKERS {
            let (result, _) = run_stage(&stage, 1);
            assert!(result.unwrap_err().to_string().contains("timed out"));
        }
        assert_eq!(stage.active_workers(), MAX_WORKERS);

        let (result, is_cutout) = run_stage(&stage, 1);
        let err = result.unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("busy"));
        assert!(!is_cutout);

        // Slots free up once the stragglers finish
        thread::sleep(Duration::from_millis(1_500));
        assert_eq!(stage.active_workers(), 0);
    }
}
