use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Upper bound (exclusive) of the simulated perimeter measurement.
pub const MAX_SIMULATED_PERIMETER: u32 = 100;

/// Measures a single store image.
///
/// The pipeline only depends on this trait, so tests can plug in
/// deterministic outputs.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image_url: &str) -> Result<f64, AnalysisError>;
}

/// Stand-in for real image analysis: waits, then returns a random integer
/// perimeter in `[0, MAX_SIMULATED_PERIMETER)`.
pub struct SimulatedAnalyzer {
    delay: Duration,
}

impl SimulatedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ImageAnalyzer for SimulatedAnalyzer {
    async fn analyze(&self, image_url: &str) -> Result<f64, AnalysisError> {
        if image_url.is_empty() {
            return Err(AnalysisError::EmptyUrl);
        }

        tokio::time::sleep(self.delay).await;
        let perimeter = rand::thread_rng().gen_range(0..MAX_SIMULATED_PERIMETER);
        tracing::trace!(image_url, perimeter, "Simulated perimeter");
        Ok(f64::from(perimeter))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("image URL is empty")]
    EmptyUrl,

    #[error("image analysis failed: {0}")]
    Failed(String),
}
