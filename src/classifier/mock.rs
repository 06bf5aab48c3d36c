use std::fmt;
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// How long the pretend backend call takes unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Cat,
    Dog,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Cat => f.write_str("Cat"),
            Label::Dog => f.write_str("Dog"),
        }
    }
}

/// Result of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Percentage in [70, 100], rounded to two decimals.
    pub confidence: f64,
    /// Dimensions of the decoded upload.
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Please select an image first")]
    NoImageSelected,

    #[error("Failed to process image. Please try again.")]
    UnreadableImage(#[source] image::ImageError),
}

/// Stand-in for a cat/dog classification service.
///
/// It checks that the upload really is an image, waits `delay` to mimic a
/// round trip, and then makes up an answer. There is no model behind it.
pub struct MockClassifier<R = ChaCha8Rng> {
    rng: R,
    delay: Duration,
}

impl MockClassifier<ChaCha8Rng> {
    pub fn seeded(seed: u64, delay: Duration) -> Self {
        MockClassifier::new(ChaCha8Rng::seed_from_u64(seed), delay)
    }

    pub fn from_entropy(delay: Duration) -> Self {
        MockClassifier::new(ChaCha8Rng::from_entropy(), delay)
    }
}

impl<R: Rng> MockClassifier<R> {
    pub fn new(rng: R, delay: Duration) -> Self {
        MockClassifier { rng, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn classify(&mut self, upload: Option<&[u8]>) -> Result<Prediction, ClassifyError> {
        let bytes = match upload {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(ClassifyError::NoImageSelected),
        };

        let img = image::load_from_memory(bytes).map_err(ClassifyError::UnreadableImage)?;
        debug!(width = img.width(), height = img.height(), "upload decoded");

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let label = if self.rng.gen::<f64>() > 0.5 { Label::Cat } else { Label::Dog };
        let confidence = round2(self.rng.gen::<f64>() * 30.0 + 70.0);
        info!(%label, confidence, "mock classification");

        Ok(Prediction { label, confidence, width: img.width(), height: img.height() })
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
