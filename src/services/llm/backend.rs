use async_trait::async_trait;

use crate::error::{InferenceError, SynthesisError};
use crate::vision::input::ImageInput;

/// The external generative service, seen from the session.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends the image with the perception prompt and returns the raw reply text.
    async fn perceive(&self, image: &ImageInput) -> Result<String, InferenceError>;

    /// Returns base64 encoded 24 kHz mono 16-bit PCM.
    async fn synthesize(&self, text: &str) -> Result<String, SynthesisError>;
}
