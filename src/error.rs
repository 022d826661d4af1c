use thiserror::Error;

/// Vector math preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Failures talking to the inference service.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no API credential configured (set GEMINI_API_KEY or API_KEY)")]
    MissingCredential,

    #[error("inference transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference response carried no candidate text")]
    EmptyResponse,
}

/// The service answered, but not with the schema we asked for.
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing mandatory field `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` must have {expected} components, got {actual}")]
    VectorLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{field}` contains a non-finite number")]
    NonFinite { field: &'static str },
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no API credential configured (set GEMINI_API_KEY or API_KEY)")]
    MissingCredential,

    #[error("speech transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("speech service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("speech response carried no audio payload")]
    NoAudio,

    #[error("audio payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("image payload is empty")]
    Empty,
}

/// Everything that can end a cycle early.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("a cycle is already in flight")]
    Busy,

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl CycleError {
    /// Short stable label used in telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Busy => "busy",
            CycleError::Inference(_) => "inference",
            CycleError::Malformed(_) => "malformed",
            CycleError::Image(_) => "image",
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("a playback is already active")]
    Busy,

    #[error("playback I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode WAV: {0}")]
    Wav(#[from] hound::Error),
}
