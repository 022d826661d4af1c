#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use cortex::error::{InferenceError, SynthesisError};
use cortex::services::llm::backend::InferenceBackend;
use cortex::vision::input::ImageInput;

pub const SAMPLE_RESPONSE: &str = r#"{
  "sensoryVector": [0.8, 0.9, 0.1, 0.5],
  "predictionVector": [0.7, 0.9, 0.0, 0.6],
  "v1": { "edges": "Sharp/High-Freq", "contrast": 0.9, "motion": "Static" },
  "it": { "objectLabel": "Coffee Mug", "category": "Artifact", "confidence": 0.95 },
  "pfc": { "prediction": "Expect office stationary object", "context": "Work environment" },
  "motor": { "action": "Reach and Grasp", "target": "Handle", "confidence": 0.88, "reasoning": "Object affords grasping" },
  "activations": { "v1": 85, "it": 92, "pfc": 60, "motor": 45 },
  "narrative": "Received bottom-up stream. Low surprise. Motor Cortex preparing grasp action."
}"#;

pub enum Reply {
    Text(String),
    Status(u16),
}

/// Scripted backend. Replies are consumed in order; the last one repeats.
pub struct MockBackend {
    replies: Mutex<VecDeque<Reply>>,
    audio: Mutex<Option<String>>,
    pub calls: AtomicUsize,
    /// Signalled when `perceive` is entered.
    pub entered: Notify,
    /// When set, `perceive` waits for a permit before answering.
    pub gate: Option<Notify>,
}

impl MockBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            audio: Mutex::new(None),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(vec![Reply::Text(SAMPLE_RESPONSE.to_string())])
    }

    pub fn gated() -> Self {
        let mut backend = Self::ok();
        backend.gate = Some(Notify::new());
        backend
    }

    pub fn with_audio(self, base64: &str) -> Self {
        *self.audio.lock().unwrap() = Some(base64.to_string());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn perceive(&self, _image: &ImageInput) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().map(|r| match r {
                Reply::Text(t) => Reply::Text(t.clone()),
                Reply::Status(s) => Reply::Status(*s),
            })
        };
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Status(status)) => Err(InferenceError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(InferenceError::EmptyResponse),
        }
    }

    async fn synthesize(&self, _text: &str) -> Result<String, SynthesisError> {
        self.audio.lock().unwrap().clone().ok_or(SynthesisError::NoAudio)
    }
}

pub fn sample_image() -> ImageInput {
    ImageInput::from_data_uri_or_base64("data:image/png;base64,iVBORw0KGgo=").unwrap()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
