use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::SynthesisError;

/// Synthesized speech is single-channel 24 kHz linear PCM.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl SpeechClip {
    /// Little-endian signed 16-bit samples. A dangling odd byte is dropped.
    pub fn from_pcm_bytes(bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self {
            samples,
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SynthesisError> {
        let bytes = STANDARD.decode(encoded.trim().as_bytes())?;
        Ok(Self::from_pcm_bytes(&bytes))
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
        Duration::from_micros(frames * 1_000_000 / self.sample_rate as u64)
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<(), hound::Error> {
        let writer = hound::WavWriter::create(path, self.wav_spec())?;
        self.write_samples(writer)
    }

    /// Writes into an already open file, e.g. a temp file held by the caller.
    pub fn write_wav_to(&self, file: &mut File) -> Result<(), hound::Error> {
        let writer = hound::WavWriter::new(BufWriter::new(file), self.wav_spec())?;
        self.write_samples(writer)
    }

    fn write_samples<W: Write + Seek>(
        &self,
        mut writer: hound::WavWriter<W>,
    ) -> Result<(), hound::Error> {
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}
