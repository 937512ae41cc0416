//! Test infrastructure for audio-intake integration tests.
//!
//! Provides a scripted container engine, RTP packet builders, and WAV
//! fixture helpers so the pipeline can be exercised without external
//! media.

#![allow(dead_code)]

use audio_intake::error::StreamError;
use audio_intake::sources::container::{AudioFrame, ContainerEngine, ContainerProvider};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A container engine that replays a prepared list of frames/errors and
/// counts how many times it gets released (dropped).
pub struct ScriptedEngine {
    frames: VecDeque<Result<AudioFrame, StreamError>>,
    released: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new(
        frames: Vec<Result<AudioFrame, StreamError>>,
        released: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            frames: frames.into(),
            released,
        }
    }
}

impl ContainerEngine for ScriptedEngine {
    fn next_frame(&mut self) -> Result<Option<AudioFrame>, StreamError> {
        match self.frames.pop_front() {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Container provider backed by a scripted engine. Returns the release
/// counter alongside the provider.
pub fn scripted_provider(
    frames: Vec<Result<AudioFrame, StreamError>>,
) -> (ContainerProvider, Arc<AtomicUsize>) {
    let released = Arc::new(AtomicUsize::new(0));

    let provider = {
        let released = released.clone();
        ContainerProvider::with_engine(
            "scripted://test",
            None,
            Box::new(move |_, _| {
                Ok(Box::new(ScriptedEngine::new(frames, released)) as Box<dyn ContainerEngine>)
            }),
        )
    };

    (provider, released)
}

/// A decoded mono frame at 8kHz, long enough to always produce resampler
/// output.
pub fn tone_frame(samples: usize) -> AudioFrame {
    AudioFrame {
        sample_rate: 8000,
        channels: 1,
        samples: (0..samples).map(|i| ((i % 100) as i16 - 50) * 100).collect(),
    }
}

/// Build an RTP packet (version 2, payload type 96) carrying the samples
/// as big-endian s16.
pub fn build_rtp(sequence: u16, samples: &[i16]) -> Vec<u8> {
    let mut packet = vec![0x80, 0x60];
    packet.extend_from_slice(&sequence.to_be_bytes());
    packet.extend_from_slice(&(sequence as u32 * samples.len() as u32).to_be_bytes());
    packet.extend_from_slice(&0x1234_5678u32.to_be_bytes());

    for &sample in samples {
        packet.extend_from_slice(&sample.to_be_bytes());
    }

    packet
}

/// Write a 1-second mono s16 WAV test asset at the given rate.
pub fn write_test_wav(path: &Path, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    for i in 0..sample_rate {
        let phase = i as f64 * 440.0 / sample_rate as f64;
        let sample = ((phase * std::f64::consts::PI * 2.0).sin() * 8000.0) as i16;
        writer.write_sample(sample).unwrap();
    }

    writer.finalize().unwrap();
}
