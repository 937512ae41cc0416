//! Container/stream audio provider.
//!
//! Decodes a demuxed audio-capable source (file path or stream URL) into
//! normalized PCM. The demux/decode engine sits behind the
//! `ContainerEngine` trait; `SymphoniaEngine` is the default
//! implementation for local files.

use crate::{
    constants::DEFAULT_IO_TIMEOUT,
    error::StreamError,
    resample::StreamResampler,
    sources::{pcm_bytes, AudioChunk, AudioProvider, ProviderControl},
};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Open options passed to the demux/decode engine: a key/value table in
/// the engine's own vocabulary, plus an I/O timeout.
#[derive(Clone, Debug, Default)]
pub struct OpenOptions {
    pub options: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl OpenOptions {
    /// Defaults tuned for low latency, applied when the caller supplies no
    /// explicit options. Real-time streaming locators additionally get a
    /// reliable-transport preference and audio-only media negotiation.
    pub fn low_latency(locator: &str) -> Self {
        let mut options = BTreeMap::new();
        options.insert("fflags".to_string(), "nobuffer".to_string());
        options.insert("flags".to_string(), "low_delay".to_string());
        // The engine expects microseconds here
        options.insert("timeout".to_string(), "5000000".to_string());

        if locator.starts_with("rtsp") {
            options.insert("rtsp_flags".to_string(), "prefer_tcp".to_string());
            options.insert("allowed_media_types".to_string(), "audio".to_string());
        }

        Self {
            options,
            timeout: Some(DEFAULT_IO_TIMEOUT),
        }
    }
}

/// One decoded frame in the engine's native rate/layout, interleaved s16.
#[derive(Clone, Debug)]
pub struct AudioFrame {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

/// The demux/decode engine contract the provider needs: yield decoded
/// frames until EOF, release resources on drop.
pub trait ContainerEngine: Send {
    fn next_frame(&mut self) -> Result<Option<AudioFrame>, StreamError>;
}

/// Deferred engine constructor, consumed by `start()`. Lets tests inject a
/// scripted engine in place of symphonia.
pub type EngineFactory =
    Box<dyn FnOnce(&str, &OpenOptions) -> Result<Box<dyn ContainerEngine>, StreamError> + Send>;

pub struct ContainerProvider {
    control: ProviderControl,
    locator: String,
    options: Option<OpenOptions>,
    factory: Option<EngineFactory>,
    engine: Option<Box<dyn ContainerEngine>>,
    resampler: Option<StreamResampler>,
}

impl ContainerProvider {
    pub fn new(locator: impl Into<String>, options: Option<OpenOptions>) -> Self {
        Self::with_engine(
            locator,
            options,
            Box::new(|locator, options| {
                SymphoniaEngine::open(locator, options)
                    .map(|engine| Box::new(engine) as Box<dyn ContainerEngine>)
            }),
        )
    }

    /// Construct with a custom engine factory.
    pub fn with_engine(
        locator: impl Into<String>,
        options: Option<OpenOptions>,
        factory: EngineFactory,
    ) -> Self {
        Self {
            control: ProviderControl::new(),
            locator: locator.into(),
            options,
            factory: Some(factory),
            engine: None,
            resampler: None,
        }
    }

    /// Drop the engine, closing the underlying resource. Safe to call on
    /// every terminal path; only the first call does anything.
    fn release(&mut self) {
        if self.engine.take().is_some() {
            debug!("container engine released");
        }
    }
}

impl AudioProvider for ContainerProvider {
    fn start(&mut self) -> Result<(), StreamError> {
        debug!("starting container source {}", self.locator);

        let options = self
            .options
            .take()
            .unwrap_or_else(|| OpenOptions::low_latency(&self.locator));

        let factory = self.factory.take().ok_or_else(|| StreamError::SourceOpen {
            locator: self.locator.clone(),
            reason: "provider already started".to_string(),
        })?;

        self.engine = Some(factory(&self.locator, &options)?);

        debug!("container source started");
        Ok(())
    }

    fn next_chunk(&mut self) -> Result<Option<AudioChunk>, StreamError> {
        loop {
            if self.control.closed() {
                self.release();
                return Ok(None);
            }

            let Some(engine) = self.engine.as_mut() else {
                // Never started, or the sequence already terminated
                return Ok(None);
            };

            let frame = match engine.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.release();
                    return Ok(None);
                }
                Err(e) => {
                    // Decode failures end the sequence, they are not fatal
                    // to the caller
                    debug!("stream exception: {e}");
                    self.release();
                    return Ok(None);
                }
            };

            if !self.control.enabled() {
                // Dropped, not buffered
                continue;
            }

            let needs_new = self
                .resampler
                .as_ref()
                .map(|r| r.input_rate() != frame.sample_rate)
                .unwrap_or(true);

            if needs_new {
                match StreamResampler::new(frame.sample_rate) {
                    Ok(resampler) => self.resampler = Some(resampler),
                    Err(e) => {
                        debug!("stream exception: {e}");
                        self.release();
                        return Ok(None);
                    }
                }
            }

            let Some(resampler) = self.resampler.as_mut() else {
                return Ok(None);
            };

            let mono = downmix(&frame.samples, frame.channels);

            match resampler.process(&mono) {
                // A frame may expand to zero output while the resampler
                // accumulates; never yield an empty chunk here since empty
                // means end-of-stream to the consumer
                Ok(output) if output.is_empty() => continue,
                Ok(output) => return Ok(Some(pcm_bytes(&output))),
                Err(e) => {
                    debug!("stream exception: {e}");
                    self.release();
                    return Ok(None);
                }
            }
        }
    }

    fn control(&self) -> ProviderControl {
        self.control.clone()
    }
}

/// Average interleaved channels down to mono.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Symphonia-backed engine for local files.
pub struct SymphoniaEngine {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_buf: Option<SampleBuffer<i16>>,
    sample_rate: u32,
    channels: u16,
}

impl SymphoniaEngine {
    pub fn open(locator: &str, _options: &OpenOptions) -> Result<Self, StreamError> {
        let open_err = |reason: String| StreamError::SourceOpen {
            locator: locator.to_string(),
            reason,
        };

        let file = File::open(Path::new(locator)).map_err(|e| open_err(e.to_string()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let hint = Hint::new();
        let format_opts: FormatOptions = Default::default();
        let metadata_opts: MetadataOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| open_err(e.to_string()))?;

        let format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| open_err("no audio track".to_string()))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| open_err(e.to_string()))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_buf: None,
            sample_rate: 0,
            channels: 0,
        })
    }
}

impl ContainerEngine for SymphoniaEngine {
    fn next_frame(&mut self) -> Result<Option<AudioFrame>, StreamError> {
        loop {
            let packet = match self.format.next_packet() {
                // Symphonia returns UnexpectedEof even when the EOF was
                // expected, handle this gracefully
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(StreamError::Decode(e.to_string())),
                Ok(packet) => packet,
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let audio_buf = self
                .decoder
                .decode(&packet)
                .map_err(|e| StreamError::Decode(e.to_string()))?;

            // First decoded packet defines the buffer spec
            if self.sample_buf.is_none() {
                let spec = *audio_buf.spec();
                let duration = audio_buf.capacity() as u64;

                self.sample_rate = spec.rate;
                self.channels = spec.channels.count() as u16;
                self.sample_buf = Some(SampleBuffer::<i16>::new(duration, spec));
            }

            let Some(buf) = self.sample_buf.as_mut() else {
                return Ok(None);
            };

            buf.copy_interleaved_ref(audio_buf);

            return Ok(Some(AudioFrame {
                sample_rate: self.sample_rate,
                channels: self.channels,
                samples: buf.samples().to_vec(),
            }));
        }
    }
}
