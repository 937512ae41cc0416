//! Audio source abstraction for the acquisition pipeline.
//!
//! All sources implement the `AudioProvider` trait: a blocking pull
//! interface yielding chunks of raw audio data, already normalized to
//! mono s16le PCM at 16kHz.

pub mod container;
pub mod packet;

use crate::error::StreamError;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A contiguous block of mono s16le PCM samples at 16kHz. No fixed length.
/// An empty chunk is the end-of-stream sentinel when emitted by the
/// controller.
pub type AudioChunk = Bytes;

/// Shared enable/close flags for one provider.
///
/// The pump thread blocks inside `next_chunk` while the host gates or
/// cancels from elsewhere, so the flags live behind an `Arc` the host can
/// clone off. `close` is idempotent and terminal: the flag never reverts.
#[derive(Clone, Default)]
pub struct ProviderControl {
    flags: Arc<ControlFlags>,
}

#[derive(Default)]
struct ControlFlags {
    enabled: AtomicBool,
    closed: AtomicBool,
}

impl ProviderControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.flags.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.flags.enabled.store(false, Ordering::SeqCst);
    }

    pub fn enabled(&self) -> bool {
        self.flags.enabled.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.flags.closed.store(true, Ordering::SeqCst);
    }

    pub fn closed(&self) -> bool {
        self.flags.closed.load(Ordering::SeqCst)
    }

    /// True when both handles refer to the same provider's flags.
    pub fn same(&self, other: &ProviderControl) -> bool {
        Arc::ptr_eq(&self.flags, &other.flags)
    }
}

/// Trait for audio sources that produce normalized PCM chunks on demand.
///
/// `next_chunk` is blocking and meant to run on a dedicated worker (see
/// `StreamController::run`). Lifecycle: created → started → (enabled ⇄
/// disabled) → closed. Close is observed at per-frame/per-packet
/// granularity, and any terminal return releases the underlying resource
/// exactly once.
pub trait AudioProvider: Send {
    /// Blocking setup before chunk production begins (e.g. opening the
    /// source).
    fn start(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    /// Pull the next chunk from the source.
    ///
    /// Returns:
    /// - `Ok(Some(chunk))` with the next normalized chunk
    /// - `Ok(None)` when the sequence has ended (EOF or closed)
    /// - `Err(_)` on a propagated mid-stream failure
    ///
    /// The sequence is not restartable; after a terminal return every
    /// subsequent call returns `Ok(None)`.
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>, StreamError>;

    /// Handle to the shared enable/close flags.
    fn control(&self) -> ProviderControl;

    fn enable(&self) {
        self.control().enable();
    }

    fn disable(&self) {
        self.control().disable();
    }

    fn enabled(&self) -> bool {
        self.control().enabled()
    }

    fn closed(&self) -> bool {
        self.control().closed()
    }

    /// Trigger cleanup. Only flips the flag; the pump side releases the
    /// resource when it observes it.
    fn close(&self) {
        self.control().close();
    }
}

/// Serialize mono samples to little-endian PCM bytes.
pub fn pcm_bytes(samples: &[i16]) -> AudioChunk {
    let mut data = Vec::with_capacity(samples.len() * 2);

    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }

    Bytes::from(data)
}
