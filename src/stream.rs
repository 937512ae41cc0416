//! Stream controller: owns the active provider, runs its blocking pump,
//! and exposes the async chunk queue to the consumer.

use crate::{
    error::StreamError,
    queue::ChunkQueue,
    sources::{
        container::{ContainerProvider, OpenOptions},
        packet::PacketStreamProvider,
        AudioChunk, AudioProvider, ProviderControl,
    },
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Clonable handle to one acquisition stream.
///
/// At most one provider is active at a time. The blocking pump (`run`)
/// executes on a dedicated worker (`tokio::task::spawn_blocking`) while
/// the host gates data flow with `start`/`stop`, terminates with `close`,
/// and a single consumer task awaits chunks via `recv`.
#[derive(Clone, Default)]
pub struct StreamController {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    slot: Mutex<ProviderSlot>,
    queue: ChunkQueue,
}

#[derive(Default)]
struct ProviderSlot {
    /// Taken by `run()`; control outlives it for lifecycle calls.
    active: Option<Box<dyn AudioProvider>>,
    control: Option<ProviderControl>,
}

impl StreamController {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, ProviderSlot> {
        match self.inner.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn control(&self) -> Option<ProviderControl> {
        self.slot().control.clone()
    }

    /// Open a container/stream source. Low-latency defaults apply when
    /// `options` is `None`.
    pub fn open_container(
        &self,
        locator: &str,
        options: Option<OpenOptions>,
    ) -> Result<(), StreamError> {
        debug!("container stream open");
        self.install(Box::new(ContainerProvider::new(locator, options)))
    }

    /// Open an RTP packet stream bound to `port` on all interfaces.
    pub fn open_packet_stream(&self, port: u16) -> Result<(), StreamError> {
        debug!("packet stream open");
        self.install(Box::new(PacketStreamProvider::new(port)?))
    }

    /// Start the provider and install it as the active one.
    ///
    /// A previous provider that was never closed gets its control closed
    /// here so its pump unwinds and releases the orphaned resource.
    pub fn install(&self, mut provider: Box<dyn AudioProvider>) -> Result<(), StreamError> {
        provider.start()?;
        let control = provider.control();

        let mut slot = self.slot();

        if let Some(prev) = slot.control.as_ref() {
            if !prev.closed() {
                warn!("replacing a provider that was never closed, closing it now");
                prev.close();
            }
        }

        slot.active = Some(provider);
        slot.control = Some(control);

        Ok(())
    }

    /// Blocking pump: pull every chunk from the active provider and
    /// enqueue it. Run this on a dedicated worker, not the async
    /// scheduler.
    ///
    /// The provider is always closed on exit. With `emit_end_marker` set
    /// and the provider still enabled, one empty sentinel chunk is
    /// enqueued so the consumer can tell transport-level end from a
    /// disabled stream. A pump whose provider has been replaced by a
    /// newer `open_*` suppresses the marker, so it cannot inject a false
    /// end-of-stream into the new session. Transport errors are returned
    /// to the caller after cleanup; container decode errors never reach
    /// here.
    pub fn run(&self, emit_end_marker: bool) -> Result<(), StreamError> {
        debug!("stream start");

        let provider = self.slot().active.take();
        let Some(mut provider) = provider else {
            warn!("run called without an open provider");
            return Ok(());
        };

        let control = provider.control();
        let mut result = Ok(());

        loop {
            match provider.next_chunk() {
                Ok(Some(chunk)) => self.inner.queue.push(chunk),
                Ok(None) => break,
                Err(e) => {
                    debug!("stream exception: {e}");
                    result = Err(e);
                    break;
                }
            }
        }

        provider.close();

        let still_active = self
            .control()
            .map(|active| active.same(&control))
            .unwrap_or(false);

        if emit_end_marker && still_active && provider.enabled() {
            self.inner.queue.push(AudioChunk::new());
        }

        debug!("stream end");
        result
    }

    /// Enable data flow, discarding any stale chunks first so a fresh
    /// session starts with an empty backlog.
    pub fn start(&self) {
        self.inner.queue.clear();

        if let Some(control) = self.control() {
            control.enable();
        }
    }

    /// Disable data flow. Already-enqueued chunks stay available.
    pub fn stop(&self) {
        if let Some(control) = self.control() {
            control.disable();
        }
    }

    /// Terminate acquisition. Idempotent; resource release happens on the
    /// pump side when it observes the flag.
    pub fn close(&self) {
        debug!("stream close");

        if let Some(control) = self.control() {
            control.close();
        }
    }

    /// True when no provider is installed or the active one is closed.
    pub fn closed(&self) -> bool {
        match self.control() {
            Some(control) => control.closed(),
            None => true,
        }
    }

    /// Await the next chunk. An empty chunk is the end-of-stream sentinel;
    /// the sequence never ends on its own otherwise.
    pub async fn recv(&self) -> AudioChunk {
        self.inner.queue.pop().await
    }

    /// Dequeue without waiting.
    pub fn try_recv(&self) -> Option<AudioChunk> {
        self.inner.queue.try_pop()
    }

    /// Number of chunks currently queued.
    pub fn queued(&self) -> usize {
        self.inner.queue.len()
    }
}
