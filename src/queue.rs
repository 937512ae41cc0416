//! Unbounded async FIFO of audio chunks.
//!
//! The sole synchronization point between the blocking producer loop and
//! the async consumer: pushes never block or fail, pops suspend until an
//! item is available. `clear` works from any thread, which is what lets
//! `StreamController::start` discard stale chunks while a consumer may be
//! waiting.

use crate::sources::AudioChunk;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

#[derive(Default)]
pub struct ChunkQueue {
    items: Mutex<VecDeque<AudioChunk>>,
    notify: Notify,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<AudioChunk>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Enqueue a chunk. Never blocks.
    pub fn push(&self, chunk: AudioChunk) {
        self.items().push_back(chunk);
        self.notify.notify_one();
    }

    /// Dequeue the oldest chunk, suspending until one is available.
    pub async fn pop(&self) -> AudioChunk {
        loop {
            let notified = self.notify.notified();

            if let Some(chunk) = self.items().pop_front() {
                return chunk;
            }

            notified.await;
        }
    }

    /// Dequeue without waiting.
    pub fn try_pop(&self) -> Option<AudioChunk> {
        self.items().pop_front()
    }

    /// Discard everything currently queued.
    pub fn clear(&self) {
        self.items().clear();
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}
