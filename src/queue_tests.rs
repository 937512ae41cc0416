//! Unit tests for the queue module

#[cfg(test)]
mod tests {
    use crate::queue::ChunkQueue;
    use crate::sources::AudioChunk;
    use std::sync::Arc;
    use std::time::Duration;

    fn chunk(byte: u8) -> AudioChunk {
        AudioChunk::from(vec![byte; 4])
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = ChunkQueue::new();

        queue.push(chunk(1));
        queue.push(chunk(2));
        queue.push(chunk(3));

        assert_eq!(queue.pop().await, chunk(1));
        assert_eq!(queue.pop().await, chunk(2));
        assert_eq!(queue.pop().await, chunk(3));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_clear_discards_everything() {
        let queue = ChunkQueue::new();

        queue.push(chunk(1));
        queue.push(chunk(2));
        assert_eq!(queue.len(), 2);

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.try_pop(), None);
    }

    #[tokio::test]
    async fn test_pending_pop_wakes_on_push() {
        let queue = Arc::new(ChunkQueue::new());

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        // Give the waiter a chance to suspend before pushing
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(chunk(7));

        let received = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("pop should have been woken")
            .unwrap();

        assert_eq!(received, chunk(7));
    }

    #[tokio::test]
    async fn test_empty_sentinel_round_trips() {
        let queue = ChunkQueue::new();

        queue.push(AudioChunk::new());

        let received = queue.pop().await;
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_try_pop_does_not_wait() {
        let queue = ChunkQueue::new();

        assert_eq!(queue.try_pop(), None);

        queue.push(chunk(9));
        assert_eq!(queue.try_pop(), Some(chunk(9)));
        assert_eq!(queue.try_pop(), None);
    }
}
