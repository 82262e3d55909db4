use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use crossbeam::queue::ArrayQueue;

use super::message::Message;

/// A named FIFO queue.
///
/// The buffer is a crossbeam `ArrayQueue` that starts at the configured
/// initial capacity and grows by one chunk whenever free space drops below
/// half a chunk, preserving order. Push and pop go through the read side of
/// the lock; only a growth swap takes the write side.
pub struct MessageQueue {
    name: String,
    inner: RwLock<ArrayQueue<Message>>,
    grow_chunk: usize,
    stats: QueueStats,
}

#[derive(Default)]
pub struct QueueStats {
    enqueued_total: AtomicU64,
    dequeued_total: AtomicU64,
}

impl QueueStats {
    pub fn enqueued_total(&self) -> u64 {
        self.enqueued_total.load(Ordering::SeqCst)
    }

    pub fn dequeued_total(&self) -> u64 {
        self.dequeued_total.load(Ordering::SeqCst)
    }
}

impl MessageQueue {
    pub fn new(name: String, capacity: usize) -> Self {
        // A zero-capacity ArrayQueue panics; a queue that can never hold a
        // message is useless anyway.
        let capacity = capacity.max(1);
        Self {
            name,
            inner: RwLock::new(ArrayQueue::new(capacity)),
            grow_chunk: capacity,
            stats: QueueStats::default(),
        }
    }

    pub fn enqueue(&self, body: String) -> Message {
        let message = Message::new(body);
        self.push_raw(message.clone());
        self.stats.enqueued_total.fetch_add(1, Ordering::SeqCst);
        message
    }

    pub fn dequeue(&self) -> Option<Message> {
        let message = self.read_queue().pop();
        if message.is_some() {
            self.stats.dequeued_total.fetch_add(1, Ordering::SeqCst);
        }
        message
    }

    /// Rotate the queue: `n` times, pop the head and push it back onto the
    /// tail. Stops early only when the queue is empty. Counters are not
    /// touched since the queue contents do not change.
    pub fn rotate(&self, n: usize) {
        for _ in 0..n {
            let popped = self.read_queue().pop();
            match popped {
                Some(message) => self.push_raw(message),
                None => break,
            }
        }
    }

    pub fn size(&self) -> usize {
        self.read_queue().len()
    }

    pub fn capacity(&self) -> usize {
        self.read_queue().capacity()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    fn read_queue(&self) -> RwLockReadGuard<'_, ArrayQueue<Message>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn push_raw(&self, message: Message) {
        self.maybe_grow();
        let mut message = message;
        loop {
            match self.read_queue().push(message) {
                Ok(()) => return,
                // Filled up between the headroom check and the push.
                Err(rejected) => message = rejected,
            }
            self.grow();
        }
    }

    // Grow when free space drops below half a chunk, the same rule the
    // queue's fixed-size predecessor buffers used.
    fn maybe_grow(&self) {
        let threshold = self.grow_chunk / 2;
        let needs_grow = {
            let queue = self.read_queue();
            queue.capacity() - queue.len() < threshold
        };
        if needs_grow {
            self.grow();
        }
    }

    fn grow(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let threshold = self.grow_chunk / 2;
        if guard.capacity() - guard.len() >= threshold.max(1) {
            // Another writer already grew the buffer.
            return;
        }
        let bigger = ArrayQueue::new(guard.capacity() + self.grow_chunk);
        while let Some(message) = guard.pop() {
            // Cannot fail: the new buffer is strictly larger.
            let _ = bigger.push(message);
        }
        *guard = bigger;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_past_initial_capacity_in_order() {
        let queue = MessageQueue::new("grow".to_string(), 4);

        for i in 0..100 {
            queue.enqueue(format!("m{}", i));
        }

        assert_eq!(queue.size(), 100);
        assert!(queue.capacity() >= 100);
        for i in 0..100 {
            assert_eq!(queue.dequeue().unwrap().body, format!("m{}", i));
        }
    }
}
