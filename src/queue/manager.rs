use std::sync::Arc;

use dashmap::DashMap;

use super::message::Message;
use super::message_queue::MessageQueue;

/// Concurrent registry of named queues.
///
/// Queues come into existence when something is enqueued into them (or when
/// journal replay rebuilds them), never on lookup.
pub struct QueueManager {
    queues: DashMap<String, Arc<MessageQueue>>,
    init_capacity: usize,
}

impl QueueManager {
    pub fn new(init_capacity: usize) -> Self {
        Self {
            queues: DashMap::new(),
            init_capacity,
        }
    }

    pub fn get_or_create_queue(&self, name: &str) -> Arc<MessageQueue> {
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MessageQueue::new(name.to_string(), self.init_capacity)))
            .clone()
    }

    pub fn get_queue(&self, name: &str) -> Option<Arc<MessageQueue>> {
        self.queues.get(name).map(|q| q.clone())
    }

    pub fn enqueue(&self, queue_name: &str, body: String) -> Message {
        self.get_or_create_queue(queue_name).enqueue(body)
    }

    /// Pop the head of an existing queue. `None` means the queue exists but
    /// is empty; a missing queue is the caller's 404 to report.
    pub fn dequeue(&self, queue_name: &str) -> Option<Option<Message>> {
        self.get_queue(queue_name).map(|queue| queue.dequeue())
    }

    pub fn list_queues(&self) -> Vec<String> {
        self.queues.iter().map(|e| e.key().clone()).collect()
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Remove a queue, dropping any buffered messages. Returns false if no
    /// such queue existed.
    pub fn delete_queue(&self, name: &str) -> bool {
        self.queues.remove(name).is_some()
    }

    pub fn init_capacity(&self) -> usize {
        self.init_capacity
    }
}
