use lmq::MessageQueue;

#[tokio::test]
async fn test_message_queue_creation() {
    let queue = MessageQueue::new("test-queue".to_string(), 100);

    assert_eq!(queue.name(), "test-queue");
    assert_eq!(queue.capacity(), 100);
    assert_eq!(queue.size(), 0);
}

#[tokio::test]
async fn test_enqueue_single_message() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);

    let message = queue.enqueue("hello".to_string());

    assert_eq!(message.body, "hello");
    assert_eq!(queue.size(), 1);
    assert_eq!(queue.stats().enqueued_total(), 1);
}

#[tokio::test]
async fn test_enqueue_stamps_timestamp() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);

    let message = queue.enqueue("hello".to_string());

    assert!(message.enqueued_at > 0);
}

#[tokio::test]
async fn test_dequeue_single_message() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);
    queue.enqueue("payload".to_string());

    let message = queue.dequeue().unwrap();

    assert_eq!(message.body, "payload");
    assert_eq!(queue.size(), 0);
    assert_eq!(queue.stats().dequeued_total(), 1);
}

#[tokio::test]
async fn test_dequeue_preserves_fifo_order() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);

    queue.enqueue("first".to_string());
    queue.enqueue("second".to_string());
    queue.enqueue("third".to_string());

    assert_eq!(queue.dequeue().unwrap().body, "first");
    assert_eq!(queue.dequeue().unwrap().body, "second");
    assert_eq!(queue.dequeue().unwrap().body, "third");
}

#[tokio::test]
async fn test_dequeue_empty_queue_returns_none() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);

    assert!(queue.dequeue().is_none());
    assert_eq!(queue.stats().dequeued_total(), 0);
}

#[tokio::test]
async fn test_queue_grows_past_initial_capacity() {
    let queue = MessageQueue::new("test-queue".to_string(), 8);

    for i in 0..1000 {
        queue.enqueue(format!("message-{}", i));
    }

    assert_eq!(queue.size(), 1000);
    assert!(queue.capacity() >= 1000);
    // Order survives every growth step.
    for i in 0..1000 {
        assert_eq!(queue.dequeue().unwrap().body, format!("message-{}", i));
    }
}

#[tokio::test]
async fn test_rotate_moves_head_to_tail() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);
    queue.enqueue("a".to_string());
    queue.enqueue("b".to_string());
    queue.enqueue("c".to_string());

    queue.rotate(2);

    assert_eq!(queue.size(), 3);
    assert_eq!(queue.dequeue().unwrap().body, "c");
    assert_eq!(queue.dequeue().unwrap().body, "a");
    assert_eq!(queue.dequeue().unwrap().body, "b");
}

#[tokio::test]
async fn test_rotate_does_not_touch_counters() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);
    queue.enqueue("a".to_string());

    queue.rotate(5);

    assert_eq!(queue.stats().enqueued_total(), 1);
    assert_eq!(queue.stats().dequeued_total(), 0);
}

#[tokio::test]
async fn test_rotate_on_empty_queue_is_noop() {
    let queue = MessageQueue::new("test-queue".to_string(), 10);

    queue.rotate(3);

    assert_eq!(queue.size(), 0);
}

#[tokio::test]
async fn test_concurrent_producers() {
    use std::sync::Arc;

    let queue = Arc::new(MessageQueue::new("shared".to_string(), 16));
    let mut producers = vec![];

    for i in 0..5 {
        let queue = queue.clone();
        producers.push(tokio::spawn(async move {
            for j in 0..200 {
                queue.enqueue(format!("p{}-{}", i, j));
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(queue.size(), 1000);
    assert_eq!(queue.stats().enqueued_total(), 1000);

    let mut drained = 0;
    while queue.dequeue().is_some() {
        drained += 1;
    }
    assert_eq!(drained, 1000);
}
