use lmq::QueueManager;

#[tokio::test]
async fn test_queue_manager_creation() {
    let manager = QueueManager::new(1000);

    assert_eq!(manager.queue_count(), 0);
    assert_eq!(manager.init_capacity(), 1000);
}

#[tokio::test]
async fn test_get_or_create_queue() {
    let manager = QueueManager::new(100);

    let queue = manager.get_or_create_queue("emails");

    assert_eq!(queue.name(), "emails");
    assert_eq!(manager.queue_count(), 1);
}

#[tokio::test]
async fn test_get_or_create_returns_existing_queue() {
    let manager = QueueManager::new(100);

    manager.get_or_create_queue("emails").enqueue("one".to_string());
    let again = manager.get_or_create_queue("emails");

    assert_eq!(again.size(), 1);
    assert_eq!(manager.queue_count(), 1);
}

#[tokio::test]
async fn test_get_queue_nonexistent() {
    let manager = QueueManager::new(100);

    assert!(manager.get_queue("nonexistent").is_none());
}

#[tokio::test]
async fn test_enqueue_creates_queue() {
    let manager = QueueManager::new(100);

    manager.enqueue("jobs", "payload".to_string());

    let queue = manager.get_queue("jobs").unwrap();
    assert_eq!(queue.size(), 1);
}

#[tokio::test]
async fn test_queue_capacity_from_manager() {
    let manager = QueueManager::new(500);

    let queue = manager.get_or_create_queue("test");

    assert_eq!(queue.capacity(), 500);
}

#[tokio::test]
async fn test_dequeue_distinguishes_missing_from_empty() {
    let manager = QueueManager::new(100);
    manager.get_or_create_queue("jobs");

    // Missing queue: the outer Option is None.
    assert!(manager.dequeue("nope").is_none());
    // Existing but empty queue: Some(None).
    assert!(matches!(manager.dequeue("jobs"), Some(None)));

    manager.enqueue("jobs", "work".to_string());
    let message = manager.dequeue("jobs").unwrap().unwrap();
    assert_eq!(message.body, "work");
}

#[tokio::test]
async fn test_dequeue_never_creates_queue() {
    let manager = QueueManager::new(100);

    manager.dequeue("ghost");

    assert_eq!(manager.queue_count(), 0);
}

#[tokio::test]
async fn test_list_queues() {
    let manager = QueueManager::new(100);
    manager.get_or_create_queue("emails");
    manager.get_or_create_queue("webhooks");
    manager.get_or_create_queue("images");

    let mut names = manager.list_queues();
    names.sort();

    assert_eq!(names, vec!["emails", "images", "webhooks"]);
}

#[tokio::test]
async fn test_delete_queue() {
    let manager = QueueManager::new(100);
    manager.enqueue("jobs", "buffered".to_string());

    assert!(manager.delete_queue("jobs"));
    assert!(manager.get_queue("jobs").is_none());
    assert_eq!(manager.queue_count(), 0);
    // Deleting again reports that nothing was there.
    assert!(!manager.delete_queue("jobs"));
}

#[tokio::test]
async fn test_queues_are_independent() {
    let manager = QueueManager::new(100);
    manager.enqueue("a", "for-a".to_string());
    manager.enqueue("b", "for-b".to_string());

    assert_eq!(manager.dequeue("a").unwrap().unwrap().body, "for-a");
    assert_eq!(manager.get_queue("b").unwrap().size(), 1);
}
