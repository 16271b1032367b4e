use {
    crate::utils::syncqueue::SyncQueue,
    std::{sync::Arc, thread, time::Duration},
};

#[test]
fn fifo() {
    let queue = SyncQueue::new(4);
    for i in 0..4 {
        queue.push(i, Duration::ZERO).unwrap();
    }
    for i in 0..4 {
        assert_eq!(queue.try_pop(), Some(i));
    }
    assert_eq!(queue.try_pop(), None);
}

#[test]
fn full_queue_rejects_after_timeout() {
    let queue = SyncQueue::new(1);
    queue.push(1, Duration::ZERO).unwrap();
    assert_eq!(queue.push(2, Duration::from_millis(10)), Err(2));
}

#[test]
fn pop_times_out() {
    let queue = SyncQueue::<u32>::new(1);
    assert_eq!(queue.pop(Duration::from_millis(10)), None);
}

#[test]
fn producer_unblocks_when_consumed() {
    let queue = Arc::new(SyncQueue::new(1));
    queue.push(1, Duration::ZERO).unwrap();
    let queue2 = queue.clone();
    let producer = thread::spawn(move || queue2.push(2, Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(queue.pop(Duration::from_secs(1)), Some(1));
    producer.join().unwrap().unwrap();
    assert_eq!(queue.pop(Duration::from_secs(1)), Some(2));
}
