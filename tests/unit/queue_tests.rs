/*!
 * Tests for the bounded worker queue
 */

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use locsync::localization::BoundedQueue;

/// Test that items start in submission order
#[test]
fn test_settle_all_withLimitOne_shouldRunItemsInOrder() {
    let started = Arc::new(Mutex::new(Vec::new()));
    let log = started.clone();
    let queue = BoundedQueue::new(
        move |n: u32| {
            let log = log.clone();
            async move {
                log.lock().push(n);
                tokio::time::sleep(Duration::from_millis(1)).await;
                n
            }
        },
        1,
    );

    let outcomes = tokio_test::block_on(queue.settle_all(vec![3, 1, 2]));

    assert_eq!(outcomes, vec![3, 1, 2]);
    assert_eq!(*started.lock(), vec![3, 1, 2]);
    assert_eq!(queue.peak_in_flight(), 1);
}

/// Test that a zero limit still makes progress
#[test]
fn test_new_withZeroLimit_shouldClampToOne() {
    let queue = BoundedQueue::new(|n: u8| async move { n + 1 }, 0);
    assert_eq!(queue.limit(), 1);
    assert_eq!(tokio_test::block_on(queue.push(1)), 2);
}

/// Test that outcomes keep submission order when items finish out of order
#[tokio::test]
async fn test_settle_all_withUnevenDurations_shouldKeepSubmissionOrder() {
    let queue = BoundedQueue::new(
        |n: u64| async move {
            tokio::time::sleep(Duration::from_millis(20 - n * 5)).await;
            n
        },
        4,
    );

    let outcomes = queue.settle_all(0..4).await;

    assert_eq!(outcomes, vec![0, 1, 2, 3]);
    assert_eq!(queue.peak_in_flight(), 4);
}
