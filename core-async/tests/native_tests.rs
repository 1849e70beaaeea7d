//! Integration tests for the tokio-backed async facade.

use core_async::{runtime, sync, task, time};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[core_async::test]
async fn test_timeout_success() {
    let result = time::timeout(time::Duration::from_millis(200), async {
        time::sleep(time::Duration::from_millis(5)).await;
        7
    })
    .await;

    assert_eq!(result.unwrap(), 7);
}

#[core_async::test]
async fn test_timeout_elapses() {
    let result = time::timeout(
        time::Duration::from_millis(10),
        time::sleep(time::Duration::from_secs(5)),
    )
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_aborted_task_reports_cancelled() {
    let handle = task::spawn(async {
        time::sleep(time::Duration::from_secs(30)).await;
        1
    });

    handle.abort();
    let err = handle.await.unwrap_err();
    assert!(err.is_cancelled());
}

#[core_async::test]
async fn test_cancellation_token_is_sticky() {
    let token = sync::CancellationToken::new();
    let observer = token.clone();

    assert!(!observer.is_cancelled());
    token.cancel();
    token.cancel();
    assert!(observer.is_cancelled());
}

#[core_async::test]
async fn test_cancellation_token_wakes_waiters() {
    let token = sync::CancellationToken::new();
    let waiter = token.clone();

    let handle = task::spawn(async move {
        waiter.cancelled().await;
        "woken"
    });

    time::sleep(time::Duration::from_millis(5)).await;
    token.cancel();
    assert_eq!(handle.await.unwrap(), "woken");
}

#[core_async::test]
async fn test_mutex_held_across_await() {
    let mutex = Arc::new(sync::Mutex::new(Vec::new()));
    let mut handles = Vec::new();

    for i in 0..5 {
        let mutex = Arc::clone(&mutex);
        handles.push(task::spawn(async move {
            let mut guard = mutex.lock().await;
            time::sleep(time::Duration::from_millis(1)).await;
            guard.push(i);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(mutex.lock().await.len(), 5);
}

#[test]
fn test_block_on_runs_future() {
    let value = runtime::block_on(async { 3 + 4 });
    assert_eq!(value, 7);
}

#[test]
fn test_worker_pool_runs_spawned_work() {
    let pool = runtime::build_worker_pool(2, "test-pool").unwrap();
    let (tx, rx) = std::sync::mpsc::channel();

    pool.spawn(async move {
        tx.send(99).unwrap();
    });

    let value = rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .unwrap();
    assert_eq!(value, 99);
}
