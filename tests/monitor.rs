//! Drain timer behaviour on a real tokio runtime with paused time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use eventide::{
    Dispatcher, DispatcherConfig, Event, Listener, ListenerConfig, Propagation, SchedulerError,
    TokioScheduler,
};

fn queued_counter(dispatcher: &Dispatcher) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let handled = count.clone();
    Listener::builder(ListenerConfig::new("counter", ["tick"]).queued())
        .handle(move |_| {
            handled.fetch_add(1, Ordering::SeqCst);
            Ok(Propagation::Continue)
        })
        .register(dispatcher)
        .unwrap();
    count
}

#[tokio::test(start_paused = true)]
async fn drains_one_entry_every_five_seconds() {
    let dispatcher = Dispatcher::new(
        DispatcherConfig::default().monitored(),
        Arc::new(TokioScheduler::new()),
    )
    .unwrap();
    let count = queued_counter(&dispatcher);

    for _ in 0..3 {
        Event::new("tick").unwrap().fire_on(&dispatcher).unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.queue_len(), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert_eq!(dispatcher.queue_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_monitoring_halts_drain() {
    let dispatcher = Dispatcher::new(
        DispatcherConfig::default()
            .with_drain_interval(Duration::from_millis(100))
            .monitored(),
        Arc::new(TokioScheduler::new()),
    )
    .unwrap();
    let count = queued_counter(&dispatcher);

    for _ in 0..4 {
        Event::new("tick").unwrap().fire_on(&dispatcher).unwrap();
    }

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);

    dispatcher.stop_monitoring();
    assert!(!dispatcher.is_monitoring());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(dispatcher.queue_len(), 2);
}

#[tokio::test(start_paused = true)]
async fn monitoring_twice_keeps_single_timer() {
    let scheduler = Arc::new(TokioScheduler::new());
    let dispatcher = Dispatcher::new(
        DispatcherConfig::default().with_drain_interval(Duration::from_secs(1)),
        scheduler.clone(),
    )
    .unwrap();
    let count = queued_counter(&dispatcher);

    dispatcher.monitor().unwrap();
    dispatcher.monitor().unwrap();
    assert_eq!(scheduler.active_timers(), 1);

    for _ in 0..3 {
        Event::new("tick").unwrap().fire_on(&dispatcher).unwrap();
    }

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn monitored_dispatcher_needs_runtime() {
    let result = Dispatcher::new(
        DispatcherConfig::default().monitored(),
        Arc::new(TokioScheduler::new()),
    );

    assert_eq!(result.unwrap_err(), SchedulerError::NoRuntime);
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

#[test]
fn monitoring_resumes_on_a_new_runtime() {
    let first = paused_runtime();
    let dispatcher = first.block_on(async {
        Dispatcher::new(
            DispatcherConfig::default().monitored(),
            Arc::new(TokioScheduler::new()),
        )
        .unwrap()
    });
    let count = queued_counter(&dispatcher);
    assert!(dispatcher.is_monitoring());

    drop(first);
    assert!(!dispatcher.is_monitoring());

    let second = paused_runtime();
    second.block_on(async {
        Event::new("tick").unwrap().fire_on(&dispatcher).unwrap();
        dispatcher.monitor().unwrap();
        assert!(dispatcher.is_monitoring());

        tokio::time::sleep(Duration::from_millis(5_100)).await;
    });

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.queue_len(), 0);
}
