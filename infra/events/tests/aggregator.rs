use acat_events::{CatalogChanged, ChangeAggregator, EventBus, EventBusError, EventReceiverExt};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

const WINDOW: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn burst_collapses_into_one_event() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();
    let notifier = aggregator.notifier();

    for _ in 0..4 {
        notifier.notify();
        sleep(WINDOW / 5).await;
    }
    notifier.notify();
    let last = Instant::now();

    let event = rx.recv_event().await.unwrap();
    assert_eq!(event.notifications, 5);
    assert!(Instant::now() >= last + WINDOW, "event fired before the window elapsed");
    assert!(!aggregator.is_armed());

    assert!(timeout(WINDOW * 5, rx.recv()).await.is_err(), "only one event per burst");
    aggregator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_produce_separate_events() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();

    aggregator.notify();
    assert_eq!(rx.recv_event().await.unwrap().notifications, 1);

    sleep(WINDOW * 3).await;

    aggregator.notify();
    aggregator.notify();
    assert_eq!(rx.recv_event().await.unwrap().notifications, 2);

    aggregator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn no_notifications_means_no_event() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();

    assert!(timeout(WINDOW * 10, rx.recv()).await.is_err());
    assert!(!aggregator.is_armed());
    aggregator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_while_armed_suppresses_the_event() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();

    aggregator.notify();
    sleep(WINDOW / 2).await;
    assert!(aggregator.is_armed());

    aggregator.shutdown().await;

    assert!(timeout(WINDOW * 5, rx.recv()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn notify_after_shutdown_is_ignored() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();
    let notifier = aggregator.notifier();

    aggregator.shutdown().await;

    notifier.notify();
    assert!(notifier.is_closed());
    assert!(timeout(WINDOW * 5, rx.recv()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_aggregator_tears_it_down() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<CatalogChanged>().unwrap();
    let aggregator = ChangeAggregator::spawn(bus.clone(), WINDOW).unwrap();
    let notifier = aggregator.notifier();

    notifier.notify();
    drop(aggregator);

    assert!(timeout(WINDOW * 5, rx.recv()).await.is_err());
}

#[test]
fn spawn_requires_a_runtime() {
    let result = ChangeAggregator::spawn(EventBus::new(), WINDOW);
    assert!(matches!(result, Err(EventBusError::NoRuntime { .. })));
}
