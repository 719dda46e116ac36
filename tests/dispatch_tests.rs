//! Tests for the completion-signal bus

use std::time::Duration;

use rootbot::dispatch::{Dispatcher, Signal};
use tokio::time::timeout;

#[tokio::test]
async fn test_publish_resolves_a_subscriber() {
    let dispatcher = Dispatcher::new();
    let mut completion = dispatcher.subscribe(Signal::MotorFinished);

    dispatcher.publish(Signal::MotorFinished);

    timeout(Duration::from_secs(1), completion.wait())
        .await
        .expect("completion should already be resolved");
}

#[tokio::test(start_paused = true)]
async fn test_other_signals_do_not_resolve() {
    let dispatcher = Dispatcher::new();
    let mut completion = dispatcher.subscribe(Signal::SoundFinished);

    dispatcher.publish(Signal::MotorFinished);
    dispatcher.publish(Signal::MarkerFinished);

    let result = timeout(Duration::from_millis(10), completion.wait()).await;
    assert!(result.is_err(), "unrelated signals must not fire the slot");
}

#[tokio::test]
async fn test_publish_fans_out_to_every_live_subscriber() {
    let dispatcher = Dispatcher::new();
    let mut first = dispatcher.subscribe(Signal::MotorFinished);
    let mut second = dispatcher.subscribe(Signal::MotorFinished);
    assert_eq!(dispatcher.pending(Signal::MotorFinished), 2);

    dispatcher.publish(Signal::MotorFinished);

    timeout(Duration::from_secs(1), first.wait()).await.unwrap();
    timeout(Duration::from_secs(1), second.wait()).await.unwrap();
    assert_eq!(dispatcher.pending(Signal::MotorFinished), 0);
}

#[tokio::test]
async fn test_slots_are_single_fire() {
    let dispatcher = Dispatcher::new();
    let _stale = dispatcher.subscribe(Signal::MarkerFinished);
    dispatcher.publish(Signal::MarkerFinished);
    assert_eq!(dispatcher.pending(Signal::MarkerFinished), 0);

    // a second publish finds no leftover listeners from the first
    dispatcher.publish(Signal::MarkerFinished);
    assert_eq!(dispatcher.pending(Signal::MarkerFinished), 0);
}

#[tokio::test]
async fn test_dropped_completion_unregisters_itself() {
    let dispatcher = Dispatcher::new();
    let kept = dispatcher.subscribe(Signal::SoundFinished);
    let abandoned = dispatcher.subscribe(Signal::SoundFinished);
    assert_eq!(dispatcher.pending(Signal::SoundFinished), 2);

    // an operation that timed out drops its handle without waiting
    drop(abandoned);
    assert_eq!(dispatcher.pending(Signal::SoundFinished), 1);

    drop(kept);
    assert_eq!(dispatcher.pending(Signal::SoundFinished), 0);

    // publishing into the emptied slot list is harmless
    dispatcher.publish(Signal::SoundFinished);
}

#[tokio::test]
async fn test_repeated_commands_do_not_accumulate_listeners() {
    let dispatcher = Dispatcher::new();

    for _ in 0..50 {
        let mut completion = dispatcher.subscribe(Signal::MotorFinished);
        dispatcher.publish(Signal::MotorFinished);
        timeout(Duration::from_secs(1), completion.wait()).await.unwrap();
    }
    assert_eq!(dispatcher.pending(Signal::MotorFinished), 0);
}

#[tokio::test]
async fn test_publish_without_subscribers_is_a_no_op() {
    let dispatcher = Dispatcher::new();
    dispatcher.publish(Signal::NosePressed);
    assert_eq!(dispatcher.pending(Signal::NosePressed), 0);
}
