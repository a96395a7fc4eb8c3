// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for FilteredStore against a scripted source.

use std::sync::Arc;
use std::time::Duration;

use sendvision_core::{Filter, Flag, Order, RecordId, SendvisionError, Status, TimeRange};
use sendvision_store::{FilteredStore, StoreOptions, StoreSnapshot};
use sendvision_test_utils::ScriptedSource;
use sendvision_test_utils::fixtures::{EMAILS, at, day, email, email_at, escalated, with_status};

async fn open(source: &Arc<ScriptedSource>, filter: Filter) -> FilteredStore {
    FilteredStore::open(source.clone(), EMAILS, filter, StoreOptions::default())
        .await
        .expect("store should open")
}

/// Waits until the snapshot reflects `generation` and nothing is loading.
async fn settled(store: &FilteredStore, generation: u64) -> StoreSnapshot {
    let mut rx = store.watch();
    let snap = rx
        .wait_for(|s| s.generation >= generation && !s.is_loading)
        .await
        .expect("store dropped while waiting")
        .clone();
    snap
}

/// Lets every runnable task make progress. Time is paused, so this returns
/// only once the runtime is idle.
async fn quiesce() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn ids(snapshot: &StoreSnapshot) -> Vec<String> {
    snapshot.iter().map(|r| r.id.0.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn initial_query_populates_snapshot() {
    let source = Arc::new(ScriptedSource::new());
    source.seed(EMAILS, [email("1"), email("2")]).await;

    let store = open(&source, Filter::all()).await;
    let snap = settled(&store, 1).await;

    assert_eq!(snap.len(), 2);
    assert!(snap.is_populated());
    assert!(snap.last_error.is_none());
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn waiting_filter_includes_unclassified_records() {
    let source = Arc::new(ScriptedSource::new());
    source
        .seed(
            EMAILS,
            [
                with_status("A", Status::Waiting),
                email("B").with_flag(Flag::Escalation, true),
                with_status("C", Status::Approval),
            ],
        )
        .await;

    let store = open(&source, Filter::all().status(Status::Waiting)).await;
    let snap = settled(&store, 1).await;
    assert_eq!(ids(&snap), ["A", "B"]);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn older_generation_never_overwrites_newer() {
    let source = Arc::new(ScriptedSource::new());
    source
        .seed(EMAILS, [email("1"), with_status("2", Status::Objection)])
        .await;
    source.hold_queries();

    let store = open(&source, Filter::all()).await;
    source.wait_for_queries(1).await;
    let objections = Filter::all().status(Status::Objection);
    store.set_filter(objections.clone()).unwrap();
    source.wait_for_queries(2).await;
    assert!(store.current_snapshot().is_loading);

    source.release_query(2);
    let snap = settled(&store, 2).await;
    assert_eq!(ids(&snap), ["2"]);
    assert_eq!(snap.filter, objections);

    source.release_query(1);
    quiesce().await;
    let snap = store.current_snapshot();
    assert_eq!(snap.generation, 2);
    assert_eq!(ids(&snap), ["2"]);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn end_of_day_record_is_inside_range() {
    let source = Arc::new(ScriptedSource::new());
    source
        .seed(
            EMAILS,
            [
                email_at("before", at(2024, 4, 30, 23, 59, 59)),
                email_at("start", at(2024, 5, 1, 0, 0, 0)),
                email_at("last", at(2024, 5, 3, 23, 59, 59)),
                email_at("after", at(2024, 5, 4, 0, 0, 0)),
            ],
        )
        .await;

    let range = TimeRange::between(day(2024, 5, 1), day(2024, 5, 3)).unwrap();
    let store = open(&source, Filter::all().created_within(range)).await;
    let snap = settled(&store, 1).await;
    assert_eq!(ids(&snap), ["start", "last"]);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_costs_at_most_two_queries() {
    let source = Arc::new(ScriptedSource::new());
    source.seed(EMAILS, [email("1")]).await;
    source.hold_queries();

    let store = open(&source, Filter::all()).await;
    source.wait_for_queries(1).await;
    for _ in 0..12 {
        source.touch(EMAILS);
    }
    store.refresh().unwrap();
    quiesce().await;
    assert_eq!(source.query_count(), 1, "triggers fold into the in-flight query");

    source.pass_queries();
    source.release_query(1);
    let snap = settled(&store, 2).await;
    quiesce().await;

    assert_eq!(source.query_count(), 2);
    assert_eq!(snap.generation, 2);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn change_notification_refreshes_snapshot() {
    let source = Arc::new(ScriptedSource::new());
    let store = open(&source, Filter::all().flag(Flag::Escalation, true)).await;
    assert!(settled(&store, 1).await.is_empty());

    source.memory().insert(EMAILS, escalated("9")).await;
    let snap = settled(&store, 2).await;
    assert_eq!(ids(&snap), ["9"]);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_records() {
    let source = Arc::new(ScriptedSource::new());
    source.seed(EMAILS, [email("1"), email("2")]).await;
    let store = open(&source, Filter::all()).await;
    settled(&store, 1).await;

    source.fail_next_query("connection reset");
    store.refresh().unwrap();
    let mut rx = store.watch();
    let snap = rx
        .wait_for(|s| s.last_error.is_some() && !s.is_loading)
        .await
        .unwrap()
        .clone();
    assert_eq!(snap.len(), 2, "records survive a failed refresh");
    assert_eq!(snap.generation, 1);
    assert!(matches!(
        snap.last_error.as_deref(),
        Some(SendvisionError::Remote { .. })
    ));

    store.refresh().unwrap();
    let snap = settled(&store, 3).await;
    assert!(snap.last_error.is_none());
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn result_after_close_is_discarded() {
    let source = Arc::new(ScriptedSource::new());
    source.seed(EMAILS, [email("1")]).await;
    source.hold_queries();

    let store = open(&source, Filter::all()).await;
    source.wait_for_queries(1).await;
    store.close().await;

    source.release_all();
    quiesce().await;
    let snap = store.current_snapshot();
    assert!(snap.is_empty());
    assert!(!snap.is_loading);
    assert_eq!(snap.generation, 0);

    source.touch(EMAILS);
    quiesce().await;
    assert_eq!(source.query_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_realtime_ignores_changes_until_resumed() {
    let source = Arc::new(ScriptedSource::new());
    let store = FilteredStore::open(
        source.clone(),
        EMAILS,
        Filter::all(),
        StoreOptions {
            order: None,
            realtime_enabled: false,
        },
    )
    .await
    .unwrap();
    settled(&store, 1).await;

    source.memory().insert(EMAILS, email("late")).await;
    quiesce().await;
    assert_eq!(source.query_count(), 1);
    assert!(store.current_snapshot().is_empty());

    store.set_realtime_enabled(true).unwrap();
    let snap = settled(&store, 2).await;
    assert_eq!(ids(&snap), ["late"]);

    source.touch(EMAILS);
    settled(&store, 3).await;
    assert_eq!(source.query_count(), 3);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn requested_order_reaches_the_source() {
    let source = Arc::new(ScriptedSource::new());
    source
        .seed(
            EMAILS,
            [
                email_at("new", at(2024, 5, 2, 0, 0, 0)),
                email_at("old", at(2024, 5, 1, 0, 0, 0)),
            ],
        )
        .await;

    let store = FilteredStore::open(
        source.clone(),
        EMAILS,
        Filter::all(),
        StoreOptions {
            order: Some(Order::CreatedAtAscending),
            realtime_enabled: true,
        },
    )
    .await
    .unwrap();
    let snap = settled(&store, 1).await;
    assert_eq!(ids(&snap), ["old", "new"]);
    assert_eq!(source.queries()[0].order, Some(Order::CreatedAtAscending));
    assert!(snap.get(&RecordId::from("old")).is_some());
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn panicking_query_does_not_wedge_store() {
    let source = Arc::new(ScriptedSource::new());
    source.seed(EMAILS, [email("1")]).await;
    source.panic_next_query();

    let store = open(&source, Filter::all()).await;
    let mut rx = store.watch();
    let snap = rx
        .wait_for(|s| s.last_error.is_some() && !s.is_loading)
        .await
        .unwrap()
        .clone();
    assert!(matches!(
        snap.last_error.as_deref(),
        Some(SendvisionError::Internal(_))
    ));
    assert!(!store.is_loading());

    store.refresh().unwrap();
    let snap = settled(&store, 2).await;
    assert_eq!(ids(&snap), ["1"]);
    assert!(snap.last_error.is_none());
    assert_eq!(source.query_count(), 2);
    store.close().await;
}

#[tokio::test(start_paused = true)]
async fn stores_sharing_a_source_stay_independent() {
    let source = Arc::new(ScriptedSource::new());
    source
        .seed(
            EMAILS,
            [email("1"), with_status("2", Status::Approval), escalated("3")],
        )
        .await;

    let approvals = open(&source, Filter::all().status(Status::Approval)).await;
    let everything = open(&source, Filter::all()).await;
    settled(&approvals, 1).await;
    settled(&everything, 1).await;
    assert_eq!(source.memory().subscriber_count(), 2);

    everything
        .set_filter(Filter::all().flag(Flag::Escalation, true))
        .unwrap();
    let snap = settled(&everything, 2).await;
    assert_eq!(ids(&snap), ["3"]);
    quiesce().await;

    let snap = approvals.current_snapshot();
    assert_eq!(snap.generation, 1);
    assert_eq!(ids(&snap), ["2"]);

    approvals.close().await;
    assert_eq!(source.memory().subscriber_count(), 1);

    source.memory().insert(EMAILS, escalated("4")).await;
    let snap = settled(&everything, 3).await;
    assert_eq!(ids(&snap), ["3", "4"]);
    assert_eq!(approvals.current_snapshot().generation, 1);
    everything.close().await;
}
