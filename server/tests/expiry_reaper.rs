//! Expiry reaping: exact-once stock restoration, idempotent re-run.

mod common;

use common::*;
use storefront_server::db::models::Reservation;
use storefront_server::utils::now_millis;

/// Backdate a reservation so it falls past the TTL
async fn backdate(state: &storefront_server::core::AppState, customer: &str, reserved_at: i64) {
    state
        .db
        .db
        .query("UPDATE $resv SET reserved_at = $at")
        .bind(("resv", Reservation::record_id(customer)))
        .bind(("at", reserved_at))
        .await
        .expect("backdate")
        .check()
        .expect("backdate check");
}

#[tokio::test]
async fn expired_reservations_are_reaped_exactly_once() {
    let state = test_state().await;
    let tee = seed_variant_product(&state, "Tee", 20.0, &[("M", 5)]).await;
    let mug = seed_product(&state, "Mug", 9.5, 4).await;

    state
        .store
        .add_or_merge("alice", &tee.key(), Some("M"), 3)
        .await
        .expect("reserve tee");
    state
        .store
        .add_or_merge("alice", &mug.key(), None, 2)
        .await
        .expect("reserve mug");
    assert_eq!(variant_stock_of(&state, &tee, "M").await, 2);
    assert_eq!(stock_of(&state, &mug).await, 2);

    let now = now_millis();
    // 49 hours old, one hour past the 48h TTL
    backdate(&state, "alice", now - 49 * 3600 * 1000).await;

    let reaped = state.reaper.reap(now).await.expect("first sweep");
    assert_eq!(reaped, 1);

    // Every held unit is back, reservation gone
    assert_eq!(variant_stock_of(&state, &tee, "M").await, 5);
    assert_eq!(stock_of(&state, &mug).await, 4);
    assert!(state.store.read("alice").await.expect("read").is_empty());

    // Re-running restores nothing twice
    let reaped = state.reaper.reap(now).await.expect("second sweep");
    assert_eq!(reaped, 0);
    assert_eq!(variant_stock_of(&state, &tee, "M").await, 5);
    assert_eq!(stock_of(&state, &mug).await, 4);
}

#[tokio::test]
async fn fresh_reservations_survive_the_sweep() {
    let state = test_state().await;
    let mug = seed_product(&state, "Mug", 9.5, 4).await;

    state
        .store
        .add_or_merge("alice", &mug.key(), None, 2)
        .await
        .expect("reserve");

    let reaped = state.reaper.reap(now_millis()).await.expect("sweep");
    assert_eq!(reaped, 0);
    assert_eq!(state.store.read("alice").await.expect("read").len(), 1);
    assert_eq!(stock_of(&state, &mug).await, 2);
}

#[tokio::test]
async fn only_expired_carts_are_touched() {
    let state = test_state().await;
    let mug = seed_product(&state, "Mug", 9.5, 10).await;
    let now = now_millis();

    state
        .store
        .add_or_merge("old", &mug.key(), None, 3)
        .await
        .expect("reserve old");
    state
        .store
        .add_or_merge("fresh", &mug.key(), None, 2)
        .await
        .expect("reserve fresh");
    backdate(&state, "old", now - 72 * 3600 * 1000).await;

    let reaped = state.reaper.reap(now).await.expect("sweep");
    assert_eq!(reaped, 1);

    assert!(state.store.read("old").await.expect("read old").is_empty());
    assert_eq!(state.store.read("fresh").await.expect("read fresh").len(), 1);
    // Old cart's 3 units are back; fresh cart still holds 2
    assert_eq!(stock_of(&state, &mug).await, 8);
}
