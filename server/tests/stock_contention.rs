//! Stock ledger behavior under contention: partial fulfilment, no
//! oversell, conservation of units between stock and reservations.

mod common;

use common::*;
use storefront_server::utils::AppError;

#[tokio::test]
async fn partial_fulfilment_grants_the_remainder() {
    let state = test_state().await;
    let product = seed_variant_product(&state, "Tee", 20.0, &[("M", 5)]).await;
    let key = product.key();

    let a = state
        .store
        .add_or_merge("alice", &key, Some("M"), 3)
        .await
        .expect("alice reserves");
    assert_eq!(a.held_quantity, 3);
    assert_eq!(a.remaining_stock, 2);

    // Bob asks for 4 but only 2 remain
    let b = state
        .store
        .add_or_merge("bob", &key, Some("M"), 4)
        .await
        .expect("bob reserves");
    assert_eq!(b.requested_quantity, 4);
    assert_eq!(b.held_quantity, 2);
    assert_eq!(b.remaining_stock, 0);

    assert_eq!(variant_stock_of(&state, &product, "M").await, 0);

    // Nothing left at all
    let err = state
        .store
        .add_or_merge("carol", &key, Some("M"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OutOfStock(_)), "got {err:?}");
}

#[tokio::test]
async fn reserve_merges_into_existing_line() {
    let state = test_state().await;
    let product = seed_product(&state, "Mug", 9.5, 10).await;
    let key = product.key();

    state
        .store
        .add_or_merge("alice", &key, None, 2)
        .await
        .expect("first reserve");
    state
        .store
        .add_or_merge("alice", &key, None, 3)
        .await
        .expect("second reserve");

    let lines = state.store.read("alice").await.expect("read cart");
    assert_eq!(lines.len(), 1, "same (product, variant) merges");
    assert_eq!(lines[0].quantity, 5);
    assert_eq!(stock_of(&state, &product).await, 5);
}

#[tokio::test]
async fn concurrent_reserves_never_oversell() {
    let state = test_state().await;
    let product = seed_product(&state, "Limited", 50.0, 10).await;
    let key = product.key();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        let key = key.clone();
        tasks.push(tokio::spawn(async move {
            state
                .store
                .add_or_merge(&format!("user{i}"), &key, None, 2)
                .await
        }));
    }

    let mut held_total = 0i64;
    for task in tasks {
        match task.await.expect("task") {
            Ok(receipt) => held_total += receipt.held_quantity,
            // Losing a contended race or finding nothing left are both
            // legal outcomes; oversell is not.
            Err(AppError::OutOfStock(_)) | Err(AppError::StockConflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let remaining = stock_of(&state, &product).await;
    assert!(held_total <= 10, "oversold: held {held_total}");
    assert!(remaining >= 0);
    // Conservation: every unit is either still in stock or held by a cart
    assert_eq!(remaining + held_total, 10);
}

#[tokio::test]
async fn update_quantity_adjusts_by_delta() {
    let state = test_state().await;
    let product = seed_product(&state, "Lamp", 30.0, 10).await;
    let key = product.key();

    state
        .store
        .add_or_merge("alice", &key, None, 4)
        .await
        .expect("reserve");
    assert_eq!(stock_of(&state, &product).await, 6);

    // Shrink to 1: 3 units go back
    state
        .store
        .update_quantity("alice", &key, None, 1)
        .await
        .expect("shrink");
    assert_eq!(stock_of(&state, &product).await, 9);

    // Grow to 8: exactly 7 more needed, 9 available
    state
        .store
        .update_quantity("alice", &key, None, 8)
        .await
        .expect("grow");
    assert_eq!(stock_of(&state, &product).await, 2);

    // Growing beyond availability is rejected, not partially granted
    let err = state
        .store
        .update_quantity("alice", &key, None, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { available: 2 }), "got {err:?}");
    assert_eq!(stock_of(&state, &product).await, 2);

    // Zero removes the line and releases everything
    state
        .store
        .update_quantity("alice", &key, None, 0)
        .await
        .expect("remove via zero");
    assert_eq!(stock_of(&state, &product).await, 10);
    assert!(state.store.read("alice").await.expect("read").is_empty());
}

#[tokio::test]
async fn clear_releases_every_line() {
    let state = test_state().await;
    let tee = seed_variant_product(&state, "Tee", 20.0, &[("M", 5), ("L", 3)]).await;
    let mug = seed_product(&state, "Mug", 9.5, 4).await;

    state
        .store
        .add_or_merge("alice", &tee.key(), Some("M"), 2)
        .await
        .expect("reserve M");
    state
        .store
        .add_or_merge("alice", &tee.key(), Some("L"), 1)
        .await
        .expect("reserve L");
    state
        .store
        .add_or_merge("alice", &mug.key(), None, 4)
        .await
        .expect("reserve mug");

    state.store.clear("alice").await.expect("clear");

    assert_eq!(variant_stock_of(&state, &tee, "M").await, 5);
    assert_eq!(variant_stock_of(&state, &tee, "L").await, 3);
    assert_eq!(stock_of(&state, &mug).await, 4);
    assert!(state.store.read("alice").await.expect("read").is_empty());

    // Clearing an absent cart is a no-op
    state.store.clear("alice").await.expect("idempotent clear");
}

#[tokio::test]
async fn removing_an_unreserved_item_fails() {
    let state = test_state().await;
    let product = seed_product(&state, "Mug", 9.5, 4).await;

    let err = state
        .store
        .remove("alice", &product.key(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    state
        .store
        .add_or_merge("alice", &product.key(), None, 1)
        .await
        .expect("reserve");
    let err = state
        .store
        .remove("alice", "other-product", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ItemNotReserved(_)), "got {err:?}");
}
