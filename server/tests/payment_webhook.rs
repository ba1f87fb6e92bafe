//! Payment confirmation: idempotent processing, non-order-affecting kinds.

mod common;

use common::*;
use storefront_server::payment::{
    NotificationKind, PaymentNotification, ProcessOutcome, signature,
};
use storefront_server::utils::AppError;

fn notification(kind: NotificationKind, session: &str) -> PaymentNotification {
    PaymentNotification {
        kind,
        session_id: session.to_string(),
        customer_key: "carol".to_string(),
        customer_name: "Carol".to_string(),
        shipping_address: "2 Side St".to_string(),
        payment_method: "card".to_string(),
        coupon_code: None,
    }
}

#[tokio::test]
async fn replayed_confirmation_creates_exactly_one_order() {
    let state = test_state().await;
    let product = seed_product(&state, "Mug", 25.0, 10).await;

    state
        .store
        .add_or_merge("carol", &product.key(), None, 2)
        .await
        .expect("reserve");

    let first = state
        .processor
        .process(&notification(NotificationKind::PaymentSucceeded, "cs_1"))
        .await
        .expect("first delivery");
    let order = match first {
        ProcessOutcome::Committed(order) => order,
        other => panic!("expected commit, got {other:?}"),
    };
    assert_eq!(order.payment_session.as_deref(), Some("cs_1"));
    assert_eq!(order.final_amount, 55.0);
    assert_eq!(stock_of(&state, &product).await, 8);

    // Same notification delivered again
    let second = state
        .processor
        .process(&notification(NotificationKind::PaymentSucceeded, "cs_1"))
        .await
        .expect("second delivery");
    assert!(matches!(second, ProcessOutcome::AlreadyProcessed), "got {second:?}");

    // One order, stock not decremented further
    let history = state
        .orders
        .find_by_customer("carol")
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(stock_of(&state, &product).await, 8);
}

#[tokio::test]
async fn payment_failure_leaves_the_reservation_alone() {
    let state = test_state().await;
    let product = seed_product(&state, "Mug", 25.0, 10).await;

    state
        .store
        .add_or_merge("carol", &product.key(), None, 2)
        .await
        .expect("reserve");

    for kind in [NotificationKind::PaymentFailed, NotificationKind::SessionExpired] {
        let outcome = state
            .processor
            .process(&notification(kind, "cs_2"))
            .await
            .expect("delivery");
        assert!(matches!(outcome, ProcessOutcome::Acknowledged), "got {outcome:?}");
    }

    // Carol can still check out later
    assert_eq!(state.store.read("carol").await.expect("read").len(), 1);
    assert_eq!(stock_of(&state, &product).await, 8);
    let history = state
        .orders
        .find_by_customer("carol")
        .await
        .expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_kinds_are_acknowledged() {
    let state = test_state().await;

    // Wire shape the provider might grow without warning
    let parsed: PaymentNotification = serde_json::from_str(
        r#"{
            "kind": "refund_issued",
            "session_id": "cs_3",
            "customer_key": "carol",
            "customer_name": "Carol",
            "shipping_address": "2 Side St",
            "payment_method": "card",
            "coupon_code": null
        }"#,
    )
    .expect("parse");
    assert_eq!(parsed.kind, NotificationKind::Other);

    let outcome = state.processor.process(&parsed).await.expect("delivery");
    assert!(matches!(outcome, ProcessOutcome::Acknowledged), "got {outcome:?}");
}

#[tokio::test]
async fn paid_session_without_reservation_is_acked_loudly() {
    let state = test_state().await;

    let outcome = state
        .processor
        .process(&notification(NotificationKind::PaymentSucceeded, "cs_4"))
        .await
        .expect("delivery");
    assert!(matches!(outcome, ProcessOutcome::Acknowledged), "got {outcome:?}");

    // The marker was released, so a later retry is still processed cleanly
    assert!(!state.sessions.contains("cs_4"));
}

#[tokio::test]
async fn webhook_signature_matches_raw_body() {
    let secret = "test-webhook-secret";
    let body = serde_json::to_vec(&serde_json::json!({
        "kind": "payment_succeeded",
        "session_id": "cs_5",
        "customer_key": "carol",
        "customer_name": "Carol",
        "shipping_address": "2 Side St",
        "payment_method": "card"
    }))
    .expect("serialize");

    let good = signature::sign(secret, &body);
    assert!(signature::verify(secret, &body, &good).is_ok());

    let err = signature::verify(secret, &body, "deadbeef").unwrap_err();
    assert!(matches!(err, AppError::InvalidSignature));
}
