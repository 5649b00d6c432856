//! End-to-end payment lifecycle tests: checkout through fulfillment or
//! expiry, driven over the HTTP surface.

mod common;

use chrono::Utc;
use serde_json::json;

use kiosk_core::{AccountId, IntentStatus, TrackId};
use kiosk_ledger::Ledger;

use common::{mount_invoice_success, TestHarness, ADMIN_KEY, SERVICE_KEY};

async fn checkout(harness: &TestHarness, account_id: i64, package_id: &str) -> String {
    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("x-api-key", SERVICE_KEY)
        .json(&json!({
            "account_id": account_id,
            "package_id": package_id
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["track_id"].as_str().unwrap().to_string()
}

async fn deliver_callback(harness: &TestHarness, track_id: &str, status: &str) -> serde_json::Value {
    let body = json!({ "trackId": track_id, "status": status }).to_string();
    let response = harness
        .server
        .post("/webhooks/payment")
        .add_header("content-type", "application/json")
        .add_header("x-webhook-signature", TestHarness::sign(&body))
        .text(body)
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn paid_invoice_ends_in_purchase_and_statistics() {
    let harness = TestHarness::new().await;
    mount_invoice_success(&harness.processor, "trk_e2e_1").await;

    let track_id = checkout(&harness, 42, "100_videos").await;
    assert_eq!(track_id, "trk_e2e_1");

    let outcome = deliver_callback(&harness, &track_id, "Paid").await;
    assert_eq!(outcome["status"], "success");

    // Purchase history over the HTTP surface.
    let history = harness
        .server
        .get("/v1/accounts/42/purchases")
        .add_header("x-api-key", SERVICE_KEY)
        .await;
    history.assert_status_ok();
    let purchases: serde_json::Value = history.json();
    let purchases = purchases.as_array().unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["package_id"], "100_videos");
    assert_eq!(purchases[0]["amount_cents"], 1500);

    // And the admin report reflects it.
    let stats = harness
        .server
        .get("/v1/stats")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    stats.assert_status_ok();
    let stats: serde_json::Value = stats.json();
    assert_eq!(stats["purchasing_accounts"], 1);
    assert_eq!(stats["total_revenue_cents"], 1500);
    assert_eq!(stats["sales_by_package"]["100_videos"], 1);
}

#[tokio::test]
async fn unpaid_invoice_is_expired_by_the_sweep() {
    let harness = TestHarness::new().await;
    mount_invoice_success(&harness.processor, "trk_e2e_2").await;

    let track_id = checkout(&harness, 42, "100_videos").await;
    let track = TrackId::new(track_id.clone());

    // Pull the deadline forward so the sweep sees it now.
    let (due_at, _) = harness
        .ledger
        .due_deadlines(Utc::now() + chrono::Duration::hours(1))
        .unwrap()
        .into_iter()
        .find(|(_, t)| *t == track)
        .unwrap();
    harness.ledger.clear_deadline(&track, due_at).unwrap();
    harness
        .ledger
        .record_deadline(&track, Utc::now() - chrono::Duration::minutes(1))
        .unwrap();

    let expired = harness.orchestrator.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(expired, 1);

    let intent = harness.ledger.get_intent(&track).unwrap().unwrap();
    assert_eq!(intent.status, IntentStatus::Expired);
    assert_eq!(harness.notifier.expiries.lock().unwrap().len(), 1);

    // A late payment callback no longer changes anything.
    let outcome = deliver_callback(&harness, &track_id, "Paid").await;
    assert_eq!(outcome["status"], "already_processed");
    assert!(harness
        .ledger
        .list_purchases_by_account(&AccountId::new(42), 10, 0)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn two_accounts_buy_independently() {
    let harness = TestHarness::new().await;
    mount_invoice_success(&harness.processor, "trk_shared").await;

    // The mock hands out the same track id, so complete the first checkout
    // before starting the second.
    let first = checkout(&harness, 1, "100_videos").await;
    let outcome = deliver_callback(&harness, &first, "Paid").await;
    assert_eq!(outcome["status"], "success");

    // The second checkout collides on track id and is surfaced as a server
    // error rather than silently overwriting the first intent.
    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("x-api-key", SERVICE_KEY)
        .json(&json!({ "account_id": 2, "package_id": "100_videos" }))
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    // The first account's purchase is intact.
    let purchases = harness
        .ledger
        .list_purchases_by_account(&AccountId::new(1), 10, 0)
        .unwrap();
    assert_eq!(purchases.len(), 1);
}

#[tokio::test]
async fn failed_payment_is_terminal() {
    let harness = TestHarness::new().await;
    mount_invoice_success(&harness.processor, "trk_e2e_3").await;

    let track_id = checkout(&harness, 42, "100_videos").await;

    let outcome = deliver_callback(&harness, &track_id, "Failed").await;
    assert_eq!(outcome["status"], "failed");

    let outcome = deliver_callback(&harness, &track_id, "Paid").await;
    assert_eq!(outcome["status"], "already_processed");

    let intent = harness
        .ledger
        .get_intent(&TrackId::new(track_id))
        .unwrap()
        .unwrap();
    assert_eq!(intent.status, IntentStatus::Failed);
    assert!(intent.completed_at.is_some());
}
