//! Integration tests for the crowdfunding API
//!
//! These tests drive the router end to end against the in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use cf_api::{create_router, AppState};
use cf_db::{LedgerDatabase, RetryConfig, RetryPolicy, StoreConfig};
use serde_json::{json, Value};

const ALICE: &str = "0xa11ce";
const BOB: &str = "0xb0b";

/// Create test server
fn create_test_server() -> TestServer {
    let database = LedgerDatabase::in_memory(RetryPolicy::no_retry());
    TestServer::new(create_router(AppState::new(database))).unwrap()
}

/// Create a campaign owned by Alice and return its id
async fn create_campaign(server: &TestServer, goal: &str, targets: &[&str]) -> String {
    let milestones: Vec<Value> = targets
        .iter()
        .enumerate()
        .map(|(i, target)| json!({ "title": format!("Stage {}", i + 1), "targetAmount": target }))
        .collect();

    let response = server
        .post("/api/v1/campaigns")
        .json(&json!({
            "creatorWallet": ALICE,
            "title": "Community garden",
            "description": "Raised beds for the east lot",
            "goalAmount": goal,
            "email": "alice@example.com",
            "milestones": milestones,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["campaign"]["id"].as_str().unwrap().to_string()
}

async fn contribute(server: &TestServer, campaign_id: &str, amount: Value, hash: &str) -> axum_test::TestResponse {
    server
        .post("/api/v1/transactions")
        .json(&json!({
            "campaignId": campaign_id,
            "donorWallet": BOB,
            "amount": amount,
            "transactionHash": hash,
        }))
        .await
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_ready_check() {
    let server = create_test_server();

    let response = server.get("/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
}

// ============ Contribution Flow Tests ============

#[tokio::test]
async fn test_contribution_crosses_goal() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;

    let response = contribute(&server, &campaign_id, json!("600"), "0xevent1").await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["transaction"]["amount"], "600");
    assert_eq!(body["transaction"]["transactionHash"], "0xevent1");
    assert_eq!(body["campaign"]["currentAmount"], "600");
    assert_eq!(body["campaign"]["status"], "FULFILLED");
    assert!(!body["campaign"]["fulfilledAt"].is_null());

    let response = server.get(&format!("/api/v1/campaigns/{}", campaign_id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["campaign"]["status"], "FULFILLED");
    assert_eq!(body["campaign"]["_count"]["transactions"], 1);
    assert_eq!(body["campaign"]["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_event_is_rejected() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "1000", &[]).await;

    contribute(&server, &campaign_id, json!(600), "0xdup")
        .await
        .assert_status(StatusCode::CREATED);

    let response = contribute(&server, &campaign_id, json!(600), "0xdup").await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE_EVENT");

    let body: Value = server
        .get(&format!("/api/v1/campaigns/{}", campaign_id))
        .await
        .json();
    assert_eq!(body["campaign"]["currentAmount"], "600");
    assert_eq!(body["campaign"]["status"], "ACTIVE");
}

#[tokio::test]
async fn test_milestones_reached_in_order() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "2000", &["300", "900", "1500"]).await;

    let response = contribute(&server, &campaign_id, json!("950"), "0xmilestones").await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let reached = body["reachedMilestones"].as_array().unwrap();
    assert_eq!(reached.len(), 2);
    assert_eq!(reached[0]["targetAmount"], "300");
    assert_eq!(reached[1]["targetAmount"], "900");
    assert!(reached.iter().all(|m| m["isReached"] == true));
    assert_eq!(body["campaign"]["status"], "ACTIVE");

    let body: Value = server
        .get(&format!("/api/v1/campaigns/{}", campaign_id))
        .await
        .json();
    let milestones = body["campaign"]["milestones"].as_array().unwrap();
    assert_eq!(milestones.len(), 3);
    assert_eq!(milestones[2]["isReached"], false);
}

#[tokio::test]
async fn test_unknown_campaign() {
    let server = create_test_server();

    let response = contribute(&server, "missing-campaign", json!("10"), "0xghost").await;
    response.assert_status_not_found();

    // nothing was persisted for the event
    let body: Value = server
        .get(&format!("/api/v1/transactions?donorWallet={}", BOB))
        .await
        .json();
    assert!(body["transactions"].as_array().unwrap().is_empty());

    server
        .get("/api/v1/campaigns/missing-campaign")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_invalid_contribution() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;

    for amount in [json!("0"), json!("-5"), json!("1.5"), json!("abc")] {
        let response = contribute(&server, &campaign_id, amount, "0xbad").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    let response = server
        .post("/api/v1/transactions")
        .json(&json!({ "campaignId": campaign_id, "amount": "5" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_donor_hidden() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;

    let response = server
        .post("/api/v1/transactions")
        .json(&json!({
            "campaignId": campaign_id,
            "donorWallet": BOB,
            "amount": "50",
            "transactionHash": "0xanon",
            "isAnonymous": true,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = server
        .get(&format!("/api/v1/transactions?campaignId={}", campaign_id))
        .await
        .json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert!(transactions[0]["donorWallet"].is_null());
    assert_eq!(transactions[0]["isAnonymous"], true);
}

// ============ Campaign Endpoint Tests ============

#[tokio::test]
async fn test_owner_edit_and_forbidden() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;
    let path = format!("/api/v1/campaigns/{}", campaign_id);

    let response = server
        .patch(&path)
        .json(&json!({ "requesterWallet": "0xmallory", "title": "Mine now" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .patch(&path)
        .json(&json!({ "requesterWallet": ALICE, "title": "Bigger garden", "category": null }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["campaign"]["title"], "Bigger garden");

    let response = server
        .patch(&path)
        .json(&json!({ "requesterWallet": ALICE, "currentAmount": "999999" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_rejects_aggregate_fields_even_when_null() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;
    let path = format!("/api/v1/campaigns/{}", campaign_id);

    for body in [
        json!({ "title": "x", "contributionCount": 99 }),
        json!({ "title": "y", "goalAmount": null }),
        json!({ "title": "z", "fulfilledAt": null }),
    ] {
        let response = server.patch(&path).json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].as_str().unwrap().contains("read-only"));
    }

    let response = server.get(&path).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["campaign"]["title"], "Community garden");
    assert_eq!(body["campaign"]["goalAmount"], "500");
    assert_eq!(body["campaign"]["_count"]["transactions"], 0);
}

#[tokio::test]
async fn test_close_and_delete() {
    let server = create_test_server();
    let empty = create_campaign(&server, "500", &[]).await;
    let funded = create_campaign(&server, "500", &[]).await;

    contribute(&server, &funded, json!("10"), "0xsmall")
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .delete(&format!("/api/v1/campaigns/{}", funded))
        .json(&json!({ "requesterWallet": ALICE }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = server
        .post(&format!("/api/v1/campaigns/{}/close", funded))
        .json(&json!({ "requesterWallet": ALICE }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["campaign"]["status"], "CLOSED");

    let response = server
        .delete(&format!("/api/v1/campaigns/{}", empty))
        .json(&json!({ "requesterWallet": ALICE }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    server
        .get(&format!("/api/v1/campaigns/{}", empty))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_campaign_listing_filters() {
    let server = create_test_server();
    let open = create_campaign(&server, "1000", &[]).await;
    let done = create_campaign(&server, "100", &[]).await;

    contribute(&server, &done, json!("100"), "0xfill")
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server.get("/api/v1/campaigns").await.json();
    assert_eq!(body["campaigns"].as_array().unwrap().len(), 2);

    let body: Value = server
        .get("/api/v1/campaigns?excludeFulfilled=true")
        .await
        .json();
    let campaigns = body["campaigns"].as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], open.as_str());

    let body: Value = server
        .get("/api/v1/campaigns?status=FULFILLED")
        .await
        .json();
    let campaigns = body["campaigns"].as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], done.as_str());
}

#[tokio::test]
async fn test_post_update() {
    let server = create_test_server();
    let campaign_id = create_campaign(&server, "500", &[]).await;

    let response = server
        .post(&format!("/api/v1/campaigns/{}/updates", campaign_id))
        .json(&json!({ "title": "Soil delivered", "content": "Beds go in on Saturday" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["update"]["title"], "Soil delivered");

    server
        .post(&format!("/api/v1/campaigns/{}/updates", campaign_id))
        .json(&json!({ "title": "No content" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/v1/campaigns/missing/updates")
        .json(&json!({ "title": "t", "content": "c" }))
        .await
        .assert_status_not_found();

    let body: Value = server
        .get(&format!("/api/v1/campaigns/{}", campaign_id))
        .await
        .json();
    assert_eq!(body["campaign"]["updates"].as_array().unwrap().len(), 1);
}

// ============ Auth and Achievement Tests ============

#[tokio::test]
async fn test_connect_and_profile() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/auth")
        .json(&json!({ "walletAddress": "0xCAFE", "username": "cafe" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["walletAddress"], "0xcafe");
    assert_eq!(body["user"]["username"], "cafe");

    // a later connect only touches the fields it carries
    let body: Value = server
        .post("/api/v1/auth")
        .json(&json!({ "walletAddress": "0xcafe", "email": "cafe@example.com" }))
        .await
        .json();
    assert_eq!(body["user"]["username"], "cafe");
    assert_eq!(body["user"]["email"], "cafe@example.com");

    let response = server.get("/api/v1/auth?walletAddress=0xcafe").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["_count"]["campaigns"], 0);

    server
        .get("/api/v1/auth?walletAddress=0xnobody")
        .await
        .assert_status_not_found();
    server
        .post("/api/v1/auth")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_creator_profile_and_achievements() {
    let server = create_test_server();
    let fulfilled = create_campaign(&server, "100", &[]).await;
    let _pending = create_campaign(&server, "5000", &[]).await;

    contribute(&server, &fulfilled, json!("150"), "0xachieve")
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server
        .get(&format!("/api/v1/auth?walletAddress={}", ALICE))
        .await
        .json();
    assert_eq!(body["user"]["_count"]["campaigns"], 2);
    assert_eq!(body["user"]["campaigns"].as_array().unwrap().len(), 2);

    let response = server
        .get(&format!("/api/v1/achievements/user?wallet={}", ALICE))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let campaigns = body["campaigns"].as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], fulfilled.as_str());

    let body: Value = server
        .get(&format!("/api/v1/achievements/user?wallet={}", BOB))
        .await
        .json();
    assert!(body["campaigns"].as_array().unwrap().is_empty());
}

// ============ Persistence Tests ============

#[tokio::test]
async fn test_sled_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let retry = RetryConfig::default();

    let campaign_id = {
        let database = LedgerDatabase::open(StoreConfig::sled(dir.path()), &retry).unwrap();
        let server = TestServer::new(create_router(AppState::new(database.clone()))).unwrap();
        let campaign_id = create_campaign(&server, "500", &[]).await;
        contribute(&server, &campaign_id, json!("500"), "0xpersist")
            .await
            .assert_status(StatusCode::CREATED);
        database.shutdown().await.unwrap();
        campaign_id
    };

    let database = LedgerDatabase::open(StoreConfig::sled(dir.path()), &retry).unwrap();
    let server = TestServer::new(create_router(AppState::new(database))).unwrap();

    let body: Value = server
        .get(&format!("/api/v1/campaigns/{}", campaign_id))
        .await
        .json();
    assert_eq!(body["campaign"]["status"], "FULFILLED");
    assert_eq!(body["campaign"]["currentAmount"], "500");

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["backend"], "sled");
}
