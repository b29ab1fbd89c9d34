//! Requests built by the core client, executed over real HTTP.
//!
//! # Design
//! Starts the mock server on a random port, points a `Client` at it with the
//! `base_url` option, and executes through the default `UreqTransport`.
//! Validates that what the builder produces is what reaches the server.

use std::net::SocketAddr;

use etsy_core::{ApiError, Client, HttpMethod, NO_BODY};
use mock_server::{EchoedRequest, Listing, APPLICATION_ID};

/// Start the mock server on a random port in a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, api_key: &str) -> Client {
    Client::builder()
        .with_app(api_key)
        .base_url(format!("http://{addr}/v3/application/"))
        .build()
        .unwrap()
}

#[test]
fn listing_lifecycle() {
    let addr = start_server();
    let client = client_for(addr, "integration-key");

    // Step 1: ping.
    let req = client.build_get("openapi-ping").unwrap();
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 200);
    let ping: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(ping["application_id"], APPLICATION_ID);

    // Step 2: create a listing.
    let payload = serde_json::json!({"title": "Linen apron", "quantity": 2});
    let req = client.new_request("POST", "shops/11/listings", Some(&payload)).unwrap();
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 201);
    let created: Listing = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(created.shop_id, 11);
    assert_eq!(created.title, "Linen apron");
    assert_eq!(created.quantity, 2);

    // Step 3: fetch it back.
    let req = client.build_get(&format!("listings/{}", created.listing_id)).unwrap();
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 200);
    let fetched: Listing = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(fetched, created);

    // Step 4: delete.
    let req = client.build_delete(&format!("listings/{}", created.listing_id)).unwrap();
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 204);

    // Step 5: error statuses come back as data.
    let req = client.build_get(&format!("listings/{}", created.listing_id)).unwrap();
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 404);
}

#[test]
fn headers_reach_the_wire() {
    let addr = start_server();
    let client = client_for(addr, "wire-key");

    let req = client
        .new_request("PUT", "echo/listings/3?fields=title", Some(&serde_json::json!({"title": "x"})))
        .unwrap();
    assert_eq!(req.method, HttpMethod::Put);
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 200);

    let echoed: EchoedRequest = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(echoed.method, "PUT");
    assert_eq!(echoed.path, "/v3/application/echo/listings/3");
    assert_eq!(echoed.query.as_deref(), Some("fields=title"));
    assert_eq!(echoed.headers["content-type"], "application/json; charset=utf-8");
    assert_eq!(echoed.headers["accept"], "application/json; charset=utf-8");
    assert_eq!(echoed.headers["x-api-key"], "wire-key");
    assert_eq!(echoed.headers["user-agent"], "go-etsy");
    // The wire host comes from the URL, not the fixed Host header.
    assert_eq!(echoed.headers["host"], addr.to_string());
    assert!(!echoed.headers.contains_key("authorization"));
    let body: serde_json::Value = serde_json::from_str(&echoed.body).unwrap();
    assert_eq!(body, serde_json::json!({"title": "x"}));
}

#[test]
fn get_without_body_sends_no_body() {
    let addr = start_server();
    let client = client_for(addr, "key");

    let req = client.new_request("get", "echo/shops/1", NO_BODY).unwrap();
    let echoed: EchoedRequest = serde_json::from_str(&client.execute(&req).unwrap().body).unwrap();
    assert_eq!(echoed.method, "GET");
    assert!(echoed.body.is_empty());
}

#[test]
fn non_typed_methods_reach_the_wire() {
    let addr = start_server();
    let client = client_for(addr, "ext-key");

    for token in ["OPTIONS", "PROPFIND"] {
        let req = client.new_request(token, "echo/shops/1", NO_BODY).unwrap();
        let resp = client.execute(&req).unwrap();
        assert_eq!(resp.status, 200, "{token}");

        let echoed: EchoedRequest = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(echoed.method, token);
        assert_eq!(echoed.path, "/v3/application/echo/shops/1");
        assert_eq!(echoed.headers["x-api-key"], "ext-key");
        assert_eq!(echoed.headers["user-agent"], "go-etsy");
        assert_eq!(echoed.headers["host"], addr.to_string());
    }

    let body = serde_json::json!({"depth": 1});
    let req = client.new_request("PROPFIND", "echo/shops/2", Some(&body)).unwrap();
    let echoed: EchoedRequest = serde_json::from_str(&client.execute(&req).unwrap().body).unwrap();
    let sent: serde_json::Value = serde_json::from_str(&echoed.body).unwrap();
    assert_eq!(sent, body);
}

#[test]
fn missing_api_key_is_rejected_by_server_not_client() {
    let addr = start_server();
    let client = Client::builder()
        .base_url(format!("http://{addr}/v3/application/"))
        .build()
        .unwrap();

    let req = client.build_get("openapi-ping").unwrap();
    assert_eq!(req.header("x-api-key"), Some(""));
    let resp = client.execute(&req).unwrap();
    assert_eq!(resp.status, 403);
}

#[test]
fn unreachable_host_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr, "key");

    let req = client.build_get("openapi-ping").unwrap();
    let err = client.execute(&req).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
