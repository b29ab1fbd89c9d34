use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{OriginalUri, Path, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Path prefix the real API serves v3 application endpoints under.
pub const BASE_PATH: &str = "/v3/application";

/// `application_id` reported by the ping endpoint.
pub const APPLICATION_ID: u64 = 1_234_567;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: u64,
    pub shop_id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateListing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// What the echo endpoint saw on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Default)]
pub struct AppState {
    listings: RwLock<HashMap<u64, Listing>>,
    next_id: AtomicU64,
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    let db: Db = Arc::new(AppState::default());
    let api = Router::new()
        .route("/openapi-ping", get(ping))
        .route("/shops/{shop_id}/listings", post(create_listing))
        .route("/listings/{listing_id}", get(get_listing).delete(delete_listing))
        .route("/echo/{*rest}", any(echo))
        .route_layer(middleware::from_fn(require_api_key))
        .with_state(db);
    Router::new().nest(BASE_PATH, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let has_key = request
        .headers()
        .get("x-api-key")
        .is_some_and(|v| !v.is_empty());
    if !has_key {
        debug!(uri = %request.uri(), "rejected request without api key");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Invalid API key: should be in the format 'keystring:shared_secret'"})),
        )
            .into_response();
    }
    next.run(request).await
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "application_id": APPLICATION_ID }))
}

async fn create_listing(
    State(db): State<Db>,
    Path(shop_id): Path<u64>,
    Json(input): Json<CreateListing>,
) -> (StatusCode, Json<Listing>) {
    let listing_id = db.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    let listing = Listing {
        listing_id,
        shop_id,
        title: input.title,
        description: input.description,
        quantity: input.quantity,
    };
    db.listings.write().await.insert(listing_id, listing.clone());
    debug!(listing_id, shop_id, "created listing");
    (StatusCode::CREATED, Json(listing))
}

async fn get_listing(
    State(db): State<Db>,
    Path(listing_id): Path<u64>,
) -> Result<Json<Listing>, StatusCode> {
    let listings = db.listings.read().await;
    listings.get(&listing_id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_listing(
    State(db): State<Db>,
    Path(listing_id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut listings = db.listings.write().await;
    listings
        .remove(&listing_id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    })
}
