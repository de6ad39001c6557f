//! In-process mock Rule Store built on axum.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use brokerage_store::StoreClient;

/// Requests observed by the mock store.
#[derive(Default)]
pub struct Recorded {
    pub upserts: Vec<Value>,
    pub deletes: Vec<Vec<i64>>,
    pub rule_queries: Vec<HashMap<String, String>>,
    pub plan_queries: Vec<HashMap<String, String>>,
}

pub type SharedRecorded = Arc<Mutex<Recorded>>;

/// `from` value the mock rejects with a store message.
pub const REJECTED_FROM: f64 = 13.0;

/// Make id whose model lookup fails without a message.
pub const BROKEN_MAKE: i64 = 999;

async fn upsert(State(rec): State<SharedRecorded>, Json(body): Json<Value>) -> Response {
    if body["from"].as_f64() == Some(REJECTED_FROM) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"statusCode": 400, "message": "Range overlaps an existing rule"})),
        )
            .into_response();
    }
    let id = body.get("id").cloned().unwrap_or(json!(42));
    rec.lock().unwrap().upserts.push(body);
    Json(json!({ "id": id })).into_response()
}

async fn delete(State(rec): State<SharedRecorded>, Json(body): Json<Value>) -> StatusCode {
    let ids = body["ids"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    rec.lock().unwrap().deletes.push(ids);
    StatusCode::OK
}

async fn get_rules(
    State(rec): State<SharedRecorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    rec.lock().unwrap().rule_queries.push(params);
    Json(json!({
        "health": [],
        "life": [],
        "car": {
            "used": {
                "range": [{
                    "id": 1, "from": 0, "to": 10000, "persitage": 5,
                    "type": "used", "createdAt": "2025-01-01T00:00:00.000Z"
                }],
                "groups": [{
                    "id": 7, "persitage": 10, "type": "used",
                    "createdAt": "2025-01-02T00:00:00.000Z",
                    "groups": [{"groupName": "Economy", "cars": [
                        {"makeId": 5, "modelId": 12, "years": [2018],
                         "make": {"name": "Toyota"}, "model": {"name": "Corolla"}}
                    ]}]
                }]
            }
        }
    }))
}

async fn makes() -> Json<Value> {
    Json(json!([{"id": 5, "name": "Toyota"}, {"id": 6, "name": "Honda"}]))
}

async fn models(Path(make_id): Path<i64>) -> Response {
    if make_id == BROKEN_MAKE {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    Json(json!([{"id": 12, "name": "Corolla"}, {"id": 13, "name": "Camry"}])).into_response()
}

async fn years(Path(model_id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": model_id * 100, "year": 2018}, {"id": model_id * 100 + 1, "year": 2019}]))
}

async fn plans(
    State(rec): State<SharedRecorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    rec.lock().unwrap().plan_queries.push(params);
    Json(json!({"results": [
        {"id": 1, "name": "Health Basic", "insuranceType": "HEALTH"},
        {"id": 2, "name": "Car Gold", "insuranceType": "CAR", "recommend": true}
    ]}))
}

pub fn router(rec: SharedRecorded) -> Router {
    Router::new()
        .route("/rules/car", post(upsert))
        .route("/rules/car/delete", post(delete))
        .route("/rules/getRules", get(get_rules))
        .route("/cars/makes", get(makes))
        .route("/cars/models/{make_id}", get(models))
        .route("/cars/years/{model_id}", get(years))
        .route("/insurance-plans/getAll", get(plans))
        .with_state(rec)
}

/// Start the mock store on an ephemeral port and return a client for it.
pub async fn spawn_store() -> (StoreClient, SharedRecorded) {
    let rec = SharedRecorded::default();
    let app = router(Arc::clone(&rec));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock store crashed");
    });

    let client = StoreClient::with_client(reqwest::Client::new(), format!("http://{addr}"));
    (client, rec)
}
