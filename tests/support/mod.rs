// Shared bootstrapping for integration tests: an axum fake of the hosted
// backend plus the ledger service pointed at it.
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};
use url::Url;

// Token the fake backend accepts as a signed-in operator.
pub const OPERATOR_TOKEN: &str = "operator-token";
pub const OPERATOR_EMAIL: &str = "ops@example.com";
// Second accepted token, for flows that end the session.
pub const DEPARTING_TOKEN: &str = "departing-token";
// Players whose name starts with this reject balance updates.
pub const FROZEN_PREFIX: &str = "frozen-";

// Global base URL of the ledger service once it is listening.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

#[derive(Clone, Default)]
struct FakeTables {
    players: Arc<Mutex<Vec<Value>>>,
    deposits: Arc<Mutex<Vec<Value>>>,
    revoked: Arc<Mutex<HashSet<String>>>,
}

// Ensure both servers are running and return the ledger base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own runtime on an OS thread so the servers outlive individual test runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let backend_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fake backend port");
                let backend_addr = backend_listener.local_addr().expect("backend addr");
                tokio::spawn(async move {
                    axum::serve(backend_listener, fake_backend())
                        .await
                        .expect("fake backend failed");
                });

                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));

                let config = chip_ledger::LedgerConfig {
                    supabase_url: Url::parse(&format!("http://{backend_addr}"))
                        .expect("backend url"),
                    supabase_anon_key: "anon-key".to_string(),
                    http_port: addr.port(),
                    request_timeout: Duration::from_secs(2),
                    login_path: "/login".to_string(),
                    view_idle_timeout: Duration::from_secs(600),
                };
                chip_ledger::run(listener, config).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Client that does not follow redirects, so login redirects can be asserted.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test client")
}

fn fake_backend() -> Router {
    Router::new()
        .route("/auth/v1/user", get(current_user))
        .route("/auth/v1/logout", post(sign_out))
        .route(
            "/rest/v1/players",
            get(select_players).post(insert_players).patch(update_player),
        )
        .route(
            "/rest/v1/deposits",
            get(select_deposits).post(insert_deposits),
        )
        .with_state(FakeTables::default())
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn is_operator(tables: &FakeTables, headers: &HeaderMap) -> bool {
    let has_key = headers.get("apikey").is_some_and(|v| v == "anon-key");
    let Some(token) = bearer(headers) else {
        return false;
    };
    let known = token == OPERATOR_TOKEN || token == DEPARTING_TOKEN;
    has_key && known && !tables.revoked.lock().expect("revoked mutex").contains(token)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": 401, "msg": "invalid JWT" })),
    )
        .into_response()
}

async fn current_user(State(tables): State<FakeTables>, headers: HeaderMap) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    Json(json!({ "id": "user-ops", "email": OPERATOR_EMAIL })).into_response()
}

async fn sign_out(State(tables): State<FakeTables>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer(&headers) {
        tables
            .revoked
            .lock()
            .expect("revoked mutex")
            .insert(token.to_string());
    }
    StatusCode::NO_CONTENT
}

async fn select_players(State(tables): State<FakeTables>, headers: HeaderMap) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    let players = tables.players.lock().expect("players mutex").clone();
    Json(players).into_response()
}

async fn insert_players(
    State(tables): State<FakeTables>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    let mut players = tables.players.lock().expect("players mutex");
    for row in rows {
        players.push(json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "name": row["name"],
            "balance": null,
        }));
    }
    StatusCode::CREATED.into_response()
}

async fn update_player(
    State(tables): State<FakeTables>,
    headers: HeaderMap,
    Query(filter): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    let Some(id) = filter.get("id").and_then(|v| v.strip_prefix("eq.")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "missing id filter" })),
        )
            .into_response();
    };
    let mut players = tables.players.lock().expect("players mutex");
    let frozen = players.iter().any(|p| {
        p["id"] == id
            && p["name"]
                .as_str()
                .is_some_and(|name| name.starts_with(FROZEN_PREFIX))
    });
    if frozen {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "balance column is locked" })),
        )
            .into_response();
    }
    for player in players.iter_mut().filter(|p| p["id"] == id) {
        player["balance"] = patch["balance"].clone();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn select_deposits(
    State(tables): State<FakeTables>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    let mut deposits = tables.deposits.lock().expect("deposits mutex").clone();
    if params.get("order").map(String::as_str) == Some("timestamp.desc") {
        // RFC 3339 strings in the same zone sort chronologically.
        deposits.sort_by(|a, b| {
            b["timestamp"]
                .as_str()
                .unwrap_or_default()
                .cmp(a["timestamp"].as_str().unwrap_or_default())
        });
    }
    Json(deposits).into_response()
}

async fn insert_deposits(
    State(tables): State<FakeTables>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    if !is_operator(&tables, &headers) {
        return unauthorized();
    }
    let mut deposits = tables.deposits.lock().expect("deposits mutex");
    for mut row in rows {
        row["id"] = json!(deposits.len() + 1);
        deposits.push(row);
    }
    StatusCode::CREATED.into_response()
}
