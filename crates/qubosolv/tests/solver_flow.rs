//! End-to-end tests against an in-process fake of the identity provider and
//! the task endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use ndarray::array;
use qubosolv::{
    Algorithm, CredentialStore, Credentials, OidcConfig, QuboError, SolveParams, Solver,
    SolverBuilder,
};
use serde_json::{Value, json};

// ============================================================================
// Fake service
// ============================================================================

const USERNAME: &str = "alice";
const PASSWORD: &str = "s3cret";
const ISSUED_TOKEN: &str = "issued-token";
const PORTAL_TOKEN: &str = "portal-token";

#[derive(Default)]
struct Recorded {
    base: String,
    token_requests: Mutex<Vec<HashMap<String, String>>>,
    tasks: Mutex<Vec<Value>>,
}

fn canned_response() -> Value {
    json!({
        "opt_bitstring": "10",
        "energies": [-1.0, 0.0, 1.0],
        "bitstrings": ["10", "00", "11"],
        "opt_energy": -1.0,
        "duration": 0.25,
        "solver_config": {"algorithm": "sa", "num_reads": 3}
    })
}

async fn well_known(State(state): State<Arc<Recorded>>) -> Json<Value> {
    let realm = format!("{}/auth/realms/quantum", state.base);
    Json(json!({
        "issuer": realm,
        "token_endpoint": format!("{realm}/protocol/openid-connect/token"),
    }))
}

async fn token(
    State(state): State<Arc<Recorded>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let ok = form.get("grant_type").map(String::as_str) == Some("password")
        && form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    state.token_requests.lock().unwrap().push(form);

    if ok {
        Json(json!({
            "access_token": ISSUED_TOKEN,
            "token_type": "Bearer",
            "expires_in": 300,
            "refresh_expires_in": 1800,
            "refresh_token": "refresh",
            "scope": "openid"
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    value == format!("Bearer {ISSUED_TOKEN}") || value == format!("Bearer {PORTAL_TOKEN}")
}

async fn task(
    State(state): State<Arc<Recorded>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    state.tasks.lock().unwrap().push(body);
    Json(canned_response()).into_response()
}

async fn task_as_string(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    Json(Value::String(canned_response().to_string())).into_response()
}

async fn task_broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "annealer offline").into_response()
}

async fn spawn_server() -> Arc<Recorded> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let state = Arc::new(Recorded {
        base: format!("http://{addr}"),
        ..Recorded::default()
    });

    let app = Router::new()
        .route(
            "/auth/realms/quantum/.well-known/openid-configuration",
            get(well_known),
        )
        .route(
            "/auth/realms/quantum/protocol/openid-connect/token",
            post(token),
        )
        .route("/api/task", post(task))
        .route("/string-api/task", post(task_as_string))
        .route("/broken-api/task", post(task_broken))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    state
}

fn builder_for(state: &Recorded, dir: &std::path::Path) -> SolverBuilder {
    Solver::builder()
        .credentials_file(dir)
        .oidc_config(OidcConfig::custom(
            format!("{}/auth/", state.base),
            "quantum",
            "quantum-client",
        ))
        .host(format!("{}/api", state.base))
}

// ============================================================================
// Token supplied directly
// ============================================================================

#[tokio::test]
async fn test_token_submits_matrix_and_parameters_unchanged() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let solver = builder_for(&state, dir.path())
        .token(PORTAL_TOKEN)
        .connect()
        .await
        .unwrap();

    let params = SolveParams::default()
        .with_temp_start(8.0)
        .with_beta(0.1)
        .maximize(true)
        .with_algorithm(Algorithm::SimulatedQuantumAnnealing);
    let matrix = vec![vec![-1.0, 2.0], vec![0.0, -1.5]];
    solver.solve(matrix.clone(), &params).await.unwrap();

    assert!(state.token_requests.lock().unwrap().is_empty());

    let tasks = state.tasks.lock().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["matrix"], json!(matrix));
    assert_eq!(
        tasks[0]["parameter"],
        json!({
            "temp_start": 8.0,
            "temp_end": 0.1,
            "tau": 0.9999,
            "beta": 0.1,
            "maximize": true,
            "algorithm": "sqa"
        })
    );
}

#[tokio::test]
async fn test_result_energies_shifted_by_offset() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let solver = builder_for(&state, dir.path())
        .token(PORTAL_TOKEN)
        .connect()
        .await
        .unwrap();

    let result = solver
        .solve(
            vec![vec![1.0, -2.0], vec![0.0, 1.0]],
            &SolveParams::default().with_offset(3.0),
        )
        .await
        .unwrap();

    assert_eq!(result.energies, vec![2.0, 3.0, 4.0]);
    assert_eq!(result.optimal_energy, 2.0);
    assert_eq!(result.optimal_bitstring, vec![1, 0]);
    assert_eq!(result.bitstrings, vec![vec![1, 0], vec![0, 0], vec![1, 1]]);
    assert_eq!(result.duration, 0.25);
    assert_eq!(result.solver_config["num_reads"], 3);
}

#[tokio::test]
async fn test_ndarray_matrix_sent_as_nested_lists() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let solver = builder_for(&state, dir.path())
        .token(PORTAL_TOKEN)
        .connect()
        .await
        .unwrap();

    let qubo = array![[-2.0, 1.0, 0.0], [0.0, -2.0, 1.0], [0.0, 0.0, -2.0]];
    solver.solve(&qubo, &SolveParams::default()).await.unwrap();

    let tasks = state.tasks.lock().unwrap();
    assert_eq!(
        tasks[0]["matrix"],
        json!([[-2.0, 1.0, 0.0], [0.0, -2.0, 1.0], [0.0, 0.0, -2.0]])
    );
    assert!(tasks[0]["parameter"]["algorithm"].is_null());
}

#[tokio::test]
async fn test_string_encoded_response() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let solver = builder_for(&state, dir.path())
        .token(PORTAL_TOKEN)
        .host(format!("{}/string-api", state.base))
        .connect()
        .await
        .unwrap();

    let result = solver
        .solve(vec![vec![1.0]], &SolveParams::default())
        .await
        .unwrap();
    assert_eq!(result.optimal_energy, -1.0);
}

#[tokio::test]
async fn test_rejected_token() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let solver = builder_for(&state, dir.path())
        .token("forged")
        .connect()
        .await
        .unwrap();

    let err = solver
        .solve(vec![vec![1.0]], &SolveParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, QuboError::AuthFailed(_)));
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let solver = builder_for(&state, dir.path())
        .token(PORTAL_TOKEN)
        .host(format!("{}/broken-api", state.base))
        .connect()
        .await
        .unwrap();

    let err = solver
        .solve(vec![vec![1.0]], &SolveParams::default())
        .await
        .unwrap_err();
    match err {
        QuboError::ApiError { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("annealer offline"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

// ============================================================================
// Username / password
// ============================================================================

#[tokio::test]
async fn test_supplied_credentials_are_saved_and_exchanged() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let solver = builder_for(&state, dir.path())
        .username(USERNAME)
        .password(PASSWORD)
        .connect()
        .await
        .unwrap();

    assert_eq!(
        solver.configuration().access_token.as_deref(),
        Some(ISSUED_TOKEN)
    );

    let stored = CredentialStore::resolve(Some(dir.path())).load().unwrap();
    assert_eq!(stored, Credentials::new(USERNAME, PASSWORD));

    let requests = state.token_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["client_id"], "quantum-client");
    assert_eq!(requests[0]["scope"], "openid");
}

#[tokio::test]
async fn test_stored_credentials_used_on_later_sessions() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    CredentialStore::resolve(Some(dir.path()))
        .save(&Credentials::new(USERNAME, PASSWORD))
        .unwrap();

    let solver = builder_for(&state, dir.path()).connect().await.unwrap();
    let result = solver
        .solve(vec![vec![0.0, 1.0], vec![0.0, 0.0]], &SolveParams::default())
        .await
        .unwrap();

    assert_eq!(result.to_string(), "SolverResult(-1)");
    assert_eq!(state.tasks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_password_fails_authentication() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let err = builder_for(&state, dir.path())
        .username(USERNAME)
        .password("wrong")
        .connect()
        .await
        .unwrap_err();

    assert!(matches!(err, QuboError::AuthFailed(_)));
    // The pair is persisted before it is checked against the provider.
    assert!(CredentialStore::resolve(Some(dir.path())).exists());
}

#[tokio::test]
async fn test_missing_file_without_token_is_configuration_error() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let err = builder_for(&state, dir.path()).connect().await.unwrap_err();
    assert!(err.is_configuration());
    assert!(state.token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_username_is_configuration_error() {
    let state = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let err = builder_for(&state, dir.path())
        .username(USERNAME)
        .connect()
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(!CredentialStore::resolve(Some(dir.path())).exists());
}

// ============================================================================
// Blocking wrapper
// ============================================================================

#[test]
fn test_blocking_solver_round_trip() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let state = server_rt.block_on(spawn_server());
    let dir = tempfile::tempdir().unwrap();

    let solver = qubosolv::blocking::Solver::connect(
        builder_for(&state, dir.path())
            .username(USERNAME)
            .password(PASSWORD),
    )
    .unwrap();

    let result = solver
        .solve(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            &SolveParams::default().with_offset(-1.0),
        )
        .unwrap();
    assert_eq!(result.energies, vec![-2.0, -1.0, 0.0]);
}
