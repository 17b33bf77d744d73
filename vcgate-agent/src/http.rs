//! HTTP front end: two routes, optional Basic auth, status mapping.
//!
//! ```text
//! POST /api/1/vehicles/{vin}/command/{command}   body: optional JSON object  -> true
//! GET  /api/1/vehicles/{vin}/data/{command}                                  -> scalar
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::task::JoinError;
use tokio::time::timeout;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use vcgate_domain::{decode_body, Result, VcError, VehicleConnector};

use crate::config::HTTP_READ_TIMEOUT;
use crate::dispatcher::Dispatcher;

/// Largest accepted command body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the application router. Auth applies to every route when
/// `credentials` is set.
pub fn router<C: VehicleConnector>(
    dispatcher: Dispatcher<C>,
    credentials: Option<Credentials>,
) -> Router {
    // ---
    let routes = Router::new()
        .route("/api/1/vehicles/{vin}/command/{command}", post(post_command::<C>))
        .route("/api/1/vehicles/{vin}/data/{command}", get(get_data::<C>));

    let routes = match credentials {
        Some(creds) => {
            routes.route_layer(middleware::from_fn_with_state(Arc::new(creds), require_auth))
        }
        None => routes,
    };

    routes.with_state(dispatcher)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn post_command<C: VehicleConnector>(
    State(dispatcher): State<Dispatcher<C>>,
    Path((vin, command)): Path<(String, String)>,
    body: Body,
) -> Response {
    // ---
    let span = info_span!("request", request_id = %Uuid::new_v4(), %vin, %command);
    async {
        let params = match read_params(body).await {
            Ok(params) => params,
            Err(e) => return respond(&vin, &command, Err::<bool, _>(e)),
        };

        let task = {
            let (vin, command) = (vin.clone(), command.clone());
            tokio::spawn(
                async move { dispatcher.execute_action(&vin, &command, &params).await }
                    .in_current_span(),
            )
        };
        respond(&vin, &command, joined(task.await).map(|()| true))
    }
    .instrument(span)
    .await
}

// ---

async fn get_data<C: VehicleConnector>(
    State(dispatcher): State<Dispatcher<C>>,
    Path((vin, command)): Path<(String, String)>,
) -> Response {
    // ---
    let span = info_span!("request", request_id = %Uuid::new_v4(), %vin, %command);
    async {
        let task = {
            let (vin, command) = (vin.clone(), command.clone());
            tokio::spawn(
                async move { dispatcher.execute_data(&vin, &command).await }.in_current_span(),
            )
        };
        respond(&vin, &command, joined(task.await))
    }
    .instrument(span)
    .await
}

// ---

/// Vehicle work runs in its own task so a dropped client connection cannot
/// cancel it between connection setup and teardown.
fn joined<T>(outcome: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    outcome.unwrap_or_else(|e| Err(VcError::Handler(format!("request task failed: {e}"))))
}

// ---

async fn read_params(body: Body) -> Result<vcgate_domain::Params> {
    // ---
    let bytes = timeout(HTTP_READ_TIMEOUT, axum::body::to_bytes(body, MAX_BODY_BYTES))
        .await
        .map_err(|_| VcError::BadRequest("timed out reading request body".into()))?
        .map_err(|e| VcError::BadRequest(format!("failed to read request body: {e}")))?;

    decode_body(&bytes)
}

// ---

fn respond<T: Serialize>(vin: &str, command: &str, result: Result<T>) -> Response {
    // ---
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            error!(vin, command, error = %e, "request failed");
            ApiError(e).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// [`VcError`] rendered as a plain-text HTTP error.
pub struct ApiError(pub VcError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        // ---
        match self.0 {
            VcError::BadRequest(_) => StatusCode::BAD_REQUEST,
            VcError::CommandNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}

// ---------------------------------------------------------------------------
// Basic auth
// ---------------------------------------------------------------------------

/// Expected Basic credentials, kept only as SHA-256 digests.
pub struct Credentials {
    // ---
    username: Vec<u8>,
    password: Vec<u8>,
}

impl Credentials {
    // ---
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: digest(username),
            password: digest(password),
        }
    }

    // ---

    /// Both halves are always compared, in constant time.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // ---
        let user_ok = self.username.ct_eq(&digest(username));
        let pass_ok = self.password.ct_eq(&digest(password));
        bool::from(user_ok & pass_ok)
    }
}

fn digest(s: &str) -> Vec<u8> {
    Sha256::digest(s.as_bytes()).to_vec()
}

// ---

/// Pull `user:password` out of an `Authorization: Basic ...` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    // ---
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_owned(), pass.to_owned()))
}

// ---

async fn require_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let authorized = basic_credentials(request.headers())
        .is_some_and(|(user, pass)| credentials.verify(&user, &pass));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
        "Unauthorized",
    )
        .into_response()
}

// ---

#[cfg(test)]
mod tests {
    // ---
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::{json, Value};
    use tokio::time::timeout;
    use tower::ServiceExt;

    use vcgate_domain::ChargingState;
    use vcgate_sim::{SimConfig, SimConnector, SimFault, SimOp, SimVehicle};

    use super::{router, Credentials};
    use crate::config::testing;
    use crate::dispatcher::Dispatcher;

    const VIN: &str = "5YJ3E1EA7KF000001";

    fn app(cfg: SimConfig, credentials: Option<Credentials>) -> (Router, SimVehicle) {
        // ---
        let vehicle = SimVehicle::new(cfg);
        let connector = SimConnector::new().with_vehicle(VIN, vehicle.clone());
        let dispatcher = Dispatcher::new(connector, testing::settings());
        (router(dispatcher, credentials), vehicle)
    }

    fn post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn command_path(name: &str) -> String {
        format!("/api/1/vehicles/{VIN}/command/{name}")
    }

    fn data_path(name: &str) -> String {
        format!("/api/1/vehicles/{VIN}/data/{name}")
    }

    // ---

    #[tokio::test]
    async fn action_responds_true() {
        // ---
        let (app, vehicle) = app(SimConfig::asleep(), None);
        let resp = app
            .oneshot(post(&command_path("set_charging_amps"), r#"{"charging_amps":"24"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(json_body(resp).await, json!(true));
        assert_eq!(vehicle.charge_state().charging_amps, 24);
    }

    #[tokio::test]
    async fn empty_body_is_accepted() {
        // ---
        let (app, vehicle) = app(SimConfig::awake(), None);
        let resp = app.oneshot(post(&command_path("charge_start"), "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(vehicle.charge_state().charging_state, ChargingState::Charging);
    }

    #[tokio::test]
    async fn unknown_command_is_404_without_vehicle_traffic() {
        // ---
        let (app, vehicle) = app(SimConfig::asleep(), None);
        let resp = app.oneshot(post(&command_path("honk"), "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(vehicle.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        // ---
        let (app, vehicle) = app(SimConfig::awake(), None);
        for body in ["{not json", "[1, 2]"] {
            let resp = app
                .clone()
                .oneshot(post(&command_path("set_soc_limit"), body))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        }
        assert!(vehicle.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_400() {
        // ---
        let (app, _vehicle) = app(SimConfig::awake(), None);
        let padding = "x".repeat(super::MAX_BODY_BYTES + 1);
        let body = format!(r#"{{"soc_limit":"80","pad":"{padding}"}}"#);
        let resp = app.oneshot(post(&command_path("set_soc_limit"), &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn remote_failure_is_500() {
        // ---
        let (app, vehicle) = app(SimConfig::awake(), None);
        vehicle.fail_always(SimOp::ChargeStop, SimFault::Rejected("busy".into()));
        let resp = app.oneshot(post(&command_path("charge_stop"), "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(vehicle.count(SimOp::ChargeStop), 3);
    }

    // ---

    #[tokio::test]
    async fn data_routes_return_scalars() {
        // ---
        let cases = [
            ("get_soc", json!(64)),
            ("get_soc_limit", json!(80)),
            ("get_battery_range", json!(231.5)),
            ("get_charge_state", json!("B")),
        ];
        for (name, expected) in cases {
            let (app, _vehicle) = app(SimConfig::awake(), None);
            let resp = app.oneshot(get(&data_path(name))).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{name}");
            assert_eq!(json_body(resp).await, expected, "{name}");
        }
    }

    #[tokio::test]
    async fn action_name_on_data_route_is_404() {
        // ---
        let (app, _vehicle) = app(SimConfig::awake(), None);
        let resp = app.oneshot(get(&data_path("charge_start"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dropped_client_still_tears_down_the_link() {
        // ---
        let mut cfg = SimConfig::awake();
        cfg.latency = Duration::from_millis(30);
        let (app, vehicle) = app(cfg, None);

        let pending = app.oneshot(post(&command_path("wake_up"), ""));
        assert!(timeout(Duration::from_millis(50), pending).await.is_err());

        // Open, Connect, StartSession and Wakeup each take 30 ms.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(vehicle.count(SimOp::Open), 1);
        assert_eq!(vehicle.count(SimOp::Close), vehicle.count(SimOp::Open));
        assert_eq!(vehicle.count(SimOp::Disconnect), 1);
        assert_eq!(vehicle.count(SimOp::Wakeup), 1);
    }

    #[tokio::test]
    async fn wrong_method_is_rejected() {
        // ---
        let (app, _vehicle) = app(SimConfig::awake(), None);
        let resp = app.oneshot(get(&command_path("charge_start"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // ---

    #[tokio::test]
    async fn auth_challenges_missing_or_wrong_credentials() {
        // ---
        let (app, vehicle) = app(SimConfig::awake(), Some(Credentials::new("fleet", "s3cret")));

        let resp = app.clone().oneshot(get(&data_path("get_soc"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            r#"Basic realm="restricted", charset="UTF-8""#
        );

        let mut req = get(&data_path("get_soc"));
        let wrong = format!("Basic {}", STANDARD.encode("fleet:guess"));
        req.headers_mut()
            .insert(header::AUTHORIZATION, wrong.parse().unwrap());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        assert!(vehicle.calls().is_empty());
    }

    #[tokio::test]
    async fn auth_admits_matching_credentials() {
        // ---
        let (app, _vehicle) = app(SimConfig::awake(), Some(Credentials::new("fleet", "s3cret")));

        let mut req = get(&data_path("get_soc"));
        let good = format!("Basic {}", STANDARD.encode("fleet:s3cret"));
        req.headers_mut()
            .insert(header::AUTHORIZATION, good.parse().unwrap());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!(64));
    }

    #[test]
    fn credentials_compare_both_halves() {
        // ---
        let creds = Credentials::new("fleet", "s3cret");
        assert!(creds.verify("fleet", "s3cret"));
        assert!(!creds.verify("fleet", "s3cre"));
        assert!(!creds.verify("Fleet", "s3cret"));
        assert!(!creds.verify("", ""));
    }
}
