//! HTTP route handlers: the network side of the control surface.
//!
//! Every arbitration outcome maps 1:1 to a status code and message; none of
//! them are transported as HTTP faults. The servo endpoints are maintenance
//! hooks that drive the actuator directly, bypassing arbitration.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::credential::Credential;
use crate::gate::GateActuator;
use crate::lanes::CredentialReader;
use crate::service::{ArbitrationError, LotService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LotService>,
    pub gate: Arc<dyn GateActuator>,
    /// Reader shared with the maintenance scan endpoint. None when no reader
    /// hardware is attached.
    pub reader: Option<Arc<dyn CredentialReader>>,
}

#[derive(Debug, Deserialize)]
struct UidRequest {
    uid: String,
}

fn message(text: &str) -> Json<serde_json::Value> {
    Json(json!({ "message": text }))
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.snapshot().await)
}

async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<UidRequest>,
) -> impl IntoResponse {
    let cred = Credential::from(request.uid);
    match state.service.reserve(&cred).await {
        Ok(()) => (StatusCode::OK, message("Reservation Successful")),
        Err(ArbitrationError::AlreadyReserved) => {
            // 200 for parity with the original controller: a repeated
            // reservation is data, not an HTTP error.
            (StatusCode::OK, message("UID already reserved"))
        }
        Err(ArbitrationError::ParkingFull) => (StatusCode::BAD_REQUEST, message("Parking Full")),
        Err(ArbitrationError::NotRegistered) | Err(ArbitrationError::AccessDenied) => {
            (StatusCode::FORBIDDEN, message("Access Denied: Invalid UID"))
        }
        Err(e) => {
            tracing::error!(%cred, error = %e, "reservation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message("Internal Error"))
        }
    }
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Json(request): Json<UidRequest>,
) -> impl IntoResponse {
    let cred = Credential::from(request.uid);
    match state.service.cancel_reservation(&cred).await {
        Ok(()) => (StatusCode::OK, message("Reservation Canceled")),
        Err(ArbitrationError::NotFound) => (
            StatusCode::BAD_REQUEST,
            message("No reservation found for this UID"),
        ),
        Err(e) => {
            tracing::error!(%cred, error = %e, "reservation cancel failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message("Internal Error"))
        }
    }
}

/// Single non-blocking poll of the RFID reader.
async fn rfid_read(State(state): State<AppState>) -> impl IntoResponse {
    let uid = match state.reader {
        Some(reader) => reader.poll().await.map(|cred| cred.to_string()),
        None => None,
    };
    Json(json!({ "uid": uid }))
}

async fn servo_open(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("gate open requested via maintenance endpoint");
    state.gate.open().await;
    (StatusCode::OK, message("Gate opened"))
}

async fn servo_close(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("gate close requested via maintenance endpoint");
    state.gate.close().await;
    (StatusCode::OK, message("Gate closed"))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/reserve", post(reserve))
        .route("/cancel_reservation", post(cancel_reservation))
        .route("/rfid_read", get(rfid_read))
        .route("/servo_open", post(servo_open))
        .route("/servo_close", post(servo_close))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::LotConfig;
    use crate::gate::{DisplayPanel, LoggingDisplay};

    #[derive(Default)]
    struct RecordingGate {
        events: StdMutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl GateActuator for RecordingGate {
        async fn open(&self) {
            self.events.lock().unwrap().push("open");
        }

        async fn close(&self) {
            self.events.lock().unwrap().push("close");
        }
    }

    /// Reader with a fixed queue of scans.
    struct ScriptedReader {
        scans: StdMutex<Vec<Credential>>,
    }

    #[async_trait]
    impl CredentialReader for ScriptedReader {
        async fn next_credential(&self) -> Option<Credential> {
            self.poll().await
        }

        async fn poll(&self) -> Option<Credential> {
            self.scans.lock().unwrap().pop()
        }
    }

    struct Harness {
        state: AppState,
        gate: Arc<RecordingGate>,
        _dir: tempfile::TempDir,
    }

    fn harness(slot_count: usize, reader: Option<Arc<dyn CredentialReader>>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = LotConfig {
            slot_count,
            data_dir: dir.path().to_path_buf(),
            gate_hold: Duration::ZERO,
            ..LotConfig::default()
        };
        let gate = Arc::new(RecordingGate::default());
        let service = Arc::new(
            LotService::open(
                &config,
                Arc::clone(&gate) as Arc<dyn GateActuator>,
                Arc::new(LoggingDisplay) as Arc<dyn DisplayPanel>,
            )
            .unwrap(),
        );
        Harness {
            state: AppState {
                service,
                gate: Arc::new(RecordingGate::default()),
                reader,
            },
            gate,
            _dir: dir,
        }
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_uid(path: &str, uid: &str) -> Request<Body> {
        Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"uid":"{uid}"}}"#)))
            .unwrap()
    }

    #[tokio::test]
    async fn status_reports_counts_and_per_slot_identity() {
        let h = harness(4, None);
        h.state.service.register(&Credential::from("A1")).await.unwrap();
        h.state.service.entry(&Credential::from("A1")).await.unwrap();

        let app = routes(h.state.clone());
        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["available_slots"], 3);
        assert_eq!(json["total_slots"], 4);
        assert_eq!(json["reserved"], 0);
        assert_eq!(json["slots"][0], "A1");
        assert!(json["slots"][1].is_null());
    }

    #[tokio::test]
    async fn reserve_succeeds_for_registered_uid() {
        let h = harness(4, None);
        h.state.service.register(&Credential::from("B2")).await.unwrap();

        let app = routes(h.state.clone());
        let response = app.oneshot(post_uid("/reserve", "B2")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["message"], "Reservation Successful");
    }

    #[tokio::test]
    async fn reserve_unknown_uid_is_forbidden() {
        let h = harness(4, None);

        let app = routes(h.state.clone());
        let response = app.oneshot(post_uid("/reserve", "ghost")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = response_json(response).await;
        assert_eq!(json["message"], "Access Denied: Invalid UID");
    }

    #[tokio::test]
    async fn repeated_reserve_is_ok_with_already_reserved_message() {
        let h = harness(4, None);
        h.state.service.register(&Credential::from("B2")).await.unwrap();

        let app = routes(h.state.clone());
        let first = app.oneshot(post_uid("/reserve", "B2")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let app = routes(h.state.clone());
        let second = app.oneshot(post_uid("/reserve", "B2")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let json = response_json(second).await;
        assert_eq!(json["message"], "UID already reserved");
    }

    #[tokio::test]
    async fn reserve_on_full_lot_is_bad_request() {
        let h = harness(1, None);
        h.state.service.register(&Credential::from("A1")).await.unwrap();
        h.state.service.register(&Credential::from("B2")).await.unwrap();
        h.state.service.entry(&Credential::from("A1")).await.unwrap();

        let app = routes(h.state.clone());
        let response = app.oneshot(post_uid("/reserve", "B2")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["message"], "Parking Full");
    }

    #[tokio::test]
    async fn cancel_reservation_round_trip() {
        let h = harness(4, None);
        h.state.service.register(&Credential::from("B2")).await.unwrap();
        h.state.service.reserve(&Credential::from("B2")).await.unwrap();

        let app = routes(h.state.clone());
        let response = app
            .oneshot(post_uid("/cancel_reservation", "B2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = routes(h.state.clone());
        let again = app
            .oneshot(post_uid("/cancel_reservation", "B2"))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::BAD_REQUEST);
        let json = response_json(again).await;
        assert_eq!(json["message"], "No reservation found for this UID");
    }

    #[tokio::test]
    async fn rfid_read_returns_scanned_uid_or_null() {
        let reader = Arc::new(ScriptedReader {
            scans: StdMutex::new(vec![Credential::from("12345678")]),
        });
        let h = harness(4, Some(reader as Arc<dyn CredentialReader>));

        let app = routes(h.state.clone());
        let response = app
            .oneshot(Request::get("/rfid_read").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["uid"], "12345678");

        // Queue drained: next poll reports no tag.
        let app = routes(h.state.clone());
        let response = app
            .oneshot(Request::get("/rfid_read").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["uid"].is_null());
    }

    #[tokio::test]
    async fn rfid_read_without_reader_returns_null() {
        let h = harness(4, None);

        let app = routes(h.state.clone());
        let response = app
            .oneshot(Request::get("/rfid_read").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert!(json["uid"].is_null());
    }

    #[tokio::test]
    async fn servo_endpoints_drive_the_gate_directly() {
        let h = harness(4, None);
        let maintenance_gate = Arc::new(RecordingGate::default());
        let state = AppState {
            gate: Arc::clone(&maintenance_gate) as Arc<dyn GateActuator>,
            ..h.state.clone()
        };

        let app = routes(state.clone());
        let response = app
            .oneshot(Request::post("/servo_open").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["message"], "Gate opened");

        let app = routes(state);
        let response = app
            .oneshot(Request::post("/servo_close").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response_json(response).await["message"], "Gate closed");

        assert_eq!(*maintenance_gate.events.lock().unwrap(), vec!["open", "close"]);
        // Arbitration's own gate never moved.
        assert!(h.gate.events.lock().unwrap().is_empty());
    }
}
