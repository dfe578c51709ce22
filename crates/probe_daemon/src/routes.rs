use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{
        sse::{Event as SseEvent, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use probe_core::{
    Command, Event, EventEnvelope, FlightProfile, GameStep, LandingMethod, PartCategory, PartId,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<axum::http::HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/state", get(state_handler))
        .route("/api/v1/catalog", get(catalog_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/start", post(start_handler))
        .route("/api/v1/parts/select", post(select_part_handler))
        .route("/api/v1/design/back", post(design_back_handler))
        .route("/api/v1/design/next", post(design_next_handler))
        .route("/api/v1/plan", post(plan_handler))
        .route("/api/v1/plan/back", post(plan_back_handler))
        .route("/api/v1/launch", post(launch_handler))
        .route("/api/v1/sweep/stop", post(sweep_stop_handler))
        .route("/api/v1/retry", post(retry_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Apply one wizard command, broadcast its events, and report the new
/// position in the wizard alongside them.
fn run_command(app_state: &AppState, command: &Command) -> Json<serde_json::Value> {
    let (events, step, phase) = {
        let mut sim = app_state.sim.lock();
        let events = sim.apply(command);
        (events, sim.session.step, sim.session.sim_phase)
    };
    if !events.is_empty() {
        let _ = app_state.event_tx.send(events.clone());
    }
    Json(serde_json::json!({
        "step": step,
        "sim_phase": phase,
        "events": events,
    }))
}

async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    Json(serde_json::json!({
        "step": sim.session.step,
        "sim_phase": sim.session.sim_phase,
        "seed": sim.session.meta.seed,
        "epoch": sim.session.meta.epoch,
        "content_version": sim.session.meta.content_version,
    }))
}

async fn state_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let sim = app_state.sim.lock();
    match serde_json::to_string(&sim.session) {
        Ok(json) => {
            drop(sim);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            tracing::error!("session serialization failed: {err}");
            drop(sim);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

async fn catalog_handler(State(app_state): State<AppState>) -> Json<Vec<probe_core::Part>> {
    let sim = app_state.sim.lock();
    Json(sim.session.catalog.clone())
}

async fn start_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    run_command(&app_state, &Command::StartMission)
}

#[derive(Deserialize)]
struct SelectPartBody {
    part_id: String,
}

async fn select_part_handler(
    State(app_state): State<AppState>,
    Json(body): Json<SelectPartBody>,
) -> Json<serde_json::Value> {
    run_command(
        &app_state,
        &Command::SelectPart {
            part_id: PartId(body.part_id),
        },
    )
}

async fn design_back_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    run_command(&app_state, &Command::BackToIntro)
}

async fn design_next_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let (events, advanced) = {
        let mut sim = app_state.sim.lock();
        let events = sim.apply(&Command::AdvanceToPlan);
        (events, sim.session.step == GameStep::Plan)
    };
    if !events.is_empty() {
        let _ = app_state.event_tx.send(events.clone());
    }
    let missing: Vec<PartCategory> = events
        .iter()
        .find_map(|envelope| match &envelope.event {
            Event::TransitionRefused { missing } => Some(missing.clone()),
            _ => None,
        })
        .unwrap_or_default();
    Json(serde_json::json!({
        "advanced": advanced,
        "missing": missing,
        "events": events,
    }))
}

#[derive(Deserialize)]
struct PlanBody {
    #[serde(default)]
    flight_profile: Option<FlightProfile>,
    #[serde(default)]
    landing_method: Option<LandingMethod>,
}

async fn plan_handler(
    State(app_state): State<AppState>,
    Json(body): Json<PlanBody>,
) -> Json<serde_json::Value> {
    let mut events: Vec<EventEnvelope> = Vec::new();
    let (step, phase) = {
        let mut sim = app_state.sim.lock();
        if let Some(profile) = body.flight_profile {
            events.extend(sim.apply(&Command::SetFlightProfile { profile }));
        }
        if let Some(method) = body.landing_method {
            events.extend(sim.apply(&Command::SetLandingMethod { method }));
        }
        (sim.session.step, sim.session.sim_phase)
    };
    if !events.is_empty() {
        let _ = app_state.event_tx.send(events.clone());
    }
    Json(serde_json::json!({
        "step": step,
        "sim_phase": phase,
        "events": events,
    }))
}

async fn plan_back_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    run_command(&app_state, &Command::BackToDesign)
}

async fn launch_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    run_command(&app_state, &Command::Launch)
}

async fn sweep_stop_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let (events, grade) = {
        let mut sim = app_state.sim.lock();
        let events = sim.apply(&Command::StopSweep);
        (events, sim.session.pending_launch)
    };
    if !events.is_empty() {
        let _ = app_state.event_tx.send(events.clone());
    }
    match grade {
        Some(grade) => Json(serde_json::json!({
            "stopped": true,
            "score": grade.score,
            "band": grade.band,
        })),
        None => Json(serde_json::json!({ "stopped": false })),
    }
}

async fn retry_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    run_command(&app_state, &Command::Retry)
}

async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<SseEvent, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_millis(200));
        heartbeat.tick().await; // discard the immediate first tick
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await; // discard the immediate first tick
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) => pending.extend(events),
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if !pending.is_empty() {
                        let data = serde_json::to_string(&pending).unwrap_or_default();
                        pending.clear();
                        yield Ok(SseEvent::default().data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let (step, phase, position) = {
                        let sim = sim.lock();
                        let position = sim.session.minigame.as_ref().map(|m| m.position);
                        (sim.session.step, sim.session.sim_phase, position)
                    };
                    let hb = serde_json::json!({
                        "heartbeat": true,
                        "step": step,
                        "sim_phase": phase,
                        "sweep_position": position,
                    });
                    yield Ok(SseEvent::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PhaseTimers, SimState};
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use probe_core::test_fixtures::{base_content, make_rng};
    use probe_outcome::{OutcomeBackend, ScriptedBackend};
    use probe_world::JsonFileStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let content = base_content();
        let session = probe_core::Session::new(&content, 0, None);
        let (event_tx, _) = tokio::sync::broadcast::channel(64);
        let app = AppState {
            sim: Arc::new(parking_lot::Mutex::new(SimState {
                session,
                content,
                rng: make_rng(),
                store: JsonFileStore::new(dir.path().join("mission_config.json")),
                timers: PhaseTimers::default(),
            })),
            event_tx,
            backend: Arc::new(OutcomeBackend::Scripted(ScriptedBackend::default())),
        };
        (app, dir)
    }

    async fn get_json(app: &Router, uri: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_empty(app: &Router, uri: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_meta_reports_the_intro_step() {
        let (state, _dir) = make_test_state();
        let app = make_router(state);
        let meta = get_json(&app, "/api/v1/meta").await;
        assert_eq!(meta["step"], "Intro");
        assert_eq!(meta["epoch"], 0);
    }

    #[tokio::test]
    async fn test_state_snapshot_is_valid_json() {
        let (state, _dir) = make_test_state();
        let app = make_router(state);
        let snapshot = get_json(&app, "/api/v1/state").await;
        assert!(snapshot["config"].is_object());
        assert!(snapshot["catalog"].is_array());
    }

    #[tokio::test]
    async fn test_start_draws_a_catalog_and_enters_design() {
        let (state, _dir) = make_test_state();
        let app = make_router(state);

        let response = post_empty(&app, "/api/v1/start").await;
        assert_eq!(response["step"], "Design");

        let catalog = get_json(&app, "/api/v1/catalog").await;
        assert_eq!(catalog.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_design_gate_refuses_an_incomplete_craft() {
        let (state, _dir) = make_test_state();
        let app = make_router(state);
        post_empty(&app, "/api/v1/start").await;

        let response = post_empty(&app, "/api/v1/design/next").await;
        assert_eq!(response["advanced"], false);
        assert_eq!(response["missing"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_full_wizard_flow_reaches_the_game_phase() {
        let (state, _dir) = make_test_state();
        let app = make_router(state);

        post_empty(&app, "/api/v1/start").await;
        let catalog = get_json(&app, "/api/v1/catalog").await;
        for part in catalog.as_array().unwrap() {
            post_json(
                &app,
                "/api/v1/parts/select",
                serde_json::json!({ "part_id": part["id"] }),
            )
            .await;
        }

        let response = post_empty(&app, "/api/v1/design/next").await;
        assert_eq!(response["advanced"], true);

        let response = post_json(
            &app,
            "/api/v1/plan",
            serde_json::json!({
                "flight_profile": "FastTransit",
                "landing_method": "FullLanding",
            }),
        )
        .await;
        assert_eq!(response["step"], "Plan");

        let response = post_empty(&app, "/api/v1/launch").await;
        assert_eq!(response["step"], "Simulate");
        assert_eq!(response["sim_phase"], "Game");

        let response = post_empty(&app, "/api/v1/sweep/stop").await;
        assert_eq!(response["stopped"], true);
        assert_eq!(response["score"], 10); // stopped at the left rail

        // Stopping again never re-scores.
        let response = post_empty(&app, "/api/v1/sweep/stop").await;
        assert_eq!(response["stopped"], false);
    }

    #[tokio::test]
    async fn test_retry_returns_to_design_with_a_fresh_catalog() {
        let (state, _dir) = make_test_state();
        let app = make_router(state.clone());

        post_empty(&app, "/api/v1/start").await;
        let first = get_json(&app, "/api/v1/catalog").await;
        for part in first.as_array().unwrap() {
            post_json(
                &app,
                "/api/v1/parts/select",
                serde_json::json!({ "part_id": part["id"] }),
            )
            .await;
        }
        post_empty(&app, "/api/v1/design/next").await;
        post_empty(&app, "/api/v1/launch").await;

        let response = post_empty(&app, "/api/v1/retry").await;
        assert_eq!(response["step"], "Design");

        let meta = get_json(&app, "/api/v1/meta").await;
        assert_eq!(meta["epoch"], 2, "start and retry each bump the epoch");

        let second = get_json(&app, "/api/v1/catalog").await;
        assert_ne!(first, second, "retry must redraw the catalog");
        let snapshot = get_json(&app, "/api/v1/state").await;
        assert!(snapshot["config"]["propulsion"].is_null());
    }
}
