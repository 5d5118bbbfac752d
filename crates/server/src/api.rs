use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use stickfit_agent::{NarrativeGenerator, Rationale, RationaleRequest};
use stickfit_catalog::SnapshotStore;
use stickfit_core::engine::FallbackDiagnostics;
use stickfit_core::{
    ApplicationError, DeterministicSelectionEngine, Journey, PlayerType, Priority, Profile,
    RankedProduct, SelectionEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub engine: Arc<DeterministicSelectionEngine>,
    pub narrative: Arc<NarrativeGenerator>,
    /// Narrative feature gate resolved from configuration.
    pub rationale_enabled: bool,
    pub rationale_default: bool,
}

/// Raw request payload. Numbers arrive as JSON numbers or as strings
/// ("£150", "36.5"); everything is coerced here, before the engine sees a
/// typed profile.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    pub skill: Option<Value>,
    pub attack: Option<Value>,
    pub midfield: Option<Value>,
    pub defence: Option<Value>,
    pub budget: Option<Value>,
    pub dragflick: Option<Value>,
    pub aerials: Option<Value>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub bow: Option<String>,
    pub length: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// Per-request narrative override: `?rationale=0|1`.
    pub rationale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub primaries: Vec<RankedProduct>,
    pub wildcard: Option<RankedProduct>,
    pub fallback: FallbackDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
}

pub async fn recommend(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
    Json(payload): Json<RecommendRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    let missing = missing_fields(&payload);
    if !missing.is_empty() {
        info!(
            event_name = "recommend.rejected",
            correlation_id = %correlation_id,
            missing = ?missing,
            "recommendation request missing required fields"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(RecommendResponse {
                ok: false,
                error: Some("Missing fields".to_string()),
                missing: Some(missing),
                profile: None,
                primaries: Vec::new(),
                wildcard: None,
                fallback: FallbackDiagnostics::default(),
                rationale: None,
            }),
        )
            .into_response();
    }

    let profile = build_profile(&payload);
    let snapshot = state.store.current();

    // A zero-row snapshot is a service problem (nothing was ever loaded),
    // not a "no match for you" outcome; answer like one.
    if snapshot.is_empty() {
        let interface = ApplicationError::Catalog("catalog snapshot is empty".to_string())
            .into_interface(correlation_id.clone());
        tracing::warn!(
            event_name = "recommend.degraded",
            correlation_id = %correlation_id,
            error = %interface,
            "serving without a catalog snapshot"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "ok": false,
                "error": interface.user_message(),
                "correlation_id": correlation_id,
            })),
        )
            .into_response();
    }

    let selection = state.engine.recommend(&snapshot, &profile);

    let Some(slate) = selection.slate else {
        info!(
            event_name = "recommend.empty",
            correlation_id = %correlation_id,
            journey = %profile.journey,
            player_type = %profile.player_type,
            relaxed = %selection.fallback.relaxed.join(","),
            "no catalog rows for the requested player type"
        );
        return Json(RecommendResponse {
            ok: false,
            error: Some("No sticks matched your criteria".to_string()),
            missing: None,
            profile: Some(profile),
            primaries: Vec::new(),
            wildcard: None,
            fallback: selection.fallback,
            rationale: None,
        })
        .into_response();
    };

    let rationale = if generate_rationale(&state, query.rationale.as_deref()) {
        Some(
            state
                .narrative
                .generate(RationaleRequest {
                    profile: &profile,
                    slate: &slate,
                    fallback: &selection.fallback,
                })
                .await,
        )
    } else {
        None
    };

    let primaries: Vec<RankedProduct> =
        slate.primaries().into_iter().cloned().collect();

    info!(
        event_name = "recommend.completed",
        correlation_id = %correlation_id,
        journey = %profile.journey,
        player_type = %profile.player_type,
        budget = %profile.budget,
        relaxed = %selection.fallback.relaxed.join(","),
        primary = %primaries[0].product.code,
        wildcard = slate.wildcard.as_ref().map(|pick| pick.product.code.as_str()).unwrap_or("none"),
        rationale_source = rationale
            .as_ref()
            .map(|rationale| match rationale.source {
                stickfit_agent::RationaleSource::Llm => "llm",
                stickfit_agent::RationaleSource::Deterministic => "deterministic",
            })
            .unwrap_or("disabled"),
        "recommendation slate produced"
    );

    Json(RecommendResponse {
        ok: true,
        error: None,
        missing: None,
        profile: Some(profile),
        primaries,
        wildcard: slate.wildcard,
        fallback: selection.fallback,
        rationale,
    })
    .into_response()
}

/// Every field except `length` is required; report all absences at once.
fn missing_fields(payload: &RecommendRequest) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let absent_value =
        |value: &Option<Value>| value.as_ref().map(value_is_blank).unwrap_or(true);
    let absent_text =
        |value: &Option<String>| value.as_ref().map(|text| text.trim().is_empty()).unwrap_or(true);

    if absent_value(&payload.skill) {
        missing.push("skill");
    }
    if absent_value(&payload.attack) {
        missing.push("attack");
    }
    if absent_value(&payload.midfield) {
        missing.push("midfield");
    }
    if absent_value(&payload.defence) {
        missing.push("defence");
    }
    if absent_value(&payload.budget) {
        missing.push("budget");
    }
    if absent_value(&payload.dragflick) {
        missing.push("dragflick");
    }
    if absent_value(&payload.aerials) {
        missing.push("aerials");
    }
    if absent_text(&payload.category) {
        missing.push("category");
    }
    if absent_text(&payload.priority) {
        missing.push("priority");
    }
    if absent_text(&payload.bow) {
        missing.push("bow");
    }
    missing
}

fn value_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Coerce the validated payload into the engine's typed profile. All
/// derivations happen once, here; the pipeline reads them as immutable
/// context.
fn build_profile(payload: &RecommendRequest) -> Profile {
    let number = |value: &Option<Value>| value.as_ref().and_then(lenient_number).unwrap_or(0.0);

    let skill = number(&payload.skill);
    let budget = number(&payload.budget).max(0.0);
    let preferred_bow = payload
        .bow
        .as_deref()
        .map(|bow| bow.trim().to_ascii_lowercase())
        .filter(|bow| !bow.is_empty());

    Profile {
        skill,
        journey: Journey::from_skill(skill),
        player_type: PlayerType::from_category(payload.category.as_deref().unwrap_or("")),
        priority: Priority::from_input(payload.priority.as_deref().unwrap_or("")),
        preferred_bow,
        budget: Decimal::from_f64(budget).unwrap_or(Decimal::ZERO),
        length: payload.length.as_ref().and_then(lenient_number),
        attack: number(&payload.attack),
        midfield: number(&payload.midfield),
        defence: number(&payload.defence),
        aerials: number(&payload.aerials),
        dragflick: number(&payload.dragflick),
    }
}

/// Accept numbers or number-ish strings ("£150", " 36.5 ").
fn lenient_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let cleaned: String = text
                .chars()
                .filter(|ch| !matches!(ch, '£' | '$' | '€' | ',' | ' '))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Master flag can disable narrative globally; the query parameter
/// overrides per request.
fn generate_rationale(state: &AppState, query_value: Option<&str>) -> bool {
    if !state.rationale_enabled {
        return false;
    }
    match query_value.map(str::trim) {
        None | Some("") => state.rationale_default,
        Some(value) => value == "1",
    }
}

/// Response-latency header, set on every route.
pub async fn track_latency(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if let Ok(header) = HeaderValue::from_str(&format!("{elapsed_ms:.1}")) {
        response.headers_mut().insert("x-response-time-ms", header);
    }
    response
}
