//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{FromRequest, Path, State},
  http::StatusCode,
  response::{Html, IntoResponse},
  Json,
};
use tracing::{info, instrument};

use crate::design::RawDesignInput;
use crate::error::ApiError;
use crate::lesson::{render_printable, SummaryView};
use crate::protocol::*;
use crate::state::AppState;

/// `Json` body extractor whose rejections render as `ApiError` JSON.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, assistant_configured: state.assistant.is_configured() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = state.create_session().await;
  (StatusCode::CREATED, Json(SessionView::from(&session)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  state.with_session(&id, |s| Ok(SessionView::from(&*s))).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(step = ?body.step))]
pub async fn http_goto(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<GotoIn>,
) -> Result<Json<SessionView>, ApiError> {
  let view = state.with_session(&id, |s| {
    s.go_to(body.step);
    Ok(SessionView::from(&*s))
  }).await?;
  info!(target: "lesson", session = %id, step = ?view.step, "Navigated");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_restart(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  state.with_session(&id, |s| {
    s.restart();
    Ok(SessionView::from(&*s))
  }).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_submit_design(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<RawDesignInput>,
) -> Result<Json<SessionView>, ApiError> {
  let view = state.with_session(&id, |s| {
    s.submit_design(&body)?;
    Ok(SessionView::from(&*s))
  }).await?;
  info!(target: "lesson", session = %id, "Design accepted");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_summary(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SummaryView>, ApiError> {
  state.with_session(&id, |s| Ok(s.lesson().summary())).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_print_summary(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
  let summary = state.with_session(&id, |s| Ok(s.lesson().summary())).await?;
  Ok(Html(render_printable(&summary)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_pascal(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<PascalOut>, ApiError> {
  state.with_session(&id, |s| Ok(PascalOut::from(s.pascal()?))).await.map(Json)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_pascal_force(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<crate::formula::ForceInputs>,
) -> Result<Json<PascalOut>, ApiError> {
  state.with_session(&id, |s| {
    let p = s.pascal_mut()?;
    p.simulator.update(body);
    Ok(PascalOut::from(&*p))
  }).await.map(Json)
}

/// Store the typed answer. Any earlier result is hidden until the next check.
#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_pascal_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<ChallengeIn>,
) -> Result<Json<PascalOut>, ApiError> {
  state.with_session(&id, |s| {
    let p = s.pascal_mut()?;
    p.challenge.set_answer(body.answer);
    Ok(PascalOut::from(&*p))
  }).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_pascal_check(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<PascalOut>, ApiError> {
  let view = state.with_session(&id, |s| {
    let p = s.pascal_mut()?;
    p.challenge.check();
    Ok(PascalOut::from(&*p))
  }).await?;
  info!(target: "lesson", session = %id, result = ?view.challenge.result, "Challenge checked");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_mechanics(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<MechanicsOut>, ApiError> {
  state.with_session(&id, |s| Ok(MechanicsOut::from(s.mechanics()?))).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(slot = %body.slot, joint = %body.joint))]
pub async fn http_mechanics_match(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<MatchIn>,
) -> Result<Json<MechanicsOut>, ApiError> {
  state.with_session(&id, |s| {
    let m = s.mechanics_mut()?;
    m.joints.record_match(&body.slot, &body.joint)?;
    Ok(MechanicsOut::from(&*m))
  }).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(criterion = ?body.criterion, material = ?body.material))]
pub async fn http_mechanics_material(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<MaterialIn>,
) -> Result<Json<MechanicsOut>, ApiError> {
  state.with_session(&id, |s| {
    let m = s.mechanics_mut()?;
    m.materials.select(body.criterion, body.material);
    Ok(MechanicsOut::from(&*m))
  }).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_mechanics_check(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<MechanicsOut>, ApiError> {
  state.with_session(&id, |s| {
    let m = s.mechanics_mut()?;
    m.materials.check();
    Ok(MechanicsOut::from(&*m))
  }).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len(), session = ?body.session_id))]
pub async fn http_assistant_ask(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<AskIn>,
) -> Result<Json<AskOut>, ApiError> {
  let text = state
    .ask_assistant(&body.question, body.context.as_deref(), body.session_id.as_deref())
    .await?;
  Ok(Json(AskOut { text }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_assistant_greeting(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(AskOut { text: state.assistant.greeting().to_string() })
}
