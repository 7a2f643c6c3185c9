//! Application state: in-memory lesson sessions and the assistant gateway.
//!
//! This module owns:
//!   - the session store (by id)
//!   - per-session step workspaces (exercise state of the active step)
//!   - the assistant gateway (optional OpenAI client + prompts)
//!
//! A step's workspace is created when the step is entered and dropped when
//! it is left, so re-entering a step always starts its exercises fresh.
//!
//! Sessions idle for longer than the TTL are treated as gone: lookups answer
//! 404 and creating a session prunes them from the store.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::assistant::AssistantGateway;
use crate::config::load_lesson_config_from_env;
use crate::design::{validate_and_build, RawDesignInput};
use crate::domain::LessonStep;
use crate::error::ApiError;
use crate::formula::{ChallengeState, ForceSimulator};
use crate::lesson::LessonController;
use crate::mechanics::{JointMatchState, MaterialQuiz};
use crate::openai::OpenAI;

/// Idle lifetime of a session unless `SESSION_TTL_SECS` says otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PascalWorkspace {
    pub simulator: ForceSimulator,
    pub challenge: ChallengeState,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MechanicsWorkspace {
    pub joints: JointMatchState,
    pub materials: MaterialQuiz,
}

/// Transient exercise state owned by the active step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepWorkspace {
    Idle,
    Pascal(PascalWorkspace),
    Mechanics(MechanicsWorkspace),
}

impl StepWorkspace {
    fn for_step(step: LessonStep) -> Self {
        match step {
            LessonStep::PascalTheory => StepWorkspace::Pascal(PascalWorkspace::default()),
            LessonStep::Mechanics => StepWorkspace::Mechanics(MechanicsWorkspace::default()),
            LessonStep::Intro | LessonStep::Design | LessonStep::Summary => StepWorkspace::Idle,
        }
    }
}

/// One student's walk through the lesson.
#[derive(Clone, Debug)]
pub struct LessonSession {
    id: String,
    lesson: LessonController,
    workspace: StepWorkspace,
    last_seen: Instant,
}

impl LessonSession {
    pub fn new(id: String) -> Self {
        Self {
            id,
            lesson: LessonController::new(),
            workspace: StepWorkspace::Idle,
            last_seen: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool { self.last_seen.elapsed() >= ttl }

    fn touch(&mut self) { self.last_seen = Instant::now(); }

    pub fn id(&self) -> &str { &self.id }

    pub fn lesson(&self) -> &LessonController { &self.lesson }

    pub fn step(&self) -> LessonStep { self.lesson.current() }

    /// Navigate. Choosing the current step again keeps its workspace.
    pub fn go_to(&mut self, step: LessonStep) {
        if step == self.lesson.current() {
            return;
        }
        self.lesson.go_to(step);
        self.workspace = StepWorkspace::for_step(step);
    }

    pub fn restart(&mut self) {
        self.lesson.restart();
        self.workspace = StepWorkspace::Idle;
    }

    /// Validate the form and, on success, move to the summary.
    /// On failure nothing is stored and the step does not change.
    pub fn submit_design(&mut self, raw: &RawDesignInput) -> Result<(), ApiError> {
        self.expect_step(LessonStep::Design)?;
        let proposal = validate_and_build(raw).map_err(|errs| {
            debug!(target: "lesson", session = %self.id, errors = errs.len(), "Design proposal rejected");
            ApiError::Validation(errs)
        })?;
        self.lesson.submit_design(proposal);
        self.workspace = StepWorkspace::Idle;
        Ok(())
    }

    pub fn pascal(&self) -> Result<&PascalWorkspace, ApiError> {
        match &self.workspace {
            StepWorkspace::Pascal(p) => Ok(p),
            _ => Err(self.wrong_step(LessonStep::PascalTheory)),
        }
    }

    pub fn pascal_mut(&mut self) -> Result<&mut PascalWorkspace, ApiError> {
        let err = self.wrong_step(LessonStep::PascalTheory);
        match &mut self.workspace {
            StepWorkspace::Pascal(p) => Ok(p),
            _ => Err(err),
        }
    }

    pub fn mechanics(&self) -> Result<&MechanicsWorkspace, ApiError> {
        match &self.workspace {
            StepWorkspace::Mechanics(m) => Ok(m),
            _ => Err(self.wrong_step(LessonStep::Mechanics)),
        }
    }

    pub fn mechanics_mut(&mut self) -> Result<&mut MechanicsWorkspace, ApiError> {
        let err = self.wrong_step(LessonStep::Mechanics);
        match &mut self.workspace {
            StepWorkspace::Mechanics(m) => Ok(m),
            _ => Err(err),
        }
    }

    fn expect_step(&self, expected: LessonStep) -> Result<(), ApiError> {
        if self.lesson.current() == expected { Ok(()) } else { Err(self.wrong_step(expected)) }
    }

    fn wrong_step(&self, expected: LessonStep) -> ApiError {
        ApiError::WrongStep { expected, actual: self.lesson.current() }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, LessonSession>>>,
    pub assistant: AssistantGateway,
    pub session_ttl: Duration,
}

impl AppState {
    /// Build state from env: load config, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_lesson_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let gateway = AssistantGateway::new(OpenAI::from_env(), prompts);
        match gateway.describe() {
            Some((base_url, model)) => {
                info!(target: "hydralearn_backend", %base_url, %model, "Assistant enabled.");
            }
            None => info!(target: "hydralearn_backend", "Assistant disabled (no OPENAI_API_KEY)."),
        }

        let session_ttl = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);
        info!(target: "hydralearn_backend", ttl_secs = session_ttl.as_secs(), "Session TTL");

        Self::with_gateway(gateway).with_session_ttl(session_ttl)
    }

    pub fn with_gateway(assistant: AssistantGateway) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            assistant,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Start a new lesson session at Intro.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> LessonSession {
        let id = Uuid::new_v4().to_string();
        let session = LessonSession::new(id.clone());
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.session_ttl));
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(target: "lesson", pruned, "Expired sessions pruned");
        }
        sessions.insert(id.clone(), session.clone());
        info!(target: "lesson", session = %id, live = sessions.len(), "Session created");
        session
    }

    /// Run one synchronous operation against a session under the write lock.
    /// An expired session is removed and reported as not found.
    #[instrument(level = "debug", skip(self, f), fields(%id))]
    pub async fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut LessonSession) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if !session.is_expired(self.session_ttl) => {
                session.touch();
                return f(session);
            }
            Some(_) => {}
            None => return Err(ApiError::SessionNotFound(id.to_string())),
        }
        sessions.remove(id);
        info!(target: "lesson", session = %id, "Session expired");
        Err(ApiError::SessionNotFound(id.to_string()))
    }

    /// Context label of the session's active step.
    pub async fn session_context(&self, id: &str) -> Option<&'static str> {
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|s| !s.is_expired(self.session_ttl))
            .map(|s| s.lesson().context())
    }

    /// Ask the assistant. Context is the explicit label if given, otherwise the
    /// session's step; no lock is held while the model call is in flight.
    #[instrument(level = "info", skip(self, question, context), fields(question_len = question.len(), session = ?session_id))]
    pub async fn ask_assistant(
        &self,
        question: &str,
        context: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<String, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::BadRequest("question must not be empty".into()));
        }
        let context = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => c.to_string(),
            None => match session_id {
                Some(id) => match self.session_context(id).await {
                    Some(c) => c.to_string(),
                    None => {
                        warn!(target: "assistant", session = %id, "Unknown session for assistant context");
                        return Err(ApiError::SessionNotFound(id.to_string()));
                    }
                },
                None => LessonStep::Intro.context().to_string(),
            },
        };
        Ok(self.assistant.ask(question.trim(), &context).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::design::RawField;
    use crate::formula::ForceInputs;

    fn offline_state() -> AppState {
        AppState::with_gateway(AssistantGateway::new(None, Prompts::default()))
    }

    fn valid_design() -> RawDesignInput {
        RawDesignInput {
            control_piston_diameter: Some(RawField::Number(10.0)),
            actuator_piston_diameter: Some(RawField::Number(20.0)),
            ..Default::default()
        }
    }

    #[test]
    fn workspace_follows_active_step() {
        let mut s = LessonSession::new("s".into());
        assert!(s.pascal().is_err());

        s.go_to(LessonStep::PascalTheory);
        s.pascal_mut().unwrap().simulator.update(ForceInputs { input_force: 20.0, control_area: 2.0, actuator_area: 10.0 });
        s.go_to(LessonStep::PascalTheory);
        assert_eq!(s.pascal().unwrap().simulator.display_output_force(), 100.0);

        s.go_to(LessonStep::Mechanics);
        assert!(matches!(s.pascal(), Err(ApiError::WrongStep { .. })));
        s.mechanics_mut().unwrap().joints.record_match("grip-slot", "grip").unwrap();

        s.go_to(LessonStep::PascalTheory);
        assert_eq!(s.pascal().unwrap().simulator.display_output_force(), 50.0);
        s.go_to(LessonStep::Mechanics);
        assert_eq!(s.mechanics().unwrap().joints, JointMatchState::default());
    }

    #[test]
    fn invalid_design_neither_stores_nor_transitions() {
        let mut s = LessonSession::new("s".into());
        s.go_to(LessonStep::Design);
        let mut raw = valid_design();
        raw.control_piston_diameter = Some(RawField::Number(4.0));
        assert!(matches!(s.submit_design(&raw), Err(ApiError::Validation(_))));
        assert_eq!(s.step(), LessonStep::Design);
        assert!(s.lesson().proposal().is_none());
    }

    #[test]
    fn design_submission_requires_design_step() {
        let mut s = LessonSession::new("s".into());
        assert!(matches!(s.submit_design(&valid_design()), Err(ApiError::WrongStep { .. })));
        s.go_to(LessonStep::Design);
        s.submit_design(&valid_design()).unwrap();
        assert_eq!(s.step(), LessonStep::Summary);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let state = offline_state();
        let a = state.create_session().await;
        let b = state.create_session().await;
        state.with_session(a.id(), |s| { s.go_to(LessonStep::Mechanics); Ok(()) }).await.unwrap();
        assert_eq!(state.session_context(a.id()).await, Some(LessonStep::Mechanics.context()));
        assert_eq!(state.session_context(b.id()).await, Some(LessonStep::Intro.context()));
        assert!(matches!(
            state.with_session("nope", |_| Ok(())).await,
            Err(ApiError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_not_found_and_pruned() {
        let state = offline_state().with_session_ttl(Duration::ZERO);
        let a = state.create_session().await;
        assert!(matches!(
            state.with_session(a.id(), |_| Ok(())).await,
            Err(ApiError::SessionNotFound(_))
        ));
        assert_eq!(state.session_context(a.id()).await, None);
        assert!(state.sessions.read().await.is_empty());

        state.create_session().await;
        state.create_session().await;
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn active_sessions_survive_pruning() {
        let state = offline_state();
        let a = state.create_session().await;
        state.create_session().await;
        assert_eq!(state.sessions.read().await.len(), 2);
        assert!(state.with_session(a.id(), |_| Ok(())).await.is_ok());
    }

    #[tokio::test]
    async fn assistant_rejects_blank_questions_and_unknown_sessions() {
        let state = offline_state();
        assert!(matches!(state.ask_assistant("  ", None, None).await, Err(ApiError::BadRequest(_))));
        assert!(matches!(
            state.ask_assistant("hi", None, Some("missing")).await,
            Err(ApiError::SessionNotFound(_))
        ));
        let text = state.ask_assistant("hi", None, None).await.unwrap();
        assert_eq!(text, Prompts::default().not_configured);
    }
}
