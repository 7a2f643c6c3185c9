//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::LessonStep;
use crate::formula::{ChallengeResult, ChallengeState, ForceInputs};
use crate::lesson::{MenuView, SummaryView};
use crate::mechanics::{Criterion, JointKind, MatchMarker, MaterialJudgment, QuizMaterial};
use crate::state::{LessonSession, MechanicsWorkspace, PascalWorkspace};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Ask {
        question: String,
        #[serde(default)]
        context: Option<String>,
        #[serde(default, rename = "sessionId")]
        session_id: Option<String>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    /// Sent as soon as a question is accepted, before the model answers.
    Pending,
    AssistantReply {
        text: String,
    },
    Error {
        message: String,
    },
}

//
// Session views
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub step: LessonStep,
    pub context: &'static str,
    pub menu: MenuView,
    pub has_proposal: bool,
    /// Present only while the summary step is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
}

impl From<&LessonSession> for SessionView {
    fn from(s: &LessonSession) -> Self {
        let lesson = s.lesson();
        SessionView {
            id: s.id().to_string(),
            step: s.step(),
            context: lesson.context(),
            menu: lesson.menu(),
            has_proposal: lesson.proposal().is_some(),
            summary: (s.step() == LessonStep::Summary).then(|| lesson.summary()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GotoIn {
    pub step: LessonStep,
}

//
// Pascal step
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceOut {
    pub inputs: ForceInputs,
    /// F2 rounded to two decimals.
    pub output_force: f64,
    pub output_force_raw: f64,
    /// S2/S1 rounded to one decimal; null when S1 <= 0.
    pub amplification_ratio: Option<f64>,
    /// False while the inputs are undefined and the previous output is kept.
    pub recomputed: bool,
    pub input_bar_percent: f64,
    pub output_bar_percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeIn {
    pub answer: String,
}

/// Challenge box as shown: the typed answer and, once checked, its result.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub answer: String,
    pub result: Option<ChallengeResult>,
    pub correct: Option<bool>,
    pub feedback: Option<&'static str>,
}

impl From<&ChallengeState> for ChallengeOut {
    fn from(c: &ChallengeState) -> Self {
        let result = c.result();
        ChallengeOut {
            answer: c.answer().to_string(),
            result,
            correct: result.map(|r| r == ChallengeResult::Correct),
            feedback: result.map(ChallengeResult::feedback),
        }
    }
}

/// Whole Pascal step: simulator fields at the top level plus the challenge box.
#[derive(Debug, Serialize)]
pub struct PascalOut {
    #[serde(flatten)]
    pub force: ForceOut,
    pub challenge: ChallengeOut,
}

impl From<&PascalWorkspace> for PascalOut {
    fn from(p: &PascalWorkspace) -> Self {
        let sim = &p.simulator;
        let (input_bar_percent, output_bar_percent) = sim.bar_shares();
        PascalOut {
            force: ForceOut {
                inputs: sim.inputs(),
                output_force: sim.display_output_force(),
                output_force_raw: sim.output_force(),
                amplification_ratio: sim.display_ratio(),
                recomputed: sim.output_is_current(),
                input_bar_percent,
                output_bar_percent,
            },
            challenge: ChallengeOut::from(&p.challenge),
        }
    }
}

//
// Mechanics step
//

#[derive(Debug, Deserialize)]
pub struct MatchIn {
    pub slot: String,
    pub joint: String,
}

#[derive(Debug, Deserialize)]
pub struct MaterialIn {
    pub criterion: Criterion,
    pub material: QuizMaterial,
}

#[derive(Debug, Serialize)]
pub struct JointSlotOut {
    pub slot: String,
    pub joint: JointKind,
    pub name: &'static str,
    pub description: &'static str,
    pub dropped: Option<JointKind>,
    pub marker: MatchMarker,
    pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct MaterialOptionOut {
    pub material: QuizMaterial,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CriterionOut {
    pub criterion: Criterion,
    pub label: &'static str,
    pub answer: Option<QuizMaterial>,
    /// Null until checked, and again after the answer changes.
    pub judgment: Option<MaterialJudgment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicsOut {
    pub joints: Vec<JointSlotOut>,
    pub all_joints_correct: bool,
    pub materials: Vec<CriterionOut>,
    pub material_options: Vec<MaterialOptionOut>,
    pub materials_checked: bool,
}

impl From<&MechanicsWorkspace> for MechanicsOut {
    fn from(m: &MechanicsWorkspace) -> Self {
        MechanicsOut {
            joints: JointKind::ALL
                .iter()
                .map(|j| {
                    let slot = j.slot_id();
                    JointSlotOut {
                        correct: m.joints.is_correct(&slot),
                        slot,
                        joint: *j,
                        name: j.name(),
                        description: j.description(),
                        dropped: m.joints.dropped(*j),
                        marker: m.joints.marker(*j),
                    }
                })
                .collect(),
            all_joints_correct: m.joints.all_correct(),
            materials: Criterion::ALL
                .iter()
                .map(|c| CriterionOut {
                    criterion: *c,
                    label: c.label(),
                    answer: m.materials.answer(*c),
                    judgment: m.materials.verdict(*c),
                })
                .collect(),
            material_options: QuizMaterial::ALL
                .iter()
                .map(|q| MaterialOptionOut { material: *q, label: q.label() })
                .collect(),
            materials_checked: m.materials.is_checked(),
        }
    }
}

//
// Assistant
//

#[derive(Debug, Deserialize)]
pub struct AskIn {
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskOut {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub assistant_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
    pub details: Vec<String>,
}
