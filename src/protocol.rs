//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::checker::MatchingOutcome;
use crate::domain::{Agent, Mission, MissionCategory, Stage};
use crate::editor::FieldEdit;
use crate::progress::MissionRun;
use crate::session::{CompletionOutcome, View};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListMissions,
    Leaderboard,
    Navigate {
        view: View,
    },
    StartMission {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    AdvanceStage,
    RetreatStage,
    SelectMatch {
        #[serde(rename = "itemId")]
        item_id: String,
        description: String,
    },
    SubmitMatching,
    SetReport {
        text: String,
    },
    SubmitReport,
    CompleteMission {
        #[serde(rename = "missionId")]
        mission_id: String,
        points: i64,
    },
    Tip {
        #[serde(rename = "missionId")]
        mission_id: String,
        #[serde(rename = "stageId")]
        stage_id: Option<String>,
    },
    /// Tip for whatever the active run is currently looking at.
    TipCurrent,
    UpdateMissions {
        categories: Vec<MissionCategory>,
    },
    ToggleEditMode,
    EditField {
        #[serde(flatten)]
        edit: FieldEdit,
    },
    SaveMission,
    AddCategory {
        name: String,
    },
    AddMission {
        #[serde(rename = "categoryId")]
        category_id: String,
        title: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Missions {
        categories: Vec<MissionCategory>,
    },
    Leaderboard {
        agents: Vec<Agent>,
    },
    Navigated {
        view: View,
    },
    MissionStarted {
        mission: Mission,
        stage: StageOut,
    },
    Stage {
        stage: StageOut,
    },
    MatchingResult {
        #[serde(rename = "perItem")]
        per_item: HashMap<String, bool>,
        passed: bool,
    },
    ReportSet,
    MissionComplete {
        #[serde(rename = "missionId")]
        mission_id: String,
        awarded: i64,
        #[serde(rename = "creditedCodename")]
        credited_codename: String,
    },
    Tip {
        text: String,
    },
    EditMode {
        enabled: bool,
    },
    FieldEdited {
        applied: bool,
    },
    MissionSaved {
        mission: Mission,
    },
    CategoryAdded {
        id: Option<String>,
    },
    MissionAdded {
        id: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Where the learner stands inside the active mission.
#[derive(Clone, Debug, Serialize)]
pub struct StageOut {
    pub index: usize,
    #[serde(rename = "stageCount")]
    pub stage_count: usize,
    #[serde(rename = "canAdvance")]
    pub can_advance: bool,
    #[serde(rename = "onFinalStage")]
    pub on_final_stage: bool,
    pub stage: Option<Stage>,
}

pub fn stage_out(run: &MissionRun) -> StageOut {
    StageOut {
        index: run.stage_index(),
        stage_count: run.stage_count(),
        can_advance: run.can_advance(),
        on_final_stage: run.on_final_stage(),
        stage: run.current_stage().cloned(),
    }
}

pub fn matching_result_out(outcome: MatchingOutcome) -> ServerWsMessage {
    ServerWsMessage::MatchingResult {
        per_item: outcome.per_item,
        passed: outcome.passed,
    }
}

pub fn mission_complete_out(outcome: CompletionOutcome) -> ServerWsMessage {
    ServerWsMessage::MissionComplete {
        mission_id: outcome.mission_id,
        awarded: outcome.awarded,
        credited_codename: outcome.credited_codename,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartMissionIn {
    #[serde(rename = "missionId")]
    pub mission_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectMatchIn {
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportIn {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteIn {
    #[serde(rename = "missionId")]
    pub mission_id: String,
    pub points: i64,
}

#[derive(Debug, Deserialize)]
pub struct TipQuery {
    #[serde(rename = "missionId")]
    pub mission_id: String,
    #[serde(rename = "stageId")]
    pub stage_id: Option<String>,
}
#[derive(Serialize)]
pub struct TipOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateIn {
    pub view: View,
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryIn {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMissionIn {
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub title: String,
}

/// Id of a created category/mission; `null` when the addition was aborted
/// (blank input or unknown parent).
#[derive(Serialize)]
pub struct AddedOut {
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct EditModeOut {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct AppliedOut {
    pub applied: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
