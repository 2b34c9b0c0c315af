use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::nullable;
use crate::domain::entities::{MessageKind, PlayerRole, ScheduleParticipant};
use crate::domain::value_objects::{
    AdventureId, EncounterId, Recurrence, SceneId, ScheduleId, UserId,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameSessionRequest {
    pub title: String,
    #[serde(default)]
    pub encounter_id: Option<EncounterId>,
    #[serde(default)]
    pub scene_id: Option<SceneId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameSessionRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub encounter_id: Option<Option<EncounterId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameSessionRequest {
    #[serde(default)]
    pub role: Option<PlayerRole>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub role: PlayerRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub adventure_id: Option<AdventureId>,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub participants: Vec<ScheduleParticipant>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub adventure_id: Option<Option<AdventureId>>,
    pub start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub participants: Option<Vec<ScheduleParticipant>>,
    #[serde(default, deserialize_with = "nullable")]
    pub recurrence: Option<Option<Recurrence>>,
}

/// Occurrence window for upcoming schedules; defaults to the next 30 days
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// One concrete occurrence of a schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOccurrence {
    pub schedule_id: ScheduleId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
