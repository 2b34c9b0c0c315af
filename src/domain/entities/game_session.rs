//! GameSession entity - a live table with players, chat and an event log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    EncounterId, GameEventId, GameSessionId, MessageId, SceneId, ScheduleId, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameSessionStatus {
    #[default]
    Draft,
    Scheduled,
    InProgress,
    Paused,
    Finished,
    Cancelled,
}

impl GameSessionStatus {
    pub fn is_live(self) -> bool {
        matches!(self, GameSessionStatus::InProgress | GameSessionStatus::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerRole {
    Guest,
    #[default]
    Player,
    Assistant,
    Master,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: UserId,
    pub role: PlayerRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageKind {
    #[default]
    Text,
    Command,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sent_at: DateTime<Utc>,
    pub kind: MessageKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionEvent {
    pub id: GameEventId,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: GameSessionId,
    pub owner_id: UserId,
    pub title: String,
    pub status: GameSessionStatus,
    pub schedule_id: Option<ScheduleId>,
    pub encounter_id: Option<EncounterId>,
    pub scene_id: Option<SceneId>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub players: Vec<Participant>,
    pub messages: Vec<GameSessionMessage>,
    pub events: Vec<GameSessionEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameSession {
    /// New draft session with the owner seated as Master
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GameSessionId::new(),
            owner_id,
            title: title.into(),
            status: GameSessionStatus::Draft,
            schedule_id: None,
            encounter_id: None,
            scene_id: None,
            scheduled_for: None,
            started_at: None,
            finished_at: None,
            players: vec![Participant {
                user_id: owner_id,
                role: PlayerRole::Master,
                joined_at: now,
            }],
            messages: Vec::new(),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn player(&self, user: UserId) -> Option<&Participant> {
        self.players.iter().find(|p| p.user_id == user)
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.player(user).is_some()
    }

    pub fn is_master(&self, user: UserId) -> bool {
        self.player(user).is_some_and(|p| p.role == PlayerRole::Master)
    }

    /// Seat `user`; returns false when already seated
    pub fn join(&mut self, user: UserId, role: PlayerRole) -> bool {
        if self.is_participant(user) {
            return false;
        }
        self.players.push(Participant {
            user_id: user,
            role,
            joined_at: Utc::now(),
        });
        true
    }

    /// Remove `user`; returns false when not seated
    pub fn leave(&mut self, user: UserId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.user_id != user);
        self.players.len() != before
    }

    pub fn add_participant(&mut self, user: UserId, role: PlayerRole) -> Result<(), &'static str> {
        if self.status == GameSessionStatus::Finished {
            return Err("Cannot add participants to a finished session");
        }
        if self.is_participant(user) {
            return Err("This user is already a participant in the session");
        }
        if role == PlayerRole::Master && self.players.iter().any(|p| p.role == PlayerRole::Master) {
            return Err("A session can only have one participant with the Master role");
        }
        self.join(user, role);
        Ok(())
    }

    pub fn remove_participant(&mut self, user: UserId) -> Result<(), &'static str> {
        if self.status == GameSessionStatus::Finished {
            return Err("Cannot remove participants from a finished session");
        }
        match self.player(user) {
            None => Err("User is not a participant in this session"),
            Some(p) if p.role == PlayerRole::Master => Err("Cannot remove Game Master from session"),
            Some(_) => {
                self.leave(user);
                Ok(())
            }
        }
    }

    /// Start or resume play; repeated starts are accepted
    pub fn start(&mut self) -> Result<(), &'static str> {
        match self.status {
            GameSessionStatus::Finished | GameSessionStatus::Cancelled => {
                Err("Cannot start a session that has ended")
            }
            _ => {
                self.status = GameSessionStatus::InProgress;
                self.started_at.get_or_insert_with(Utc::now);
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), &'static str> {
        if self.status != GameSessionStatus::InProgress {
            return Err("Only sessions in progress can be paused");
        }
        self.status = GameSessionStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), &'static str> {
        if self.status != GameSessionStatus::Paused {
            return Err("Only paused sessions can be resumed");
        }
        self.status = GameSessionStatus::InProgress;
        Ok(())
    }

    /// End play; finishing twice is accepted
    pub fn finish(&mut self) -> Result<(), &'static str> {
        if self.status == GameSessionStatus::Cancelled {
            return Err("Cannot finish a cancelled session");
        }
        self.status = GameSessionStatus::Finished;
        self.finished_at.get_or_insert_with(Utc::now);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), &'static str> {
        match self.status {
            GameSessionStatus::Draft | GameSessionStatus::Scheduled => {
                self.status = GameSessionStatus::Cancelled;
                Ok(())
            }
            _ => Err("Only draft or scheduled sessions can be cancelled"),
        }
    }

    pub fn post_message(
        &mut self,
        sender: UserId,
        kind: MessageKind,
        content: &str,
    ) -> Result<GameSessionMessage, &'static str> {
        if content.trim().is_empty() {
            return Err("Message content cannot be empty");
        }
        if !self.is_participant(sender) {
            return Err("Only participants can send messages");
        }
        if !self.status.is_live() {
            return Err("Messages can only be sent in InProgress or Paused sessions");
        }
        let message = GameSessionMessage {
            id: MessageId::new(),
            sender_id: sender,
            sent_at: Utc::now(),
            kind,
            content: content.to_string(),
        };
        self.messages.push(message.clone());
        Ok(message)
    }

    pub fn record_event(
        &mut self,
        event_type: &str,
        data: serde_json::Value,
    ) -> Result<GameSessionEvent, &'static str> {
        if event_type.trim().is_empty() {
            return Err("EventType cannot be empty");
        }
        if !self.status.is_live() {
            return Err("Events can only be recorded for InProgress or Paused sessions");
        }
        let event = GameSessionEvent {
            id: GameEventId::new(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            data,
        };
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
