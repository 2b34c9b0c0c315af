//! Game Session Service - running tables, participants, chat and events

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{
    AddParticipantRequest, CreateGameSessionRequest, JoinGameSessionRequest, RecordEventRequest,
    SendMessageRequest, UpdateGameSessionRequest,
};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{load, MAX_NAME_LENGTH};
use crate::domain::entities::{
    GameSession, GameSessionEvent, GameSessionMessage, GameSessionStatus, PlayerRole,
};
use crate::domain::value_objects::{EncounterId, GameSessionId, SceneId, UserId};

const SESSION: &str = "Game session";

#[async_trait]
pub trait GameSessionService: Send + Sync {
    /// Sessions the user owns or takes part in
    async fn list_sessions(&self, user: UserId) -> ServiceResult<Vec<GameSession>>;

    async fn get_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn create_session(
        &self,
        user: UserId,
        request: CreateGameSessionRequest,
    ) -> ServiceResult<GameSession>;

    async fn update_session(
        &self,
        user: UserId,
        id: GameSessionId,
        request: UpdateGameSessionRequest,
    ) -> ServiceResult<GameSession>;

    async fn delete_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<()>;

    async fn join_session(
        &self,
        user: UserId,
        id: GameSessionId,
        request: JoinGameSessionRequest,
    ) -> ServiceResult<GameSession>;

    async fn leave_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<()>;

    async fn set_active_encounter(
        &self,
        user: UserId,
        id: GameSessionId,
        encounter_id: EncounterId,
    ) -> ServiceResult<GameSession>;

    async fn set_active_scene(
        &self,
        user: UserId,
        id: GameSessionId,
        scene_id: SceneId,
    ) -> ServiceResult<GameSession>;

    async fn start_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn pause_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn resume_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn finish_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn cancel_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession>;

    async fn add_participant(
        &self,
        user: UserId,
        id: GameSessionId,
        request: AddParticipantRequest,
    ) -> ServiceResult<GameSession>;

    async fn remove_participant(
        &self,
        user: UserId,
        id: GameSessionId,
        participant: UserId,
    ) -> ServiceResult<GameSession>;

    async fn send_message(
        &self,
        user: UserId,
        id: GameSessionId,
        request: SendMessageRequest,
    ) -> ServiceResult<GameSessionMessage>;

    async fn record_event(
        &self,
        user: UserId,
        id: GameSessionId,
        request: RecordEventRequest,
    ) -> ServiceResult<GameSessionEvent>;
}

fn check_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::invalid("Title cannot be empty"));
    }
    if title.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::invalid(format!(
            "Title cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct GameSessionServiceImpl {
    repository: Repository,
}

impl GameSessionServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        let session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.owner_id != user {
            return Err(ServiceError::not_allowed(
                "Only the session owner can manage participants",
            ));
        }
        Ok(session)
    }

    async fn mastered_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        let session = load(self.repository.game_sessions(), id, SESSION).await?;
        if !session.is_master(user) {
            return Err(ServiceError::not_allowed(
                "Only the Game Master can modify the session",
            ));
        }
        Ok(session)
    }

    async fn save(&self, session: &mut GameSession) -> ServiceResult<()> {
        session.touch();
        self.repository.game_sessions().save(session).await?;
        Ok(())
    }

    /// Load as Master, apply a lifecycle transition and persist
    async fn transition(
        &self,
        user: UserId,
        id: GameSessionId,
        apply: fn(&mut GameSession) -> Result<(), &'static str>,
    ) -> ServiceResult<GameSession> {
        let mut session = self.mastered_session(user, id).await?;
        apply(&mut session)?;
        self.save(&mut session).await?;
        info!(session_id = %id, status = ?session.status, "Game session status changed");
        Ok(session)
    }

    async fn check_encounter(&self, encounter_id: Option<EncounterId>) -> ServiceResult<()> {
        if let Some(encounter_id) = encounter_id {
            load(self.repository.encounters(), encounter_id, "Encounter").await?;
        }
        Ok(())
    }
}

#[async_trait]
impl GameSessionService for GameSessionServiceImpl {
    #[instrument(skip(self))]
    async fn list_sessions(&self, user: UserId) -> ServiceResult<Vec<GameSession>> {
        let sessions = self.repository.game_sessions().list().await?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.owner_id == user || s.is_participant(user))
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        let session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.owner_id != user && !session.is_participant(user) {
            return Err(ServiceError::not_allowed("You are not a participant in this session"));
        }
        Ok(session)
    }

    #[instrument(skip(self, request))]
    async fn create_session(
        &self,
        user: UserId,
        request: CreateGameSessionRequest,
    ) -> ServiceResult<GameSession> {
        check_title(&request.title)?;
        self.check_encounter(request.encounter_id).await?;
        if let Some(scene_id) = request.scene_id {
            load(self.repository.scenes(), scene_id, "Scene").await?;
        }

        let mut session = GameSession::new(user, request.title.trim());
        session.encounter_id = request.encounter_id;
        session.scene_id = request.scene_id;
        self.repository.game_sessions().save(&session).await?;

        info!(session_id = %session.id, "Created game session: {}", session.title);
        Ok(session)
    }

    #[instrument(skip(self, request))]
    async fn update_session(
        &self,
        user: UserId,
        id: GameSessionId,
        request: UpdateGameSessionRequest,
    ) -> ServiceResult<GameSession> {
        let mut session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.owner_id != user {
            return Err(ServiceError::not_allowed("Only the session owner can update the session"));
        }
        if let Some(title) = &request.title {
            check_title(title)?;
        }
        if let Some(encounter_id) = request.encounter_id {
            self.check_encounter(encounter_id).await?;
            session.encounter_id = encounter_id;
        }
        if let Some(title) = request.title {
            session.title = title.trim().to_string();
        }
        self.save(&mut session).await?;

        info!(session_id = %id, "Updated game session: {}", session.title);
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<()> {
        let session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.owner_id != user {
            return Err(ServiceError::not_allowed("Only the session owner can delete the session"));
        }
        self.repository.game_sessions().delete(id).await?;
        info!(session_id = %id, "Deleted game session");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn join_session(
        &self,
        user: UserId,
        id: GameSessionId,
        request: JoinGameSessionRequest,
    ) -> ServiceResult<GameSession> {
        let mut session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.is_participant(user) {
            return Ok(session);
        }
        if matches!(
            session.status,
            GameSessionStatus::Finished | GameSessionStatus::Cancelled
        ) {
            return Err(ServiceError::invalid("Cannot join a session that has ended"));
        }

        // Joiners seat themselves as Player or Guest; higher roles are granted via add_participant
        let role = match request.role {
            Some(PlayerRole::Guest) => PlayerRole::Guest,
            _ => PlayerRole::Player,
        };
        session.add_participant(user, role)?;
        self.save(&mut session).await?;

        info!(session_id = %id, user_id = %user, role = ?role, "Player joined game session");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn leave_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<()> {
        let mut session = load(self.repository.game_sessions(), id, SESSION).await?;
        if session.is_master(user) {
            return Err(ServiceError::invalid("Cannot remove Game Master from session"));
        }
        if session.leave(user) {
            self.save(&mut session).await?;
            info!(session_id = %id, user_id = %user, "Player left game session");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_active_encounter(
        &self,
        user: UserId,
        id: GameSessionId,
        encounter_id: EncounterId,
    ) -> ServiceResult<GameSession> {
        let mut session = self.mastered_session(user, id).await?;
        load(self.repository.encounters(), encounter_id, "Encounter").await?;

        session.encounter_id = Some(encounter_id);
        self.save(&mut session).await?;

        info!(session_id = %id, encounter_id = %encounter_id, "Active encounter changed");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn set_active_scene(
        &self,
        user: UserId,
        id: GameSessionId,
        scene_id: SceneId,
    ) -> ServiceResult<GameSession> {
        let mut session = self.mastered_session(user, id).await?;
        load(self.repository.scenes(), scene_id, "Scene").await?;

        session.scene_id = Some(scene_id);
        self.save(&mut session).await?;

        info!(session_id = %id, scene_id = %scene_id, "Active scene changed");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn start_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        self.transition(user, id, GameSession::start).await
    }

    #[instrument(skip(self))]
    async fn pause_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        self.transition(user, id, GameSession::pause).await
    }

    #[instrument(skip(self))]
    async fn resume_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        self.transition(user, id, GameSession::resume).await
    }

    #[instrument(skip(self))]
    async fn finish_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        self.transition(user, id, GameSession::finish).await
    }

    #[instrument(skip(self))]
    async fn cancel_session(&self, user: UserId, id: GameSessionId) -> ServiceResult<GameSession> {
        self.transition(user, id, GameSession::cancel).await
    }

    #[instrument(skip(self, request), fields(participant = %request.user_id))]
    async fn add_participant(
        &self,
        user: UserId,
        id: GameSessionId,
        request: AddParticipantRequest,
    ) -> ServiceResult<GameSession> {
        let mut session = self.owned_session(user, id).await?;
        session.add_participant(request.user_id, request.role)?;
        self.save(&mut session).await?;

        info!(session_id = %id, participant = %request.user_id, role = ?request.role, "Added participant");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        user: UserId,
        id: GameSessionId,
        participant: UserId,
    ) -> ServiceResult<GameSession> {
        let mut session = self.owned_session(user, id).await?;
        session.remove_participant(participant)?;
        self.save(&mut session).await?;

        info!(session_id = %id, participant = %participant, "Removed participant");
        Ok(session)
    }

    #[instrument(skip(self, request))]
    async fn send_message(
        &self,
        user: UserId,
        id: GameSessionId,
        request: SendMessageRequest,
    ) -> ServiceResult<GameSessionMessage> {
        let mut session = load(self.repository.game_sessions(), id, SESSION).await?;
        let message = session.post_message(user, request.kind, &request.content)?;
        self.save(&mut session).await?;

        debug!(session_id = %id, message_id = %message.id, "Chat message sent");
        Ok(message)
    }

    #[instrument(skip(self, request), fields(event_type = %request.event_type))]
    async fn record_event(
        &self,
        user: UserId,
        id: GameSessionId,
        request: RecordEventRequest,
    ) -> ServiceResult<GameSessionEvent> {
        let mut session = load(self.repository.game_sessions(), id, SESSION).await?;
        if !session.is_participant(user) {
            return Err(ServiceError::not_allowed("Only participants can record events"));
        }
        let event = session.record_event(&request.event_type, request.data)?;
        self.save(&mut session).await?;

        debug!(session_id = %id, event_id = %event.id, "Game event recorded");
        Ok(event)
    }
}
