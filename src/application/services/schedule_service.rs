//! Schedule Service - planned play time and the sessions generated from it

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::application::dto::{
    CreateScheduleRequest, ScheduleOccurrence, UpcomingQuery, UpdateScheduleRequest,
};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{load, MAX_NAME_LENGTH};
use crate::domain::entities::{
    validate_schedule, GameSession, GameSessionStatus, Participant, PlayerRole, Schedule,
};
use crate::domain::value_objects::{ScheduleId, UserId};

/// Default width of the upcoming window
const UPCOMING_DAYS: i64 = 30;

#[async_trait]
pub trait ScheduleService: Send + Sync {
    async fn create_schedule(
        &self,
        user: UserId,
        request: CreateScheduleRequest,
    ) -> ServiceResult<Schedule>;

    async fn get_schedule(&self, user: UserId, id: ScheduleId) -> ServiceResult<Schedule>;

    async fn list_schedules(&self, user: UserId) -> ServiceResult<Vec<Schedule>>;

    /// Occurrences of the user's schedules inside a window, earliest first
    async fn list_upcoming(
        &self,
        user: UserId,
        query: UpcomingQuery,
    ) -> ServiceResult<Vec<ScheduleOccurrence>>;

    async fn update_schedule(
        &self,
        user: UserId,
        id: ScheduleId,
        request: UpdateScheduleRequest,
    ) -> ServiceResult<Schedule>;

    /// Delete a schedule; sessions generated from it are kept
    async fn delete_schedule(&self, user: UserId, id: ScheduleId) -> ServiceResult<()>;

    /// Create a Scheduled game session for every occurrence not yet covered
    async fn generate_sessions(&self, user: UserId, id: ScheduleId) -> ServiceResult<Vec<GameSession>>;
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    if title.trim().is_empty() {
        errors.push("Title cannot be empty".to_string());
    } else if title.trim().chars().count() > MAX_NAME_LENGTH {
        errors.push(format!("Title cannot exceed {} characters", MAX_NAME_LENGTH));
    }
}

fn check_schedule(schedule: &Schedule) -> ServiceResult<()> {
    let mut errors = Vec::new();
    check_title(&schedule.title, &mut errors);
    errors.extend(validate_schedule(
        schedule.owner_id,
        schedule.start,
        schedule.duration_minutes,
        &schedule.participants,
        schedule.recurrence.as_ref(),
        Utc::now(),
    ));
    ServiceError::check(errors)
}

/// Seat the schedule's participants; the owner leads when nobody is GameMaster
fn seat_players(schedule: &Schedule) -> Vec<Participant> {
    let now = Utc::now();
    let mut players: Vec<Participant> = Vec::with_capacity(schedule.participants.len());
    for participant in &schedule.participants {
        if players.iter().any(|p| p.user_id == participant.user_id) {
            continue;
        }
        let mut role = PlayerRole::from(participant.player_type);
        if role == PlayerRole::Master && players.iter().any(|p| p.role == PlayerRole::Master) {
            role = PlayerRole::Assistant;
        }
        players.push(Participant {
            user_id: participant.user_id,
            role,
            joined_at: now,
        });
    }
    if !players.iter().any(|p| p.role == PlayerRole::Master) {
        match players.iter_mut().find(|p| p.user_id == schedule.owner_id) {
            Some(owner) => owner.role = PlayerRole::Master,
            None => players.insert(
                0,
                Participant {
                    user_id: schedule.owner_id,
                    role: PlayerRole::Master,
                    joined_at: now,
                },
            ),
        }
    }
    players
}

#[derive(Clone)]
pub struct ScheduleServiceImpl {
    repository: Repository,
}

impl ScheduleServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_schedule(&self, user: UserId, id: ScheduleId, action: &str) -> ServiceResult<Schedule> {
        let schedule = load(self.repository.schedules(), id, "Schedule").await?;
        if schedule.owner_id != user {
            return Err(ServiceError::not_allowed(format!(
                "Only the schedule owner can {}",
                action
            )));
        }
        Ok(schedule)
    }
}

fn involves(schedule: &Schedule, user: UserId) -> bool {
    schedule.owner_id == user || schedule.participants.iter().any(|p| p.user_id == user)
}

#[async_trait]
impl ScheduleService for ScheduleServiceImpl {
    #[instrument(skip(self, request), fields(start = %request.start))]
    async fn create_schedule(
        &self,
        user: UserId,
        request: CreateScheduleRequest,
    ) -> ServiceResult<Schedule> {
        let now = Utc::now();
        let schedule = Schedule {
            id: ScheduleId::new(),
            owner_id: user,
            title: request.title.trim().to_string(),
            adventure_id: request.adventure_id,
            start: request.start,
            duration_minutes: request.duration_minutes,
            participants: request.participants,
            recurrence: request.recurrence,
            created_at: now,
            updated_at: now,
        };
        check_schedule(&schedule)?;
        if let Some(adventure_id) = schedule.adventure_id {
            load(self.repository.adventures(), adventure_id, "Adventure").await?;
        }
        self.repository.schedules().save(&schedule).await?;

        info!(schedule_id = %schedule.id, "Created schedule: {}", schedule.title);
        Ok(schedule)
    }

    #[instrument(skip(self))]
    async fn get_schedule(&self, user: UserId, id: ScheduleId) -> ServiceResult<Schedule> {
        let schedule = load(self.repository.schedules(), id, "Schedule").await?;
        if !involves(&schedule, user) {
            return Err(ServiceError::not_allowed("You are not a participant in this schedule"));
        }
        Ok(schedule)
    }

    #[instrument(skip(self))]
    async fn list_schedules(&self, user: UserId) -> ServiceResult<Vec<Schedule>> {
        Ok(self.repository.schedules().list_by_owner(user).await?)
    }

    #[instrument(skip(self))]
    async fn list_upcoming(
        &self,
        user: UserId,
        query: UpcomingQuery,
    ) -> ServiceResult<Vec<ScheduleOccurrence>> {
        let from = query.from.unwrap_or_else(Utc::now);
        let to = query.to.unwrap_or(from + Duration::days(UPCOMING_DAYS));
        if to <= from {
            return Err(ServiceError::invalid("The end of the window must be after its start"));
        }

        let mut occurrences: Vec<ScheduleOccurrence> = self
            .repository
            .schedules()
            .list()
            .await?
            .into_iter()
            .filter(|s| involves(s, user))
            .flat_map(|schedule| {
                let duration = schedule.duration();
                schedule
                    .occurrences_between(from, to)
                    .into_iter()
                    .map(|start| ScheduleOccurrence {
                        schedule_id: schedule.id,
                        title: schedule.title.clone(),
                        start,
                        end: start + duration,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        occurrences.sort_by_key(|o| o.start);

        debug!(user_id = %user, count = occurrences.len(), "Listed upcoming occurrences");
        Ok(occurrences)
    }

    #[instrument(skip(self, request))]
    async fn update_schedule(
        &self,
        user: UserId,
        id: ScheduleId,
        request: UpdateScheduleRequest,
    ) -> ServiceResult<Schedule> {
        let mut schedule = self.owned_schedule(user, id, "update it").await?;

        if let Some(title) = request.title {
            schedule.title = title.trim().to_string();
        }
        if let Some(adventure_id) = request.adventure_id {
            if let Some(adventure_id) = adventure_id {
                load(self.repository.adventures(), adventure_id, "Adventure").await?;
            }
            schedule.adventure_id = adventure_id;
        }
        if let Some(start) = request.start {
            schedule.start = start;
        }
        if let Some(duration) = request.duration_minutes {
            schedule.duration_minutes = duration;
        }
        if let Some(participants) = request.participants {
            schedule.participants = participants;
        }
        if let Some(recurrence) = request.recurrence {
            schedule.recurrence = recurrence;
        }
        check_schedule(&schedule)?;
        schedule.touch();
        self.repository.schedules().save(&schedule).await?;

        info!(schedule_id = %id, "Updated schedule: {}", schedule.title);
        Ok(schedule)
    }

    #[instrument(skip(self))]
    async fn delete_schedule(&self, user: UserId, id: ScheduleId) -> ServiceResult<()> {
        self.owned_schedule(user, id, "delete it").await?;
        self.repository.schedules().delete(id).await?;
        info!(schedule_id = %id, "Deleted schedule");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn generate_sessions(&self, user: UserId, id: ScheduleId) -> ServiceResult<Vec<GameSession>> {
        let schedule = self.owned_schedule(user, id, "generate sessions").await?;

        let covered: HashSet<_> = self
            .repository
            .game_sessions()
            .list_by_parent(id.into())
            .await?
            .into_iter()
            .filter_map(|s| s.scheduled_for)
            .map(|at| at.date_naive())
            .collect();

        let players = seat_players(&schedule);
        let mut created = Vec::new();
        for start in schedule.occurrences() {
            if covered.contains(&start.date_naive()) {
                continue;
            }
            let mut session = GameSession::new(schedule.owner_id, schedule.title.clone());
            session.status = GameSessionStatus::Scheduled;
            session.schedule_id = Some(id);
            session.scheduled_for = Some(start);
            session.players = players.clone();
            self.repository.game_sessions().save(&session).await?;
            created.push(session);
        }

        info!(
            schedule_id = %id,
            created = created.len(),
            existing = covered.len(),
            "Generated game sessions from schedule"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PlayerType, ScheduleParticipant};
    use crate::domain::value_objects::{Frequency, Recurrence};
    use crate::infrastructure::persistence::in_memory_repository;

    fn seat(user: UserId, player_type: PlayerType) -> ScheduleParticipant {
        ScheduleParticipant {
            user_id: user,
            is_required: true,
            player_type,
        }
    }

    fn request(owner: UserId, recurrence: Option<Recurrence>) -> CreateScheduleRequest {
        CreateScheduleRequest {
            title: "Weekly game".to_string(),
            adventure_id: None,
            start: Utc::now() + Duration::days(1),
            duration_minutes: 240,
            participants: vec![seat(owner, PlayerType::GameMaster)],
            recurrence,
        }
    }

    fn weekly(count: u32) -> Recurrence {
        Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            count: Some(count),
            until: None,
        }
    }

    #[tokio::test]
    async fn test_create_schedule_validation() {
        let service = ScheduleServiceImpl::new(in_memory_repository());
        let owner = UserId::new();

        let mut past = request(owner, None);
        past.start = Utc::now() - Duration::hours(1);
        past.participants.clear();
        match service.create_schedule(owner, past).await {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.contains(&"Start date must be in the future".to_string()));
                assert!(errors.contains(&"Owner must be included in participants".to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let schedule = service.create_schedule(owner, request(owner, None)).await.unwrap();
        assert_eq!(service.list_schedules(owner).await.unwrap()[0].id, schedule.id);
    }

    #[tokio::test]
    async fn test_generate_sessions_skips_covered_dates() {
        let repository = in_memory_repository();
        let service = ScheduleServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let player = UserId::new();
        let mut create = request(owner, Some(weekly(3)));
        create.participants.push(seat(player, PlayerType::Player));
        let schedule = service.create_schedule(owner, create).await.unwrap();

        let first = service.generate_sessions(owner, schedule.id).await.unwrap();
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|s| s.status == GameSessionStatus::Scheduled));
        assert_eq!(first[1].scheduled_for, Some(schedule.start + Duration::weeks(1)));
        assert!(first[0].is_master(owner));
        assert_eq!(first[0].player(player).map(|p| p.role), Some(PlayerRole::Player));

        let second = service.generate_sessions(owner, schedule.id).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_moving_start_time_does_not_duplicate_dates() {
        let repository = in_memory_repository();
        let service = ScheduleServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let mut create = request(owner, Some(weekly(3)));
        create.start = (Utc::now() + Duration::days(1))
            .date_naive()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        let schedule = service.create_schedule(owner, create).await.unwrap();
        assert_eq!(service.generate_sessions(owner, schedule.id).await.unwrap().len(), 3);

        let update = UpdateScheduleRequest {
            start: Some(schedule.start + Duration::hours(1)),
            ..Default::default()
        };
        service.update_schedule(owner, schedule.id, update).await.unwrap();

        let second = service.generate_sessions(owner, schedule.id).await.unwrap();
        assert!(second.is_empty());
        let stored = repository
            .game_sessions()
            .list_by_parent(schedule.id.into())
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_sessions_is_owner_only() {
        let service = ScheduleServiceImpl::new(in_memory_repository());
        let owner = UserId::new();
        let schedule = service.create_schedule(owner, request(owner, None)).await.unwrap();

        match service.generate_sessions(UserId::new(), schedule.id).await {
            Err(ServiceError::NotAllowed(message)) => {
                assert_eq!(message, "Only the schedule owner can generate sessions")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let missing = service.generate_sessions(owner, ScheduleId::new()).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_keeps_generated_sessions() {
        let repository = in_memory_repository();
        let service = ScheduleServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let schedule = service.create_schedule(owner, request(owner, None)).await.unwrap();
        let sessions = service.generate_sessions(owner, schedule.id).await.unwrap();

        service.delete_schedule(owner, schedule.id).await.unwrap();

        assert!(repository.game_sessions().get(sessions[0].id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upcoming_window() {
        let service = ScheduleServiceImpl::new(in_memory_repository());
        let owner = UserId::new();
        let schedule = service.create_schedule(owner, request(owner, Some(weekly(10)))).await.unwrap();

        let upcoming = service
            .list_upcoming(
                owner,
                UpcomingQuery {
                    from: Some(schedule.start),
                    to: Some(schedule.start + Duration::days(15)),
                },
            )
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 3);
        assert_eq!(upcoming[0].end, schedule.start + Duration::minutes(240));

        let stranger = service.list_upcoming(UserId::new(), UpcomingQuery::default()).await.unwrap();
        assert!(stranger.is_empty());
    }
}
