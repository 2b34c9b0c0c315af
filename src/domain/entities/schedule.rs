//! Schedule entity - planned play time, optionally recurring

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{expand, AdventureId, Recurrence, ScheduleId, UserId};

use super::PlayerRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerType {
    Guest,
    #[default]
    Player,
    Assistant,
    GameMaster,
}

impl From<PlayerType> for PlayerRole {
    fn from(value: PlayerType) -> Self {
        match value {
            PlayerType::Guest => PlayerRole::Guest,
            PlayerType::Player => PlayerRole::Player,
            PlayerType::Assistant => PlayerRole::Assistant,
            PlayerType::GameMaster => PlayerRole::Master,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleParticipant {
    pub user_id: UserId,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub player_type: PlayerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub owner_id: UserId,
    pub title: String,
    pub adventure_id: Option<AdventureId>,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub participants: Vec<ScheduleParticipant>,
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }

    pub fn occurrences(&self) -> Vec<DateTime<Utc>> {
        expand(self.start, self.recurrence.as_ref())
    }

    /// Occurrences overlapping the half-open window `[from, to)`
    pub fn occurrences_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let duration = self.duration();
        self.occurrences()
            .into_iter()
            .filter(|start| *start < to && *start + duration > from)
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Rules every schedule must satisfy at creation and on update
pub fn validate_schedule(
    owner: UserId,
    start: DateTime<Utc>,
    duration_minutes: u32,
    participants: &[ScheduleParticipant],
    recurrence: Option<&Recurrence>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if start <= now {
        errors.push("Start date must be in the future".to_string());
    }
    if duration_minutes == 0 {
        errors.push("Duration must be positive".to_string());
    }
    if let Some(rule) = recurrence {
        errors.extend(rule.validate(start));
    }
    if !participants.iter().any(|p| p.user_id == owner) {
        errors.push("Owner must be included in participants".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Frequency;

    fn owner_seat(owner: UserId) -> Vec<ScheduleParticipant> {
        vec![ScheduleParticipant {
            user_id: owner,
            is_required: true,
            player_type: PlayerType::GameMaster,
        }]
    }

    #[test]
    fn test_validation_messages() {
        let owner = UserId::new();
        let now = Utc::now();
        let rule = Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            count: None,
            until: Some(now - Duration::days(1)),
        };

        let errors = validate_schedule(owner, now - Duration::hours(1), 0, &[], Some(&rule), now);

        assert!(errors.contains(&"Start date must be in the future".to_string()));
        assert!(errors.contains(&"Duration must be positive".to_string()));
        assert!(errors.contains(&"Invalid recurrence: Until must be after Start".to_string()));
        assert!(errors.contains(&"Owner must be included in participants".to_string()));
    }

    #[test]
    fn test_valid_schedule_passes() {
        let owner = UserId::new();
        let now = Utc::now();
        let errors = validate_schedule(owner, now + Duration::days(1), 180, &owner_seat(owner), None, now);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_game_master_maps_to_master_role() {
        assert_eq!(PlayerRole::from(PlayerType::GameMaster), PlayerRole::Master);
        assert_eq!(PlayerRole::from(PlayerType::Guest), PlayerRole::Guest);
    }

    #[test]
    fn test_occurrences_between_window() {
        let owner = UserId::new();
        let start = Utc::now() + Duration::days(1);
        let schedule = Schedule {
            id: ScheduleId::new(),
            owner_id: owner,
            title: "Weekly".to_string(),
            adventure_id: None,
            start,
            duration_minutes: 60,
            participants: owner_seat(owner),
            recurrence: Some(Recurrence {
                frequency: Frequency::Weekly,
                interval: 1,
                count: Some(4),
                until: None,
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let hits = schedule.occurrences_between(start + Duration::days(6), start + Duration::days(15));
        assert_eq!(hits, vec![start + Duration::weeks(1), start + Duration::weeks(2)]);
    }
}
