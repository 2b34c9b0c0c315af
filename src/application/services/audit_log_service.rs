//! Audit Log Service - storage and reporting over recorded requests

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use tracing::{debug, instrument};

use crate::application::dto::{
    AuditLogPage, AuditLogQuery, AuditStatistics, HourlyAverage, DEFAULT_PAGE_SIZE,
};
use crate::application::errors::ServiceResult;
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{check_paging, load};
use crate::domain::entities::AuditLog;
use crate::domain::value_objects::AuditLogId;

#[async_trait]
pub trait AuditLogService: Send + Sync {
    async fn add(&self, log: AuditLog) -> ServiceResult<()>;

    async fn get(&self, id: AuditLogId) -> ServiceResult<AuditLog>;

    /// Filtered page, newest first
    async fn query(&self, query: AuditLogQuery) -> ServiceResult<AuditLogPage>;

    async fn total_count(&self) -> ServiceResult<usize>;

    async fn count_in_period(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> ServiceResult<usize>;

    /// Distinct authenticated users seen since `since`
    async fn distinct_active_users(&self, since: DateTime<Utc>) -> ServiceResult<usize>;

    /// Mean duration of requests since `since`; 0 when there are none
    async fn average_response_time(&self, since: DateTime<Utc>) -> ServiceResult<f64>;

    async fn hourly_average_response_times(
        &self,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<HourlyAverage>>;

    async fn statistics(&self, since: DateTime<Utc>) -> ServiceResult<AuditStatistics>;
}

fn matches(log: &AuditLog, query: &AuditLogQuery) -> bool {
    query.from.is_none_or(|from| log.timestamp >= from)
        && query.to.is_none_or(|to| log.timestamp <= to)
        && query.user_id.is_none_or(|user| log.user_id == Some(user))
        && query.result.is_none_or(|result| log.result == result)
        && query.action.as_deref().is_none_or(|action| {
            log.action.to_lowercase().contains(&action.to_lowercase())
        })
        && query
            .entity_type
            .as_deref()
            .is_none_or(|entity| log.entity_type.as_deref() == Some(entity))
}

fn mean(durations: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = durations.fold((0f64, 0u64), |(s, c), d| (s + d as f64, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[derive(Clone)]
pub struct AuditLogServiceImpl {
    repository: Repository,
}

impl AuditLogServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn since(&self, since: DateTime<Utc>) -> ServiceResult<Vec<AuditLog>> {
        let logs = self.repository.audit_logs().list().await?;
        Ok(logs.into_iter().filter(|l| l.timestamp >= since).collect())
    }
}

#[async_trait]
impl AuditLogService for AuditLogServiceImpl {
    #[instrument(skip(self, log), fields(action = %log.action, status = log.status_code))]
    async fn add(&self, log: AuditLog) -> ServiceResult<()> {
        self.repository.audit_logs().save(&log).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: AuditLogId) -> ServiceResult<AuditLog> {
        load(self.repository.audit_logs(), id, "Audit log").await
    }

    #[instrument(skip(self))]
    async fn query(&self, query: AuditLogQuery) -> ServiceResult<AuditLogPage> {
        let skip = query.skip.unwrap_or(0);
        let take = query.take.unwrap_or(DEFAULT_PAGE_SIZE);
        check_paging(skip, take)?;

        let mut logs: Vec<AuditLog> = self
            .repository
            .audit_logs()
            .list()
            .await?
            .into_iter()
            .filter(|log| matches(log, &query))
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_count = logs.len();
        let items = logs
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .collect::<Vec<_>>();

        debug!(total_count, returned = items.len(), "Queried audit logs");
        Ok(AuditLogPage {
            items,
            total_count,
            skip,
            take,
        })
    }

    #[instrument(skip(self))]
    async fn total_count(&self) -> ServiceResult<usize> {
        Ok(self.repository.audit_logs().list().await?.len())
    }

    #[instrument(skip(self))]
    async fn count_in_period(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> ServiceResult<usize> {
        let logs = self.since(from).await?;
        Ok(logs.iter().filter(|l| l.timestamp <= to).count())
    }

    #[instrument(skip(self))]
    async fn distinct_active_users(&self, since: DateTime<Utc>) -> ServiceResult<usize> {
        let logs = self.since(since).await?;
        let users: HashSet<_> = logs.iter().filter_map(|l| l.user_id).collect();
        Ok(users.len())
    }

    #[instrument(skip(self))]
    async fn average_response_time(&self, since: DateTime<Utc>) -> ServiceResult<f64> {
        let logs = self.since(since).await?;
        Ok(mean(logs.iter().map(|l| l.duration_ms)))
    }

    #[instrument(skip(self))]
    async fn hourly_average_response_times(
        &self,
        since: DateTime<Utc>,
    ) -> ServiceResult<Vec<HourlyAverage>> {
        let mut buckets: BTreeMap<DateTime<Utc>, Vec<u64>> = BTreeMap::new();
        for log in self.since(since).await? {
            let hour = log
                .timestamp
                .duration_trunc(TimeDelta::hours(1))
                .unwrap_or(log.timestamp);
            buckets.entry(hour).or_default().push(log.duration_ms);
        }
        Ok(buckets
            .into_iter()
            .map(|(hour, durations)| HourlyAverage {
                hour,
                average_ms: mean(durations.into_iter()),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn statistics(&self, since: DateTime<Utc>) -> ServiceResult<AuditStatistics> {
        Ok(AuditStatistics {
            total_count: self.total_count().await?,
            distinct_users: self.distinct_active_users(since).await?,
            average_response_time_ms: self.average_response_time(since).await?,
        })
    }
}
