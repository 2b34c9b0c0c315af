//! Recurrence rules for schedules

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on occurrences produced from a single rule
pub const MAX_OCCURRENCES: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// How a schedule repeats after its first occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Total number of occurrences, including the first
    #[serde(default)]
    pub count: Option<u32>,
    /// No occurrence starts after this instant
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

impl Recurrence {
    pub fn once() -> Self {
        Self {
            frequency: Frequency::Once,
            interval: 1,
            count: None,
            until: None,
        }
    }

    pub fn validate(&self, start: DateTime<Utc>) -> Vec<String> {
        let mut errors = Vec::new();
        if self.interval == 0 {
            errors.push("Invalid recurrence: Interval must be at least 1".to_string());
        }
        if let Some(until) = self.until {
            if until <= start {
                errors.push("Invalid recurrence: Until must be after Start".to_string());
            }
        }
        if self.frequency != Frequency::Once {
            match self.count {
                Some(0) => errors.push("Invalid recurrence: Count must be at least 1".to_string()),
                None if self.until.is_none() => errors
                    .push("Invalid recurrence: a Count or an Until date is required".to_string()),
                _ => {}
            }
        }
        errors
    }

    /// The n-th occurrence (0-based) counted from `start`.
    ///
    /// Month and year steps are computed from `start` rather than from the
    /// previous occurrence, so a series starting on the 31st keeps landing
    /// on the last day of shorter months without drifting.
    fn nth(&self, start: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        let steps = n.checked_mul(self.interval)?;
        match self.frequency {
            Frequency::Once => (n == 0).then_some(start),
            Frequency::Daily => start.checked_add_signed(Duration::days(steps as i64)),
            Frequency::Weekly => start.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => start.checked_add_months(Months::new(steps)),
            Frequency::Yearly => start.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }

    /// Expand the rule into concrete start instants
    pub fn occurrences(&self, start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if self.frequency == Frequency::Once {
            return vec![start];
        }
        let limit = self.count.unwrap_or(MAX_OCCURRENCES).min(MAX_OCCURRENCES);
        let mut result = Vec::new();
        for n in 0..limit {
            let Some(next) = self.nth(start, n) else {
                break;
            };
            if self.until.is_some_and(|until| next > until) {
                break;
            }
            result.push(next);
        }
        result
    }
}

/// Occurrences of an optional rule; a missing rule means a single occurrence
pub fn expand(start: DateTime<Utc>, recurrence: Option<&Recurrence>) -> Vec<DateTime<Utc>> {
    match recurrence {
        Some(rule) => rule.occurrences(start),
        None => vec![start],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 31, 19, 0, 0).unwrap()
    }

    fn rule(frequency: Frequency, interval: u32, count: Option<u32>) -> Recurrence {
        Recurrence {
            frequency,
            interval,
            count,
            until: None,
        }
    }

    #[test]
    fn test_once_yields_start_only() {
        assert_eq!(Recurrence::once().occurrences(start()), vec![start()]);
        assert_eq!(expand(start(), None), vec![start()]);
    }

    #[test]
    fn test_daily_with_interval() {
        let dates = rule(Frequency::Daily, 2, Some(3)).occurrences(start());
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], start() + Duration::days(2));
        assert_eq!(dates[2], start() + Duration::days(4));
    }

    #[test]
    fn test_weekly_count() {
        let dates = rule(Frequency::Weekly, 1, Some(4)).occurrences(start());
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[3], start() + Duration::weeks(3));
    }

    #[test]
    fn test_monthly_clamps_to_month_end_without_drift() {
        let dates = rule(Frequency::Monthly, 1, Some(3)).occurrences(start());
        assert_eq!(dates[1], Utc.with_ymd_and_hms(2030, 2, 28, 19, 0, 0).unwrap());
        assert_eq!(dates[2], Utc.with_ymd_and_hms(2030, 3, 31, 19, 0, 0).unwrap());
    }

    #[test]
    fn test_until_cuts_the_series() {
        let mut recurrence = rule(Frequency::Daily, 1, Some(10));
        recurrence.until = Some(start() + Duration::days(2));
        assert_eq!(recurrence.occurrences(start()).len(), 3);
    }

    #[test]
    fn test_until_without_count_is_bounded() {
        let mut recurrence = rule(Frequency::Yearly, 1, None);
        recurrence.until = Some(start() + Duration::days(365 * 3));
        assert_eq!(recurrence.occurrences(start()).len(), 3);
    }

    #[test]
    fn test_validation() {
        assert!(rule(Frequency::Daily, 1, Some(3)).validate(start()).is_empty());
        assert_eq!(rule(Frequency::Daily, 0, Some(3)).validate(start()).len(), 1);
        assert_eq!(rule(Frequency::Weekly, 1, None).validate(start()).len(), 1);

        let mut backwards = rule(Frequency::Daily, 1, Some(3));
        backwards.until = Some(start() - Duration::days(1));
        let errors = backwards.validate(start());
        assert!(errors.iter().any(|e| e.contains("Until must be after Start")));
    }
}
