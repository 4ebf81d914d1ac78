use crate::errors::ValidationError;
use crate::models::{DailyLog, Window};
use crate::severity::SeverityBand;
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub score: u8,
    pub has_data: bool,
    pub severity: Option<SeverityBand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub log: Option<DailyLog>,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One bucket per day of `window` ending at `anchor`, oldest first. Days
/// without a log get a zero score and `has_data == false`.
pub fn bucket_days(anchor: NaiveDate, window: Window, logs: &[DailyLog]) -> Vec<DateBucket> {
    let by_date = index_by_date(logs);

    window
        .dates(anchor)
        .map(|date| match by_date.get(&date) {
            Some(log) => DateBucket {
                date,
                score: log.total_score(),
                has_data: true,
                severity: Some(log.severity()),
            },
            None => DateBucket {
                date,
                score: 0,
                has_data: false,
                severity: None,
            },
        })
        .collect()
}

/// Every day of the given month in order, paired with its log if one exists.
pub fn month_days(
    year: i32,
    month: u32,
    logs: &[DailyLog],
) -> Result<Vec<CalendarDay>, ValidationError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ValidationError::InvalidMonth { year, month })?;
    let by_date = index_by_date(logs);

    let mut days = Vec::with_capacity(31);
    let mut next = Some(first);
    while let Some(date) = next.filter(|date| date.month() == month) {
        days.push(CalendarDay {
            date,
            log: by_date.get(&date).map(|log| **log),
        });
        next = date.succ_opt();
    }
    Ok(days)
}

/// Parses `YYYY-MM` into a year and month.
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|_| (year, month))
}

// First log wins when a date appears more than once.
fn index_by_date(logs: &[DailyLog]) -> HashMap<NaiveDate, &DailyLog> {
    let mut by_date = HashMap::with_capacity(logs.len());
    for log in logs {
        by_date.entry(log.date()).or_insert(log);
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::SymptomRatings;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn log(date: NaiveDate, pain: i64, bleeding: i64, fatigue: i64, pressure: i64) -> DailyLog {
        DailyLog::new(date, SymptomRatings::new(pain, bleeding, fatigue, pressure).unwrap())
    }

    #[test]
    fn empty_window_is_dense_and_ordered() {
        let buckets = bucket_days(anchor(), Window::WEEK, &[]);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| !b.has_data && b.score == 0 && b.severity.is_none()));
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn window_spans_anchor_minus_n_minus_one() {
        for days in [1, 7, 30, 366] {
            let window = Window::new(days).unwrap();
            let buckets = bucket_days(anchor(), window, &[]);
            assert_eq!(buckets.len(), days as usize);
            assert_eq!(buckets[0].date, anchor() - Duration::days(days - 1));
            assert_eq!(buckets[buckets.len() - 1].date, anchor());
        }
    }

    #[test]
    fn sparse_logs_fill_matching_days_only() {
        let one_ago = anchor() - Duration::days(1);
        let three_ago = anchor() - Duration::days(3);
        let logs = vec![log(three_ago, 1, 1, 1, 1), log(one_ago, 3, 3, 3, 0)];

        let buckets = bucket_days(anchor(), Window::WEEK, &logs);
        for bucket in &buckets {
            if bucket.date == one_ago {
                assert!(bucket.has_data);
                assert_eq!(bucket.score, 9);
                assert_eq!(bucket.severity, Some(SeverityBand::Severe));
            } else if bucket.date == three_ago {
                assert!(bucket.has_data);
                assert_eq!(bucket.score, 4);
            } else {
                assert!(!bucket.has_data);
                assert_eq!(bucket.score, 0);
            }
        }
    }

    #[test]
    fn output_does_not_depend_on_input_order() {
        let logs = vec![
            log(anchor(), 1, 0, 0, 0),
            log(anchor() - Duration::days(2), 2, 0, 0, 0),
            log(anchor() - Duration::days(6), 3, 0, 0, 0),
        ];
        let mut reversed = logs.clone();
        reversed.reverse();
        assert_eq!(
            bucket_days(anchor(), Window::WEEK, &logs),
            bucket_days(anchor(), Window::WEEK, &reversed)
        );
    }

    #[test]
    fn logs_outside_window_are_ignored() {
        let logs = vec![
            log(anchor() - Duration::days(7), 3, 3, 3, 3),
            log(anchor() + Duration::days(1), 3, 3, 3, 3),
        ];
        let buckets = bucket_days(anchor(), Window::WEEK, &logs);
        assert!(buckets.iter().all(|b| !b.has_data));
    }

    #[test]
    fn duplicate_day_uses_first_match() {
        let logs = vec![log(anchor(), 1, 0, 0, 0), log(anchor(), 3, 3, 0, 0)];
        let buckets = bucket_days(anchor(), Window::WEEK, &logs);
        assert_eq!(buckets[6].score, 1);
    }

    #[test]
    fn anchor_at_start_of_calendar_does_not_panic() {
        let anchor = NaiveDate::MIN + Duration::days(2);
        let buckets = bucket_days(anchor, Window::MONTH, &[log(anchor, 1, 0, 0, 0)]);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].date, NaiveDate::MIN);
        assert!(buckets[2].has_data);
        assert!(Window::MONTH.start_for(anchor).is_err());
    }

    #[test]
    fn month_grid_covers_every_day() {
        let feb = month_days(2028, 2, &[]).unwrap();
        assert_eq!(feb.len(), 29);
        assert_eq!(feb[0].date, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());

        let logged = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let jan = month_days(2026, 1, &[log(logged, 2, 1, 0, 0)]).unwrap();
        assert_eq!(jan.len(), 31);
        assert_eq!(jan[14].log.map(|l| l.total_score()), Some(3));
        assert!(jan[13].log.is_none());
    }

    #[test]
    fn month_grid_rejects_bad_month() {
        assert_eq!(
            month_days(2026, 13, &[]),
            Err(ValidationError::InvalidMonth { year: 2026, month: 13 })
        );
    }

    #[test]
    fn parses_year_month() {
        assert_eq!(parse_month("2026-03"), Some((2026, 3)));
        assert_eq!(parse_month("2026-3"), Some((2026, 3)));
        assert_eq!(parse_month("2026-00"), None);
        assert_eq!(parse_month("march"), None);
    }
}
