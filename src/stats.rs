use crate::models::{AdminStatsResponse, DailyLog, SubjectLog, Symptom, Window};
use crate::severity::SeverityBand;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// An average kept both exact and rounded to one decimal for display.
/// Aggregate further from `exact`; show `rounded`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Mean {
    pub exact: f64,
    pub rounded: f64,
}

impl Mean {
    /// Mean of `sum` over `count` values. An empty set averages to zero.
    pub fn of(sum: f64, count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        let exact = sum / count as f64;
        Self {
            exact,
            rounded: round_one_decimal(exact),
        }
    }

    pub fn display(&self) -> String {
        format!("{:.1}", self.rounded)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomStat {
    pub symptom: Symptom,
    pub name: &'static str,
    pub total: u64,
    pub average: Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomDistribution {
    #[serde(flatten)]
    pub stat: SymptomStat,
    pub band: SeverityBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestEntry {
    pub date: NaiveDate,
    pub score: u8,
    pub severity: SeverityBand,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub window_days: usize,
    pub days_logged: usize,
    pub average_total: Mean,
    pub symptoms: Vec<SymptomStat>,
    pub latest: Option<LatestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub total_subjects: usize,
    pub total_logs: usize,
    pub average_score: Mean,
    pub logs_today: usize,
    pub active_subjects: usize,
}

pub fn average_total_score(logs: &[DailyLog]) -> Mean {
    mean_total(logs.iter())
}

/// Sum and mean of every symptom dimension, in a fixed order.
pub fn symptom_totals(logs: &[DailyLog]) -> Vec<SymptomStat> {
    let logs: Vec<&DailyLog> = logs.iter().collect();
    per_symptom(&logs)
}

/// Per-symptom totals across every subject, banded on the per-field average
/// scale. The band follows the displayed (rounded) average.
pub fn symptom_distribution(logs: &[SubjectLog]) -> Vec<SymptomDistribution> {
    let logs: Vec<&DailyLog> = logs.iter().map(|entry| &entry.log).collect();
    per_symptom(&logs)
        .into_iter()
        .map(|stat| SymptomDistribution {
            band: SeverityBand::for_average(stat.average.rounded),
            stat,
        })
        .collect()
}

pub fn distinct_subjects(logs: &[SubjectLog]) -> usize {
    logs.iter()
        .map(|entry| &entry.subject)
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn logs_on(date: NaiveDate, logs: &[SubjectLog]) -> usize {
    logs.iter().filter(|entry| entry.log.date() == date).count()
}

/// How many logs (from any subject) fall on each day of the window, oldest
/// first, zero-count days included.
pub fn daily_activity(
    anchor: NaiveDate,
    window: Window,
    logs: &[SubjectLog],
) -> Vec<ActivityPoint> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for entry in logs {
        *counts.entry(entry.log.date()).or_default() += 1;
    }

    window
        .dates(anchor)
        .map(|date| ActivityPoint {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Distinct subjects with at least one log inside the window.
pub fn active_subjects(anchor: NaiveDate, window: Window, logs: &[SubjectLog]) -> usize {
    logs.iter()
        .filter(|entry| window.contains(anchor, entry.log.date()))
        .map(|entry| &entry.subject)
        .collect::<BTreeSet<_>>()
        .len()
}

/// One subject's picture over the window: how often they logged, their
/// average score and per-symptom figures, and the newest logged day.
pub fn trend_summary(anchor: NaiveDate, window: Window, logs: &[DailyLog]) -> TrendSummary {
    let mut in_window: Vec<&DailyLog> = logs
        .iter()
        .filter(|log| window.contains(anchor, log.date()))
        .collect();
    in_window.sort_by_key(|log| log.date());
    in_window.dedup_by_key(|log| log.date());

    let latest = in_window.last().map(|log| {
        let severity = log.severity();
        LatestEntry {
            date: log.date(),
            score: log.total_score(),
            severity,
            label: severity.short_label(),
        }
    });

    TrendSummary {
        window_days: window.days(),
        days_logged: in_window.len(),
        average_total: mean_total(in_window.iter().copied()),
        symptoms: per_symptom(&in_window),
        latest,
    }
}

pub fn admin_overview(
    anchor: NaiveDate,
    active_window: Window,
    logs: &[SubjectLog],
) -> AdminOverview {
    AdminOverview {
        total_subjects: distinct_subjects(logs),
        total_logs: logs.len(),
        average_score: mean_total(logs.iter().map(|entry| &entry.log)),
        logs_today: logs_on(anchor, logs),
        active_subjects: active_subjects(anchor, active_window, logs),
    }
}

pub fn build_admin_stats_at(
    anchor: NaiveDate,
    activity_window: Window,
    active_window: Window,
    logs: &[SubjectLog],
) -> AdminStatsResponse {
    AdminStatsResponse {
        anchor,
        overview: admin_overview(anchor, active_window, logs),
        distribution: symptom_distribution(logs),
        daily_activity: daily_activity(anchor, activity_window, logs),
    }
}

fn mean_total<'a>(logs: impl Iterator<Item = &'a DailyLog>) -> Mean {
    let (sum, count) = logs.fold((0u64, 0usize), |(sum, count), log| {
        (sum + u64::from(log.total_score()), count + 1)
    });
    Mean::of(sum as f64, count)
}

fn per_symptom(logs: &[&DailyLog]) -> Vec<SymptomStat> {
    Symptom::ALL
        .iter()
        .map(|&symptom| {
            let total: u64 = logs
                .iter()
                .map(|log| u64::from(log.rating(symptom).value()))
                .sum();
            SymptomStat {
                symptom,
                name: symptom.display_name(),
                total,
                average: Mean::of(total as f64, logs.len()),
            }
        })
        .collect()
}
