use crate::buckets::{bucket_days, month_days, parse_month, today};
use crate::errors::AppError;
use crate::models::{
    AdminQuery, AdminStatsResponse, CalendarQuery, CalendarResponse, ChartResponse, DailyLog,
    LogRequest, LogResponse, SeverityQuery, SeverityResponse, SubjectId, Window, WindowQuery,
};
use crate::state::AppState;
use crate::stats::{build_admin_stats_at, trend_summary, TrendSummary};
use crate::storage::{persist_data, LogRepository};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use tracing::{debug, error, info};

pub async fn health() -> &'static str {
    "ok"
}

pub async fn put_log(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<LogResponse>, AppError> {
    let subject = SubjectId::parse(&subject)?;
    let ratings = payload.ratings.normalize()?;
    let log = DailyLog::new(payload.date.unwrap_or_else(today), ratings);

    let mut store = state.store.lock().await;
    store.put(&subject, log);
    if let Err(err) = persist_data(&state.data_path, &store).await {
        error!("failed to persist data file: {}", err.message);
        return Err(err);
    }

    info!(
        subject = %subject,
        date = %log.date(),
        total_score = log.total_score(),
        "stored daily log"
    );
    Ok(Json(LogResponse::new(subject, &log, true)))
}

pub async fn get_today(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<LogResponse>, AppError> {
    let subject = SubjectId::parse(&subject)?;
    let date = today();
    let store = state.store.lock().await;

    let response = match store.find(&subject, date) {
        Some(log) => LogResponse::new(subject, &log, true),
        None => LogResponse::new(subject, &DailyLog::new(date, Default::default()), false),
    };
    Ok(Json(response))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let subject = SubjectId::parse(&subject)?;
    let window = Window::new(query.days.unwrap_or(7))?;
    let anchor = query.anchor.unwrap_or_else(today);

    let start = window.start_for(anchor)?;

    let logs = state.store.lock().await.get(&subject, start..=anchor);
    debug!(subject = %subject, logs = logs.len(), days = window.days(), "building chart");

    Ok(Json(ChartResponse {
        buckets: bucket_days(anchor, window, &logs),
        summary: trend_summary(anchor, window, &logs),
        subject,
        anchor,
    }))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let subject = SubjectId::parse(&subject)?;
    let (year, month) = match query.month.as_deref() {
        Some(raw) => {
            parse_month(raw).ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))?
        }
        None => {
            let now = today();
            (now.year(), now.month())
        }
    };

    let store = state.store.lock().await;
    let days = month_days(year, month, store.logs_for(&subject))?;
    Ok(Json(CalendarResponse {
        subject,
        year,
        month,
        days,
    }))
}

pub async fn get_trends(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<TrendSummary>, AppError> {
    let subject = SubjectId::parse(&subject)?;
    let window = Window::new(query.days.unwrap_or(7))?;
    let anchor = query.anchor.unwrap_or_else(today);

    let start = window.start_for(anchor)?;

    let logs = state.store.lock().await.get(&subject, start..=anchor);
    Ok(Json(trend_summary(anchor, window, &logs)))
}

pub async fn get_admin_stats(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<AdminStatsResponse>, AppError> {
    let activity_window = Window::new(query.days.unwrap_or(30))?;
    let active_window = Window::new(query.active_days.unwrap_or(7))?;
    let anchor = query.anchor.unwrap_or_else(today);
    activity_window.start_for(anchor)?;
    active_window.start_for(anchor)?;

    let logs = state.store.lock().await.all();
    Ok(Json(build_admin_stats_at(anchor, activity_window, active_window, &logs)))
}

pub async fn get_severity(
    Query(query): Query<SeverityQuery>,
) -> Result<Json<SeverityResponse>, AppError> {
    let band = query.scale.classify(query.value)?;
    Ok(Json(SeverityResponse {
        scale: query.scale,
        value: query.value,
        severity: band.into(),
    }))
}
