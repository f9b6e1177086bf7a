use crate::errors::AppError;
use crate::models::{
    AnalyticsQuery, AnalyticsResponse, AutosaveRequest, CopyPreviousResponse, DailyRecord, DateQuery,
    HistoryResponse, LoginRequest, PlacementResponse, PlannerEdit, PlannerResponse, RecurringRequest,
    RecurringResponse,
};
use crate::recurring::{self, RecurringError};
use crate::state::AppState;
use crate::stats::{RANGE_OPTIONS, build_analytics};
use crate::ui::{render_analytics, render_planner};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::Html,
};
use chrono::{Local, NaiveDate};
use std::convert::Infallible;
use tracing::info;

pub async fn index(State(state): State<AppState>, Query(query): Query<DateQuery>) -> Html<String> {
    let planner = open_planner(&state, query.date).await;
    Html(render_planner(&planner, state.store.mode()))
}

pub async fn analytics_page(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Html<String>, AppError> {
    let range = analytics_range(query.range)?;
    let report = build_analytics(&state.store, range).await;
    Ok(Html(render_analytics(&report, range)))
}

pub async fn get_planner(State(state): State<AppState>, Query(query): Query<DateQuery>) -> Json<PlannerResponse> {
    Json(open_planner(&state, query.date).await)
}

pub async fn edit_planner(
    State(state): State<AppState>,
    Json(edit): Json<PlannerEdit>,
) -> Result<Json<PlannerResponse>, AppError> {
    let mut planner = state.planner.lock().await;
    planner.edit(edit).await?;
    Ok(Json(planner.view().await))
}

pub async fn save_planner(State(state): State<AppState>) -> Result<Json<PlannerResponse>, AppError> {
    let mut planner = state.planner.lock().await;
    planner.save_now().await?;
    Ok(Json(planner.view().await))
}

pub async fn set_autosave(
    State(state): State<AppState>,
    Json(payload): Json<AutosaveRequest>,
) -> Json<PlannerResponse> {
    let mut planner = state.planner.lock().await;
    planner.set_autosave(payload.enabled);
    Json(planner.view().await)
}

pub async fn copy_previous(State(state): State<AppState>) -> Result<Json<CopyPreviousResponse>, AppError> {
    let mut planner = state.planner.lock().await;
    let copied = planner
        .copy_previous_day()
        .await?
        .ok_or_else(|| AppError::not_found("no planner data found for the previous day"))?;
    info!("imported {copied} unfinished task(s) into {}", planner.date());
    Ok(Json(CopyPreviousResponse {
        copied,
        planner: planner.view().await,
    }))
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let dates = state.store.list_dates().await?;
    Ok(Json(HistoryResponse { dates }))
}

pub async fn list_recurring(State(state): State<AppState>) -> Result<Json<RecurringResponse>, AppError> {
    recurring_response(&state).await.map(Json)
}

pub async fn add_recurring(
    State(state): State<AppState>,
    Json(payload): Json<RecurringRequest>,
) -> Result<Json<RecurringResponse>, AppError> {
    let known = recurring::list_recurring(&state.store).await?;
    let text = recurring::validate_new(&payload.text, &known)?;
    update_day(&state, today(), |record| recurring::mark_recurring(record, &text)).await?;
    Ok(Json(recurring_response(&state).await?))
}

pub async fn remove_recurring(
    State(state): State<AppState>,
    Json(payload): Json<RecurringRequest>,
) -> Result<Json<RecurringResponse>, AppError> {
    let text = payload.text;
    recurring::remove_everywhere(&state.store, &text).await?;

    let mut planner = state.planner.lock().await;
    if planner.snapshot().await.recurring.contains(&text) {
        let _ = planner
            .update(|record| {
                record.recurring.remove(&text);
                Ok::<_, Infallible>(())
            })
            .await;
    }
    drop(planner);

    Ok(Json(recurring_response(&state).await?))
}

pub async fn add_recurring_to_today(
    State(state): State<AppState>,
    Json(payload): Json<RecurringRequest>,
) -> Result<Json<PlacementResponse>, AppError> {
    let date = today();
    let text = payload.text.trim().to_string();
    let (category, slot) =
        update_day(&state, date, |record| recurring::place_in_first_empty_slot(record, &text)).await?;
    info!("added recurring task {text:?} to {date} ({category:?} slot {slot})");
    Ok(Json(PlacementResponse { date, category, slot }))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let range = analytics_range(query.range)?;
    Ok(Json(build_analytics(&state.store, range).await))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<serde_json::Value>), AppError> {
    let cookie = state
        .gate
        .login(&payload.password)
        .ok_or_else(|| AppError::unauthorized("incorrect password"))?;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(AppError::internal)?,
    );
    Ok((headers, Json(serde_json::json!({ "authenticated": true }))))
}

async fn open_planner(state: &AppState, date: Option<NaiveDate>) -> PlannerResponse {
    let mut planner = state.planner.lock().await;
    planner.switch_date(date.unwrap_or_else(today)).await;
    planner.view().await
}

async fn recurring_response(state: &AppState) -> Result<RecurringResponse, AppError> {
    let tasks = recurring::list_recurring(&state.store).await?;
    Ok(RecurringResponse {
        tasks: tasks.into_iter().collect(),
    })
}

/// Goes through the open session when `date` is the open day.
async fn update_day<T>(
    state: &AppState,
    date: NaiveDate,
    change: impl FnOnce(&mut DailyRecord) -> Result<T, RecurringError>,
) -> Result<T, AppError> {
    let mut planner = state.planner.lock().await;
    if planner.date() == date {
        let outcome = planner.update(change).await?;
        planner.save_now().await?;
        return Ok(outcome);
    }
    drop(planner);

    let mut record = state.store.fetch(date).await?.unwrap_or_default();
    let outcome = change(&mut record)?;
    state.store.put(date, &record).await?;
    Ok(outcome)
}

fn analytics_range(range: Option<u32>) -> Result<u32, AppError> {
    let range = range.unwrap_or(RANGE_OPTIONS[0]);
    if RANGE_OPTIONS.contains(&range) {
        Ok(range)
    } else {
        Err(AppError::bad_request("range must be 7 or 30"))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
