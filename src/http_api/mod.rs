use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    Cell, DayCode, Density, DocumentFormat, PeriodIndex, RenderError, ScheduleConfig, Session,
    StorageError, StoreStatus, Summary, TableView, ValidationError,
};

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    pub fn with_shared(session: Arc<RwLock<Session>>) -> Self {
        Self { session }
    }

    fn session(&self) -> Arc<RwLock<Session>> {
        self.session.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(_) => ApiError::NotFound(value.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(value: RenderError) -> Self {
        match value {
            RenderError::NothingToRender => ApiError::Unprocessable(value.to_string()),
            RenderError::Geometry(_) => ApiError::Invalid(value.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "nothing_to_render", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ScheduleQuery {
    show_empty: bool,
    density: Density,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePayload {
    teacher: Option<String>,
    subjects: Option<String>,
    institution: Option<String>,
    school_year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DaysPayload {
    weekdays: Option<Vec<DayCode>>,
    rest_day: Option<DayCode>,
    include_rest_day: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodsPayload {
    active_periods: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct TimePayload {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct DayCell {
    period: PeriodIndex,
    cell: Cell,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/summary", get(get_summary))
        .route("/status", get(get_status))
        .route("/schedule", get(get_schedule))
        .route("/schedule/text", get(get_schedule_text))
        .route("/schedule/csv", get(get_schedule_csv))
        .route("/schedule/document/:format", get(get_document))
        .route("/config", get(get_config).put(replace_config))
        .route("/config/profile", put(update_profile))
        .route("/config/days", put(update_days))
        .route("/config/periods", put(update_periods))
        .route("/config/periods/:period/time", put(update_period_time))
        .route("/cells/reset", post(reset_cells))
        .route("/cells/:day", get(get_day))
        .route("/cells/:day/:period", put(set_cell).delete(clear_cell))
        .route("/actions/example", post(load_example))
        .route("/actions/save", post(save_config))
        .route("/actions/reload", post(reload_config))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, session: Session) -> std::io::Result<()> {
    let state = AppState::new(session);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

fn parse_day(day: &str) -> Result<DayCode, ApiError> {
    DayCode::from_str(day).map_err(|err| ApiError::invalid(err.to_string()))
}

fn parse_period(period: &str) -> Result<PeriodIndex, ApiError> {
    Ok(PeriodIndex::from_str(period)?)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_summary(State(state): State<AppState>) -> Json<Summary> {
    let session = state.session();
    let summary = session.read().summary();
    Json(summary)
}

async fn get_status(State(state): State<AppState>) -> Json<StoreStatus> {
    let session = state.session();
    let status = session.read().status();
    Json(status)
}

async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Json<TableView> {
    let session = state.session();
    let view = session.read().table(query.show_empty, query.density);
    Json(view)
}

async fn get_schedule_text(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<String, ApiError> {
    let session = state.session();
    let view = session.read().table(query.show_empty, query.density);
    Ok(view.to_text()?)
}

async fn get_schedule_csv(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Response, ApiError> {
    let session = state.session();
    let view = session.read().table(query.show_empty, query.density);
    let mut bytes = Vec::new();
    view.write_csv(&mut bytes)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], bytes).into_response())
}

async fn get_document(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format = DocumentFormat::from_str(&format).map_err(ApiError::invalid)?;
    let session = state.session();
    let document = session.read().render_document(format)?;
    let headers = [
        (header::CONTENT_TYPE, document.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.file_name),
        ),
    ];
    Ok((headers, document.bytes).into_response())
}

async fn get_config(State(state): State<AppState>) -> Json<ScheduleConfig> {
    let session = state.session();
    let config = session.read().config().clone();
    Json(config)
}

async fn replace_config(
    State(state): State<AppState>,
    Json(config): Json<ScheduleConfig>,
) -> Result<Json<ScheduleConfig>, ApiError> {
    let session = state.session();
    let mut guard = session.write();
    guard.replace_config(config)?;
    Ok(Json(guard.config().clone()))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfilePayload>,
) -> Json<Summary> {
    let session = state.session();
    let mut guard = session.write();
    let config = guard.config_mut();
    if let Some(teacher) = payload.teacher {
        config.set_teacher(teacher);
    }
    if let Some(subjects) = payload.subjects {
        config.set_subjects(subjects);
    }
    if let Some(institution) = payload.institution {
        config.set_institution(institution);
    }
    if let Some(school_year) = payload.school_year {
        config.set_school_year(school_year);
    }
    Json(guard.summary())
}

async fn update_days(
    State(state): State<AppState>,
    Json(payload): Json<DaysPayload>,
) -> Json<ScheduleConfig> {
    let session = state.session();
    let mut guard = session.write();
    let config = guard.config_mut();
    if let Some(weekdays) = payload.weekdays {
        config.set_weekdays(weekdays);
    }
    if let Some(rest_day) = payload.rest_day {
        config.set_rest_day(rest_day);
    }
    if let Some(include) = payload.include_rest_day {
        config.set_include_rest_day(include);
    }
    Json(config.clone())
}

async fn update_periods(
    State(state): State<AppState>,
    Json(payload): Json<PeriodsPayload>,
) -> Result<Json<ScheduleConfig>, ApiError> {
    let periods = payload
        .active_periods
        .into_iter()
        .map(PeriodIndex::new)
        .collect::<Result<Vec<_>, _>>()?;
    let session = state.session();
    let mut guard = session.write();
    guard.config_mut().set_active_periods(periods)?;
    Ok(Json(guard.config().clone()))
}

async fn update_period_time(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Json(payload): Json<TimePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let period = parse_period(&period)?;
    let session = state.session();
    let time = session
        .write()
        .config_mut()
        .set_period_time_str(period, &payload.start, &payload.end)?;
    Ok(Json(json!({
        "period": period,
        "start": time.start.format("%H:%M").to_string(),
        "end": time.end.format("%H:%M").to_string(),
        "label": time.label(),
    })))
}

async fn reset_cells(State(state): State<AppState>) -> Json<ScheduleConfig> {
    let session = state.session();
    let mut guard = session.write();
    guard.config_mut().initialize_empty_schedule();
    Json(guard.config().clone())
}

async fn get_day(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<Vec<DayCell>>, ApiError> {
    let day = parse_day(&day)?;
    let session = state.session();
    let guard = session.read();
    let config = guard.config();
    let cells = config
        .active_periods
        .iter()
        .map(|&period| DayCell {
            period,
            cell: config.cell(day, period),
        })
        .collect();
    Ok(Json(cells))
}

async fn set_cell(
    State(state): State<AppState>,
    Path((day, period)): Path<(String, String)>,
    Json(cell): Json<Cell>,
) -> Result<Json<Cell>, ApiError> {
    let day = parse_day(&day)?;
    let period = parse_period(&period)?;
    let session = state.session();
    session.write().config_mut().set_cell(day, period, cell.clone());
    Ok(Json(cell))
}

async fn clear_cell(
    State(state): State<AppState>,
    Path((day, period)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let day = parse_day(&day)?;
    let period = parse_period(&period)?;
    let session = state.session();
    session.write().config_mut().clear_cell(day, period);
    Ok(StatusCode::NO_CONTENT)
}

async fn load_example(State(state): State<AppState>) -> Json<Summary> {
    let session = state.session();
    let mut guard = session.write();
    guard.load_example();
    Json(guard.summary())
}

async fn save_config(State(state): State<AppState>) -> Result<Json<StoreStatus>, ApiError> {
    let session = state.session();
    let guard = session.read();
    guard.save()?;
    Ok(Json(guard.status()))
}

async fn reload_config(State(state): State<AppState>) -> Result<Json<ScheduleConfig>, ApiError> {
    let session = state.session();
    let mut guard = session.write();
    guard.reload()?;
    Ok(Json(guard.config().clone()))
}
