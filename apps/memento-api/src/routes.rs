use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use memento_service::{
	AddNoteRequest, AddNoteResponse, ChatRequest, ChatResponse, DeleteNoteRequest,
	DeleteNoteResponse, FlushReport, HideNoteRequest, HideNoteResponse, ListNotesRequest,
	ListNotesResponse, ListRemindersResponse, SearchRequest, SearchResponse, SetReminderRequest,
	SetReminderResponse, SubmitRequest, SubmitResponse, SyncReport, UpdateNoteRequest,
	UpdateNoteResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", get(list_notes))
		.route("/v1/notes/add", post(add_note))
		.route("/v1/notes/update", post(update_note))
		.route("/v1/notes/delete", post(delete_note))
		.route("/v1/notes/hide", post(hide_note))
		.route("/v1/submit", post(submit))
		.route("/v1/search", post(search))
		.route("/v1/chat", post(chat))
		.route("/v1/sync", post(sync))
		.route("/v1/outbox/flush", post(flush_outbox))
		.route("/v1/reminders", get(list_reminders))
		.route("/v1/reminders/set", post(set_reminder))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_notes(
	State(state): State<AppState>,
	Query(payload): Query<ListNotesRequest>,
) -> Result<Json<ListNotesResponse>, ApiError> {
	let response = state.service.list_notes(payload)?;

	Ok(Json(response))
}

async fn add_note(
	State(state): State<AppState>,
	Json(payload): Json<AddNoteRequest>,
) -> Result<Json<AddNoteResponse>, ApiError> {
	let response = state.service.add_note(payload)?;

	Ok(Json(response))
}

async fn update_note(
	State(state): State<AppState>,
	Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<UpdateNoteResponse>, ApiError> {
	let response = state.service.update_note(payload)?;

	Ok(Json(response))
}

async fn delete_note(
	State(state): State<AppState>,
	Json(payload): Json<DeleteNoteRequest>,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
	let response = state.service.delete_note(payload)?;

	Ok(Json(response))
}

async fn hide_note(
	State(state): State<AppState>,
	Json(payload): Json<HideNoteRequest>,
) -> Result<Json<HideNoteResponse>, ApiError> {
	let response = state.service.hide_note(payload)?;

	Ok(Json(response))
}

async fn submit(
	State(state): State<AppState>,
	Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
	let response = state.service.submit(payload).await?;

	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

async fn sync(State(state): State<AppState>) -> Result<Json<SyncReport>, ApiError> {
	let response = state.service.sync().await?;

	Ok(Json(response))
}

async fn flush_outbox(State(state): State<AppState>) -> Result<Json<FlushReport>, ApiError> {
	let response = state.service.flush_outbox().await?;

	Ok(Json(response))
}

async fn list_reminders(
	State(state): State<AppState>,
) -> Result<Json<ListRemindersResponse>, ApiError> {
	let response = state.service.list_reminders()?;

	Ok(Json(response))
}

async fn set_reminder(
	State(state): State<AppState>,
	Json(payload): Json<SetReminderRequest>,
) -> Result<Json<SetReminderResponse>, ApiError> {
	let response = state.service.set_reminder(payload)?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<memento_service::Error> for ApiError {
	fn from(err: memento_service::Error) -> Self {
		use memento_service::Error;

		match err {
			Error::AuthMissing =>
				Self::new(StatusCode::UNAUTHORIZED, "AUTH_MISSING", err.to_string()),
			Error::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			Error::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message),
			Error::Remote { message } => Self::new(StatusCode::BAD_GATEWAY, "REMOTE_ERROR", message),
			Error::Storage { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
