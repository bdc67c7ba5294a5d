use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::document::{parse_bill_date, BillRenderer};
use super::domain::{BillCategory, BillItem, BillItemId, Employee, NightRate, Taka};
use super::form::{EntryForm, RankChoice};
use super::reconciler::EntryOutcome;
use super::session::{BillingSession, SnapshotStatus};
use super::store::DirectoryStore;
use crate::error::AppError;

pub type SharedSession<S> = Arc<Mutex<BillingSession<S>>>;

const EXPORT_FILE_NAME: &str = "database_backup.csv";

pub struct BillingState<S> {
    session: SharedSession<S>,
    renderer: Arc<dyn BillRenderer>,
}

impl<S> Clone for BillingState<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

/// Router exposing the billing session over JSON.
pub fn billing_router<S>(session: SharedSession<S>, renderer: Arc<dyn BillRenderer>) -> Router
where
    S: DirectoryStore + 'static,
{
    Router::new()
        .route("/api/v1/bill", get(bill_handler::<S>))
        .route("/api/v1/bill/category", put(category_handler::<S>))
        .route("/api/v1/bill/night-rate", put(night_rate_handler::<S>))
        .route(
            "/api/v1/bill/form",
            get(form_handler::<S>).patch(edit_form_handler::<S>),
        )
        .route(
            "/api/v1/bill/form/suggestion",
            post(select_suggestion_handler::<S>),
        )
        .route(
            "/api/v1/bill/entries",
            post(add_entry_handler::<S>).delete(clear_bill_handler::<S>),
        )
        .route(
            "/api/v1/bill/entries/:item_id",
            delete(remove_entry_handler::<S>).patch(edit_entry_handler::<S>),
        )
        .route("/api/v1/bill/document", post(document_handler::<S>))
        .route(
            "/api/v1/directory",
            get(directory_status_handler::<S>).delete(clear_directory_handler::<S>),
        )
        .route(
            "/api/v1/directory/suggestions",
            get(suggestions_handler::<S>),
        )
        .route("/api/v1/directory/export", get(export_handler::<S>))
        .route("/api/v1/directory/import", post(import_handler::<S>))
        .route("/api/v1/settings/unlock", post(unlock_handler::<S>))
        .with_state(BillingState { session, renderer })
}

/// Snapshot of the bill as the form would display it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillView {
    pub category: BillCategory,
    pub category_label: &'static str,
    pub night_rate: Taka,
    pub night_rate_selectable: bool,
    pub current_taka: Taka,
    pub form: EntryForm,
    pub items: Vec<BillLineView>,
    pub count: usize,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineView {
    pub serial: String,
    #[serde(flatten)]
    pub item: BillItem,
}

impl BillView {
    fn from_session<S: DirectoryStore + 'static>(session: &BillingSession<S>) -> Self {
        let settings = session.settings();
        let bill = session.bill();
        Self {
            category: settings.category,
            category_label: settings.category.label(),
            night_rate: settings.night_rate.amount(),
            night_rate_selectable: session.night_rate_selectable(),
            current_taka: session.current_taka(),
            form: session.form().clone(),
            items: bill
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| BillLineView {
                    serial: format!("{:02}", index + 1),
                    item: item.clone(),
                })
                .collect(),
            count: bill.len(),
            total: bill.total(),
        }
    }
}

/// Staged entry form with what it would add right now.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub form: EntryForm,
    pub effective_rank: String,
    pub current_taka: Taka,
    pub night_rate_selectable: bool,
    pub suggestions: Vec<Employee>,
}

impl FormView {
    fn from_session<S: DirectoryStore + 'static>(
        session: &BillingSession<S>,
        suggestions: Vec<Employee>,
    ) -> Self {
        Self {
            form: session.form().clone(),
            effective_rank: session.form().effective_rank(),
            current_taka: session.current_taka(),
            night_rate_selectable: session.night_rate_selectable(),
            suggestions,
        }
    }
}

/// Field edits applied to the staged form, in field order. A card number that
/// matches a directory record fills name and rank.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormEditRequest {
    pub name: Option<String>,
    pub card_no: Option<String>,
    pub rank: Option<RankChoice>,
    pub custom_rank: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionSelection {
    pub card_no: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct NightRateRequest {
    pub rate: Taka,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub added: Option<EntryOutcome>,
    pub bill: BillView,
}

/// Amount field as typed: a number, or raw text where blank means zero.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(Taka),
    Text(String),
}

impl AmountInput {
    fn raw(&self) -> String {
        match self {
            AmountInput::Number(value) => value.to_string(),
            AmountInput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryEditRequest {
    #[serde(default)]
    pub card_no: Option<String>,
    #[serde(default)]
    pub taka: Option<AmountInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectoryStatusView {
    pub status: SnapshotStatus,
    pub records: usize,
    pub unlocked: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearDirectoryRequest {
    #[serde(default)]
    pub confirm: bool,
}

fn lock<S>(session: &SharedSession<S>) -> Result<MutexGuard<'_, BillingSession<S>>, AppError> {
    session.lock().map_err(|_| AppError::SessionUnavailable)
}

async fn bill_handler<S>(State(state): State<BillingState<S>>) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let session = lock(&state.session)?;
    Ok(Json(BillView::from_session(&*session)))
}

async fn category_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let category = BillCategory::from_label(&request.category).ok_or_else(|| {
        AppError::InvalidInput(format!("unknown bill category '{}'", request.category))
    })?;
    let mut session = lock(&state.session)?;
    session.set_category(category);
    Ok(Json(BillView::from_session(&*session)))
}

async fn night_rate_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<NightRateRequest>,
) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let night_rate = NightRate::from_amount(request.rate).ok_or_else(|| {
        AppError::InvalidInput(format!("night rate must be 350 or 250, got {}", request.rate))
    })?;
    let mut session = lock(&state.session)?;
    session.set_night_rate(night_rate)?;
    Ok(Json(BillView::from_session(&*session)))
}

/// A JSON form body is submitted in one step; an empty body adds the staged form.
async fn add_entry_handler<S>(
    State(state): State<BillingState<S>>,
    body: Bytes,
) -> Result<Response, AppError>
where
    S: DirectoryStore + 'static,
{
    let form = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let form: EntryForm = serde_json::from_slice(&body)
            .map_err(|err| AppError::InvalidInput(format!("invalid entry form: {err}")))?;
        Some(form)
    };

    let mut session = lock(&state.session)?;
    let added = match form {
        Some(form) => session.submit(form),
        None => session.add_entry(),
    };
    let status = if added.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let body = EntryResponse {
        added,
        bill: BillView::from_session(&*session),
    };
    Ok((status, Json(body)).into_response())
}

async fn form_handler<S>(State(state): State<BillingState<S>>) -> Result<Json<FormView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let session = lock(&state.session)?;
    Ok(Json(FormView::from_session(&*session, Vec::new())))
}

async fn edit_form_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<FormEditRequest>,
) -> Result<Json<FormView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let mut session = lock(&state.session)?;
    let mut suggestions = Vec::new();
    if let Some(name) = &request.name {
        suggestions = session.type_name(name);
    }
    if let Some(card_no) = &request.card_no {
        suggestions = session.type_card_no(card_no);
    }
    if request.rank.is_some() || request.custom_rank.is_some() {
        let rank = request.rank.unwrap_or(session.form().rank);
        let custom_rank = request
            .custom_rank
            .clone()
            .unwrap_or_else(|| session.form().custom_rank.clone());
        session.set_rank(rank, &custom_rank);
    }
    if let Some(remarks) = &request.remarks {
        session.set_remarks(remarks);
    }
    Ok(Json(FormView::from_session(&*session, suggestions)))
}

async fn select_suggestion_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<SuggestionSelection>,
) -> Result<Json<FormView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let mut session = lock(&state.session)?;
    session.select_suggestion(&request.card_no)?;
    Ok(Json(FormView::from_session(&*session, Vec::new())))
}

async fn clear_bill_handler<S>(
    State(state): State<BillingState<S>>,
) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let mut session = lock(&state.session)?;
    session.clear_bill();
    Ok(Json(BillView::from_session(&*session)))
}

async fn edit_entry_handler<S>(
    State(state): State<BillingState<S>>,
    Path(item_id): Path<String>,
    Json(request): Json<EntryEditRequest>,
) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    if request.card_no.is_none() && request.taka.is_none() {
        return Err(AppError::InvalidInput(
            "expected cardNo and/or taka".to_string(),
        ));
    }

    let id = BillItemId(item_id);
    let mut session = lock(&state.session)?;
    // amount first: a rejected amount must not leave the card number edited
    if let Some(taka) = &request.taka {
        session.update_amount(&id, &taka.raw())?;
    }
    if let Some(card_no) = &request.card_no {
        session.update_card_no(&id, card_no)?;
    }
    Ok(Json(BillView::from_session(&*session)))
}

async fn remove_entry_handler<S>(
    State(state): State<BillingState<S>>,
    Path(item_id): Path<String>,
) -> Result<Json<BillView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let mut session = lock(&state.session)?;
    session.remove_item(&BillItemId(item_id))?;
    Ok(Json(BillView::from_session(&*session)))
}

async fn document_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<DocumentRequest>,
) -> Result<Response, AppError>
where
    S: DirectoryStore + 'static,
{
    let date = match request.date.as_deref() {
        Some(raw) => parse_bill_date(raw).map_err(AppError::InvalidInput)?,
        None => Local::now().date_naive(),
    };

    let document = lock(&state.session)?.document(date)?;
    let bytes = state
        .renderer
        .render(&document)
        .map_err(|err| AppError::Billing(err.into()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.file_name(state.renderer.extension())
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn directory_status_handler<S>(
    State(state): State<BillingState<S>>,
) -> Result<Json<DirectoryStatusView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let session = lock(&state.session)?;
    Ok(Json(DirectoryStatusView {
        status: session.snapshot_status(),
        records: session.directory().len(),
        unlocked: session.is_unlocked(),
    }))
}

async fn suggestions_handler<S>(
    State(state): State<BillingState<S>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<Employee>>, AppError>
where
    S: DirectoryStore + 'static,
{
    let session = lock(&state.session)?;
    Ok(Json(session.suggestions(&query.q)))
}

async fn unlock_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<UnlockRequest>,
) -> Result<Response, AppError>
where
    S: DirectoryStore + 'static,
{
    let unlocked = lock(&state.session)?.unlock(&request.key);
    let status = if unlocked {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    Ok((status, Json(serde_json::json!({ "unlocked": unlocked }))).into_response())
}

async fn export_handler<S>(State(state): State<BillingState<S>>) -> Result<Response, AppError>
where
    S: DirectoryStore + 'static,
{
    let csv = lock(&state.session)?.export_directory()?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

async fn import_handler<S>(
    State(state): State<BillingState<S>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError>
where
    S: DirectoryStore + 'static,
{
    let total = lock(&state.session)?.import_directory(&body)?;
    Ok(Json(serde_json::json!({ "total": total })))
}

async fn clear_directory_handler<S>(
    State(state): State<BillingState<S>>,
    Json(request): Json<ClearDirectoryRequest>,
) -> Result<Json<DirectoryStatusView>, AppError>
where
    S: DirectoryStore + 'static,
{
    let mut session = lock(&state.session)?;
    session.clear_directory(request.confirm)?;
    Ok(Json(DirectoryStatusView {
        status: session.snapshot_status(),
        records: session.directory().len(),
        unlocked: session.is_unlocked(),
    }))
}
