//! In-memory stand-in for the subset of the Fineract REST API the client
//! binding speaks.
//!
//! State lives in one `MockState` behind a `RwLock`. Lifecycle commands
//! follow Fineract's status rules closely enough that an out-of-order command
//! is refused with 403, as the real server does.

pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub use state::{
    ClientRecord, EnumRecord, GroupRecord, HookRecord, LoanRecord, LoanStatusRecord, MockState,
    CLIENT_LISTING, HEAD_OFFICE, HEAD_OFFICE_ID,
};

/// The date pattern every dated request body must declare.
pub const DATE_FORMAT: &str = "dd MMMM yyyy";

pub type Db = Arc<RwLock<MockState>>;

type ApiResult<T> = Result<T, StatusCode>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "sqlSearch")]
    pub sql_search: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CommandParams {
    pub command: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DataTableParams {
    pub apptable: Option<String>,
}

pub fn app() -> Router {
    app_with(MockState::default())
}

pub fn app_with(state: MockState) -> Router {
    let db: Db = Arc::new(RwLock::new(state));
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/template", get(client_template))
        .route("/clients/{id}", get(get_client).post(client_command))
        .route("/clients/{id}/documents", get(list_documents))
        .route(
            "/clients/{id}/documents/{document_id}",
            get(get_document).delete(delete_document),
        )
        .route("/loans", get(list_loans))
        .route("/loans/template", get(loan_template))
        .route("/loans/{id}", get(get_loan).post(loan_command))
        .route("/loans/{id}/transactions", post(loan_transaction))
        .route("/loans/{id}/documents", get(list_documents))
        .route(
            "/loans/{id}/documents/{document_id}",
            get(get_document).delete(delete_document),
        )
        .route("/groups", get(list_groups))
        .route("/groups/{id}", get(get_group))
        .route("/hooks", get(list_hooks).post(create_hook))
        .route("/hooks/{id}", get(get_hook).put(update_hook).delete(delete_hook))
        .route("/datatables", get(list_datatables))
        .route("/datatables/{name}", get(get_datatable))
        .route(
            "/datatables/{name}/{apptable_id}",
            get(get_entries)
                .post(add_entry)
                .put(update_entry)
                .delete(delete_entries),
        )
        .route("/reports", get(list_reports))
        .route("/reports/{id}", get(get_report))
        .route("/runreports/{name}", get(run_report))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockState::default()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn page<T: Serialize>(items: Vec<T>, params: &ListParams) -> Json<Value> {
    let total = items.len();
    let items: Vec<T> = items
        .into_iter()
        .skip(params.offset.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .collect();
    Json(json!({ "totalFilteredRecords": total, "pageItems": items }))
}

/// Value compared against `column` in a `column=value` search fragment.
/// Quoted values are unescaped (`''` becomes `'`).
fn search_value(search: &str, column: &str) -> Option<String> {
    let value = search.strip_prefix(column)?.strip_prefix('=')?.trim();
    match value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        Some(quoted) => Some(quoted.replace("''", "'")),
        None => Some(value.to_string()),
    }
}

fn str_field<'a>(body: &'a Value, field: &str) -> ApiResult<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or(StatusCode::BAD_REQUEST)
}

fn i64_field(body: &Value, field: &str) -> ApiResult<i64> {
    body.get(field)
        .and_then(Value::as_i64)
        .ok_or(StatusCode::BAD_REQUEST)
}

/// A dated field, which must come with `dateFormat` and `locale`.
fn body_date(body: &Value, field: &str) -> ApiResult<Option<NaiveDate>> {
    let Some(raw) = body.get(field) else {
        return Ok(None);
    };
    let text = raw.as_str().ok_or(StatusCode::BAD_REQUEST)?;
    if body.get("dateFormat").and_then(Value::as_str) != Some(DATE_FORMAT)
        || body.get("locale").and_then(Value::as_str).is_none()
    {
        return Err(StatusCode::BAD_REQUEST);
    }
    NaiveDate::parse_from_str(text, "%d %B %Y")
        .map(Some)
        .map_err(|_| StatusCode::BAD_REQUEST)
}

fn required_date(body: &Value, field: &str) -> ApiResult<NaiveDate> {
    body_date(body, field)?.ok_or(StatusCode::BAD_REQUEST)
}

fn require(condition: bool) -> ApiResult<()> {
    if condition {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

// --- clients ---

async fn list_clients(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let state = db.read().await;
    let mobile = match params.sql_search.as_deref() {
        None => None,
        Some(search) => Some(search_value(search, "c.mobile_no").ok_or(StatusCode::BAD_REQUEST)?),
    };
    let clients: Vec<ClientRecord> = state
        .clients
        .values()
        .filter(|c| mobile.is_none() || c.mobile_no == mobile)
        .cloned()
        .collect();
    Ok(page(clients, &params))
}

async fn create_client(State(db): State<Db>, Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    let firstname = str_field(&body, "firstname")?;
    let lastname = str_field(&body, "lastname")?;
    let office_id = i64_field(&body, "officeId")?;
    let active = body.get("active").and_then(Value::as_bool).unwrap_or(false);
    let activation_date = if active {
        Some(required_date(&body, "activationDate")?)
    } else {
        None
    };

    let mut state = db.write().await;
    let mobile_no = body.get("mobileNo").and_then(Value::as_str);
    let id = state.add_client(firstname, lastname, mobile_no);
    if let Some(client) = state.clients.get_mut(&id) {
        client.office_id = office_id;
        if office_id != HEAD_OFFICE_ID {
            client.office_name = format!("Office {office_id}");
        }
        client.timeline.submitted_on_date = Some(today());
        if let Some(date) = activation_date {
            activate_client(client, date);
        }
    }
    info!(client_id = id, "created client");
    Ok(Json(json!({ "officeId": office_id, "clientId": id, "resourceId": id })))
}

async fn get_client(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<ClientRecord>> {
    let state = db.read().await;
    state.clients.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

fn activate_client(client: &mut ClientRecord, date: NaiveDate) {
    client.status = EnumRecord::client_active();
    client.active = true;
    client.activation_date = Some(date);
    client.timeline.activated_on_date = Some(date);
    client.timeline.activated_by_username = Some("mifos".to_string());
}

async fn client_command(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(params): Query<CommandParams>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut state = db.write().await;
    let client = state.clients.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let status = client.status.id;
    match params.command.as_deref() {
        Some("activate") => {
            let date = required_date(&body, "activationDate")?;
            require(status == EnumRecord::client_pending().id)?;
            activate_client(client, date);
        }
        Some("close") => {
            required_date(&body, "closureDate")?;
            i64_field(&body, "closureReasonId")?;
            require(status == EnumRecord::client_active().id)?;
            client.status = EnumRecord::client_closed();
            client.active = false;
        }
        Some("reject") => {
            required_date(&body, "rejectionDate")?;
            i64_field(&body, "rejectionReasonId")?;
            require(status == EnumRecord::client_pending().id)?;
            client.status = EnumRecord::client_rejected();
        }
        Some("withdraw") => {
            required_date(&body, "withdrawalDate")?;
            i64_field(&body, "withdrawalReasonId")?;
            require(status == EnumRecord::client_pending().id)?;
            client.status = EnumRecord::client_withdrawn();
        }
        Some("reactivate") => {
            let date = required_date(&body, "reactivationDate")?;
            require(status == EnumRecord::client_closed().id)?;
            activate_client(client, date);
        }
        Some("UndoRejection") => {
            required_date(&body, "reopenedDate")?;
            require(status == EnumRecord::client_rejected().id)?;
            client.status = EnumRecord::client_pending();
        }
        Some("UndoWithdrawal") => {
            required_date(&body, "reopenedDate")?;
            require(status == EnumRecord::client_withdrawn().id)?;
            client.status = EnumRecord::client_pending();
        }
        _ => return Err(StatusCode::BAD_REQUEST),
    }
    let office_id = client.office_id;
    info!(client_id = id, command = ?params.command, "client command applied");
    Ok(Json(json!({ "officeId": office_id, "clientId": id, "resourceId": id })))
}

async fn client_template() -> Json<Value> {
    Json(json!({
        "officeId": HEAD_OFFICE_ID,
        "officeOptions": [{ "id": HEAD_OFFICE_ID, "name": HEAD_OFFICE }],
        "activationDate": date_triple(today()),
    }))
}

fn date_triple(date: NaiveDate) -> Value {
    use chrono::Datelike;
    json!([date.year(), date.month(), date.day()])
}

// --- loans ---

async fn list_loans(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let state = db.read().await;
    let client_id = match params.sql_search.as_deref() {
        None => None,
        Some(search) => Some(
            search_value(search, "l.client_id")
                .and_then(|id| id.parse::<i64>().ok())
                .ok_or(StatusCode::BAD_REQUEST)?,
        ),
    };
    let loans: Vec<LoanRecord> = state
        .loans
        .values()
        .filter(|l| client_id.map_or(true, |id| l.client_id == id))
        .cloned()
        .collect();
    Ok(page(loans, &params))
}

async fn get_loan(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<LoanRecord>> {
    let state = db.read().await;
    state.loans.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn loan_command(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(params): Query<CommandParams>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut state = db.write().await;
    let loan = state.loans.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    match params.command.as_deref() {
        Some("approve") => {
            let date = required_date(&body, "approvedOnDate")?;
            require(loan.status.pending_approval)?;
            loan.status = LoanStatusRecord::approved();
            loan.timeline.approved_on_date = Some(date);
        }
        Some("undoApproval") => {
            require(loan.status.waiting_for_disbursal)?;
            loan.status = LoanStatusRecord::submitted();
            loan.timeline.approved_on_date = None;
        }
        Some("reject") => {
            let date = required_date(&body, "rejectedOnDate")?;
            require(loan.status.pending_approval)?;
            loan.status = LoanStatusRecord::rejected();
            loan.timeline.closed_on_date = Some(date);
        }
        Some("withdrawnByApplicant") => {
            let date = required_date(&body, "withdrawnOnDate")?;
            require(loan.status.pending_approval)?;
            loan.status = LoanStatusRecord::withdrawn();
            loan.timeline.closed_on_date = Some(date);
        }
        Some("disburse") => {
            let date = required_date(&body, "actualDisbursementDate")?;
            require(loan.status.waiting_for_disbursal)?;
            let amount = body
                .get("transactionAmount")
                .and_then(Value::as_f64)
                .unwrap_or(loan.principal);
            loan.status = LoanStatusRecord::active();
            loan.timeline.actual_disbursement_date = Some(date);
            loan.summary.principal_disbursed = amount;
            loan.summary.total_outstanding = amount;
        }
        Some("undoDisbursal") => {
            require(loan.status.active)?;
            loan.status = LoanStatusRecord::approved();
            loan.timeline.actual_disbursement_date = None;
            loan.summary = Default::default();
        }
        _ => return Err(StatusCode::BAD_REQUEST),
    }
    let client_id = loan.client_id;
    info!(loan_id = id, command = ?params.command, "loan command applied");
    Ok(Json(json!({
        "officeId": HEAD_OFFICE_ID,
        "clientId": client_id,
        "loanId": id,
        "resourceId": id,
    })))
}

async fn loan_transaction(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(params): Query<CommandParams>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    if params.command.as_deref() != Some("repayment") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let date = required_date(&body, "transactionDate")?;
    let amount = body
        .get("transactionAmount")
        .and_then(Value::as_f64)
        .filter(|amount| *amount > 0.0)
        .ok_or(StatusCode::BAD_REQUEST)?;

    let mut state = db.write().await;
    let transaction_id = state.allocate_id();
    let loan = state.loans.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    require(loan.status.active)?;
    loan.summary.total_outstanding -= amount;
    if loan.summary.total_outstanding <= 0.0 {
        loan.summary.total_outstanding = 0.0;
        loan.status = LoanStatusRecord::closed_obligations_met();
        loan.timeline.closed_on_date = Some(date);
        loan.in_arrears = false;
    }
    Ok(Json(json!({
        "officeId": HEAD_OFFICE_ID,
        "clientId": loan.client_id,
        "loanId": id,
        "resourceId": transaction_id,
    })))
}

async fn loan_template(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let state = db.read().await;
    let client_id = params
        .get("clientId")
        .and_then(|id| id.parse::<i64>().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let client = state.clients.get(&client_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "clientId": client_id,
        "clientName": client.display_name,
        "productOptions": [{ "id": 1, "name": "Micro loan" }],
    })))
}

// --- groups ---

async fn list_groups(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Value> {
    let state = db.read().await;
    page(state.groups.values().cloned().collect(), &params)
}

async fn get_group(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<GroupRecord>> {
    let state = db.read().await;
    state.groups.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

// --- documents ---

/// `clients` or `loans`, read from the route that matched.
fn parent_entity(matched: &MatchedPath) -> String {
    matched
        .as_str()
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

async fn list_documents(
    State(db): State<Db>,
    matched: MatchedPath,
    Path(id): Path<i64>,
) -> Json<Value> {
    let entity = parent_entity(&matched);
    let state = db.read().await;
    let documents: Vec<_> = state
        .documents
        .values()
        .filter(|d| d.parent_entity_type == entity && d.parent_entity_id == id)
        .cloned()
        .collect();
    Json(json!(documents))
}

async fn get_document(
    State(db): State<Db>,
    matched: MatchedPath,
    Path((id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let entity = parent_entity(&matched);
    let state = db.read().await;
    state
        .documents
        .get(&document_id)
        .filter(|d| d.parent_entity_type == entity && d.parent_entity_id == id)
        .map(|d| Json(json!(d)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_document(
    State(db): State<Db>,
    matched: MatchedPath,
    Path((id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let entity = parent_entity(&matched);
    let mut state = db.write().await;
    let owned = state
        .documents
        .get(&document_id)
        .is_some_and(|d| d.parent_entity_type == entity && d.parent_entity_id == id);
    if !owned {
        return Err(StatusCode::NOT_FOUND);
    }
    state.documents.remove(&document_id);
    Ok(Json(json!({ "resourceId": document_id })))
}

// --- hooks ---

async fn list_hooks(State(db): State<Db>) -> Json<Vec<HookRecord>> {
    let state = db.read().await;
    Json(state.hooks.values().cloned().collect())
}

async fn create_hook(State(db): State<Db>, Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    let name = str_field(&body, "name")?.to_string();
    let display_name = str_field(&body, "displayName")?.to_string();
    let is_active = body.get("isActive").and_then(Value::as_bool).unwrap_or(false);
    let config = body
        .get("config")
        .and_then(Value::as_object)
        .ok_or(StatusCode::BAD_REQUEST)?
        .iter()
        .map(|(key, value)| state::HookConfigRecord {
            field_name: key.clone(),
            field_value: value.as_str().unwrap_or_default().to_string(),
        })
        .collect();
    let events = body
        .get("events")
        .and_then(Value::as_array)
        .map(|events| {
            events
                .iter()
                .map(|event| state::HookEventRecord {
                    entity_name: event["entityName"].as_str().unwrap_or_default().to_string(),
                    action_name: event["actionName"].as_str().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut state = db.write().await;
    let id = state.allocate_id();
    state.hooks.insert(
        id,
        HookRecord {
            id,
            template_id: 1,
            template_name: name.clone(),
            name,
            display_name,
            is_active,
            config,
            events,
        },
    );
    info!(hook_id = id, "created hook");
    Ok(Json(json!({ "resourceId": id })))
}

async fn get_hook(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<HookRecord>> {
    let state = db.read().await;
    state.hooks.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_hook(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut state = db.write().await;
    let hook = state.hooks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(active) = body.get("isActive").and_then(Value::as_bool) {
        hook.is_active = active;
    }
    if let Some(display_name) = body.get("displayName").and_then(Value::as_str) {
        hook.display_name = display_name.to_string();
    }
    Ok(Json(json!({ "resourceId": id })))
}

async fn delete_hook(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut state = db.write().await;
    state
        .hooks
        .remove(&id)
        .map(|_| Json(json!({ "resourceId": id })))
        .ok_or(StatusCode::NOT_FOUND)
}

// --- data tables ---

async fn list_datatables(
    State(db): State<Db>,
    Query(params): Query<DataTableParams>,
) -> Json<Value> {
    let state = db.read().await;
    let tables: Vec<_> = state
        .datatables
        .values()
        .filter(|t| {
            params
                .apptable
                .as_deref()
                .map_or(true, |apptable| t.application_table_name == apptable)
        })
        .cloned()
        .collect();
    Json(json!(tables))
}

async fn get_datatable(State(db): State<Db>, Path(name): Path<String>) -> ApiResult<Json<Value>> {
    let state = db.read().await;
    state
        .datatables
        .get(&name)
        .map(|t| Json(json!(t)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_entries(
    State(db): State<Db>,
    Path((name, apptable_id)): Path<(String, i64)>,
) -> ApiResult<Json<Vec<Map<String, Value>>>> {
    let state = db.read().await;
    let table = state.datatables.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(table.rows.get(&apptable_id).cloned().into_iter().collect()))
}

async fn add_entry(
    State(db): State<Db>,
    Path((name, apptable_id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut row = body.as_object().cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let mut state = db.write().await;
    let table = state.datatables.get_mut(&name).ok_or(StatusCode::NOT_FOUND)?;
    require(!table.rows.contains_key(&apptable_id))?;
    row.insert("client_id".to_string(), json!(apptable_id));
    table.rows.insert(apptable_id, row);
    Ok(Json(json!({ "clientId": apptable_id, "resourceId": apptable_id })))
}

async fn update_entry(
    State(db): State<Db>,
    Path((name, apptable_id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let changes = body.as_object().cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let mut state = db.write().await;
    let table = state.datatables.get_mut(&name).ok_or(StatusCode::NOT_FOUND)?;
    let row = table.rows.get_mut(&apptable_id).ok_or(StatusCode::NOT_FOUND)?;
    row.extend(changes);
    Ok(Json(json!({ "clientId": apptable_id, "resourceId": apptable_id })))
}

async fn delete_entries(
    State(db): State<Db>,
    Path((name, apptable_id)): Path<(String, i64)>,
) -> ApiResult<Json<Value>> {
    let mut state = db.write().await;
    let table = state.datatables.get_mut(&name).ok_or(StatusCode::NOT_FOUND)?;
    table.rows.remove(&apptable_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "clientId": apptable_id, "resourceId": apptable_id })))
}

// --- reports ---

async fn list_reports(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(json!(state.reports.values().collect::<Vec<_>>()))
}

async fn get_report(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let state = db.read().await;
    state
        .reports
        .get(&id)
        .map(|r| Json(json!(r)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn run_report(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Value>>> {
    if name != CLIENT_LISTING {
        return Err(StatusCode::NOT_FOUND);
    }
    let office = match params.get("R_officeId") {
        Some(id) => Some(id.parse::<i64>().map_err(|_| StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let state = db.read().await;
    let rows = state
        .clients
        .values()
        .filter(|c| office.map_or(true, |office| c.office_id == office))
        .map(|c| {
            json!({
                "Office": c.office_name,
                "Client Id": c.id,
                "Client": c.display_name,
                "Status": c.status.value,
            })
        })
        .collect();
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_value_unquotes_and_unescapes() {
        assert_eq!(search_value("c.mobile_no='0712'", "c.mobile_no").as_deref(), Some("0712"));
        assert_eq!(search_value("c.mobile_no='a''b'", "c.mobile_no").as_deref(), Some("a'b"));
        assert_eq!(search_value("l.client_id=7", "l.client_id").as_deref(), Some("7"));
        assert_eq!(search_value("l.client_id=7", "c.mobile_no"), None);
    }

    #[test]
    fn body_date_requires_format_and_locale() {
        let good = json!({"d": "05 March 2024", "dateFormat": DATE_FORMAT, "locale": "en"});
        assert_eq!(body_date(&good, "d").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(body_date(&good, "missing").unwrap(), None);

        let no_locale = json!({"d": "05 March 2024", "dateFormat": DATE_FORMAT});
        assert_eq!(body_date(&no_locale, "d"), Err(StatusCode::BAD_REQUEST));

        let bad = json!({"d": "2024-03-05", "dateFormat": DATE_FORMAT, "locale": "en"});
        assert_eq!(body_date(&bad, "d"), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn page_slices_and_reports_total() {
        let params = ListParams {
            offset: Some(1),
            limit: Some(2),
            ..ListParams::default()
        };
        let Json(value) = page(vec![1, 2, 3, 4], &params);
        assert_eq!(value["totalFilteredRecords"], 4);
        assert_eq!(value["pageItems"], json!([2, 3]));
    }
}
