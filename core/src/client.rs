//! Clients: lookup, creation, lifecycle commands and loan queries.
//!
//! # Design
//! Lifecycle commands (`activate`, `close`, ...) post to
//! `/clients/{id}?command=...` and report whether the server echoed the same
//! `clientId`. They never touch `self`; re-fetch with `Client::get` to see
//! the new state.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::group::Group;
use crate::handler::RequestHandler;
use crate::loan::{ArrearsFilter, Loan};
use crate::object::{
    dated_body, echoes_id, format_date, require_id, today, Fields, FromJson, Resource,
    DATE_FORMAT, LOCALE,
};
use crate::pagination::PaginatedList;
use crate::types::EnumOption;

pub type ClientStatus = EnumOption;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientType {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub mandatory: Option<bool>,
}

impl FromJson for ClientType {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            id: f.i64("id"),
            name: f.string("name"),
            active: f.bool("active"),
            mandatory: f.bool("mandatory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientTimeline {
    pub submitted_on_date: Option<NaiveDate>,
    pub submitted_by: Option<String>,
    pub activated_on_date: Option<NaiveDate>,
    pub activated_by: Option<String>,
}

impl FromJson for ClientTimeline {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            submitted_on_date: f.date("submittedOnDate"),
            submitted_by: f.string("submittedByUsername"),
            activated_on_date: f.date("activatedOnDate"),
            activated_by: f.string("activatedByUsername"),
        }
    }
}

/// Payload for `POST /clients`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewClient<'a> {
    firstname: &'a str,
    lastname: &'a str,
    office_id: i64,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    activation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Client {
    handler: Arc<RequestHandler>,
    pub id: Option<i64>,
    pub account_no: Option<String>,
    pub external_id: Option<String>,
    pub status: Option<ClientStatus>,
    pub active: Option<bool>,
    pub activation_date: Option<NaiveDate>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub mobile_no: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub office_id: Option<i64>,
    pub office_name: Option<String>,
    pub savings_product_id: Option<i64>,
    pub client_type: Option<ClientType>,
    pub timeline: Option<ClientTimeline>,
    pub groups: Option<Vec<Group>>,
}

impl Resource for Client {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            id: f.i64("id"),
            account_no: f.string("accountNo"),
            external_id: f.string("externalId"),
            status: f.object("status"),
            active: f.bool("active"),
            activation_date: f.date("activationDate"),
            first_name: f.string("firstname"),
            middle_name: f.string("middlename"),
            last_name: f.string("lastname"),
            full_name: f.string("displayName"),
            mobile_no: f.string("mobileNo"),
            date_of_birth: f.date("dateOfBirth"),
            office_id: f.i64("officeId"),
            office_name: f.string("officeName"),
            savings_product_id: f.i64("savingsAccountId"),
            client_type: f.object("clientType"),
            timeline: f.object("timeline"),
            groups: f.list("groups"),
        }
    }
}

/// Quote `value` as an SQL string literal for a `sqlSearch` fragment.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Client {
    pub fn get(handler: &Arc<RequestHandler>, id: i64) -> Result<Self> {
        let data = handler.get(&format!("/clients/{id}"), &[])?;
        Ok(Self::from_response(handler, &data))
    }

    pub fn list(handler: &Arc<RequestHandler>) -> PaginatedList<Self> {
        PaginatedList::new(handler, "/clients", Vec::new())
    }

    /// First client whose mobile number matches `phone_no`, if any.
    pub fn get_client_by_phone_no(
        handler: &Arc<RequestHandler>,
        phone_no: &str,
    ) -> Result<Option<Self>> {
        let filter = format!("c.mobile_no={}", sql_literal(phone_no));
        let data = handler.get("/clients", &[("sqlSearch", filter)])?;
        let first = data
            .get("pageItems")
            .and_then(Value::as_array)
            .and_then(|items| items.first());
        Ok(first.map(|item| Self::from_response(handler, item)))
    }

    /// Create a client, then fetch it back in full.
    ///
    /// When `active` is set the activation date defaults to today.
    pub fn create(
        handler: &Arc<RequestHandler>,
        firstname: &str,
        lastname: &str,
        office_id: i64,
        active: bool,
        activation_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let payload = NewClient {
            firstname,
            lastname,
            office_id,
            active,
            activation_date: active
                .then(|| format_date(activation_date.unwrap_or_else(today))),
            date_format: active.then_some(DATE_FORMAT),
            locale: active.then_some(LOCALE),
        };
        let body =
            serde_json::to_value(&payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let response = handler.post("/clients", &body)?;
        let client_id = response
            .get("clientId")
            .and_then(Value::as_i64)
            .ok_or(ApiError::MissingField("clientId"))?;
        Self::get(handler, client_id)
    }

    pub fn activate(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("activate", dated_body("activationDate", date))
    }

    pub fn close(&self, closure_reason_id: i64, date: Option<NaiveDate>) -> Result<bool> {
        let mut body = dated_body("closureDate", date);
        body.insert("closureReasonId".to_string(), Value::from(closure_reason_id));
        self.command("close", body)
    }

    pub fn reject(&self, rejection_reason_id: i64, date: Option<NaiveDate>) -> Result<bool> {
        let mut body = dated_body("rejectionDate", date);
        body.insert("rejectionReasonId".to_string(), Value::from(rejection_reason_id));
        self.command("reject", body)
    }

    pub fn withdraw(&self, withdrawal_reason_id: i64, date: Option<NaiveDate>) -> Result<bool> {
        let mut body = dated_body("withdrawalDate", date);
        body.insert("withdrawalReasonId".to_string(), Value::from(withdrawal_reason_id));
        self.command("withdraw", body)
    }

    pub fn reactivate(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("reactivate", dated_body("reactivationDate", date))
    }

    pub fn undo_reject(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("UndoRejection", dated_body("reopenedDate", date))
    }

    pub fn undo_withdrawal(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("UndoWithdrawal", dated_body("reopenedDate", date))
    }

    fn command(&self, command: &str, body: Map<String, Value>) -> Result<bool> {
        let id = require_id(self.id)?;
        let response = self
            .handler
            .post(&format!("/clients/{id}?command={command}"), &Value::Object(body))?;
        Ok(echoes_id(&response, "clientId", id))
    }

    /// All loans of this client, fetched lazily.
    pub fn get_loans(&self) -> Result<PaginatedList<Loan>> {
        let id = require_id(self.id)?;
        Ok(PaginatedList::new(
            &self.handler,
            "/loans",
            vec![("sqlSearch".to_string(), format!("l.client_id={id}"))],
        ))
    }

    pub fn get_outstanding_loans(&self) -> Result<Vec<Loan>> {
        let loans = self.get_loans()?.collect_all()?;
        Ok(loans.into_iter().filter(Loan::is_active).collect())
    }

    /// Loans in arrears under the policy `active` and `all_loans` select
    /// (see `ArrearsFilter::from_flags`), judged against today's date.
    pub fn get_loans_in_arrears(&self, active: bool, all_loans: bool) -> Result<Vec<Loan>> {
        let loans = self.get_loans()?.collect_all()?;
        Ok(ArrearsFilter::from_flags(active, all_loans).select(loans, today()))
    }
}
