//! Loans, their lifecycle commands, and the arrears selection policies.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::handler::RequestHandler;
use crate::object::{dated_body, echoes_id, require_id, Fields, FromJson, Resource};
use crate::pagination::PaginatedList;
use crate::types::EnumOption;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoanStatus {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub value: Option<String>,
    pub pending_approval: Option<bool>,
    pub waiting_for_disbursal: Option<bool>,
    pub active: Option<bool>,
    pub closed_obligations_met: Option<bool>,
    pub closed_written_off: Option<bool>,
    pub closed_rescheduled: Option<bool>,
    pub closed: Option<bool>,
    pub overpaid: Option<bool>,
}

impl FromJson for LoanStatus {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            id: f.i64("id"),
            code: f.string("code"),
            value: f.string("value"),
            pending_approval: f.bool("pendingApproval"),
            waiting_for_disbursal: f.bool("waitingForDisbursal"),
            active: f.bool("active"),
            closed_obligations_met: f.bool("closedObligationsMet"),
            closed_written_off: f.bool("closedWrittenOff"),
            closed_rescheduled: f.bool("closedRescheduled"),
            closed: f.bool("closed"),
            overpaid: f.bool("overpaid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoanTimeline {
    pub submitted_on_date: Option<NaiveDate>,
    pub approved_on_date: Option<NaiveDate>,
    pub expected_disbursement_date: Option<NaiveDate>,
    pub actual_disbursement_date: Option<NaiveDate>,
    pub expected_maturity_date: Option<NaiveDate>,
    pub closed_on_date: Option<NaiveDate>,
}

impl FromJson for LoanTimeline {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            submitted_on_date: f.date("submittedOnDate"),
            approved_on_date: f.date("approvedOnDate"),
            expected_disbursement_date: f.date("expectedDisbursementDate"),
            actual_disbursement_date: f.date("actualDisbursementDate"),
            expected_maturity_date: f.date("expectedMaturityDate"),
            closed_on_date: f.date("closedOnDate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoanSummary {
    pub principal_disbursed: Option<f64>,
    pub principal_outstanding: Option<f64>,
    pub interest_outstanding: Option<f64>,
    pub total_outstanding: Option<f64>,
    pub total_overdue: Option<f64>,
}

impl FromJson for LoanSummary {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            principal_disbursed: f.f64("principalDisbursed"),
            principal_outstanding: f.f64("principalOutstanding"),
            interest_outstanding: f.f64("interestOutstanding"),
            total_outstanding: f.f64("totalOutstanding"),
            total_overdue: f.f64("totalOverdue"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loan {
    handler: Arc<RequestHandler>,
    pub id: Option<i64>,
    pub account_no: Option<String>,
    pub external_id: Option<String>,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub group_id: Option<i64>,
    pub loan_product_id: Option<i64>,
    pub loan_product_name: Option<String>,
    pub status: Option<LoanStatus>,
    pub loan_type: Option<EnumOption>,
    pub principal: Option<f64>,
    pub approved_principal: Option<f64>,
    pub number_of_repayments: Option<i32>,
    pub interest_rate_per_period: Option<f64>,
    pub timeline: Option<LoanTimeline>,
    pub summary: Option<LoanSummary>,
    pub in_arrears: Option<bool>,
}

impl Resource for Loan {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            id: f.i64("id"),
            account_no: f.string("accountNo"),
            external_id: f.string("externalId"),
            client_id: f.i64("clientId"),
            client_name: f.string("clientName"),
            group_id: f.i64("groupId"),
            loan_product_id: f.i64("loanProductId"),
            loan_product_name: f.string("loanProductName"),
            status: f.object("status"),
            loan_type: f.object("loanType"),
            principal: f.f64("principal"),
            approved_principal: f.f64("approvedPrincipal"),
            number_of_repayments: f.i32("numberOfRepayments"),
            interest_rate_per_period: f.f64("interestRatePerPeriod"),
            timeline: f.object("timeline"),
            summary: f.object("summary"),
            in_arrears: f.bool("inArrears"),
        }
    }
}

impl Loan {
    pub fn get(handler: &Arc<RequestHandler>, id: i64) -> Result<Self> {
        let data = handler.get(&format!("/loans/{id}"), &[])?;
        Ok(Self::from_response(handler, &data))
    }

    pub fn list(handler: &Arc<RequestHandler>) -> PaginatedList<Self> {
        PaginatedList::new(handler, "/loans", Vec::new())
    }

    pub fn is_active(&self) -> bool {
        self.status.as_ref().and_then(|s| s.active).unwrap_or(false)
    }

    pub fn is_closed(&self) -> bool {
        self.status.as_ref().and_then(|s| s.closed).unwrap_or(false)
    }

    pub fn is_in_arrears(&self) -> bool {
        self.in_arrears.unwrap_or(false)
    }

    fn expected_maturity_date(&self) -> Option<NaiveDate> {
        self.timeline.as_ref()?.expected_maturity_date
    }

    /// Past its expected maturity on `today` and not closed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_closed() && self.expected_maturity_date().is_some_and(|due| today > due)
    }

    /// Closed, but only after its expected maturity date.
    pub fn closed_late(&self) -> bool {
        let Some(timeline) = self.timeline.as_ref() else {
            return false;
        };
        match (timeline.closed_on_date, timeline.expected_maturity_date) {
            (Some(closed), Some(due)) => self.is_closed() && closed > due,
            _ => false,
        }
    }

    pub fn approve(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("approve", dated_body("approvedOnDate", date))
    }

    pub fn undo_approval(&self) -> Result<bool> {
        self.command("undoApproval", Map::new())
    }

    pub fn reject(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("reject", dated_body("rejectedOnDate", date))
    }

    pub fn withdraw(&self, date: Option<NaiveDate>) -> Result<bool> {
        self.command("withdrawnByApplicant", dated_body("withdrawnOnDate", date))
    }

    /// Disburse the loan; `amount` defaults server-side to the approved
    /// principal.
    pub fn disburse(&self, amount: Option<f64>, date: Option<NaiveDate>) -> Result<bool> {
        let mut body = dated_body("actualDisbursementDate", date);
        if let Some(amount) = amount {
            body.insert("transactionAmount".to_string(), Value::from(amount));
        }
        self.command("disburse", body)
    }

    pub fn undo_disbursal(&self) -> Result<bool> {
        self.command("undoDisbursal", Map::new())
    }

    pub fn make_repayment(&self, amount: f64, date: Option<NaiveDate>) -> Result<bool> {
        let id = require_id(self.id)?;
        let mut body = dated_body("transactionDate", date);
        body.insert("transactionAmount".to_string(), Value::from(amount));
        let response = self.handler.post(
            &format!("/loans/{id}/transactions?command=repayment"),
            &Value::Object(body),
        )?;
        Ok(echoes_id(&response, "loanId", id))
    }

    fn command(&self, command: &str, body: Map<String, Value>) -> Result<bool> {
        let id = require_id(self.id)?;
        let response = self
            .handler
            .post(&format!("/loans/{id}?command={command}"), &Value::Object(body))?;
        Ok(echoes_id(&response, "loanId", id))
    }
}

/// Which loans count as "in arrears".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrearsFilter {
    /// In arrears, overdue, or closed late, regardless of status.
    All,
    /// In arrears or overdue, and still active.
    ActiveOnly,
    /// Closed after the expected maturity date.
    ClosedLate,
}

impl ArrearsFilter {
    pub fn from_flags(active: bool, all_loans: bool) -> Self {
        match (all_loans, active) {
            (true, _) => ArrearsFilter::All,
            (false, true) => ArrearsFilter::ActiveOnly,
            (false, false) => ArrearsFilter::ClosedLate,
        }
    }

    pub fn matches(&self, loan: &Loan, today: NaiveDate) -> bool {
        let late = loan.is_in_arrears() || loan.is_overdue(today);
        match self {
            ArrearsFilter::All => late || loan.closed_late(),
            ArrearsFilter::ActiveOnly => late && loan.is_active(),
            ArrearsFilter::ClosedLate => loan.closed_late(),
        }
    }

    pub fn select(&self, loans: impl IntoIterator<Item = Loan>, today: NaiveDate) -> Vec<Loan> {
        loans
            .into_iter()
            .filter(|loan| self.matches(loan, today))
            .collect()
    }
}
