//! In-memory records shaped like Fineract's JSON resources.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const HEAD_OFFICE_ID: i64 = 1;
pub const HEAD_OFFICE: &str = "Head Office";

/// Fineract renders dates as `[year, month, day]`.
fn fineract_date<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    use chrono::Datelike;
    match date {
        Some(d) => [d.year(), d.month() as i32, d.day() as i32].serialize(serializer),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct EnumRecord {
    pub id: i64,
    pub code: String,
    pub value: String,
}

impl EnumRecord {
    fn new(id: i64, code: &str, value: &str) -> Self {
        Self {
            id,
            code: code.to_string(),
            value: value.to_string(),
        }
    }

    pub fn client_pending() -> Self {
        Self::new(100, "clientStatusType.pending", "Pending")
    }

    pub fn client_active() -> Self {
        Self::new(300, "clientStatusType.active", "Active")
    }

    pub fn client_closed() -> Self {
        Self::new(600, "clientStatusType.closed", "Closed")
    }

    pub fn client_rejected() -> Self {
        Self::new(700, "clientStatusType.rejected", "Rejected")
    }

    pub fn client_withdrawn() -> Self {
        Self::new(800, "clientStatusType.withdraw", "Withdrawn")
    }

    pub fn group_active() -> Self {
        Self::new(300, "groupingStatusType.active", "Active")
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTimelineRecord {
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub submitted_on_date: Option<NaiveDate>,
    pub submitted_by_username: String,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub activated_on_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_by_username: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: i64,
    pub account_no: String,
    pub name: String,
    pub status: EnumRecord,
    pub active: bool,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<NaiveDate>,
    pub office_id: i64,
    pub office_name: String,
    pub hierarchy: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: i64,
    pub account_no: String,
    pub status: EnumRecord,
    pub active: bool,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<NaiveDate>,
    pub firstname: String,
    pub lastname: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    pub office_id: i64,
    pub office_name: String,
    pub timeline: ClientTimelineRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRecord>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatusRecord {
    pub id: i64,
    pub code: String,
    pub value: String,
    pub pending_approval: bool,
    pub waiting_for_disbursal: bool,
    pub active: bool,
    pub closed_obligations_met: bool,
    pub closed: bool,
}

impl LoanStatusRecord {
    pub fn submitted() -> Self {
        Self {
            id: 100,
            code: "loanStatusType.submitted.and.pending.approval".to_string(),
            value: "Submitted and pending approval".to_string(),
            pending_approval: true,
            ..Self::default()
        }
    }

    pub fn approved() -> Self {
        Self {
            id: 200,
            code: "loanStatusType.approved".to_string(),
            value: "Approved".to_string(),
            waiting_for_disbursal: true,
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self {
            id: 300,
            code: "loanStatusType.active".to_string(),
            value: "Active".to_string(),
            active: true,
            ..Self::default()
        }
    }

    pub fn rejected() -> Self {
        Self {
            id: 500,
            code: "loanStatusType.rejected".to_string(),
            value: "Rejected".to_string(),
            closed: true,
            ..Self::default()
        }
    }

    pub fn withdrawn() -> Self {
        Self {
            id: 400,
            code: "loanStatusType.withdrawn.by.client".to_string(),
            value: "Withdrawn by applicant".to_string(),
            closed: true,
            ..Self::default()
        }
    }

    pub fn closed_obligations_met() -> Self {
        Self {
            id: 600,
            code: "loanStatusType.closed.obligations.met".to_string(),
            value: "Closed (obligations met)".to_string(),
            closed_obligations_met: true,
            closed: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTimelineRecord {
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub submitted_on_date: Option<NaiveDate>,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub approved_on_date: Option<NaiveDate>,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub actual_disbursement_date: Option<NaiveDate>,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub expected_maturity_date: Option<NaiveDate>,
    #[serde(serialize_with = "fineract_date", skip_serializing_if = "Option::is_none")]
    pub closed_on_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummaryRecord {
    pub principal_disbursed: f64,
    pub total_outstanding: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: i64,
    pub account_no: String,
    pub client_id: i64,
    pub status: LoanStatusRecord,
    pub principal: f64,
    pub timeline: LoanTimelineRecord,
    pub summary: LoanSummaryRecord,
    pub in_arrears: bool,
}

impl LoanRecord {
    /// A freshly submitted loan; `MockState::add_loan` assigns the id.
    pub fn new(client_id: i64, principal: f64) -> Self {
        Self {
            id: 0,
            account_no: String::new(),
            client_id,
            status: LoanStatusRecord::submitted(),
            principal,
            timeline: LoanTimelineRecord::default(),
            summary: LoanSummaryRecord::default(),
            in_arrears: false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfigRecord {
    pub field_name: String,
    pub field_value: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookEventRecord {
    pub entity_name: String,
    pub action_name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookRecord {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub is_active: bool,
    pub template_id: i64,
    pub template_name: String,
    pub config: Vec<HookConfigRecord>,
    pub events: Vec<HookEventRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    pub column_name: String,
    pub column_type: String,
    pub column_display_type: String,
    pub column_length: i64,
    pub is_column_nullable: bool,
    pub is_column_primary_key: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableRecord {
    pub application_table_name: String,
    pub registered_table_name: String,
    pub column_header_data: Vec<ColumnRecord>,
    #[serde(skip)]
    pub rows: BTreeMap<i64, Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: i64,
    pub parent_entity_type: String,
    pub parent_entity_id: i64,
    pub name: String,
    pub file_name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParameterRecord {
    pub id: i64,
    pub parameter_id: i64,
    pub parameter_name: String,
    pub report_parameter_name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: i64,
    pub report_name: String,
    pub report_type: String,
    pub report_category: String,
    pub description: String,
    pub core_report: bool,
    pub use_report: bool,
    pub report_parameters: Vec<ReportParameterRecord>,
}

/// Name of the one report the mock can execute.
pub const CLIENT_LISTING: &str = "Client Listing";

/// Everything the mock server knows. Ids come from one shared sequence.
#[derive(Clone, Debug)]
pub struct MockState {
    next_id: i64,
    pub clients: BTreeMap<i64, ClientRecord>,
    pub loans: BTreeMap<i64, LoanRecord>,
    pub groups: BTreeMap<i64, GroupRecord>,
    pub hooks: BTreeMap<i64, HookRecord>,
    pub datatables: BTreeMap<String, DataTableRecord>,
    pub documents: BTreeMap<i64, DocumentRecord>,
    pub reports: BTreeMap<i64, ReportRecord>,
}

impl Default for MockState {
    fn default() -> Self {
        let mut state = Self {
            next_id: 1,
            clients: BTreeMap::new(),
            loans: BTreeMap::new(),
            groups: BTreeMap::new(),
            hooks: BTreeMap::new(),
            datatables: BTreeMap::new(),
            documents: BTreeMap::new(),
            reports: BTreeMap::new(),
        };
        let report_id = state.allocate_id();
        state.reports.insert(
            report_id,
            ReportRecord {
                id: report_id,
                report_name: CLIENT_LISTING.to_string(),
                report_type: "Table".to_string(),
                report_category: "Client".to_string(),
                description: "Individual clients per office".to_string(),
                core_report: true,
                use_report: true,
                report_parameters: vec![ReportParameterRecord {
                    id: 1,
                    parameter_id: 5,
                    parameter_name: "OfficeIdSelectOne".to_string(),
                    report_parameter_name: "officeId".to_string(),
                }],
            },
        );
        state
    }
}

impl MockState {
    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_client(&mut self, firstname: &str, lastname: &str, mobile_no: Option<&str>) -> i64 {
        let id = self.allocate_id();
        self.clients.insert(
            id,
            ClientRecord {
                id,
                account_no: format!("{id:09}"),
                status: EnumRecord::client_pending(),
                active: false,
                activation_date: None,
                firstname: firstname.to_string(),
                lastname: lastname.to_string(),
                display_name: format!("{firstname} {lastname}"),
                mobile_no: mobile_no.map(str::to_string),
                office_id: HEAD_OFFICE_ID,
                office_name: HEAD_OFFICE.to_string(),
                timeline: ClientTimelineRecord {
                    submitted_by_username: "mifos".to_string(),
                    ..ClientTimelineRecord::default()
                },
                groups: Vec::new(),
            },
        );
        id
    }

    pub fn add_group(&mut self, name: &str) -> i64 {
        let id = self.allocate_id();
        self.groups.insert(
            id,
            GroupRecord {
                id,
                account_no: format!("{id:09}"),
                name: name.to_string(),
                status: EnumRecord::group_active(),
                active: true,
                activation_date: None,
                office_id: HEAD_OFFICE_ID,
                office_name: HEAD_OFFICE.to_string(),
                hierarchy: ".1.".to_string(),
            },
        );
        id
    }

    pub fn add_loan(&mut self, mut loan: LoanRecord) -> i64 {
        let id = self.allocate_id();
        loan.id = id;
        loan.account_no = format!("{id:09}");
        self.loans.insert(id, loan);
        id
    }

    pub fn add_datatable(&mut self, name: &str, apptable: &str) -> String {
        self.datatables.insert(
            name.to_string(),
            DataTableRecord {
                application_table_name: apptable.to_string(),
                registered_table_name: name.to_string(),
                column_header_data: vec![ColumnRecord {
                    column_name: "client_id".to_string(),
                    column_type: "BIGINT".to_string(),
                    column_display_type: "INTEGER".to_string(),
                    column_length: 0,
                    is_column_nullable: false,
                    is_column_primary_key: true,
                }],
                rows: BTreeMap::new(),
            },
        );
        name.to_string()
    }

    pub fn add_document(&mut self, entity_type: &str, entity_id: i64, name: &str) -> i64 {
        let id = self.allocate_id();
        self.documents.insert(
            id,
            DocumentRecord {
                id,
                parent_entity_type: entity_type.to_string(),
                parent_entity_id: entity_id,
                name: name.to_string(),
                file_name: format!("{}.pdf", name.to_lowercase().replace(' ', "_")),
                size: 1024,
                mime_type: "application/pdf".to_string(),
                description: String::new(),
            },
        );
        id
    }
}
