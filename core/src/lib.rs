//! Client binding for the Apache Fineract core-banking REST API.
//!
//! # Overview
//! Maps Fineract's JSON resources to typed entities (`Client`, `Loan`,
//! `Group`, `DataTable`, `Document`, `Hook`, `Report`) and issues the
//! requests behind their lifecycle commands. All banking logic stays on the
//! server; this crate only shapes requests and responses.
//!
//! # Design
//! - `RequestHandler` builds `HttpRequest` values and parses `HttpResponse`
//!   values; a `Transport` executes the round-trip in between
//!   (`UreqTransport` against a live server).
//! - Entities share one handler through `Arc` and are built field by field
//!   from JSON; every field is an `Option` and absent keys never fail.
//! - Lifecycle commands return `Ok(true)` when the server echoes the
//!   entity's id, `Ok(false)` when it echoes another one.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fineract::{Client, FineractConfig, RequestHandler};
//!
//! # fn main() -> fineract::Result<()> {
//! let handler = Arc::new(RequestHandler::connect(FineractConfig::from_env()?));
//! let client = Client::get(&handler, 7)?;
//! for loan in client.get_loans_in_arrears(true, false)? {
//!     println!("{:?} is in arrears", loan.account_no);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod datatable;
pub mod document;
pub mod error;
pub mod group;
pub mod handler;
pub mod hook;
pub mod http;
pub mod loan;
pub mod object;
pub mod pagination;
pub mod report;
pub mod templates;
pub mod transport;
pub mod types;

#[cfg(test)]
mod stub;

pub use client::{Client, ClientStatus, ClientTimeline, ClientType};
pub use config::FineractConfig;
pub use datatable::{DataTable, DataTableColumn};
pub use document::Document;
pub use error::{ApiError, Result};
pub use group::Group;
pub use handler::RequestHandler;
pub use hook::{Hook, HookConfig, HookEvent, NewHook};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use loan::{ArrearsFilter, Loan, LoanStatus, LoanSummary, LoanTimeline};
pub use object::{FromJson, Resource};
pub use pagination::PaginatedList;
pub use report::{Report, ReportParameter};
pub use transport::{Transport, UreqTransport};
pub use types::EnumOption;
