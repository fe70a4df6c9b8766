//! Stretchy reports: definitions and execution.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;
use crate::object::{make_resources, path_segment, Fields, FromJson, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportParameter {
    pub id: Option<i64>,
    pub parameter_id: Option<i64>,
    pub parameter_name: Option<String>,
    pub report_parameter_name: Option<String>,
}

impl FromJson for ReportParameter {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            id: f.i64("id"),
            parameter_id: f.i64("parameterId"),
            parameter_name: f.string("parameterName"),
            report_parameter_name: f.string("reportParameterName"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    handler: Arc<RequestHandler>,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub report_type: Option<String>,
    pub report_sub_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub core_report: Option<bool>,
    pub use_report: Option<bool>,
    pub parameters: Option<Vec<ReportParameter>>,
}

impl Resource for Report {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            id: f.i64("id"),
            name: f.string("reportName"),
            report_type: f.string("reportType"),
            report_sub_type: f.string("reportSubType"),
            category: f.string("reportCategory"),
            description: f.string("description"),
            core_report: f.bool("coreReport"),
            use_report: f.bool("useReport"),
            parameters: f.list("reportParameters"),
        }
    }
}

impl Report {
    pub fn get(handler: &Arc<RequestHandler>, id: i64) -> Result<Self> {
        let data = handler.get(&format!("/reports/{id}"), &[])?;
        Ok(Self::from_response(handler, &data))
    }

    pub fn list(handler: &Arc<RequestHandler>) -> Result<Vec<Self>> {
        Ok(make_resources(handler, &handler.get("/reports", &[])?))
    }

    /// Run the report named `name`. Each `(key, value)` in `params` is sent
    /// as `R_<key>=<value>`.
    pub fn run_by_name(
        handler: &Arc<RequestHandler>,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Map<String, Value>>> {
        let mut query: Vec<(String, String)> =
            vec![("genericResultSet".to_string(), "false".to_string())];
        query.extend(
            params
                .iter()
                .map(|(key, value)| (format!("R_{key}"), value.to_string())),
        );
        let query: Vec<(&str, String)> = query
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();

        let data = handler.get(&format!("/runreports/{}", path_segment(name)), &query)?;
        Ok(data
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row.as_object().cloned()).collect())
            .unwrap_or_default())
    }

    pub fn run(&self, params: &[(&str, &str)]) -> Result<Vec<Map<String, Value>>> {
        let name = self
            .name
            .as_deref()
            .ok_or(ApiError::MissingField("reportName"))?;
        Self::run_by_name(&self.handler, name, params)
    }
}
