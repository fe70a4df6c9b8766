//! Groups: minimal representation, mostly seen nested inside a client.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::handler::RequestHandler;
use crate::object::{Fields, FromJson, Resource};
use crate::pagination::PaginatedList;
use crate::types::EnumOption;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub id: Option<i64>,
    pub account_no: Option<String>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<EnumOption>,
    pub active: Option<bool>,
    pub activation_date: Option<NaiveDate>,
    pub office_id: Option<i64>,
    pub office_name: Option<String>,
    pub hierarchy: Option<String>,
}

impl FromJson for Group {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            id: f.i64("id"),
            account_no: f.string("accountNo"),
            external_id: f.string("externalId"),
            name: f.string("name"),
            status: f.object("status"),
            active: f.bool("active"),
            activation_date: f.date("activationDate"),
            office_id: f.i64("officeId"),
            office_name: f.string("officeName"),
            hierarchy: f.string("hierarchy"),
        }
    }
}

impl Resource for Group {
    fn from_response(_handler: &Arc<RequestHandler>, data: &Value) -> Self {
        Self::from_json(data)
    }
}

impl Group {
    pub fn get(handler: &Arc<RequestHandler>, id: i64) -> Result<Self> {
        Ok(Self::from_json(&handler.get(&format!("/groups/{id}"), &[])?))
    }

    pub fn list(handler: &Arc<RequestHandler>) -> PaginatedList<Self> {
        PaginatedList::new(handler, "/groups", Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::stub::{path_of, stub_handler, StubReply};

    #[test]
    fn parses_group_fields() {
        let group = Group::from_json(&json!({
            "id": 2,
            "accountNo": "000000002",
            "name": "Market women",
            "status": {"id": 300, "code": "groupingStatusType.active", "value": "Active"},
            "active": true,
            "activationDate": [2023, 1, 9],
            "officeId": 1,
            "officeName": "Head Office",
            "hierarchy": ".1."
        }));
        assert_eq!(group.id, Some(2));
        assert_eq!(group.name.as_deref(), Some("Market women"));
        assert_eq!(group.status.unwrap().id, Some(300));
        assert_eq!(group.activation_date, NaiveDate::from_ymd_opt(2023, 1, 9));
        assert_eq!(group.external_id, None);
    }

    #[test]
    fn get_fetches_by_id() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(json!({"id": 5, "name": "G"}))]);
        let group = Group::get(&handler, 5).unwrap();
        assert_eq!(group.name.as_deref(), Some("G"));
        assert_eq!(path_of(&recorded.last()), "/groups/5");
    }
}
