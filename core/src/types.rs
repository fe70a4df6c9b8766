//! Value types shared by several entities.

use serde_json::Value;

use crate::object::{Fields, FromJson};

/// Fineract's `{id, code, value}` triple for enum-like values such as
/// statuses and types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumOption {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub value: Option<String>,
}

impl FromJson for EnumOption {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            id: f.i64("id"),
            code: f.string("code"),
            value: f.string("value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_triple() {
        let status = EnumOption::from_json(&json!({
            "id": 300,
            "code": "clientStatusType.active",
            "value": "Active"
        }));
        assert_eq!(status.id, Some(300));
        assert_eq!(status.code.as_deref(), Some("clientStatusType.active"));
        assert_eq!(status.value.as_deref(), Some("Active"));
    }

    #[test]
    fn empty_object_is_all_none() {
        assert_eq!(EnumOption::from_json(&json!({})), EnumOption::default());
    }
}
