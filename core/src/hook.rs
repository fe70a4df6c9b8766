//! Web hooks: outbound notifications Fineract fires on entity events.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;
use crate::object::{echoes_id, make_resources, require_id, Fields, FromJson, Resource};

/// Template name Fineract registers for plain HTTP hooks.
pub const WEB_TEMPLATE: &str = "Web";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HookConfig {
    pub field_name: Option<String>,
    pub field_value: Option<String>,
}

impl FromJson for HookConfig {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            field_name: f.string("fieldName"),
            field_value: f.string("fieldValue"),
        }
    }
}

/// An `(entity, action)` pair such as `("CLIENT", "CREATE")`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
}

impl HookEvent {
    pub fn new(entity_name: &str, action_name: &str) -> Self {
        Self {
            entity_name: Some(entity_name.to_string()),
            action_name: Some(action_name.to_string()),
        }
    }
}

impl FromJson for HookEvent {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            entity_name: f.string("entityName"),
            action_name: f.string("actionName"),
        }
    }
}

/// What to register with `Hook::create`.
#[derive(Debug, Clone)]
pub struct NewHook {
    pub display_name: String,
    pub payload_url: String,
    pub active: bool,
    pub events: Vec<HookEvent>,
}

#[derive(Debug, Clone)]
pub struct Hook {
    handler: Arc<RequestHandler>,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
    pub template_id: Option<i64>,
    pub template_name: Option<String>,
    pub config: Option<Vec<HookConfig>>,
    pub events: Option<Vec<HookEvent>>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Resource for Hook {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            id: f.i64("id"),
            name: f.string("name"),
            display_name: f.string("displayName"),
            is_active: f.bool("isActive"),
            template_id: f.i64("templateId"),
            template_name: f.string("templateName"),
            config: f.list("config"),
            events: f.list("events"),
            created_at: f.datetime("createdAt"),
            updated_at: f.datetime("updatedAt"),
        }
    }
}

impl Hook {
    pub fn get(handler: &Arc<RequestHandler>, id: i64) -> Result<Self> {
        let data = handler.get(&format!("/hooks/{id}"), &[])?;
        Ok(Self::from_response(handler, &data))
    }

    pub fn list(handler: &Arc<RequestHandler>) -> Result<Vec<Self>> {
        Ok(make_resources(handler, &handler.get("/hooks", &[])?))
    }

    /// Register a web hook, then fetch it back.
    pub fn create(handler: &Arc<RequestHandler>, hook: &NewHook) -> Result<Self> {
        let mut config = Map::new();
        config.insert("Payload URL".to_string(), Value::from(hook.payload_url.as_str()));
        config.insert("Content Type".to_string(), Value::from("json"));
        let body = json!({
            "name": WEB_TEMPLATE,
            "displayName": hook.display_name,
            "isActive": hook.active,
            "config": config,
            "events": hook.events,
        });
        let response = handler.post("/hooks", &body)?;
        let id = response
            .get("resourceId")
            .and_then(Value::as_i64)
            .ok_or(ApiError::MissingField("resourceId"))?;
        Self::get(handler, id)
    }

    /// Value of the config entry named `field_name`.
    pub fn config_value(&self, field_name: &str) -> Option<&str> {
        self.config
            .as_deref()?
            .iter()
            .find(|entry| entry.field_name.as_deref() == Some(field_name))?
            .field_value
            .as_deref()
    }

    pub fn set_active(&self, active: bool) -> Result<bool> {
        let id = require_id(self.id)?;
        let response = self
            .handler
            .put(&format!("/hooks/{id}"), &json!({ "isActive": active }))?;
        Ok(echoes_id(&response, "resourceId", id))
    }

    pub fn delete(&self) -> Result<bool> {
        let id = require_id(self.id)?;
        let response = self.handler.delete(&format!("/hooks/{id}"))?;
        Ok(echoes_id(&response, "resourceId", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::stub::{body_of, path_of, stub_handler, StubReply};

    fn hook_json() -> Value {
        json!({
            "id": 4,
            "name": "Web",
            "displayName": "Loan notifier",
            "isActive": true,
            "templateId": 1,
            "templateName": "Web",
            "config": [
                {"fieldName": "Payload URL", "fieldValue": "https://hooks.example/fineract"},
                {"fieldName": "Content Type", "fieldValue": "json"}
            ],
            "events": [{"entityName": "LOAN", "actionName": "DISBURSE"}],
            "createdAt": [2024, 2, 1, 9, 15, 0]
        })
    }

    #[test]
    fn parses_config_and_events() {
        let (handler, _) = stub_handler(vec![]);
        let hook = Hook::from_response(&handler, &hook_json());
        assert_eq!(hook.display_name.as_deref(), Some("Loan notifier"));
        assert_eq!(hook.config_value("Payload URL"), Some("https://hooks.example/fineract"));
        assert_eq!(hook.config_value("Missing"), None);
        assert_eq!(hook.events.as_ref().unwrap()[0], HookEvent::new("LOAN", "DISBURSE"));
        assert!(hook.created_at.is_some());
        assert!(hook.updated_at.is_none());
    }

    #[test]
    fn create_posts_web_template_then_fetches() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"resourceId": 4})),
            StubReply::ok(hook_json()),
        ]);
        let hook = Hook::create(
            &handler,
            &NewHook {
                display_name: "Loan notifier".to_string(),
                payload_url: "https://hooks.example/fineract".to_string(),
                active: true,
                events: vec![HookEvent::new("LOAN", "DISBURSE")],
            },
        )
        .unwrap();
        assert_eq!(hook.id, Some(4));

        let body = body_of(&recorded.get(0));
        assert_eq!(body["name"], "Web");
        assert_eq!(body["config"]["Payload URL"], "https://hooks.example/fineract");
        assert_eq!(body["events"], json!([{"entityName": "LOAN", "actionName": "DISBURSE"}]));
        assert_eq!(path_of(&recorded.get(1)), "/hooks/4");
    }

    #[test]
    fn set_active_and_delete() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"resourceId": 4})),
            StubReply::ok(json!({"resourceId": 4})),
        ]);
        let hook = Hook::from_response(&handler, &hook_json());
        assert!(hook.set_active(false).unwrap());
        assert_eq!(recorded.get(0).method, HttpMethod::Put);
        assert_eq!(body_of(&recorded.get(0)), json!({"isActive": false}));
        assert!(hook.delete().unwrap());
        assert_eq!(recorded.get(1).method, HttpMethod::Delete);
        assert_eq!(path_of(&recorded.get(1)), "/hooks/4");
    }
}
