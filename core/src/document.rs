//! Documents attached to clients, loans and other entities.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;
use crate::object::{echoes_id, make_resources, path_segment, require_id, Fields, Resource};

#[derive(Debug, Clone)]
pub struct Document {
    handler: Arc<RequestHandler>,
    pub id: Option<i64>,
    pub parent_entity_type: Option<String>,
    pub parent_entity_id: Option<i64>,
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub size: Option<i64>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
}

impl Resource for Document {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            id: f.i64("id"),
            parent_entity_type: f.string("parentEntityType"),
            parent_entity_id: f.i64("parentEntityId"),
            name: f.string("name"),
            file_name: f.string("fileName"),
            size: f.i64("size"),
            mime_type: f.string("type"),
            description: f.string("description"),
        }
    }
}

impl Document {
    /// Documents of one entity, e.g. `("clients", 7)`.
    pub fn list(
        handler: &Arc<RequestHandler>,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<Self>> {
        let entity_type = path_segment(entity_type);
        let data = handler.get(&format!("/{entity_type}/{entity_id}/documents"), &[])?;
        Ok(make_resources(handler, &data))
    }

    pub fn get(
        handler: &Arc<RequestHandler>,
        entity_type: &str,
        entity_id: i64,
        document_id: i64,
    ) -> Result<Self> {
        let entity_type = path_segment(entity_type);
        let data = handler.get(
            &format!("/{entity_type}/{entity_id}/documents/{document_id}"),
            &[],
        )?;
        Ok(Self::from_response(handler, &data))
    }

    pub fn delete(&self) -> Result<bool> {
        let id = require_id(self.id)?;
        let entity_type = self
            .parent_entity_type
            .as_deref()
            .ok_or(ApiError::MissingField("parentEntityType"))?;
        let entity_id = require_id(self.parent_entity_id)?;
        let entity_type = path_segment(entity_type);
        let response = self
            .handler
            .delete(&format!("/{entity_type}/{entity_id}/documents/{id}"))?;
        Ok(echoes_id(&response, "resourceId", id))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;
    use crate::stub::{path_of, stub_handler, StubReply};

    fn document_json() -> Value {
        json!({
            "id": 3,
            "parentEntityType": "clients",
            "parentEntityId": 7,
            "name": "National ID",
            "fileName": "id.png",
            "size": 20480,
            "type": "image/png",
            "description": "front side"
        })
    }

    #[test]
    fn list_maps_every_document() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(json!([document_json()]))]);
        let documents = Document::list(&handler, "clients", 7).unwrap();
        assert_eq!(path_of(&recorded.last()), "/clients/7/documents");
        assert_eq!(documents.len(), 1);
        let doc = &documents[0];
        assert_eq!(doc.id, Some(3));
        assert_eq!(doc.file_name.as_deref(), Some("id.png"));
        assert_eq!(doc.size, Some(20480));
        assert_eq!(doc.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn delete_uses_parent_path() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(document_json()),
            StubReply::ok(json!({"resourceId": 3})),
        ]);
        let doc = Document::get(&handler, "clients", 7, 3).unwrap();
        assert_eq!(path_of(&recorded.get(0)), "/clients/7/documents/3");
        assert!(doc.delete().unwrap());
        let req = recorded.last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(path_of(&req), "/clients/7/documents/3");
    }

    #[test]
    fn delete_without_id_fails() {
        let (handler, recorded) = stub_handler(vec![]);
        let doc = Document::from_response(&handler, &json!({"parentEntityType": "clients"}));
        assert!(matches!(doc.delete(), Err(ApiError::IdNotSet)));
        assert_eq!(recorded.len(), 0);
    }

    #[test]
    fn delete_without_parent_type_sends_nothing() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(json!({"resourceId": 3}))]);
        let doc = Document::from_response(&handler, &json!({"id": 3, "parentEntityId": 7}));
        assert!(matches!(
            doc.delete(),
            Err(ApiError::MissingField("parentEntityType"))
        ));
        assert_eq!(recorded.len(), 0);
    }

    #[test]
    fn entity_type_is_a_single_path_segment() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(json!([]))]);
        Document::list(&handler, "clients/7/documents/3?x=", 7).unwrap();
        assert_eq!(
            path_of(&recorded.last()),
            "/clients%2F7%2Fdocuments%2F3%3Fx=/7/documents"
        );
    }
}
