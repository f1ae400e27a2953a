//! Document store backed by the hosted Firestore REST API.
//!
//! Documents carry typed values (`{"stringValue": ...}`), so task fields are
//! encoded and decoded by hand rather than through serde derives. Partial
//! updates use an update mask and require the document to exist, which makes
//! a missing document surface as HTTP 404.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::{Map, Value, json};

use super::{AdapterError, DocumentStore};
use crate::model::config::FirestoreConfig;
use crate::model::task::{TaskFields, TaskPatch};

/// Page size requested when listing a collection
const PAGE_SIZE: &str = "300";

#[derive(Debug)]
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("todoliez/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdapterError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(FirestoreStore {
            client,
            documents_url: documents_url(config),
            api_key: config.api_key.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, AdapterError> {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        request
            .send()
            .map_err(|e| AdapterError::Network(e.to_string()))
    }

    fn json_body(response: Response) -> Result<Value, AdapterError> {
        response
            .json::<Value>()
            .map_err(|e| AdapterError::Decode(e.to_string()))
    }
}

impl DocumentStore for FirestoreStore {
    fn list_all(&self, collection: &str) -> Result<Vec<(String, TaskFields)>, AdapterError> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(self.collection_url(collection))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = check_status(self.send(request)?, collection, None)?;
            let body = Self::json_body(response)?;

            if let Some(docs) = body.get("documents").and_then(Value::as_array) {
                for doc in docs {
                    match decode_document(doc) {
                        Ok(entry) => out.push(entry),
                        Err(e) => tracing::warn!(error = %e, "skipping undecodable document"),
                    }
                }
            }

            page_token = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                return Ok(out);
            }
        }
    }

    fn create(&self, collection: &str, fields: &TaskFields) -> Result<String, AdapterError> {
        let request = self
            .client
            .post(self.collection_url(collection))
            .json(&json!({ "fields": encode_fields(fields) }));
        let response = check_status(self.send(request)?, collection, None)?;
        let body = Self::json_body(response)?;
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| AdapterError::Decode("created document has no name".into()))?;
        Ok(document_id(name).to_string())
    }

    fn update(&self, collection: &str, id: &str, patch: &TaskPatch) -> Result<(), AdapterError> {
        let mut query: Vec<(&str, &str)> = patch
            .field_names()
            .into_iter()
            .map(|f| ("updateMask.fieldPaths", f))
            .collect();
        query.push(("currentDocument.exists", "true"));
        let request = self
            .client
            .patch(self.document_url(collection, id))
            .query(&query)
            .json(&json!({ "fields": encode_patch(patch) }));
        check_status(self.send(request)?, collection, Some(id))?;
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        let request = self.client.delete(self.document_url(collection, id));
        check_status(self.send(request)?, collection, Some(id))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

fn documents_url(config: &FirestoreConfig) -> String {
    format!(
        "{}/projects/{}/databases/{}/documents",
        config.endpoint.trim_end_matches('/'),
        config.project_id,
        config.database
    )
}

fn check_status(
    response: Response,
    collection: &str,
    id: Option<&str>,
) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return Err(AdapterError::not_found(collection, id));
    }
    let body = response.text().unwrap_or_default();
    Err(AdapterError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull `error.message` out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Last path segment of a document resource name
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn bool_value(b: bool) -> Value {
    json!({ "booleanValue": b })
}

fn encode_fields(fields: &TaskFields) -> Value {
    let mut map = Map::new();
    map.insert("text".into(), string_value(&fields.text));
    map.insert("completed".into(), bool_value(fields.completed));
    map.insert("deadline".into(), string_value(&fields.deadline));
    Value::Object(map)
}

fn encode_patch(patch: &TaskPatch) -> Value {
    let mut map = Map::new();
    if let Some(text) = &patch.text {
        map.insert("text".into(), string_value(text));
    }
    if let Some(completed) = patch.completed {
        map.insert("completed".into(), bool_value(completed));
    }
    if let Some(deadline) = &patch.deadline {
        map.insert("deadline".into(), string_value(deadline));
    }
    Value::Object(map)
}

fn typed_value<'a>(fields: Option<&'a Value>, key: &str, kind: &str) -> Option<&'a Value> {
    fields.and_then(|f| f.get(key)).and_then(|v| v.get(kind))
}

fn decode_document(doc: &Value) -> Result<(String, TaskFields), AdapterError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::Decode("document has no name".into()))?;
    let id = document_id(name).to_string();
    let fields = doc.get("fields");

    let text = typed_value(fields, "text", "stringValue")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::Decode(format!("document {id} has no text")))?;
    let deadline = typed_value(fields, "deadline", "stringValue")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::Decode(format!("document {id} has no deadline")))?;
    let completed = typed_value(fields, "completed", "booleanValue")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok((
        id,
        TaskFields {
            text: text.to_string(),
            completed,
            deadline: deadline.to_string(),
        },
    ))
}
