//! In-memory stand-in for a CKAN site's action API.
//!
//! Serves `POST /data/api/{n}/action/{action}` for the organization and
//! package actions the flows use, plus `GET /data/api/{n}` version probes.
//! Deletes are soft: the record stays visible to `*_show` with
//! `state: "deleted"` and drops out of the list actions, as on a real site.
//! Every action call is appended to a journal so tests can check what went
//! over the wire and in which order.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-ckan-api-key";
pub const SUPPORTED_VERSIONS: [u32; 3] = [1, 2, 3];

const WRITE_ACTIONS: [&str; 4] = [
    "organization_create",
    "organization_delete",
    "package_create",
    "package_delete",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_organization: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub owner_org: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub license_id: Option<String>,
    pub state: String,
    #[serde(default)]
    pub extras: Vec<Value>,
}

/// One action call as the server saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub action: String,
    pub content_type: Option<String>,
    pub api_key: Option<String>,
    pub body: String,
}

/// Server behavior knobs.
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Key required for write actions. `None` accepts any non-empty key.
    pub api_key: Option<String>,
}

#[derive(Default)]
struct Catalog {
    organizations: BTreeMap<String, Organization>,
    datasets: BTreeMap<String, Dataset>,
    journal: Vec<RecordedCall>,
    failing: HashSet<String>,
}

/// Shared handle to the server's data. Clones see the same catalog.
#[derive(Clone, Default)]
pub struct MockState {
    catalog: Arc<RwLock<Catalog>>,
    config: Arc<MockConfig>,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            catalog: Arc::default(),
            config: Arc::new(config),
        }
    }

    pub async fn journal(&self) -> Vec<RecordedCall> {
        self.catalog.read().await.journal.clone()
    }

    /// Make `action` answer `200 {"success": false}` from now on.
    pub async fn fail_action(&self, action: &str) {
        self.catalog.write().await.failing.insert(action.to_string());
    }

    pub async fn seed_organization(&self, name: &str, title: &str) -> Organization {
        let org = new_organization(name, title);
        self.catalog
            .write()
            .await
            .organizations
            .insert(org.name.clone(), org.clone());
        org
    }

    pub async fn organization(&self, name: &str) -> Option<Organization> {
        self.catalog.read().await.organizations.get(name).cloned()
    }
}

pub fn app() -> Router {
    app_with(MockState::default())
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route("/data/api/{version}", get(api_version))
        .route("/data/api/{version}/action/{action}", post(dispatch_action))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockState::default()).await
}

pub async fn serve(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

async fn api_version(Path(version): Path<u32>) -> Result<Json<Value>, StatusCode> {
    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(Json(json!({ "version": version })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug)]
struct Failure {
    status: StatusCode,
    error: Value,
}

impl Failure {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: json!({"__type": "Not Found Error", "message": "Not found"}),
        }
    }

    fn not_authorized(action: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: json!({
                "__type": "Authorization Error",
                "message": format!("Access denied: User not authorized to perform {action}"),
            }),
        }
    }

    fn validation(field: &str, message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            error: json!({"__type": "Validation Error", field: [message]}),
        }
    }

    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: json!({"__type": "Bad request", "message": message}),
        }
    }
}

async fn dispatch_action(
    State(state): State<MockState>,
    Path((version, action)): Path<(u32, String)>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    if !SUPPORTED_VERSIONS.contains(&version) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": Failure::not_found().error})),
        );
    }
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let api_key = header(API_KEY_HEADER);
    let content_type = header("content-type");

    let mut catalog = state.catalog.write().await;
    catalog.journal.push(RecordedCall {
        action: action.clone(),
        content_type,
        api_key: api_key.clone(),
        body: body.clone(),
    });
    tracing::debug!(%action, authenticated = api_key.is_some(), "action call");

    if catalog.failing.contains(&action) {
        let envelope = json!({
            "help": help_url(&action),
            "success": false,
            "error": {"__type": "Injected Failure", "message": format!("{action} is set to fail")},
        });
        return (StatusCode::OK, Json(envelope));
    }

    let outcome = authorize(&state.config, &action, api_key.as_deref())
        .and_then(|()| parse_params(&body))
        .and_then(|params| catalog.apply(&action, &params));

    match outcome {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({"help": help_url(&action), "success": true, "result": result})),
        ),
        Err(failure) => (
            failure.status,
            Json(json!({"help": help_url(&action), "success": false, "error": failure.error})),
        ),
    }
}

fn help_url(action: &str) -> String {
    format!("/data/api/3/action/help_show?name={action}")
}

fn authorize(config: &MockConfig, action: &str, api_key: Option<&str>) -> Result<(), Failure> {
    if !WRITE_ACTIONS.contains(&action) {
        return Ok(());
    }
    match (api_key, config.api_key.as_deref()) {
        (Some(given), Some(required)) if given == required => Ok(()),
        (Some(given), None) if !given.is_empty() => Ok(()),
        _ => Err(Failure::not_authorized(action)),
    }
}

fn parse_params(body: &str) -> Result<Value, Failure> {
    if body.trim().is_empty() {
        return Ok(json!({}));
    }
    match serde_json::from_str(body) {
        Ok(params @ Value::Object(_)) => Ok(params),
        _ => Err(Failure::bad_request("Bad request - JSON Error: Error decoding JSON data.".to_string())),
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, Failure> {
    match params.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Failure::validation(key, "Missing value")),
    }
}

fn new_organization(name: &str, title: &str) -> Organization {
    Organization {
        id: Uuid::new_v4(),
        name: name.to_string(),
        title: title.to_string(),
        state: "active".to_string(),
        kind: "organization".to_string(),
        is_organization: true,
    }
}

fn to_value<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

impl Catalog {
    fn apply(&mut self, action: &str, params: &Value) -> Result<Value, Failure> {
        match action {
            "organization_list" => Ok(self.organization_list()),
            "organization_show" => self.organization_show(params),
            "organization_create" => self.organization_create(params),
            "organization_delete" => self.organization_delete(params),
            "package_list" => Ok(self.package_list(params)),
            "package_show" => self.package_show(params),
            "package_create" => self.package_create(params),
            "package_delete" => self.package_delete(params),
            other => Err(Failure::bad_request(format!("Bad request - Action name not known: {other}"))),
        }
    }

    fn find_organization(&self, id: &str) -> Option<&Organization> {
        self.organizations
            .get(id)
            .or_else(|| self.organizations.values().find(|org| org.id.to_string() == id))
    }

    fn find_dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets
            .get(id)
            .or_else(|| self.datasets.values().find(|ds| ds.id.to_string() == id))
    }

    fn organization_list(&self) -> Value {
        let names: Vec<&str> = self
            .organizations
            .values()
            .filter(|org| org.state == "active")
            .map(|org| org.name.as_str())
            .collect();
        json!(names)
    }

    fn organization_show(&self, params: &Value) -> Result<Value, Failure> {
        let id = str_param(params, "id")?;
        self.find_organization(id).map(to_value).ok_or_else(Failure::not_found)
    }

    fn organization_create(&mut self, params: &Value) -> Result<Value, Failure> {
        let name = str_param(params, "name")?;
        if self.organizations.contains_key(name) {
            return Err(Failure::validation("name", "Group name already exists in database"));
        }
        let title = params.get("title").and_then(Value::as_str).unwrap_or(name);
        let org = new_organization(name, title);
        let result = to_value(&org);
        self.organizations.insert(org.name.clone(), org);
        Ok(result)
    }

    fn organization_delete(&mut self, params: &Value) -> Result<Value, Failure> {
        let id = str_param(params, "id")?;
        let org_id = self.find_organization(id).map(|org| org.id).ok_or_else(Failure::not_found)?;
        let has_datasets = self
            .datasets
            .values()
            .any(|ds| ds.owner_org == org_id && ds.state == "active");
        if has_datasets {
            return Err(Failure::validation(
                "message",
                "Organization cannot be deleted while it still has datasets",
            ));
        }
        if let Some(org) = self.organizations.values_mut().find(|org| org.id == org_id) {
            org.state = "deleted".to_string();
        }
        Ok(Value::Null)
    }

    fn package_list(&self, params: &Value) -> Value {
        let offset = params.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
        let limit = params
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(usize::MAX, |limit| limit as usize);
        let names: Vec<&str> = self
            .datasets
            .values()
            .filter(|ds| ds.state == "active")
            .skip(offset)
            .take(limit)
            .map(|ds| ds.name.as_str())
            .collect();
        json!(names)
    }

    fn package_show(&self, params: &Value) -> Result<Value, Failure> {
        let id = str_param(params, "id")?;
        self.find_dataset(id).map(to_value).ok_or_else(Failure::not_found)
    }

    fn package_create(&mut self, params: &Value) -> Result<Value, Failure> {
        let name = str_param(params, "name")?;
        if self.datasets.contains_key(name) {
            return Err(Failure::validation("name", "That URL is already in use."));
        }
        let owner = str_param(params, "owner_org")?;
        let owner_org = self
            .find_organization(owner)
            .filter(|org| org.state == "active")
            .map(|org| org.id)
            .ok_or_else(|| Failure::validation("owner_org", "Organization does not exist"))?;
        let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_string);
        let dataset = Dataset {
            id: Uuid::new_v4(),
            name: name.to_string(),
            title: text("title").unwrap_or_else(|| name.to_string()),
            owner_org,
            notes: text("notes"),
            license_id: text("license_id"),
            state: "active".to_string(),
            extras: params
                .get("extras")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        };
        let result = to_value(&dataset);
        self.datasets.insert(dataset.name.clone(), dataset);
        Ok(result)
    }

    fn package_delete(&mut self, params: &Value) -> Result<Value, Failure> {
        let id = str_param(params, "id")?;
        let dataset_id = self.find_dataset(id).map(|ds| ds.id).ok_or_else(Failure::not_found)?;
        if let Some(ds) = self.datasets.values_mut().find(|ds| ds.id == dataset_id) {
            ds.state = "deleted".to_string();
        }
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_serializes_type_field() {
        let org = new_organization("helsinki", "Helsinki");
        let json = serde_json::to_value(&org).unwrap();
        assert_eq!(json["type"], "organization");
        assert_eq!(json["state"], "active");
        assert_eq!(json["is_organization"], true);
    }

    #[test]
    fn empty_body_means_no_params() {
        assert_eq!(parse_params("").unwrap(), json!({}));
        assert_eq!(parse_params("  \n").unwrap(), json!({}));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let failure = parse_params("[1,2]").unwrap_err();
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn reads_need_no_key() {
        assert!(authorize(&MockConfig::default(), "organization_list", None).is_ok());
    }

    #[test]
    fn writes_need_a_key() {
        let config = MockConfig::default();
        assert!(authorize(&config, "organization_create", None).is_err());
        assert!(authorize(&config, "organization_create", Some("")).is_err());
        assert!(authorize(&config, "organization_create", Some("anything")).is_ok());
    }

    #[test]
    fn configured_key_must_match() {
        let config = MockConfig {
            api_key: Some("right".to_string()),
        };
        assert!(authorize(&config, "package_delete", Some("wrong")).is_err());
        assert!(authorize(&config, "package_delete", Some("right")).is_ok());
    }

    #[test]
    fn deleted_organizations_leave_the_list() {
        let mut catalog = Catalog::default();
        catalog
            .organization_create(&json!({"name": "a", "title": "A"}))
            .unwrap();
        catalog
            .organization_create(&json!({"name": "b", "title": "B"}))
            .unwrap();
        catalog.organization_delete(&json!({"id": "a"})).unwrap();
        assert_eq!(catalog.organization_list(), json!(["b"]));
        let shown = catalog.organization_show(&json!({"id": "a"})).unwrap();
        assert_eq!(shown["state"], "deleted");
    }

    #[test]
    fn organization_with_datasets_cannot_be_deleted() {
        let mut catalog = Catalog::default();
        catalog.organization_create(&json!({"name": "owner"})).unwrap();
        catalog
            .package_create(&json!({"name": "ds", "owner_org": "owner"}))
            .unwrap();
        let failure = catalog.organization_delete(&json!({"id": "owner"})).unwrap_err();
        assert_eq!(failure.status, StatusCode::CONFLICT);

        catalog.package_delete(&json!({"id": "ds"})).unwrap();
        assert!(catalog.organization_delete(&json!({"id": "owner"})).is_ok());
    }

    #[test]
    fn package_list_pages() {
        let mut catalog = Catalog::default();
        catalog.organization_create(&json!({"name": "owner"})).unwrap();
        for name in ["d1", "d2", "d3"] {
            catalog
                .package_create(&json!({"name": name, "owner_org": "owner"}))
                .unwrap();
        }
        assert_eq!(catalog.package_list(&json!({"limit": 2, "offset": 1})), json!(["d2", "d3"]));
        assert_eq!(catalog.package_list(&json!({})), json!(["d1", "d2", "d3"]));
    }
}
