//! The two example flows, written as awaited sequences.
//!
//! Each step runs only after the previous one's success has been observed,
//! and the first failure ends the flow with a `FlowError` naming the step.

use ckan_core::action::{ORGANIZATION_CREATE, ORGANIZATION_DELETE, ORGANIZATION_LIST};
use ckan_core::{ActionRequest, IdRef, NewOrganization};
use serde_json::Value;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::FlowError;
use crate::naming;
use crate::sink::ObservationSink;
use crate::transport::Transport;

pub const LIST_HEADER: &str = "*** List all organizations ***";

pub fn created_line(name: &str) -> String {
    format!("*** Created test organization {name} ***")
}

pub fn deleted_line(name: &str) -> String {
    format!("*** Deleted test organization {name} ***")
}

/// Render one list entry the way a console would: strings bare, anything
/// else as JSON.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// List organizations without credentials and observe each identifier in
/// the order the site returned them.
pub async fn list_organizations<T, S>(dispatcher: &Dispatcher<T>, sink: &S) -> Result<Vec<Value>, FlowError>
where
    T: Transport,
    S: ObservationSink,
{
    let organizations: Vec<Value> = dispatcher
        .anonymous()
        .call_as(&ActionRequest::new(ORGANIZATION_LIST))
        .await
        .map_err(FlowError::at(ORGANIZATION_LIST))
        .inspect_err(|e| warn!("{e}"))?;

    sink.observe(LIST_HEADER);
    for organization in &organizations {
        sink.observe(&display(organization));
    }
    Ok(organizations)
}

/// Create an organization under a fresh timestamped name, then delete it.
pub async fn create_then_delete_organization<T, S>(dispatcher: &Dispatcher<T>, sink: &S) -> Result<String, FlowError>
where
    T: Transport,
    S: ObservationSink,
{
    let name = naming::test_organization_name();
    create_then_delete_named(dispatcher, sink, &name).await?;
    Ok(name)
}

/// Create `name`, and only once that has succeeded, delete it again.
pub async fn create_then_delete_named<T, S>(dispatcher: &Dispatcher<T>, sink: &S, name: &str) -> Result<(), FlowError>
where
    T: Transport,
    S: ObservationSink,
{
    let create = ActionRequest::with_payload(ORGANIZATION_CREATE, &NewOrganization::test(name))
        .map_err(FlowError::at(ORGANIZATION_CREATE))?;
    dispatcher
        .call(&create)
        .await
        .map_err(FlowError::at(ORGANIZATION_CREATE))
        .inspect_err(|e| warn!(organization = name, "{e}"))?;
    sink.observe(&created_line(name));

    let delete = ActionRequest::with_payload(ORGANIZATION_DELETE, &IdRef::new(name))
        .map_err(FlowError::at(ORGANIZATION_DELETE))?;
    dispatcher
        .call(&delete)
        .await
        .map_err(FlowError::at(ORGANIZATION_DELETE))
        .inspect_err(|e| warn!(organization = name, "{e}"))?;
    sink.observe(&deleted_line(name));

    info!(organization = name, "test organization created and deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use ckan_core::{ApiError, Endpoint, ErrorKind, HttpResponse};
    use serde_json::json;

    use super::*;
    use crate::sink::MemorySink;
    use crate::testing::ScriptedTransport;

    fn dispatcher(transport: ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::new(Endpoint::new("").with_api_key("secret"), transport)
    }

    #[tokio::test]
    async fn listing_observes_each_identifier_in_order() {
        let d = dispatcher(ScriptedTransport::ok_bodies(&[r#"{"success":true,"result":["org-a","org-b"]}"#]));
        let sink = MemorySink::new();

        list_organizations(&d, &sink).await.unwrap();

        assert_eq!(sink.lines(), vec![LIST_HEADER, "org-a", "org-b"]);
        let request = &d.transport().requests()[0];
        assert_eq!(request.url, "/data/api/3/action/organization_list");
        assert!(request.body.is_none());
        assert!(request.header("X-CKAN-API-KEY").is_none());
    }

    #[tokio::test]
    async fn listing_failure_observes_nothing() {
        let d = dispatcher(ScriptedTransport::ok_bodies(&[r#"{"success":false}"#]));
        let sink = MemorySink::new();

        let err = list_organizations(&d, &sink).await.unwrap_err();

        assert!(sink.lines().is_empty());
        assert_eq!(err.api_error().map(ApiError::kind), Some(ErrorKind::Application));
    }

    #[tokio::test]
    async fn failed_create_never_sends_delete() {
        let d = dispatcher(ScriptedTransport::ok_bodies(&[
            r#"{"success":false}"#,
            r#"{"success":true,"result":null}"#,
        ]));
        let sink = MemorySink::new();

        let err = create_then_delete_named(&d, &sink, "z-org-apitest-1").await.unwrap_err();

        assert!(matches!(err, FlowError::Step { step: "organization_create", .. }));
        assert_eq!(d.transport().actions(), vec!["organization_create"]);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn successful_create_sends_exactly_one_matching_delete() {
        let d = dispatcher(ScriptedTransport::ok_bodies(&[
            r#"{"success":true,"result":{"name":"z-org-apitest-7"}}"#,
            r#"{"success":true,"result":null}"#,
        ]));
        let sink = MemorySink::new();

        create_then_delete_named(&d, &sink, "z-org-apitest-7").await.unwrap();

        let requests = d.transport().requests();
        assert_eq!(d.transport().actions(), vec!["organization_create", "organization_delete"]);
        let created: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        let deleted: Value = serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(created, json!({"name": "z-org-apitest-7", "title": "Z CKAN API z-org-apitest-7"}));
        assert_eq!(deleted, json!({"id": created["name"]}));
        assert_eq!(requests[1].header("X-CKAN-API-KEY"), Some("secret"));
        assert_eq!(
            sink.lines(),
            vec![created_line("z-org-apitest-7"), deleted_line("z-org-apitest-7")]
        );
    }

    #[tokio::test]
    async fn failed_delete_is_reported_after_create_observation() {
        let d = dispatcher(ScriptedTransport::new(vec![
            Ok(HttpResponse::new(200, r#"{"success":true,"result":{}}"#)),
            Ok(HttpResponse::new(403, r#"{"success":false}"#)),
        ]));
        let sink = MemorySink::new();

        let err = create_then_delete_named(&d, &sink, "z").await.unwrap_err();

        assert!(matches!(
            err,
            FlowError::Step { step: "organization_delete", source: ApiError::NotAuthorized }
        ));
        assert_eq!(sink.lines(), vec![created_line("z")]);
    }

    #[tokio::test]
    async fn generated_name_flows_through_both_calls() {
        let d = dispatcher(ScriptedTransport::ok_bodies(&[r#"{"success":true}"#, r#"{"success":true}"#]));
        let sink = MemorySink::new();

        let name = create_then_delete_organization(&d, &sink).await.unwrap();

        assert!(name.starts_with(naming::ORGANIZATION_PREFIX));
        let delete_body = d.transport().requests()[1].body.clone().unwrap();
        assert_eq!(delete_body, format!(r#"{{"id":"{name}"}}"#));
    }

    #[test]
    fn display_strips_quotes_from_strings_only() {
        assert_eq!(display(&json!("org-a")), "org-a");
        assert_eq!(display(&json!({"name": "x"})), r#"{"name":"x"}"#);
    }
}
