//! A longer walk through the action API: version discovery, showing and
//! listing, and a full organization + dataset create/delete cycle.
//!
//! Every name created in one tour carries the same execution id so leftovers
//! from an aborted run are easy to find and clean up by hand.

use ckan_core::action::{
    ORGANIZATION_CREATE, ORGANIZATION_DELETE, ORGANIZATION_SHOW, PACKAGE_CREATE, PACKAGE_DELETE, PACKAGE_LIST,
    PACKAGE_SHOW,
};
use ckan_core::{ActionRequest, Dataset, Extra, IdRef, NewDataset, NewOrganization, PackageListQuery};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::error::FlowError;
use crate::flows::{self, display};
use crate::sink::ObservationSink;
use crate::transport::Transport;

/// The action API version every flow in this crate speaks.
pub const REQUIRED_API_VERSION: u32 = 3;

/// Shared "private person" organization that must never be deleted.
pub const PROTECTED_ORGANIZATION: &str = "yksityishenkilo";

/// Probe `/data/api/1` through `/data/api/3` and require version 3.
pub async fn discover_api_version<T: Transport>(dispatcher: &Dispatcher<T>) -> Result<u32, FlowError> {
    let mut latest = 0;
    for version in 1..=REQUIRED_API_VERSION {
        match dispatcher.api_version(version).await {
            Ok(found) if found == version => {
                debug!(version, "API version found");
                latest = version;
            }
            Ok(found) => debug!(version, found, "API version probe answered with another version"),
            Err(e) => warn!(version, "API version probe failed: {e}"),
        }
    }

    match latest {
        0 => Err(FlowError::ApiNotFound(dispatcher.endpoint().base_url().to_string())),
        REQUIRED_API_VERSION => {
            info!(url = %dispatcher.endpoint().action_url(""), "action API located");
            Ok(latest)
        }
        found => Err(FlowError::UnsupportedVersion {
            found,
            required: REQUIRED_API_VERSION,
        }),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

async fn show<T: Transport>(dispatcher: &Dispatcher<T>, action: &'static str, id: &str) -> Result<Value, FlowError> {
    let request = ActionRequest::with_payload(action, &IdRef::new(id)).map_err(FlowError::at(action))?;
    dispatcher.call(&request).await.map_err(FlowError::at(action))
}

pub async fn show_organization<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
) -> Result<Value, FlowError> {
    let organization = show(dispatcher, ORGANIZATION_SHOW, id).await?;
    sink.observe(&format!("Details of organization '{id}':"));
    sink.observe(&pretty(&organization));
    Ok(organization)
}

pub async fn show_dataset<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
) -> Result<Value, FlowError> {
    let dataset = show(dispatcher, PACKAGE_SHOW, id).await?;
    sink.observe(&format!("Details of dataset '{id}':"));
    sink.observe(&pretty(&dataset));
    Ok(dataset)
}

/// Observe a single field of an organization, e.g. its `state`.
pub async fn show_organization_property<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
    property: &str,
) -> Result<Option<Value>, FlowError> {
    let value = show(dispatcher, ORGANIZATION_SHOW, id).await?.get(property).cloned();
    sink.observe(&property_line("organization", id, property, value.as_ref()));
    Ok(value)
}

pub async fn show_dataset_property<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
    property: &str,
) -> Result<Option<Value>, FlowError> {
    let value = show(dispatcher, PACKAGE_SHOW, id).await?.get(property).cloned();
    sink.observe(&property_line("dataset", id, property, value.as_ref()));
    Ok(value)
}

fn property_line(kind: &str, id: &str, property: &str, value: Option<&Value>) -> String {
    let shown = value.map_or_else(|| "-".to_string(), display);
    format!("'{property}' of {kind} {id}: {shown}")
}

pub async fn list_datasets<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    limit: u32,
) -> Result<Vec<Value>, FlowError> {
    let request = ActionRequest::with_payload(PACKAGE_LIST, &PackageListQuery { limit, offset: 0 })
        .map_err(FlowError::at(PACKAGE_LIST))?;
    let datasets: Vec<Value> = dispatcher
        .anonymous()
        .call_as(&request)
        .await
        .map_err(FlowError::at(PACKAGE_LIST))?;
    sink.observe(&format!("The first {limit} datasets:"));
    for dataset in &datasets {
        sink.observe(&display(dataset));
    }
    Ok(datasets)
}

/// Create `z-org-{execution id}` and return its name.
pub async fn create_test_organization<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    execution_id: &str,
) -> Result<String, FlowError> {
    let name = format!("z-org-{execution_id}");
    let request = ActionRequest::with_payload(ORGANIZATION_CREATE, &NewOrganization::test(&name))
        .map_err(FlowError::at(ORGANIZATION_CREATE))?;
    let organization = dispatcher.call(&request).await.map_err(FlowError::at(ORGANIZATION_CREATE))?;
    sink.observe(&format!("Created organization {name}:"));
    sink.observe(&pretty(&organization));
    Ok(name)
}

pub fn test_dataset(execution_id: &str, owner_org: &str) -> NewDataset {
    let name = format!("z-{execution_id}");
    NewDataset {
        title: format!("Z {name}"),
        name,
        owner_org: owner_org.to_string(),
        notes: format!(
            "A temporary test dataset that can be deleted at any time. Checksum: {}",
            Uuid::new_v4()
        ),
        license_id: "cc-by-4.0".to_string(),
        collection_type: "Open Data".to_string(),
        content_type: "paikkatieto, mallintaminen".to_string(),
        tag_string: Some("foo, bar".to_string()),
        extras: ["first", "second", "third"]
            .iter()
            .map(|ordinal| Extra {
                key: format!("{ordinal}key"),
                value: format!("{ordinal}value"),
            })
            .collect(),
    }
}

/// Create `z-{execution id}` owned by `owner_org` and return its name.
pub async fn create_test_dataset<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    execution_id: &str,
    owner_org: &str,
) -> Result<String, FlowError> {
    let dataset = test_dataset(execution_id, owner_org);
    let request = ActionRequest::with_payload(PACKAGE_CREATE, &dataset).map_err(FlowError::at(PACKAGE_CREATE))?;
    let created: Dataset = dispatcher.call_as(&request).await.map_err(FlowError::at(PACKAGE_CREATE))?;
    sink.observe(&format!("Created dataset {} with id {}", created.name, created.id));
    Ok(created.name)
}

pub async fn delete_dataset<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
) -> Result<(), FlowError> {
    let request = ActionRequest::with_payload(PACKAGE_DELETE, &IdRef::new(id)).map_err(FlowError::at(PACKAGE_DELETE))?;
    dispatcher.call(&request).await.map_err(FlowError::at(PACKAGE_DELETE))?;
    sink.observe(&format!("Deleted dataset {id}"));
    Ok(())
}

/// Delete an organization, refusing the shared one without sending anything.
pub async fn delete_organization<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    id: &str,
) -> Result<(), FlowError> {
    if id == PROTECTED_ORGANIZATION {
        sink.observe("Not even trying to delete the shared organization!");
        return Err(FlowError::ProtectedOrganization(id.to_string()));
    }
    let request =
        ActionRequest::with_payload(ORGANIZATION_DELETE, &IdRef::new(id)).map_err(FlowError::at(ORGANIZATION_DELETE))?;
    dispatcher.call(&request).await.map_err(FlowError::at(ORGANIZATION_DELETE))?;
    sink.observe(&format!("Deleted organization {id}"));
    Ok(())
}

/// Discovery, listing, and a full organization + dataset lifecycle. Stops at
/// the first failing step.
pub async fn run_tour<T: Transport, S: ObservationSink>(
    dispatcher: &Dispatcher<T>,
    sink: &S,
    execution_id: &str,
) -> Result<(), FlowError> {
    info!(execution_id, "all names in this tour are tagged with the execution id");

    discover_api_version(dispatcher).await?;
    flows::list_organizations(dispatcher, sink).await?;
    list_datasets(dispatcher, sink, 10).await?;

    let organization = create_test_organization(dispatcher, sink, execution_id).await?;
    show_organization(dispatcher, sink, &organization).await?;

    let dataset = create_test_dataset(dispatcher, sink, execution_id, &organization).await?;
    show_dataset(dispatcher, sink, &dataset).await?;

    delete_dataset(dispatcher, sink, &dataset).await?;
    show_dataset_property(dispatcher, sink, &dataset, "state").await?;

    delete_organization(dispatcher, sink, &organization).await?;
    show_organization_property(dispatcher, sink, &organization, "state").await?;

    info!(execution_id, "tour finished");
    Ok(())
}
