//! The example flows in continuation style.
//!
//! Each step lives inside the previous step's success continuation, so
//! ordering comes from nesting alone, and a failure anywhere simply ends the
//! chain. Nothing is returned
//! and nothing is logged on failure.

use ckan_core::action::{ORGANIZATION_CREATE, ORGANIZATION_DELETE, ORGANIZATION_LIST};
use ckan_core::{ActionRequest, IdRef, NewOrganization};
use serde_json::Value;

use crate::dispatcher::Dispatcher;
use crate::flows::{created_line, deleted_line, display, LIST_HEADER};
use crate::naming;
use crate::sink::ObservationSink;
use crate::transport::Transport;

pub async fn list_organizations<T, S>(dispatcher: &Dispatcher<T>, sink: &S)
where
    T: Transport,
    S: ObservationSink,
{
    dispatcher
        .anonymous()
        .call_then(&ActionRequest::new(ORGANIZATION_LIST), |data| async move {
            sink.observe(LIST_HEADER);
            if let Value::Array(organizations) = data {
                for organization in &organizations {
                    sink.observe(&display(organization));
                }
            }
        })
        .await;
}

pub async fn create_then_delete_organization<T, S>(dispatcher: &Dispatcher<T>, sink: &S)
where
    T: Transport,
    S: ObservationSink,
{
    let name = naming::test_organization_name();
    create_then_delete_named(dispatcher, sink, &name).await;
}

pub async fn create_then_delete_named<T, S>(dispatcher: &Dispatcher<T>, sink: &S, name: &str)
where
    T: Transport,
    S: ObservationSink,
{
    let Ok(create) = ActionRequest::with_payload(ORGANIZATION_CREATE, &NewOrganization::test(name)) else {
        return;
    };
    dispatcher
        .call_then(&create, |_| async move {
            sink.observe(&created_line(name));
            let Ok(delete) = ActionRequest::with_payload(ORGANIZATION_DELETE, &IdRef::new(name)) else {
                return;
            };
            dispatcher
                .call_then(&delete, |_| async move {
                    sink.observe(&deleted_line(name));
                })
                .await;
        })
        .await;
}
