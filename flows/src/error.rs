//! Errors of the multi-step flows.

use ckan_core::ApiError;

/// Why a flow stopped.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// An action call failed; `step` names the action.
    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("refusing to delete the shared organization {0}")]
    ProtectedOrganization(String),

    #[error("no CKAN action API found at {0:?}")]
    ApiNotFound(String),

    #[error("found API version {found}, but version {required} is required")]
    UnsupportedVersion { found: u32, required: u32 },
}

impl FlowError {
    /// Adapter for `map_err`: tag an `ApiError` with the step it came from.
    pub fn at(step: &'static str) -> impl FnOnce(ApiError) -> FlowError {
        move |source| FlowError::Step { step, source }
    }

    /// The underlying API error, if the flow failed on a call.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            FlowError::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}
