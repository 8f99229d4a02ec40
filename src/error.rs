//! Classified failures carried inside `anyhow::Error`.
//!
//! Most failures simply propagate to the caller, but a few call sites need to
//! tell them apart: a missing label on removal is tolerated, a missing branch
//! means "does not exist", and callers of the listing helpers may want to
//! recognise rejected input. Those cases are represented by [`ForgeError`].

use thiserror::Error;

const NOT_FOUND: u16 = 404;

/// Failures that callers may want to match on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Input was rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The provider reported that the addressed resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// What was being looked up, e.g. `branch 'main'`.
        resource: String,
    },

    /// The provider rejected the request for any other reason.
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Message returned with the response.
        message: String,
    },
}

impl ForgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        ForgeError::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        ForgeError::NotFound {
            resource: resource.into(),
        }
    }
}

/// Returns true when any cause in the chain is a not-found failure, either
/// already classified or still a raw octocrab 404.
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        if let Some(forge_error) = cause.downcast_ref::<ForgeError>() {
            return matches!(forge_error, ForgeError::NotFound { .. });
        }
        match cause.downcast_ref::<octocrab::Error>() {
            Some(octocrab::Error::GitHub { source, .. }) => {
                source.status_code.as_u16() == NOT_FOUND
            }
            _ => false,
        }
    })
}

/// Returns true when the failure was raised locally for invalid input.
pub fn is_validation(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ForgeError>())
        .any(|forge_error| matches!(forge_error, ForgeError::Validation(_)))
}

/// Converts an octocrab failure into the crate's classification, keeping the
/// operation name for context.
pub(crate) fn map_octocrab_error(operation: &str, error: octocrab::Error) -> anyhow::Error {
    match error {
        octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == NOT_FOUND => {
            ForgeError::not_found(operation).into()
        }
        octocrab::Error::GitHub { source, .. } => ForgeError::Api {
            status: source.status_code.as_u16(),
            message: source.message.clone(),
        }
        .into(),
        other => anyhow::Error::new(other).context(format!("{operation} failed")),
    }
}
