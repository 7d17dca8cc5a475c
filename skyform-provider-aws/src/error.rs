//! Error types for metrics destination operations

use skyform_core::provider::ProviderError;
use skyform_core::resource::ResourceId;
use thiserror::Error;

use crate::client::ApiError;
use crate::validation::ValidationError;

/// Errors surfaced by the metrics destination adapter
#[derive(Debug, Error)]
pub enum RumError {
    /// Attributes were rejected before any remote call
    #[error("invalid CloudWatch RUM Metrics Destination: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Nothing exists remotely for this app monitor
    #[error("CloudWatch RUM Metrics Destination ({name}) not found")]
    NotFound { name: String },

    /// More than one destination matched a name expected to be unique
    #[error("CloudWatch RUM Metrics Destination ({name}): expected 1 result, got {count}")]
    Ambiguous { name: String, count: usize },

    /// The remote service failed
    #[error("{operation} CloudWatch RUM Metrics Destination ({identifier}): {source}")]
    RemoteCall {
        operation: &'static str,
        identifier: String,
        #[source]
        source: ApiError,
    },

    /// The caller cancelled the operation
    #[error("{operation} CloudWatch RUM Metrics Destination ({identifier}): cancelled")]
    Cancelled {
        operation: &'static str,
        identifier: String,
    },
}

impl RumError {
    pub fn remote(operation: &'static str, identifier: impl Into<String>, source: ApiError) -> Self {
        Self::RemoteCall {
            operation,
            identifier: identifier.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RumError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RumError::Cancelled { .. })
    }

    /// Wrap into the engine-facing error for `id`
    pub fn into_provider_error(self, id: &ResourceId) -> ProviderError {
        ProviderError::new(self.to_string())
            .for_resource(id.clone())
            .with_cause(self)
    }
}

/// Result type for metrics destination operations
pub type RumResult<T> = Result<T, RumError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
