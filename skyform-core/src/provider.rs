//! Provider - Trait abstracting resource operations
//!
//! A Provider defines operations for a specific infrastructure (AWS, GCP, etc.).
//! It is responsible for converting lifecycle calls into actual API calls.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Downcast the underlying cause, if any
    pub fn cause_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.cause.as_ref().and_then(|c| c.downcast_ref::<E>())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "rum.metrics_destination")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.name())
    }
}

/// Main Provider trait
///
/// Each infrastructure provider (AWS, GCP, etc.) implements this trait.
/// All operations are async, involve side effects, and abort with an error
/// as soon as `cancel` fires.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "aws")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of a resource
    ///
    /// `identifier` is the value assigned on creation; `None` means the
    /// resource was never created and yields `State::not_found()`.
    /// Returns `State::not_found()` if the resource has disappeared remotely.
    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the provider-side ID
    fn create(
        &self,
        resource: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place
    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    ///
    /// `from` is the last known state; providers may need its attributes
    /// to scope the delete call.
    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<()>>;

    /// Adopt an existing remote resource by identifier
    ///
    /// Fails if nothing exists under `identifier`.
    fn import(
        &self,
        id: &ResourceId,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(id, identifier, cancel)
    }

    fn create(
        &self,
        resource: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource, cancel)
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(id, identifier, from, to, cancel)
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(id, identifier, from, cancel)
    }

    fn import(
        &self,
        id: &ResourceId,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).import(id, identifier, cancel)
    }
}
