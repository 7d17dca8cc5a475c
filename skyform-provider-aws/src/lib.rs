//! Skyform AWS Provider
//!
//! AWS Provider implementation, currently managing CloudWatch RUM
//! metrics destinations.

pub mod client;
pub mod config;
pub mod error;
pub mod finder;
pub mod metrics_destination;
pub mod schemas;
pub mod validation;

#[cfg(test)]
mod testing;

use aws_config::{BehaviorVersion, Region};
use skyform_core::provider::{BoxFuture, Provider, ProviderError, ProviderResult, ResourceType};
use skyform_core::resource::{Resource, ResourceId, State, Value};
use skyform_core::schema::ResourceSchema;
use tokio_util::sync::CancellationToken;

use crate::client::{AwsRumClient, RumApi};
use crate::config::ProviderConfig;
use crate::error::RumError;
use crate::metrics_destination::{MetricsDestination, MetricsDestinationAdapter};
use crate::schemas::rum::{METRICS_DESTINATION, metrics_destination_schema};
use crate::validation::validate_metrics_destination;

/// RUM metrics destination resource type
pub struct MetricsDestinationType;

impl ResourceType for MetricsDestinationType {
    fn name(&self) -> &'static str {
        METRICS_DESTINATION
    }

    fn schema(&self) -> ResourceSchema {
        metrics_destination_schema()
    }
}

/// AWS Provider
pub struct AwsProvider<C = AwsRumClient> {
    metrics_destinations: MetricsDestinationAdapter<C>,
}

impl AwsProvider {
    /// Create a new AWS Provider using the default credential chain
    pub async fn new(config: &ProviderConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let client = AwsRumClient::new(aws_sdk_rum::Client::new(&sdk_config))
            .with_page_size(config.page_size);
        Self::with_client(client)
    }
}

impl<C: RumApi> AwsProvider<C> {
    /// Create with a specific client (for testing)
    pub fn with_client(client: C) -> Self {
        Self {
            metrics_destinations: MetricsDestinationAdapter::new(client),
        }
    }

    // ========== RUM Metrics Destination Operations ==========

    /// Read a RUM metrics destination
    async fn read_metrics_destination(
        &self,
        id: ResourceId,
        identifier: Option<String>,
        cancel: CancellationToken,
    ) -> ProviderResult<State> {
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id));
        };

        let observed = self
            .metrics_destinations
            .read(&identifier, false, &cancel)
            .await
            .map_err(|e| e.into_provider_error(&id))?;

        Ok(observed_state(id, observed))
    }

    /// Create a RUM metrics destination
    async fn create_metrics_destination(
        &self,
        resource: Resource,
        cancel: CancellationToken,
    ) -> ProviderResult<State> {
        let config = desired_config(&resource)?;

        let observed = self
            .metrics_destinations
            .upsert(&config, None, &cancel)
            .await
            .map_err(|e| e.into_provider_error(&resource.id))?;

        Ok(observed_state(resource.id, observed))
    }

    /// Update a RUM metrics destination (full overwrite)
    async fn update_metrics_destination(
        &self,
        id: ResourceId,
        identifier: String,
        to: Resource,
        cancel: CancellationToken,
    ) -> ProviderResult<State> {
        let config = desired_config(&to)?;

        let observed = self
            .metrics_destinations
            .upsert(&config, Some(&identifier), &cancel)
            .await
            .map_err(|e| e.into_provider_error(&id))?;

        Ok(observed_state(id, observed))
    }

    /// Delete a RUM metrics destination
    async fn delete_metrics_destination(
        &self,
        id: ResourceId,
        identifier: String,
        from: State,
        cancel: CancellationToken,
    ) -> ProviderResult<()> {
        let destination = from
            .attributes
            .get("destination")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::new("destination is unknown; refresh state before deleting")
                    .for_resource(id.clone())
            })?;
        let destination_arn = from.attributes.get("destination_arn").and_then(Value::as_str);

        self.metrics_destinations
            .delete(&identifier, destination, destination_arn, &cancel)
            .await
            .map_err(|e| e.into_provider_error(&id))
    }

    /// Import an existing RUM metrics destination by app monitor name
    async fn import_metrics_destination(
        &self,
        id: ResourceId,
        identifier: String,
        cancel: CancellationToken,
    ) -> ProviderResult<State> {
        let observed = self
            .metrics_destinations
            .import(&identifier, &cancel)
            .await
            .map_err(|e| e.into_provider_error(&id))?;

        Ok(observed_state(id, Some(observed)))
    }
}

impl<C: RumApi> Provider for AwsProvider<C> {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(MetricsDestinationType)]
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(String::from);
        let cancel = cancel.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                METRICS_DESTINATION => {
                    self.read_metrics_destination(id, identifier, cancel)
                        .await
                }
                _ => Err(unknown_type(id)),
            }
        })
    }

    fn create(
        &self,
        resource: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            match resource.id.resource_type.as_str() {
                METRICS_DESTINATION => self.create_metrics_destination(resource, cancel).await,
                _ => Err(unknown_type(resource.id)),
            }
        })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        _from: &State,
        to: &Resource,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let to = to.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                METRICS_DESTINATION => {
                    self.update_metrics_destination(id, identifier, to, cancel)
                        .await
                }
                _ => Err(unknown_type(id)),
            }
        })
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                METRICS_DESTINATION => {
                    self.delete_metrics_destination(id, identifier, from, cancel)
                        .await
                }
                _ => Err(unknown_type(id)),
            }
        })
    }

    fn import(
        &self,
        id: &ResourceId,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let cancel = cancel.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                METRICS_DESTINATION => {
                    self.import_metrics_destination(id, identifier, cancel)
                        .await
                }
                _ => Err(unknown_type(id)),
            }
        })
    }
}

/// Validate and convert desired attributes
fn desired_config(resource: &Resource) -> ProviderResult<MetricsDestination> {
    validate_metrics_destination(&resource.attributes)
        .map_err(|errors| RumError::Validation(errors).into_provider_error(&resource.id))?;
    MetricsDestination::from_attributes(&resource.attributes)
        .map_err(|e| e.into_provider_error(&resource.id))
}

fn observed_state(id: ResourceId, observed: Option<MetricsDestination>) -> State {
    match observed {
        Some(destination) => {
            let identifier = destination.identifier().to_string();
            State::existing(id, destination.to_attributes()).with_identifier(identifier)
        }
        None => State::not_found(id),
    }
}

fn unknown_type(id: ResourceId) -> ProviderError {
    ProviderError::new(format!("Unknown resource type: {}", id.resource_type)).for_resource(id)
}

/// Convert DSL enum value (provider.service.TypeName.value) to the raw service value
///
/// Only a prefix ending in `type_name` is stripped:
/// - aws.rum.MetricDestination.CloudWatch -> CloudWatch
/// - MetricDestination.Evidently -> Evidently
/// - CloudWatch -> CloudWatch
/// - Kinesis.CloudWatch -> Kinesis.CloudWatch
pub(crate) fn convert_enum_value(value: &str, type_name: &str) -> String {
    let parts: Vec<&str> = value.split('.').collect();
    let Some((raw_value, prefix)) = parts.split_last() else {
        return value.to_string();
    };

    let is_dsl = match prefix.split_last() {
        Some((name, namespace)) => {
            *name == type_name
                && namespace
                    .iter()
                    .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase()))
        }
        None => false,
    };

    if is_dsl {
        raw_value.to_string()
    } else {
        value.to_string()
    }
}
