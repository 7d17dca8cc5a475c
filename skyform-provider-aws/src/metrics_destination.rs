//! CloudWatch RUM metrics destination
//!
//! Maps the desired configuration of a metrics destination onto
//! `PutRumMetricsDestination`, `DeleteRumMetricsDestination` and
//! `ListRumMetricsDestinations`. The adapter holds no state between calls:
//! the remote service is the source of truth and the identifier (the app
//! monitor name) is owned by the caller.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use skyform_core::resource::Value;
use tokio_util::sync::CancellationToken;

use crate::client::{
    DeleteDestinationInput, DestinationRecord, PutDestinationInput, RumApi, cancellable,
};
use crate::error::{RumError, RumResult};
use crate::finder::find_metrics_destination_by_name;
use crate::schemas::types::normalize_metric_destination;
use crate::validation::ValidationError;

/// Desired (or observed) configuration of a metrics destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsDestination {
    pub app_monitor_name: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_arn: Option<String>,
}

impl MetricsDestination {
    pub fn new(app_monitor_name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            app_monitor_name: app_monitor_name.into(),
            destination: destination.into(),
            destination_arn: None,
            iam_role_arn: None,
        }
    }

    pub fn with_destination_arn(mut self, arn: impl Into<String>) -> Self {
        self.destination_arn = Some(arn.into());
        self
    }

    pub fn with_iam_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.iam_role_arn = Some(arn.into());
        self
    }

    /// Identifier of the managed object
    pub fn identifier(&self) -> &str {
        &self.app_monitor_name
    }

    /// Observed state for `identifier`, filled from a listed record
    pub fn from_record(identifier: &str, record: DestinationRecord) -> Self {
        Self {
            app_monitor_name: identifier.to_string(),
            destination: record.destination,
            destination_arn: record.destination_arn,
            iam_role_arn: record.iam_role_arn,
        }
    }

    /// Build from engine attributes
    ///
    /// Enum values in DSL form (`aws.rum.MetricDestination.CloudWatch`) are
    /// reduced to the raw service value. Empty optional strings count as unset.
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> RumResult<Self> {
        let required = |key: &str| -> Result<String, ValidationError> {
            attributes
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| ValidationError {
                    path: key.to_string(),
                    message: format!("{} is required", key),
                })
        };
        let optional = |key: &str| {
            attributes
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let (app_monitor_name, destination) =
            match (required("app_monitor_name"), required("destination")) {
                (Ok(name), Ok(destination)) => (name, destination),
                (name, destination) => {
                    return Err(RumError::Validation(
                        [name.err(), destination.err()].into_iter().flatten().collect(),
                    ));
                }
            };

        Ok(Self {
            app_monitor_name,
            destination: normalize_metric_destination(&destination),
            destination_arn: optional("destination_arn"),
            iam_role_arn: optional("iam_role_arn"),
        })
    }

    /// Engine attributes; unset optional fields are left out
    pub fn to_attributes(&self) -> HashMap<String, Value> {
        let mut attributes = HashMap::new();
        attributes.insert(
            "app_monitor_name".to_string(),
            Value::String(self.app_monitor_name.clone()),
        );
        attributes.insert(
            "destination".to_string(),
            Value::String(self.destination.clone()),
        );
        if let Some(arn) = &self.destination_arn {
            attributes.insert("destination_arn".to_string(), Value::String(arn.clone()));
        }
        if let Some(arn) = &self.iam_role_arn {
            attributes.insert("iam_role_arn".to_string(), Value::String(arn.clone()));
        }
        attributes
    }

    fn put_input(&self) -> PutDestinationInput {
        PutDestinationInput {
            app_monitor_name: self.app_monitor_name.clone(),
            destination: self.destination.clone(),
            destination_arn: self.destination_arn.clone(),
            iam_role_arn: self.iam_role_arn.clone(),
        }
    }
}

/// Lifecycle operations for metrics destinations
pub struct MetricsDestinationAdapter<C> {
    client: C,
}

impl<C: RumApi> MetricsDestinationAdapter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create or overwrite a destination, then read it back
    ///
    /// `identifier` is `None` for a resource that was never created; the
    /// app monitor name becomes its identifier once the put succeeds. An
    /// existing identifier must equal `config.app_monitor_name`.
    /// Returns `None` only when an existing resource vanished right after
    /// the put; a new resource that cannot be read back is an error.
    pub async fn upsert(
        &self,
        config: &MetricsDestination,
        identifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> RumResult<Option<MetricsDestination>> {
        let name = config.app_monitor_name.as_str();
        if let Some(identifier) = identifier.filter(|identifier| *identifier != name) {
            return Err(RumError::Validation(vec![ValidationError {
                path: "app_monitor_name".to_string(),
                message: format!(
                    "cannot change in place (from '{}' to '{}')",
                    identifier, name
                ),
            }]));
        }

        debug!("Putting CloudWatch RUM Metrics Destination: {}", name);

        cancellable(
            cancel,
            "putting",
            name,
            self.client.put_destination(config.put_input()),
        )
        .await?
        .map_err(|source| RumError::remote("putting", name, source))?;

        let is_new = identifier.is_none();
        let identifier = identifier.unwrap_or(name);
        self.read(identifier, is_new, cancel).await
    }

    /// Read the destination attached to `identifier`
    ///
    /// When it is gone and `is_new` is false, returns `Ok(None)` so the
    /// caller can drop it from state.
    pub async fn read(
        &self,
        identifier: &str,
        is_new: bool,
        cancel: &CancellationToken,
    ) -> RumResult<Option<MetricsDestination>> {
        match find_metrics_destination_by_name(&self.client, identifier, cancel).await {
            Ok(record) => Ok(Some(MetricsDestination::from_record(identifier, record))),
            Err(err) if err.is_not_found() && !is_new => {
                warn!(
                    "CloudWatch RUM Metrics Destination {} not found, removing from state",
                    identifier
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the destination of kind `destination` attached to `identifier`
    ///
    /// A destination that is already gone counts as deleted.
    pub async fn delete(
        &self,
        identifier: &str,
        destination: &str,
        destination_arn: Option<&str>,
        cancel: &CancellationToken,
    ) -> RumResult<()> {
        let input = DeleteDestinationInput {
            app_monitor_name: identifier.to_string(),
            destination: normalize_metric_destination(destination),
            destination_arn: destination_arn.filter(|s| !s.is_empty()).map(String::from),
        };

        debug!("Deleting CloudWatch RUM Metrics Destination: {}", identifier);
        match cancellable(
            cancel,
            "deleting",
            identifier,
            self.client.delete_destination(input),
        )
        .await?
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(source) => Err(RumError::remote("deleting", identifier, source)),
        }
    }

    /// Adopt an existing destination by identifier
    pub async fn import(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> RumResult<MetricsDestination> {
        self.read(identifier, false, cancel)
            .await?
            .ok_or_else(|| RumError::NotFound {
                name: identifier.to_string(),
            })
    }
}
