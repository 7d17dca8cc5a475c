//! CloudWatch RUM client capability
//!
//! The adapter talks to the remote service only through [`RumApi`], so the
//! SDK-backed client can be swapped for an in-memory one in tests.

use std::future::Future;

use async_trait::async_trait;
use aws_sdk_rum::Client;
use aws_sdk_rum::error::{DisplayErrorContext, SdkError};
use aws_sdk_rum::types::{MetricDestination, MetricDestinationSummary};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::{RumError, RumResult};

/// Errors reported by the remote service
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The service reported `ResourceNotFoundException`
    #[error("ResourceNotFoundException: {0}")]
    ResourceNotFound(String),

    /// Any other failure (authorization, throttling, validation, network)
    #[error("{0}")]
    Service(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::ResourceNotFound(_))
    }
}

/// A metrics destination as reported by the list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_arn: Option<String>,
}

/// One page of `ListRumMetricsDestinations` output
///
/// Entries may be null on the wire; they are kept as `None` here and
/// skipped by the finder.
#[derive(Debug, Clone, Default)]
pub struct DestinationPage {
    pub destinations: Vec<Option<DestinationRecord>>,
    pub next_token: Option<String>,
}

/// Input of `PutRumMetricsDestination`
///
/// `None` means the field is left out of the request, not sent empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDestinationInput {
    pub app_monitor_name: String,
    pub destination: String,
    pub destination_arn: Option<String>,
    pub iam_role_arn: Option<String>,
}

/// Input of `DeleteRumMetricsDestination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDestinationInput {
    pub app_monitor_name: String,
    pub destination: String,
    pub destination_arn: Option<String>,
}

/// Remote operations needed to manage metrics destinations
#[async_trait]
pub trait RumApi: Send + Sync {
    /// Create or overwrite a metrics destination
    async fn put_destination(&self, input: PutDestinationInput) -> Result<(), ApiError>;

    /// Remove a metrics destination
    async fn delete_destination(&self, input: DeleteDestinationInput) -> Result<(), ApiError>;

    /// Fetch one page of destinations for an app monitor
    async fn list_destinations(
        &self,
        app_monitor_name: &str,
        next_token: Option<&str>,
    ) -> Result<DestinationPage, ApiError>;
}

/// Race a remote call against the caller's cancellation token
///
/// The outer result carries cancellation; the inner one is the call's own
/// outcome, left for the caller to classify.
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &'static str,
    identifier: &str,
    call: F,
) -> RumResult<Result<T, ApiError>>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RumError::Cancelled {
            operation,
            identifier: identifier.to_string(),
        }),
        result = call => Ok(result),
    }
}

/// `RumApi` backed by the AWS SDK
pub struct AwsRumClient {
    client: Client,
    page_size: Option<i32>,
}

impl AwsRumClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page_size: None,
        }
    }

    /// Limit the number of destinations returned per list page
    pub fn with_page_size(mut self, page_size: Option<i32>) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl RumApi for AwsRumClient {
    async fn put_destination(&self, input: PutDestinationInput) -> Result<(), ApiError> {
        self.client
            .put_rum_metrics_destination()
            .app_monitor_name(input.app_monitor_name)
            .destination(MetricDestination::from(input.destination.as_str()))
            .set_destination_arn(input.destination_arn)
            .set_iam_role_arn(input.iam_role_arn)
            .send()
            .await
            .map_err(|e| classify(e, |_| false))?;
        Ok(())
    }

    async fn delete_destination(&self, input: DeleteDestinationInput) -> Result<(), ApiError> {
        self.client
            .delete_rum_metrics_destination()
            .app_monitor_name(input.app_monitor_name)
            .destination(MetricDestination::from(input.destination.as_str()))
            .set_destination_arn(input.destination_arn)
            .send()
            .await
            .map_err(|e| classify(e, |err| err.is_resource_not_found_exception()))?;
        Ok(())
    }

    async fn list_destinations(
        &self,
        app_monitor_name: &str,
        next_token: Option<&str>,
    ) -> Result<DestinationPage, ApiError> {
        let output = self
            .client
            .list_rum_metrics_destinations()
            .app_monitor_name(app_monitor_name)
            .set_next_token(next_token.map(str::to_string))
            .set_max_results(self.page_size)
            .send()
            .await
            .map_err(|e| classify(e, |err| err.is_resource_not_found_exception()))?;

        let destinations = output
            .destinations()
            .iter()
            .map(record_from_summary)
            .collect();

        Ok(DestinationPage {
            destinations,
            next_token: output.next_token().map(String::from),
        })
    }
}

/// A summary without a destination kind is kept as a null entry
fn record_from_summary(summary: &MetricDestinationSummary) -> Option<DestinationRecord> {
    let Some(destination) = summary.destination() else {
        warn!("Skipping CloudWatch RUM Metrics Destination summary without a destination");
        return None;
    };
    Some(DestinationRecord {
        destination: destination.as_str().to_string(),
        destination_arn: summary.destination_arn().map(String::from),
        iam_role_arn: summary.iam_role_arn().map(String::from),
    })
}

/// Map an SDK error onto `ApiError`, keeping the full error context as text
fn classify<E, R>(err: SdkError<E, R>, is_not_found: impl FnOnce(&E) -> bool) -> ApiError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    if err.as_service_error().is_some_and(is_not_found) {
        ApiError::ResourceNotFound(message)
    } else {
        ApiError::Service(message)
    }
}
