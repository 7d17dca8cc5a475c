//! CloudWatch RUM schema definitions

use skyform_core::schema::{AttributeSchema, ResourceSchema, types as core_types};

use super::types;

/// Resource type name of a RUM metrics destination
pub const METRICS_DESTINATION: &str = "rum.metrics_destination";

/// Returns the schema for RUM metrics destinations
pub fn metrics_destination_schema() -> ResourceSchema {
    ResourceSchema::new(METRICS_DESTINATION)
        .with_description("Where a CloudWatch RUM app monitor sends its extended metrics")
        .attribute(
            AttributeSchema::new("app_monitor_name", core_types::non_empty_string())
                .required()
                .with_provider_name("AppMonitorName")
                .with_description("Name of the app monitor; identifies the destination"),
        )
        .attribute(
            AttributeSchema::new("destination", types::metric_destination())
                .required()
                .with_provider_name("Destination")
                .with_description("Metric destination kind"),
        )
        .attribute(
            AttributeSchema::new("destination_arn", types::arn())
                .with_provider_name("DestinationArn")
                .with_description("ARN of the Evidently experiment receiving the metrics"),
        )
        .attribute(
            AttributeSchema::new("iam_role_arn", types::arn())
                .with_provider_name("IamRoleArn")
                .with_description("ARN of the role RUM assumes to write the metrics"),
        )
        .strict()
}
