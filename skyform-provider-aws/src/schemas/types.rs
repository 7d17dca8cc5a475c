//! AWS-specific type definitions

use std::sync::LazyLock;

use aws_sdk_rum::types::MetricDestination;
use regex::Regex;
use skyform_core::resource::Value;
use skyform_core::schema::AttributeType;

use crate::convert_enum_value;

/// Valid AWS regions (in AWS format with hyphens)
const VALID_REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "ca-central-1",
    "sa-east-1",
];

static ARN_PARTITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^aws(-[a-z]+)*$").expect("failed to create regex"));
static ARN_SERVICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("failed to create regex"));
static ARN_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d$").expect("failed to create regex"));
static ARN_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(aws|aws-managed|third-party|\d{12}|cw.{10})$").expect("failed to create regex")
});

/// AWS region type with custom validation
/// Accepts:
/// - DSL format: aws.Region.ap_northeast_1
/// - AWS string format: "ap-northeast-1"
pub fn aws_region() -> AttributeType {
    AttributeType::Custom {
        name: "Region".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            if let Value::String(s) = value {
                let normalized = normalize_region(s);
                if VALID_REGIONS.contains(&normalized.as_str()) {
                    Ok(())
                } else {
                    Err(format!(
                        "Invalid region '{}', expected one of: {} or DSL format like aws.Region.ap_northeast_1",
                        s,
                        VALID_REGIONS.join(", ")
                    ))
                }
            } else {
                Err("Expected string".to_string())
            }
        },
    }
}

/// Normalize region string to AWS format (hyphens)
/// - "aws.Region.ap_northeast_1" -> "ap-northeast-1"
/// - "ap_northeast_1" -> "ap-northeast-1"
/// - "ap-northeast-1" -> "ap-northeast-1"
pub fn normalize_region(s: &str) -> String {
    let region_part = if s.contains('.') {
        s.split('.').next_back().unwrap_or(s)
    } else {
        s
    };
    region_part.replace('_', "-")
}

/// DSL type name of metric destination kinds (aws.rum.MetricDestination.CloudWatch)
const METRIC_DESTINATION_TYPE: &str = "MetricDestination";

/// Metric destination kind, as defined by the RUM service model
///
/// Accepts the raw service value or its DSL form; nothing else.
pub fn metric_destination() -> AttributeType {
    AttributeType::Custom {
        name: METRIC_DESTINATION_TYPE.to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_metric_destination(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Reduce a DSL metric destination to the raw service value
pub fn normalize_metric_destination(value: &str) -> String {
    convert_enum_value(value, METRIC_DESTINATION_TYPE)
}

fn validate_metric_destination(value: &str) -> Result<(), String> {
    let valid = MetricDestination::values();
    if valid.contains(&normalize_metric_destination(value).as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Invalid metric destination '{}', expected one of: {}",
            value,
            valid.join(", ")
        ))
    }
}

/// ARN type (arn:partition:service:region:account:resource)
pub fn arn() -> AttributeType {
    AttributeType::Custom {
        name: "Arn".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_arn(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Validate ARN format
pub fn validate_arn(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }

    let parts: Vec<&str> = value.splitn(6, ':').collect();
    let [prefix, partition, service, region, account, resource] = parts.as_slice() else {
        return Err(format!("'{}' is an invalid ARN: not enough sections", value));
    };

    if *prefix != "arn" {
        return Err(format!("'{}' is an invalid ARN: must start with 'arn:'", value));
    }

    if !ARN_PARTITION.is_match(partition) {
        return Err(format!(
            "'{}' is an invalid ARN: invalid partition value '{}'",
            value, partition
        ));
    }
    if !ARN_SERVICE.is_match(service) {
        return Err(format!(
            "'{}' is an invalid ARN: invalid service value '{}'",
            value, service
        ));
    }
    if !region.is_empty() && !ARN_REGION.is_match(region) {
        return Err(format!(
            "'{}' is an invalid ARN: invalid region value '{}'",
            value, region
        ));
    }
    if !account.is_empty() && !ARN_ACCOUNT.is_match(account) {
        return Err(format!(
            "'{}' is an invalid ARN: invalid account ID value '{}'",
            value, account
        ));
    }
    if resource.is_empty() {
        return Err(format!("'{}' is an invalid ARN: missing resource", value));
    }

    Ok(())
}
