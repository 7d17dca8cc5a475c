//! Provider configuration

use std::collections::HashMap;

use skyform_core::resource::Value;
use skyform_core::schema::types::positive_int;

use crate::schemas::types::{aws_region, normalize_region};
use crate::validation::ValidationError;

/// Region used when the configuration does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration of the AWS provider block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// AWS region in AWS format (e.g., "ap-northeast-1")
    pub region: String,
    /// Maximum destinations per list page; service default when unset
    pub page_size: Option<i32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            page_size: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: normalize_region(&region.into()),
            page_size: None,
        }
    }

    /// Build from provider block attributes
    ///
    /// Accepts `region` in DSL format (aws.Region.ap_northeast_1) or AWS
    /// format, and an optional positive `page_size`.
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(value) = attributes.get("region") {
            aws_region().validate(value).map_err(|e| ValidationError {
                path: "region".to_string(),
                message: e.to_string(),
            })?;
            if let Value::String(region) = value {
                config.region = normalize_region(region);
            }
        }

        if let Some(value) = attributes.get("page_size") {
            positive_int().validate(value).map_err(|e| ValidationError {
                path: "page_size".to_string(),
                message: e.to_string(),
            })?;
            if let Value::Int(n) = value {
                let page_size = i32::try_from(*n).map_err(|_| ValidationError {
                    path: "page_size".to_string(),
                    message: format!("page_size {} is too large", n),
                })?;
                config.page_size = Some(page_size);
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_us_east_1() {
        let config = ProviderConfig::from_attributes(&HashMap::new()).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn region_in_dsl_format() {
        let attrs = HashMap::from([(
            "region".to_string(),
            Value::String("aws.Region.ap_northeast_1".to_string()),
        )]);
        let config = ProviderConfig::from_attributes(&attrs).unwrap();
        assert_eq!(config.region, "ap-northeast-1");
    }

    #[test]
    fn invalid_region_is_rejected() {
        let attrs = HashMap::from([(
            "region".to_string(),
            Value::String("mars-north-1".to_string()),
        )]);
        let err = ProviderConfig::from_attributes(&attrs).unwrap_err();
        assert_eq!(err.path, "region");
    }

    #[test]
    fn page_size_must_be_positive() {
        let attrs = HashMap::from([("page_size".to_string(), Value::Int(0))]);
        assert!(ProviderConfig::from_attributes(&attrs).is_err());

        let attrs = HashMap::from([("page_size".to_string(), Value::Int(25))]);
        let config = ProviderConfig::from_attributes(&attrs).unwrap();
        assert_eq!(config.page_size, Some(25));
    }

    #[test]
    fn page_size_must_be_an_integer() {
        let attrs = HashMap::from([(
            "page_size".to_string(),
            Value::String("25".to_string()),
        )]);
        let err = ProviderConfig::from_attributes(&attrs).unwrap_err();
        assert_eq!(err.path, "page_size");
        assert!(err.message.contains("Type mismatch"));
    }

    #[test]
    fn new_normalizes_region() {
        assert_eq!(ProviderConfig::new("eu_west_1").region, "eu-west-1");
    }
}
