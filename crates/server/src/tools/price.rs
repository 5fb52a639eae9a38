//! price_estimate tool implementation.

use kind_core::pricing::{FacilityType, region_of};
use kind_core::{Error, estimate_price};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the price_estimate tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PriceEstimateParams {
    /// Facility address (e.g., "서울특별시 종로구 ...").
    pub location: String,

    /// Facility type label from the registry (e.g., "대학병원", "공설").
    #[serde(default)]
    pub facility_type: Option<String>,
}

/// Output from the price_estimate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriceEstimateOutput {
    /// Matched pricing region; absent when national averages were used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub facility: FacilityType,
    pub min: u32,
    pub max: u32,
    /// Always "만원" (10,000 KRW).
    pub unit: String,
}

/// Implementation of the price_estimate tool.
pub async fn estimate_impl(params: PriceEstimateParams) -> Result<CallToolResult, McpError> {
    if params.location.len() > 1024 {
        return Err(Error::InvalidInput("location too long (max 1024 bytes)".into()).into());
    }

    let label = params.facility_type.as_deref().unwrap_or_default();
    let range = estimate_price(&params.location, label);

    json_result(&PriceEstimateOutput {
        region: region_of(&params.location).map(str::to_string),
        facility: FacilityType::classify(label),
        min: range.min,
        max: range.max,
        unit: "만원".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::parse_output;

    #[tokio::test]
    async fn test_estimate_seoul_hospital() {
        let params =
            PriceEstimateParams { location: "서울특별시 혜화동".into(), facility_type: Some("서울대학교병원".into()) };
        let result = estimate_impl(params).await.unwrap();
        let output: PriceEstimateOutput = parse_output(&result);

        assert_eq!(output.region.as_deref(), Some("서울"));
        assert_eq!(output.facility, FacilityType::Hospital);
        assert_eq!((output.min, output.max), (350, 800));
        assert_eq!(output.unit, "만원");
    }

    #[tokio::test]
    async fn test_estimate_default_region() {
        let params = PriceEstimateParams { location: "제주특별자치도".into(), facility_type: None };
        let result = estimate_impl(params).await.unwrap();
        let output: PriceEstimateOutput = parse_output(&result);

        assert!(output.region.is_none());
        assert_eq!(output.facility, FacilityType::Professional);
        assert_eq!((output.min, output.max), (150, 350));
    }

    #[tokio::test]
    async fn test_estimate_rejects_oversized_location() {
        let params = PriceEstimateParams { location: "가".repeat(400), facility_type: None };
        assert!(estimate_impl(params).await.is_err());
    }
}
