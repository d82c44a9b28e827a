//! Provider and validation-service availability, as reported to operators.

use alphaleads_core::AppConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Provider,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub name: &'static str,
    pub kind: ServiceKind,
    pub enabled: bool,
    pub description: &'static str,
    /// Setup hint, only present while the service is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'static str>,
}

fn status(
    name: &'static str,
    kind: ServiceKind,
    enabled: bool,
    description: &'static str,
    recommendation: &'static str,
) -> SourceStatus {
    SourceStatus {
        name,
        kind,
        enabled,
        description,
        recommendation: (!enabled).then_some(recommendation),
    }
}

/// Every data provider followed by every validation service.
#[must_use]
pub fn source_statuses(config: &AppConfig) -> Vec<SourceStatus> {
    vec![
        status(
            "yelp",
            ServiceKind::Provider,
            config.yelp_api_key.is_some(),
            "Yelp Fusion local business search (US only)",
            "Set YELP_API_KEY to enable Yelp business search",
        ),
        status(
            "openstreetmap",
            ServiceKind::Provider,
            config.osm_enabled,
            "OpenStreetMap businesses via Overpass, geocoded with Nominatim",
            "Set ALPHALEADS_OSM_ENABLED=true to query OpenStreetMap",
        ),
        status(
            "sec_edgar",
            ServiceKind::Provider,
            config.sec_enabled,
            "SEC EDGAR public company registry",
            "Set ALPHALEADS_SEC_ENABLED=true to include public companies",
        ),
        status(
            "hunter",
            ServiceKind::Validation,
            config.hunter_api_key.is_some(),
            "Hunter.io email deliverability checks",
            "Set HUNTER_IO_API_KEY for verified email deliverability",
        ),
        status(
            "clearbit",
            ServiceKind::Validation,
            config.clearbit_api_key.is_some(),
            "Clearbit company verification and enrichment",
            "Set CLEARBIT_API_KEY to verify businesses",
        ),
    ]
}
