//! Spatial reference id lookup from well-known text.

use serde::Deserialize;
use tracing::debug;

use kml_common::{ConvertError, ConvertResult};

const SEARCH_URL: &str = "http://prj2epsg.org/search.json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    codes: Vec<SearchCode>,
}

#[derive(Debug, Deserialize)]
struct SearchCode {
    code: String,
}

/// Resolve the EPSG code for a well-known-text spatial reference definition
/// through the prj2epsg search service.
pub async fn lookup_spatial_reference_id(well_known_text: &str) -> ConvertResult<u32> {
    let client = reqwest::Client::new();

    let response = client
        .get(SEARCH_URL)
        .query(&[("mode", "wkt"), ("terms", well_known_text)])
        .send()
        .await
        .map_err(|e| ConvertError::SridLookup(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(ConvertError::SridLookup(format!(
            "service returned {}",
            response.status()
        )));
    }

    let body: SearchResponse = response
        .json()
        .await
        .map_err(|e| ConvertError::SridLookup(format!("unexpected response: {e}")))?;

    let code = body
        .codes
        .first()
        .ok_or_else(|| ConvertError::SridLookup("no matching EPSG code".to_string()))?;

    debug!(code = %code.code, "resolved spatial reference");

    code.code
        .parse()
        .map_err(|_| ConvertError::SridLookup(format!("non-numeric EPSG code '{}'", code.code)))
}
