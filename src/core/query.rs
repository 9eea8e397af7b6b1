use crate::utils::error::{ExplorerError, Result};
use url::Url;

/// Columns exposed by the tracking-device table, in select order.
pub const TRACKING_COLUMNS: [&str; 4] = [
    "bird_name",
    "device_info_serial",
    "sex",
    "scientific_name",
];

/// The one statement this tool issues. A static literal, so no quoting or
/// parameter binding is involved.
pub const TRACKING_QUERY: &str =
    "SELECT bird_name, device_info_serial, sex, scientific_name from bird_tracking_devices";

/// 建立 SQL API 的查詢 URL
pub fn sql_api_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| ExplorerError::InvalidConfigValueError {
        field: "api_endpoint".to_string(),
        value: endpoint.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    {
        let mut segments =
            url.path_segments_mut()
                .map_err(|_| ExplorerError::InvalidConfigValueError {
                    field: "api_endpoint".to_string(),
                    value: endpoint.to_string(),
                    reason: "URL cannot be a base".to_string(),
                })?;
        segments.pop_if_empty().extend(["api", "v2", "sql"]);
    }

    url.query_pairs_mut().append_pair("q", TRACKING_QUERY);
    Ok(url)
}
