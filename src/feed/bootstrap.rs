//! One-shot historical data fetch.

use crate::errors::Result;
use crate::models::DataPoint;

/// Fetch the bootstrap series from the historical-data endpoint.
///
/// Single attempt by design: historical data is a convenience, not a
/// guaranteed contract. Any transport error, non-2xx status, or unparseable
/// body is reported once and never retried.
pub async fn fetch_initial(client: &reqwest::Client, url: &str) -> Result<Vec<DataPoint>> {
    let points = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<DataPoint>>()
        .await?;
    Ok(points)
}
