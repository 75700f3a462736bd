//! Client for the elevation statistics endpoint.

use galileo_types::geo::GeoPoint;
use serde_json::Value;
use thiserror::Error;

use crate::layers::API_ROOT;

/// Geographic extent of a drawn selection, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Builds the box from two opposite corners given in any order.
    pub fn from_corners(a: &impl GeoPoint<Num = f64>, b: &impl GeoPoint<Num = f64>) -> Self {
        Self {
            west: a.lon().min(b.lon()),
            south: a.lat().min(b.lat()),
            east: a.lon().max(b.lon()),
            north: a.lat().max(b.lat()),
        }
    }
}

/// Parameters of a statistics request, captured at the moment the selection
/// rectangle is completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsQuery {
    /// Integer zoom level of the map view at the time of selection.
    pub zoom: u32,
    /// Extent of the selection.
    pub bbox: BoundingBox,
}

impl StatsQuery {
    /// Request URL: zoom level, then the corners as `west,south,east,north`.
    pub fn url(&self) -> String {
        let BoundingBox {
            west,
            south,
            east,
            north,
        } = self.bbox;
        format!(
            "{API_ROOT}/elevation-statistics/{}/{west},{south},{east},{north}",
            self.zoom
        )
    }
}

/// Error returned by [`StatsClient::fetch`].
#[derive(Debug, Error)]
pub enum StatsError {
    /// The request failed, the server returned an error status, or the body
    /// was not valid JSON.
    #[error("statistics request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the statistics endpoint.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http_client: reqwest::Client,
}

impl StatsClient {
    /// Creates a client with the viewer's user agent.
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent("terrain-viewer/0.1")
            .build()
            .expect("failed to create an http client");
        Self { http_client }
    }

    /// Requests elevation statistics for the given selection.
    ///
    /// The payload is kept as arbitrary JSON. The backend currently returns
    /// min/max/count/sum/mean/stddev, but the viewer does not rely on that.
    pub async fn fetch(&self, query: &StatsQuery) -> Result<Value, StatsError> {
        use reqwest::header::{ACCEPT, CONTENT_TYPE, ORIGIN};

        let stats: Value = self
            .http_client
            .get(query.url())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(ORIGIN, "http://localhost:3000")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        log::info!("Received elevation statistics: {stats}");
        Ok(stats)
    }
}

impl Default for StatsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use galileo_types::latlon;

    use super::*;

    #[test]
    fn url_renders_whole_degrees_without_fraction() {
        let query = StatsQuery {
            zoom: 5,
            bbox: BoundingBox::from_corners(&latlon!(48.0, 2.0), &latlon!(49.0, 3.0)),
        };

        assert_eq!(
            query.url(),
            "http://localhost:8080/api/v1/elevation-statistics/5/2,48,3,49"
        );
    }

    #[test]
    fn url_keeps_fractional_coordinates() {
        let query = StatsQuery {
            zoom: 11,
            bbox: BoundingBox::from_corners(&latlon!(48.5, 2.25), &latlon!(48.75, 2.5)),
        };

        assert_eq!(
            query.url(),
            "http://localhost:8080/api/v1/elevation-statistics/11/2.25,48.5,2.5,48.75"
        );
    }

    #[test]
    fn corners_are_normalized_regardless_of_drag_direction() {
        let expected = BoundingBox {
            west: -3.0,
            south: 40.0,
            east: 2.0,
            north: 49.0,
        };

        // NE to SW drag.
        assert_eq!(
            BoundingBox::from_corners(&latlon!(49.0, 2.0), &latlon!(40.0, -3.0)),
            expected
        );
        // NW to SE drag.
        assert_eq!(
            BoundingBox::from_corners(&latlon!(49.0, -3.0), &latlon!(40.0, 2.0)),
            expected
        );
    }
}
