//! Carlcare brand-model-series feed
//!
//! Wire shape:
//!
//! ```json
//! {"list": [{"brand": "Tecno", "list": [{"list": [{"model": "Camon20"}]}]}]}
//! ```
//!
//! Brands contain series, series contain models. Missing or null `list`
//! arrays are treated as empty so one odd brand does not discard the feed.

use serde::Deserialize;

use super::Catalog;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub list: Option<Vec<FeedBrand>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedBrand {
    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub list: Option<Vec<FeedSeries>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSeries {
    #[serde(default)]
    pub list: Option<Vec<FeedModel>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedModel {
    /// Kept loose: anything other than a non-empty string is skipped
    #[serde(default)]
    pub model: Option<serde_json::Value>,
}

impl FeedModel {
    fn name(&self) -> Option<&str> {
        self.model
            .as_ref()
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl FeedResponse {
    /// Flatten brands -> series -> models into a catalog
    ///
    /// Every brand gets an entry before its models are appended, so a brand
    /// with no usable models still shows up with an empty list.
    pub fn into_catalog(self) -> Catalog {
        let mut catalog = Catalog::new();

        for brand_item in self.list.unwrap_or_default() {
            let brand = brand_item.brand.unwrap_or_default();
            let models = catalog.entry(&brand);

            for series in brand_item.list.iter().flatten() {
                for model_item in series.list.iter().flatten() {
                    if let Some(name) = model_item.name() {
                        models.push(name.to_string());
                    }
                }
            }
        }

        catalog
    }
}

/// Parse a feed body into a catalog
pub fn parse_feed(body: &str) -> Result<Catalog, serde_json::Error> {
    let response: FeedResponse = serde_json::from_str(body)?;
    Ok(response.into_catalog())
}
