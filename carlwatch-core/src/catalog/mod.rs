//! Carlcare catalog model and the pieces that move it around
//!
//! # Overview
//!
//! A [`Catalog`] maps a brand name to the ordered list of model names seen for
//! that brand. Brand order is the order in which brands were first inserted,
//! which is the order of the remote feed (or of the JSON document on load).
//!
//! ```text
//! Carlcare feed (HTTP GET)
//!     │
//!     ▼
//! fetcher + feed  ──►  Catalog  ──►  models.json          (every run)
//!                         │
//!                         ▼
//!   previous_models.json ──► diff ──► DiffResult ──► notifier
//! ```

mod compare;
mod feed;
mod fetcher;
mod snapshot;

pub use compare::{diff, DiffResult};
pub use feed::{parse_feed, FeedBrand, FeedModel, FeedResponse, FeedSeries};
pub use fetcher::{CatalogSource, HttpCatalogSource};
pub use snapshot::SnapshotStore;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Brand name to model names, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    brands: Vec<(String, Vec<String>)>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, brand: &str) -> Option<usize> {
        self.brands.iter().position(|(name, _)| name == brand)
    }

    /// Models recorded for a brand
    pub fn get(&self, brand: &str) -> Option<&[String]> {
        self.position(brand).map(|pos| self.brands[pos].1.as_slice())
    }

    pub fn contains_brand(&self, brand: &str) -> bool {
        self.position(brand).is_some()
    }

    /// Model list for a brand, appending an empty entry if the brand is new
    pub fn entry(&mut self, brand: &str) -> &mut Vec<String> {
        let pos = match self.position(brand) {
            Some(pos) => pos,
            None => {
                self.brands.push((brand.to_string(), Vec::new()));
                self.brands.len() - 1
            }
        };
        &mut self.brands[pos].1
    }

    /// Append a model to a brand's list
    pub fn push(&mut self, brand: &str, model: impl Into<String>) {
        self.entry(brand).push(model.into());
    }

    /// Replace a brand's list, keeping the brand's original position
    pub fn insert(&mut self, brand: impl Into<String>, models: Vec<String>) {
        let brand = brand.into();
        match self.position(&brand) {
            Some(pos) => self.brands[pos].1 = models,
            None => self.brands.push((brand, models)),
        }
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.brands
            .iter()
            .map(|(name, models)| (name.as_str(), models.as_slice()))
    }

    /// Number of brands
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    /// Total number of model entries across all brands (duplicates included)
    pub fn model_count(&self) -> usize {
        self.brands.iter().map(|(_, models)| models.len()).sum()
    }
}

impl<B: Into<String>> FromIterator<(B, Vec<String>)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (B, Vec<String>)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for (brand, models) in iter {
            catalog.insert(brand, models);
        }
        catalog
    }
}

impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.brands.len()))?;
        for (brand, models) in &self.brands {
            map.serialize_entry(brand, models)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping brand names to lists of model names")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut catalog = Catalog::new();
                // A repeated key keeps the last value, at the first key's position
                while let Some((brand, models)) = map.next_entry::<String, Vec<String>>()? {
                    catalog.insert(brand, models);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entry_creates_empty_brand() {
        let mut catalog = Catalog::new();
        catalog.entry("Itel");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Itel"), Some(&[] as &[String]));
        assert_eq!(catalog.model_count(), 0);
    }

    #[test]
    fn test_push_preserves_order_and_duplicates() {
        let mut catalog = Catalog::new();
        catalog.push("Tecno", "Spark 10");
        catalog.push("Infinix", "Hot 30");
        catalog.push("Tecno", "Camon 20");
        catalog.push("Tecno", "Spark 10");

        assert_eq!(catalog.brands().collect::<Vec<_>>(), vec!["Tecno", "Infinix"]);
        assert_eq!(
            catalog.get("Tecno").unwrap(),
            &models(&["Spark 10", "Camon 20", "Spark 10"])[..]
        );
        assert_eq!(catalog.model_count(), 4);
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let catalog: Catalog = vec![
            ("Tecno", models(&["Camon20"])),
            ("Infinix", models(&[])),
            ("Itel", models(&["A70", "P40"])),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(
            json,
            r#"{"Tecno":["Camon20"],"Infinix":[],"Itel":["A70","P40"]}"#
        );
    }

    #[test]
    fn test_deserializes_in_document_order() {
        let catalog: Catalog =
            serde_json::from_str(r#"{"Zeta": ["b"], "Alpha": ["a"], "Mid": []}"#).unwrap();
        assert_eq!(
            catalog.brands().collect::<Vec<_>>(),
            vec!["Zeta", "Alpha", "Mid"]
        );
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let catalog: Catalog =
            serde_json::from_str(r#"{"Tecno": ["old"], "Itel": [], "Tecno": ["new"]}"#).unwrap();
        assert_eq!(catalog.brands().collect::<Vec<_>>(), vec!["Tecno", "Itel"]);
        assert_eq!(catalog.get("Tecno").unwrap(), &models(&["new"])[..]);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(serde_json::from_str::<Catalog>(r#"["Tecno"]"#).is_err());
        assert!(serde_json::from_str::<Catalog>(r#"{"Tecno": "Camon20"}"#).is_err());
    }
}
