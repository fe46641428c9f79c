//! Catalog comparison
//!
//! Only additions are tracked. A brand that disappears from the feed, or a
//! model removed from a brand, produces no entry.

use super::Catalog;

/// Newly seen models per brand, in the current catalog's brand order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    new_models: Catalog,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.new_models.is_empty()
    }

    /// Number of brands with new models
    pub fn len(&self) -> usize {
        self.new_models.len()
    }

    pub fn model_count(&self) -> usize {
        self.new_models.model_count()
    }

    pub fn get(&self, brand: &str) -> Option<&[String]> {
        self.new_models.get(brand)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.new_models.iter()
    }
}

/// Models present in `current` but not in `previous`, per brand
///
/// Membership is exact string equality against the previous list for the same
/// brand. Brands without new models are omitted.
pub fn diff(current: &Catalog, previous: &Catalog) -> DiffResult {
    let mut new_models = Catalog::new();

    for (brand, models) in current.iter() {
        let seen = previous.get(brand).unwrap_or_default();
        tracing::debug!("Checking models for brand {}", brand);

        let added: Vec<String> = models
            .iter()
            .filter(|model| !seen.contains(*model))
            .cloned()
            .collect();

        if !added.is_empty() {
            tracing::debug!("{} new models found for {}", added.len(), brand);
            new_models.insert(brand, added);
        }
    }

    DiffResult { new_models }
}
