//! Catalog of supported assets with search filtering

use crate::{constants::DEFAULT_ASSETS, error::DashboardError, types::Asset};
use std::collections::HashSet;

/// Ordered, immutable list of assets the dashboard can show
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    assets: Vec<Asset>,
}

impl AssetCatalog {
    /// Builds a catalog from an ordered list of assets
    ///
    /// Ids must be unique, non-empty and lowercase.
    pub fn new(assets: Vec<Asset>) -> Result<Self, DashboardError> {
        let mut seen = HashSet::new();
        for asset in &assets {
            if asset.id.is_empty() || asset.id != asset.id.to_lowercase() {
                return Err(DashboardError::InvalidCatalog(format!(
                    "asset id '{}' is not canonical lowercase",
                    asset.id
                )));
            }
            if !seen.insert(asset.id.as_str()) {
                return Err(DashboardError::InvalidCatalog(format!(
                    "duplicate asset id '{}'",
                    asset.id
                )));
            }
        }

        Ok(Self { assets })
    }

    /// Returns the assets matching `query`, in catalog order
    ///
    /// A blank query returns everything. A query matching nothing also returns
    /// everything, so the selector never renders empty.
    pub fn filter(&self, query: &str) -> Vec<Asset> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.assets.clone();
        }

        let matches: Vec<Asset> = self
            .assets
            .iter()
            .filter(|a| {
                a.id.to_lowercase().contains(&needle)
                    || a.display_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        if matches.is_empty() {
            tracing::debug!(query, "No assets matched, showing full catalog");
            return self.assets.clone();
        }

        matches
    }

    /// Looks up an asset by id
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All asset ids, in catalog order
    pub fn ids(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.id.clone()).collect()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS
                .iter()
                .map(|(id, name)| Asset::new(*id, *name))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_full_catalog() {
        let catalog = AssetCatalog::default();
        assert_eq!(
            ids(&catalog.filter("")),
            vec!["bitcoin", "ethereum", "ripple", "litecoin"]
        );
        assert_eq!(catalog.filter("   ").len(), 4);
    }

    #[test]
    fn test_filter_matches_id_case_insensitively() {
        let catalog = AssetCatalog::default();
        assert_eq!(ids(&catalog.filter("COIN")), vec!["bitcoin", "litecoin"]);
    }

    #[test]
    fn test_filter_matches_display_name() {
        let catalog = AssetCatalog::default();
        assert_eq!(ids(&catalog.filter("xrp")), vec!["ripple"]);
    }

    #[test]
    fn test_filter_preserves_catalog_order() {
        let catalog = AssetCatalog::new(vec![
            Asset::new("zcash", "Zcash"),
            Asset::new("cardano", "Cardano"),
            Asset::new("chainlink", "Chainlink"),
        ])
        .unwrap();
        assert_eq!(ids(&catalog.filter("a")), vec!["zcash", "cardano", "chainlink"]);
        assert_eq!(ids(&catalog.filter("c")), vec!["zcash", "cardano", "chainlink"]);
        assert_eq!(ids(&catalog.filter("link")), vec!["chainlink"]);
    }

    #[test]
    fn test_no_match_falls_back_to_full_catalog() {
        let catalog = AssetCatalog::default();
        assert_eq!(catalog.filter("dogecoin"), catalog.assets().to_vec());
    }

    #[test]
    fn test_get_and_contains() {
        let catalog = AssetCatalog::default();
        assert_eq!(catalog.get("ripple").unwrap().display_name, "XRP");
        assert!(catalog.contains("litecoin"));
        assert!(!catalog.contains("Bitcoin"));
    }

    #[test]
    fn test_new_rejects_duplicates_and_uppercase() {
        let dup = AssetCatalog::new(vec![
            Asset::new("bitcoin", "Bitcoin"),
            Asset::new("bitcoin", "BTC"),
        ]);
        assert!(matches!(dup, Err(DashboardError::InvalidCatalog(_))));

        let upper = AssetCatalog::new(vec![Asset::new("Bitcoin", "Bitcoin")]);
        assert!(matches!(upper, Err(DashboardError::InvalidCatalog(_))));
    }
}
