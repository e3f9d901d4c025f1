//! Filter engine
//!
//! Derives the visible product list from the live catalog, the active
//! category and the free-text search term. `visible` is pure and keeps
//! catalog order. `FilterEngine` memoizes the last result, keyed by the
//! override version plus both filter inputs.

use tracing::debug;

use super::catalog::Catalog;
use super::data::{CategoryFilter, Product};
use super::overrides::ImageOverrides;

/// True if `product` passes both the category and the search filter.
///
/// Search is a case-insensitive substring match on name or brand.
pub fn matches(product: &Product, category: CategoryFilter, search: &str) -> bool {
    if !category.matches(product.category) {
        return false;
    }
    if search.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    product.name.to_lowercase().contains(&needle) || product.brand.to_lowercase().contains(&needle)
}

/// Stable filter over `products`
pub fn visible(products: &[Product], category: CategoryFilter, search: &str) -> Vec<Product> {
    products
        .iter()
        .filter(|product| matches(product, category, search))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    catalog_version: u64,
    category: CategoryFilter,
    search: String,
}

/// Filter state for a session plus the memoized visible list
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    category: CategoryFilter,
    search: String,
    cache: Option<(CacheKey, Vec<Product>)>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Recompute the visible list unless the cached one still matches its inputs
    pub fn refresh(&mut self, catalog: &Catalog, overrides: &ImageOverrides) -> &[Product] {
        let key = CacheKey {
            catalog_version: overrides.version(),
            category: self.category,
            search: self.search.clone(),
        };

        let stale = match &self.cache {
            Some((cached, _)) => *cached != key,
            None => true,
        };

        if stale {
            let live: Vec<Product> = catalog
                .products()
                .iter()
                .map(|product| overrides.apply(product))
                .collect();
            let products = visible(&live, key.category, &key.search);
            debug!(
                category = key.category.id(),
                search = %key.search,
                count = products.len(),
                "visible products recomputed"
            );
            self.cache = Some((key, products));
        }

        self.visible()
    }

    /// The last computed visible list (empty before the first refresh)
    pub fn visible(&self) -> &[Product] {
        self.cache
            .as_ref()
            .map(|(_, products)| products.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Category, ImageRef};
    use proptest::prelude::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_all_and_empty_search_returns_everything() {
        let catalog = Catalog::seeded();

        let result = visible(catalog.products(), CategoryFilter::All, "");

        assert_eq!(result, catalog.products());
    }

    #[test]
    fn test_search_is_case_insensitive_on_brand() {
        let catalog = Catalog::seeded();

        let result = visible(catalog.products(), CategoryFilter::All, "abbott");

        assert_eq!(ids(&result), ["1"]);
        assert_eq!(
            ids(&visible(catalog.products(), CategoryFilter::All, "ABBOTT")),
            ["1"]
        );
    }

    #[test]
    fn test_search_matches_name() {
        let catalog = Catalog::seeded();

        let result = visible(catalog.products(), CategoryFilter::All, "有机");

        assert_eq!(ids(&result), ["1", "5"]);
    }

    #[test]
    fn test_category_then_search() {
        let catalog = Catalog::seeded();
        let toddler = CategoryFilter::Only(Category::Toddler);

        let result = visible(catalog.products(), toddler, "");
        assert_eq!(ids(&result), ["3", "6"]);

        let result = visible(catalog.products(), toddler, "惠氏");
        assert_eq!(ids(&result), ["3"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let catalog = Catalog::seeded();

        assert!(visible(catalog.products(), CategoryFilter::All, "goat milk").is_empty());
    }

    #[test]
    fn test_engine_reflects_overrides() {
        let catalog = Catalog::seeded();
        let mut overrides = ImageOverrides::new();
        let mut engine = FilterEngine::new();

        engine.refresh(&catalog, &overrides);
        assert_eq!(engine.visible()[0].image, catalog.products()[0].image);

        let edited = ImageRef::inline("image/png", b"meadow");
        overrides.commit("1", edited.clone());

        let products = engine.refresh(&catalog, &overrides);
        assert_eq!(products[0].image, edited);
    }

    #[test]
    fn test_engine_recomputes_on_filter_change() {
        let catalog = Catalog::seeded();
        let overrides = ImageOverrides::new();
        let mut engine = FilterEngine::new();

        assert_eq!(engine.refresh(&catalog, &overrides).len(), 6);

        engine.set_category(CategoryFilter::Only(Category::Special));
        assert_eq!(ids(engine.refresh(&catalog, &overrides)), ["4"]);

        engine.set_category(CategoryFilter::All);
        engine.set_search("Nestle");
        assert_eq!(ids(engine.refresh(&catalog, &overrides)), ["4"]);

        engine.set_search("");
        assert_eq!(engine.refresh(&catalog, &overrides).len(), 6);
    }

    fn category_filter() -> impl Strategy<Value = CategoryFilter> {
        prop::sample::select(CategoryFilter::TABS.to_vec())
    }

    proptest! {
        #[test]
        fn visible_is_an_ordered_subsequence(
            category in category_filter(),
            search in prop_oneof![
                Just(String::new()),
                Just("abbott".to_string()),
                Just("惠".to_string()),
                "[a-zA-Z ]{0,4}",
            ],
        ) {
            let catalog = Catalog::seeded();
            let result = visible(catalog.products(), category, &search);

            let mut remaining = catalog.products().iter();
            for product in &result {
                prop_assert!(remaining.any(|candidate| candidate == product));
            }
            for product in catalog.products() {
                prop_assert_eq!(
                    matches(product, category, &search),
                    result.contains(product)
                );
            }
        }
    }
}
