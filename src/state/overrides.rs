use std::collections::HashMap;

use super::catalog::Catalog;
use super::data::{ImageRef, Product};

/// Per-product image replacements, layered over the seed catalog.
///
/// Overrides live for the process lifetime only. Every commit bumps
/// `version`, which downstream caches use as part of their key.
#[derive(Debug, Clone, Default)]
pub struct ImageOverrides {
    images: HashMap<String, ImageRef>,
    version: u64,
}

impl ImageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the image used for `product_id` in all subsequent catalog reads
    pub fn commit(&mut self, product_id: &str, image: ImageRef) {
        tracing::info!(product = product_id, image = %image, "image override committed");
        self.images.insert(product_id.to_string(), image);
        self.version += 1;
    }

    /// The override for a product, if one was committed
    pub fn get(&self, product_id: &str) -> Option<&ImageRef> {
        self.images.get(product_id)
    }

    /// Current image for a product: the override if present, else the seed image.
    /// `None` when the catalog has no such product.
    pub fn current<'a>(&'a self, catalog: &'a Catalog, product_id: &str) -> Option<&'a ImageRef> {
        let product = catalog.get(product_id)?;
        Some(self.get(product_id).unwrap_or(&product.image))
    }

    /// A copy of `product` with its override applied
    pub fn apply(&self, product: &Product) -> Product {
        let mut live = product.clone();
        if let Some(image) = self.get(&product.id) {
            live.image = image.clone();
        }
        live
    }

    /// Changes every time an override is committed
    pub fn version(&self) -> u64 {
        self.version
    }
}
