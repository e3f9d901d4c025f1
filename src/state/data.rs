//! Shared data structures for the storefront
//!
//! These structs represent the data model that flows between
//! the session state, the image edit gateway and the UI layer.

use base64::Engine;
use std::fmt;

/// Coarse product grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Infant,
    Toddler,
    Special,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Infant, Category::Toddler, Category::Special];

    /// Stable identifier (e.g., "infant")
    pub fn id(self) -> &'static str {
        match self {
            Category::Infant => "infant",
            Category::Toddler => "toddler",
            Category::Special => "special",
        }
    }

    /// Display label shown on the category tabs
    pub fn label(self) -> &'static str {
        match self {
            Category::Infant => "婴儿",
            Category::Toddler => "幼儿",
            Category::Special => "特殊",
        }
    }
}

/// The active category selection.
///
/// `All` is the "all" sentinel and matches every product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Tabs in display order
    pub const TABS: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Infant),
        CategoryFilter::Only(Category::Toddler),
        CategoryFilter::Only(Category::Special),
    ];

    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(only) => only == category,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.id(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "全部",
            CategoryFilter::Only(category) => category.label(),
        }
    }

    /// Parse a category identifier, accepting the "all" sentinel
    pub fn from_id(id: &str) -> Option<Self> {
        if id == "all" {
            return Some(CategoryFilter::All);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.id() == id)
            .map(CategoryFilter::Only)
    }
}

/// Reference to a product image.
///
/// Either a fetchable URL or an inline `data:<mime>;base64,<payload>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Build an inline data reference from raw image bytes
    pub fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for embedded `data:` references that need no network fetch
    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Inline payloads can be megabytes long; only show the header
        if self.is_inline() {
            let header = self.0.split(',').next().unwrap_or_default();
            write!(f, "{header},…")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Represents a single purchasable product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique product identifier
    pub id: String,
    pub name: String,
    /// Brand label (e.g., "雅培 (Abbott)")
    pub brand: String,
    /// Free-text age/use descriptor (e.g., "1段 (0-6个月)")
    pub stage: String,
    /// Price in whole currency units
    pub price: u32,
    pub description: String,
    pub image: ImageRef,
    pub category: Category,
}

/// A product snapshot held in the cart together with its quantity
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: Product,
    /// Always >= 1 while the item is in the cart
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> u64 {
        u64::from(self.product.price) * u64::from(self.quantity)
    }
}
