use super::data::{Category, CategoryFilter, ImageRef, Product};

/// The Catalog holds the immutable seed products offered by the store.
///
/// Products are created once at startup and never mutated. Image
/// replacements live in [`super::overrides::ImageOverrides`].
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from an explicit product list
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Create the catalog with the store's built-in product range
    pub fn seeded() -> Self {
        let products = vec![
            seed(
                "1",
                "有机赋儿",
                "雅培 (Abbott)",
                "1段 (0-6个月)",
                368,
                "100%有机奶源，全乳糖配方，助力宝宝自然成长。",
                "https://picsum.photos/seed/milk1/400/400",
                Category::Infant,
            ),
            seed(
                "2",
                "黄金成长",
                "美赞臣 (Mead Johnson)",
                "2段 (6-12个月)",
                328,
                "含有DHA和MFGM乳脂球膜，支持大脑发育和免疫。",
                "https://picsum.photos/seed/milk2/400/400",
                Category::Infant,
            ),
            seed(
                "3",
                "启赋",
                "惠氏 (Wyeth)",
                "3段 (12-36个月)",
                398,
                "富含OPO结构脂，亲和人体，促进钙质吸收。",
                "https://picsum.photos/seed/milk3/400/400",
                Category::Toddler,
            ),
            seed(
                "4",
                "舒尔滋",
                "雀巢 (Nestle)",
                "特殊配方 (过敏适用)",
                450,
                "深度水解蛋白，针对敏感体质宝宝设计。",
                "https://picsum.photos/seed/milk4/400/400",
                Category::Special,
            ),
            seed(
                "5",
                "优萃有机",
                "飞鹤 (Feihe)",
                "1段",
                298,
                "新鲜奶源，专为中国宝宝体质研发。",
                "https://picsum.photos/seed/milk5/400/400",
                Category::Infant,
            ),
            seed(
                "6",
                "爱他美卓萃",
                "爱他美 (Aptamil)",
                "3段",
                345,
                "独有Nu-MMO低聚糖，支持肠道健康。",
                "https://picsum.photos/seed/milk6/400/400",
                Category::Toddler,
            ),
        ];

        Self::new(products)
    }

    /// All products in catalog order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by identifier
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Category tabs offered by the store, "all" first
    pub fn categories(&self) -> &'static [CategoryFilter] {
        &CategoryFilter::TABS
    }
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    brand: &str,
    stage: &str,
    price: u32,
    description: &str,
    image_url: &str,
    category: Category,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        stage: stage.to_string(),
        price,
        description: description.to_string(),
        image: ImageRef::new(image_url),
        category,
    }
}
