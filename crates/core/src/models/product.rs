//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;
use crate::{CategoryId, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Soft reference; not checked when the product is written.
    pub category_id: CategoryId,
    #[serde(default)]
    pub stock: u32,
    /// Image URLs, the first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    /// Stock keeping unit, unique across products.
    pub sku: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: CategoryId,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    pub sku: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Partial product update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category_id: Option<CategoryId>,
    pub stock: Option<u32>,
    pub images: Option<Vec<String>>,
    pub sku: Option<String>,
    pub featured: Option<bool>,
    pub features: Option<Vec<String>>,
}

/// A product joined with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

impl Product {
    /// Apply a partial update in place.
    pub fn apply(&mut self, update: ProductUpdate) {
        let ProductUpdate {
            name,
            description,
            price,
            category_id,
            stock,
            images,
            sku,
            featured,
            features,
        } = update;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = category_id {
            self.category_id = v;
        }
        if let Some(v) = stock {
            self.stock = v;
        }
        if let Some(v) = images {
            self.images = v;
        }
        if let Some(v) = sku {
            self.sku = v;
        }
        if let Some(v) = featured {
            self.featured = v;
        }
        if let Some(v) = features {
            self.features = v;
        }
    }

    /// Whether the product can currently be shipped.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_defaults() {
        let new: NewProduct = serde_json::from_str(
            r#"{"name":"Plain","description":"Lightly salted","price":"199","categoryId":1,"sku":"PL001"}"#,
        )
        .unwrap();
        assert_eq!(new.stock, 0);
        assert!(new.images.is_empty());
        assert!(!new.featured);
        assert!(new.features.is_empty());
    }

    #[test]
    fn test_with_category_flattens() {
        let product = Product {
            id: ProductId::new(1),
            name: "Plain".to_string(),
            description: "Lightly salted".to_string(),
            price: Price::parse("199").unwrap(),
            category_id: CategoryId::new(2),
            stock: 3,
            images: vec![],
            sku: "PL001".to_string(),
            featured: false,
            features: vec![],
            created_at: Utc::now(),
        };
        let category = Category {
            id: CategoryId::new(2),
            name: "Organic".to_string(),
            slug: "organic".to_string(),
            description: None,
            thumbnail: None,
        };
        let json = serde_json::to_value(ProductWithCategory { product, category }).unwrap();
        assert_eq!(json["sku"], "PL001");
        assert_eq!(json["categoryId"], 2);
        assert_eq!(json["category"]["slug"], "organic");
    }
}
