//! Sample catalog written to a fresh datastore.

use chrono::{DateTime, Utc};
use makhana_core::models::{NewCategory, NewProduct};
use makhana_core::{CategoryId, Price};

use crate::database::Database;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: u32,
    category: i32,
    sku: &'static str,
    featured: bool,
    stock: u32,
    images: &'static [&'static str],
    features: &'static [&'static str],
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "Premium Makhana",
        "premium-makhana",
        "Premium quality makhana varieties with superior taste and texture",
    ),
    (
        "Organic Makhana",
        "organic-makhana",
        "Organically grown makhana free from chemicals and pesticides",
    ),
    (
        "Flavored Makhana",
        "flavored-makhana",
        "Delicious makhana with traditional Indian spices and seasonings",
    ),
    (
        "Roasted Makhana",
        "roasted-makhana",
        "Perfectly roasted makhana with crispy texture and rich flavor",
    ),
    (
        "Seasoned Makhana",
        "seasoned-makhana",
        "Expertly seasoned makhana with traditional spices and herbs",
    ),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Premium Roasted Makhana",
        description: "Premium quality roasted makhana with authentic Indian processing. Perfect for healthy snacking.",
        price: 2999,
        category: 1,
        sku: "POT001",
        featured: true,
        stock: 15,
        images: &["/images/ceramic-vase-1.svg"],
        features: &["Premium Quality", "Traditional Processing", "Healthy Snacking"],
    },
    SeedProduct {
        name: "Organic Makhana Pack",
        description: "Beautiful organic makhana with natural processing methods. Made by skilled farmers.",
        price: 1899,
        category: 2,
        sku: "TEX001",
        featured: true,
        stock: 25,
        images: &["/images/silk-scarf-1.svg"],
        features: &["Organic", "Natural processing", "Premium texture"],
    },
    SeedProduct {
        name: "Flavored Makhana Mix",
        description: "Exquisite flavored makhana mix showcasing traditional seasoning.",
        price: 3499,
        category: 3,
        sku: "JEW001",
        featured: false,
        stock: 12,
        images: &["/images/silver-earrings-1.svg"],
        features: &["Multiple flavors", "Traditional seasoning", "Nutritious"],
    },
    SeedProduct {
        name: "Seasoned Makhana Variety",
        description: "Intricately seasoned makhana variety with traditional spice blends.",
        price: 1599,
        category: 4,
        sku: "WOD001",
        featured: false,
        stock: 8,
        images: &["/images/wooden-box-1.jpg", "/images/wooden-box-2.jpg"],
        features: &["Hand-seasoned", "Traditional spices", "Healthy snacking"],
    },
    SeedProduct {
        name: "Spiced Makhana Selection",
        description: "Hand-seasoned makhana selection with vibrant flavors and traditional spices.",
        price: 899,
        category: 2,
        sku: "TEX002",
        featured: true,
        stock: 30,
        images: &["/images/cushion-cover-1.jpg"],
        features: &["Hand-seasoned", "Vibrant flavors", "Traditional spices"],
    },
    SeedProduct {
        name: "Premium Makhana Assortment",
        description: "Ornate makhana assortment with premium varieties, perfect for healthy indulgence.",
        price: 2199,
        category: 5,
        sku: "MET001",
        featured: false,
        stock: 10,
        images: &["/images/brass-plate-1.jpg", "/images/brass-plate-2.jpg"],
        features: &["Premium varieties", "Multiple textures", "Healthy indulgence"],
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Build a database holding the sample catalog: 5 categories and 6 products.
#[must_use]
pub fn seeded(now: DateTime<Utc>) -> Database {
    let mut db = Database::default();

    for &(name, slug, description) in CATEGORIES {
        db.insert_category(NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
            thumbnail: None,
        });
    }

    for p in PRODUCTS {
        db.insert_product(
            NewProduct {
                name: p.name.to_string(),
                description: p.description.to_string(),
                price: Price::from(p.price),
                category_id: CategoryId::new(p.category),
                stock: p.stock,
                images: owned(p.images),
                sku: p.sku.to_string(),
                featured: p.featured,
                features: owned(p.features),
            },
            now,
        );
    }

    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_counts_and_counters() {
        let db = seeded(Utc::now());
        assert_eq!(db.categories.len(), 5);
        assert_eq!(db.products.len(), 6);
        assert_eq!(db.counters.category_id, 6);
        assert_eq!(db.counters.product_id, 7);
        assert!(db.users.is_empty());
    }

    #[test]
    fn test_seed_products_reference_existing_categories() {
        let db = seeded(Utc::now());
        for product in &db.products {
            assert!(db.categories.iter().any(|c| c.id == product.category_id));
        }
        assert_eq!(db.products.iter().filter(|p| p.featured).count(), 3);
    }
}
