//! Product recommendation scoring.

use makhana_core::models::Product;

/// Number of recommendations returned when the caller does not choose.
pub const DEFAULT_LIMIT: usize = 8;

const SAME_CATEGORY: f64 = 50.0;
const FEATURE_OVERLAP: f64 = 30.0;
const CLOSE_PRICE: f64 = 10.0;
const NEAR_PRICE: f64 = 5.0;
const FEATURED: f64 = 5.0;
const IN_STOCK: f64 = 3.0;

/// Share of `reference` features that loosely match one of `candidate`'s,
/// relative to the longer feature list. Matching is case-insensitive
/// substring containment in either direction.
#[allow(clippy::cast_precision_loss)]
fn feature_overlap(reference: &[String], candidate: &[String]) -> f64 {
    if reference.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let candidate: Vec<String> = candidate.iter().map(|f| f.to_lowercase()).collect();
    let matches = reference
        .iter()
        .map(|f| f.to_lowercase())
        .filter(|f| {
            candidate
                .iter()
                .any(|g| g.contains(f.as_str()) || f.contains(g.as_str()))
        })
        .count();
    matches as f64 / reference.len().max(candidate.len()) as f64
}

/// Similarity score of `candidate` to `reference`.
#[must_use]
pub fn score(reference: &Product, candidate: &Product) -> f64 {
    let mut score = 0.0;

    if candidate.category_id == reference.category_id {
        score += SAME_CATEGORY;
    }

    score += FEATURE_OVERLAP * feature_overlap(&reference.features, &candidate.features);

    // No price bonus against a free product.
    if let Some(diff) = reference.price.relative_difference(&candidate.price) {
        if diff <= 0.2 {
            score += CLOSE_PRICE;
        } else if diff <= 0.5 {
            score += NEAR_PRICE;
        }
    }

    if candidate.featured {
        score += FEATURED;
    }
    if candidate.in_stock() {
        score += IN_STOCK;
    }

    score
}

/// Rank `catalog` against `reference`, best first, keeping at most `limit`.
///
/// The reference product itself is excluded. Ties keep catalog order.
#[must_use]
pub fn rank(reference: &Product, catalog: &[Product], limit: usize) -> Vec<Product> {
    let mut scored: Vec<(f64, &Product)> = catalog
        .iter()
        .filter(|p| p.id != reference.id)
        .map(|p| (score(reference, p), p))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, p)| p.clone())
        .collect()
}
