//! Product categories.

use serde::{Deserialize, Serialize};

use super::double_option;
use crate::CategoryId;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    /// Display name, unique across categories.
    pub name: String,
    /// URL-safe identifier, unique across categories.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL or `/images/...` path.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Partial category update. Absent fields keep their current value;
/// an explicit `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail: Option<Option<String>>,
}

impl Category {
    /// Apply a partial update in place.
    pub fn apply(&mut self, update: CategoryUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(thumbnail) = update.thumbnail {
            self.thumbnail = thumbnail;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category() -> Category {
        Category {
            id: CategoryId::new(1),
            name: "Roasted".to_string(),
            slug: "roasted".to_string(),
            description: Some("Crunchy".to_string()),
            thumbnail: None,
        }
    }

    #[test]
    fn test_update_absent_fields_are_kept() {
        let mut cat = category();
        let update: CategoryUpdate = serde_json::from_str(r#"{"name":"Roasted Makhana"}"#).unwrap();
        cat.apply(update);
        assert_eq!(cat.name, "Roasted Makhana");
        assert_eq!(cat.description.as_deref(), Some("Crunchy"));
    }

    #[test]
    fn test_update_explicit_null_clears() {
        let mut cat = category();
        let update: CategoryUpdate = serde_json::from_str(r#"{"description":null}"#).unwrap();
        cat.apply(update);
        assert!(cat.description.is_none());
    }

    #[test]
    fn test_missing_optional_fields_default_on_load() {
        let cat: Category =
            serde_json::from_str(r#"{"id":3,"name":"Spiced","slug":"spiced"}"#).unwrap();
        assert!(cat.description.is_none());
        assert!(cat.thumbnail.is_none());
    }
}
