//! Category rule table.
//!
//! Maps provider category keys to the kind of item they denote. The table is
//! loaded from TOML; the copy in `rules/categories.toml` is compiled in.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use local_places_core::{
    types::{CategoryKey, ItemKind, PlaceCategory},
    Error, Result,
};

const EMBEDDED_RULES: &str = include_str!("../rules/categories.toml");

#[derive(Debug, Deserialize)]
struct RulesFile {
    version: u32,
    event: KindRules,
    park: KindRules,
    restaurant: KindRules,
}

#[derive(Debug, Deserialize)]
struct KindRules {
    label: String,
    #[serde(default)]
    ids: Vec<u32>,
    #[serde(default)]
    aliases: Vec<String>,
}

/// A category that matched a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub kind: ItemKind,
    /// The category's own label, or the kind's fallback label when blank.
    pub label: &'a str,
}

/// Lookup table from category key to item kind.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    version: u32,
    kinds: HashMap<CategoryKey, ItemKind>,
    fallback_labels: HashMap<ItemKind, String>,
}

impl CategoryRules {
    /// The rule table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_RULES)
    }

    /// Load a replacement table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read category rules '{}': {}", path.display(), e))
        })?;
        let rules = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), version = rules.version, "Loaded category rules");
        Ok(rules)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: RulesFile =
            toml::from_str(text).map_err(|e| Error::config(format!("Invalid category rules: {}", e)))?;

        let mut kinds = HashMap::new();
        let mut fallback_labels = HashMap::new();

        for (kind, rules) in [
            (ItemKind::Event, file.event),
            (ItemKind::Park, file.park),
            (ItemKind::Restaurant, file.restaurant),
        ] {
            let keys = rules
                .ids
                .into_iter()
                .map(CategoryKey::Id)
                .chain(rules.aliases.into_iter().map(|a| CategoryKey::Alias(a.trim().to_lowercase())));
            for key in keys {
                // A key listed under two kinds keeps the higher-priority one.
                kinds
                    .entry(key)
                    .and_modify(|existing: &mut ItemKind| *existing = (*existing).min(kind))
                    .or_insert(kind);
            }
            fallback_labels.insert(kind, rules.label);
        }

        Ok(Self {
            version: file.version,
            kinds,
            fallback_labels,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of category keys in the table.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind for a single key, ignoring hierarchy.
    pub fn kind_of(&self, key: &CategoryKey) -> Option<ItemKind> {
        match key {
            CategoryKey::Alias(alias) if alias.chars().any(|c| c.is_ascii_uppercase()) => {
                self.kinds.get(&CategoryKey::Alias(alias.to_lowercase())).copied()
            }
            _ => self.kinds.get(key).copied(),
        }
    }

    /// Match one category: its own key first, then its parent. When both
    /// match, the higher-priority kind wins.
    pub fn match_category<'a>(&'a self, category: &'a PlaceCategory) -> Option<RuleMatch<'a>> {
        let kind = category.lookup_keys().filter_map(|key| self.kind_of(key)).min()?;
        Some(RuleMatch {
            kind,
            label: self.label_for(kind, &category.label),
        })
    }

    /// Match a category list in order; the first category that matches
    /// anything decides the kind.
    pub fn match_first<'a>(&'a self, categories: &'a [PlaceCategory]) -> Option<RuleMatch<'a>> {
        categories.iter().find_map(|c| self.match_category(c))
    }

    pub fn fallback_label(&self, kind: ItemKind) -> &str {
        self.fallback_labels
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.as_str())
    }

    fn label_for<'a>(&'a self, kind: ItemKind, label: &'a str) -> &'a str {
        if label.trim().is_empty() {
            self.fallback_label(kind)
        } else {
            label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CategoryRules {
        CategoryRules::embedded().unwrap()
    }

    #[test]
    fn test_embedded_rules_load() {
        let rules = rules();
        assert_eq!(rules.version(), 1);
        assert!(!rules.is_empty());
        assert_eq!(rules.kind_of(&CategoryKey::Id(13000)), Some(ItemKind::Restaurant));
        assert_eq!(rules.kind_of(&CategoryKey::Id(16032)), Some(ItemKind::Park));
        assert_eq!(rules.kind_of(&CategoryKey::Id(10027)), Some(ItemKind::Event));
        assert_eq!(rules.kind_of(&CategoryKey::alias("parks")), Some(ItemKind::Park));
        assert_eq!(rules.kind_of(&CategoryKey::alias("Parks")), Some(ItemKind::Park));
        assert_eq!(rules.kind_of(&CategoryKey::Id(17000)), None);
    }

    #[test]
    fn test_parent_match() {
        let rules = rules();
        let italian = PlaceCategory::new(CategoryKey::Id(13065), "Italian Restaurant")
            .with_parent(CategoryKey::Id(13000));
        let m = rules.match_category(&italian).unwrap();
        assert_eq!(m.kind, ItemKind::Restaurant);
        assert_eq!(m.label, "Italian Restaurant");

        let orphan = PlaceCategory::new(CategoryKey::Id(13065), "Italian Restaurant");
        assert!(rules.match_category(&orphan).is_none());
    }

    #[test]
    fn test_first_matching_category_decides() {
        let rules = rules();
        let categories = vec![
            PlaceCategory::new(CategoryKey::Id(17069), "Gift Shop").with_parent(CategoryKey::Id(17000)),
            PlaceCategory::new(CategoryKey::Id(13065), "Pizzeria").with_parent(CategoryKey::Id(13000)),
            PlaceCategory::new(CategoryKey::Id(16032), "Park").with_parent(CategoryKey::Id(16000)),
        ];
        let m = rules.match_first(&categories).unwrap();
        assert_eq!(m.kind, ItemKind::Restaurant);
        assert_eq!(m.label, "Pizzeria");
    }

    #[test]
    fn test_duplicate_key_keeps_higher_priority() {
        let text = r#"
            version = 2
            [event]
            label = "Event Venue"
            ids = [500]
            [park]
            label = "Park"
            ids = [500, 600]
            [restaurant]
            label = "Restaurant"
            aliases = ["Food"]
        "#;
        let rules = CategoryRules::from_toml_str(text).unwrap();
        assert_eq!(rules.version(), 2);
        assert_eq!(rules.kind_of(&CategoryKey::Id(500)), Some(ItemKind::Event));
        assert_eq!(rules.kind_of(&CategoryKey::Id(600)), Some(ItemKind::Park));
        assert_eq!(rules.kind_of(&CategoryKey::alias("food")), Some(ItemKind::Restaurant));
    }

    #[test]
    fn test_blank_label_uses_fallback() {
        let rules = rules();
        let blank = PlaceCategory::new(CategoryKey::Id(16032), "  ");
        assert_eq!(rules.match_category(&blank).unwrap().label, "Park");
        assert_eq!(rules.fallback_label(ItemKind::Event), "Event Venue");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(matches!(CategoryRules::from_toml_str("version = 1"), Err(Error::Config(_))));
        assert!(CategoryRules::from_path("/nonexistent/categories.toml").is_err());
    }
}
