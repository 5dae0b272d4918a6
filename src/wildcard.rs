//! Wildcard ingredients outside the augmentation pipeline: single-ingredient
//! suggestions, pairing explanations, and the catalog helpers behind the
//! browse screen.

use crate::error::IngestError;
use crate::extract::extract_json;
use crate::model::{Intensity, WildcardCatalogEntry, WildcardSuggestion};
use crate::pipelines::Orchestrator;
use crate::prompt::{build_pairing_explanation_prompt, build_wildcard_suggestion_prompt};
use crate::store::RecipeStore;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::BTreeMap;

/// A built-in catalog entry, available without the backend
#[derive(Debug, Clone, Copy)]
pub struct FallbackWildcard {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub flavor_profile: &'static [&'static str],
    pub pairs_with: &'static [&'static str],
    pub description: &'static str,
    pub usage_tips: &'static str,
    pub intensity: Intensity,
}

impl FallbackWildcard {
    pub fn to_entry(&self) -> WildcardCatalogEntry {
        WildcardCatalogEntry {
            id: Some(self.id.to_string()),
            name: self.name.to_string(),
            category: self.category.to_string(),
            flavor_profile: self.flavor_profile.iter().map(|s| s.to_string()).collect(),
            pairs_with: self.pairs_with.iter().map(|s| s.to_string()).collect(),
            description: self.description.to_string(),
            usage_tips: self.usage_tips.to_string(),
            intensity: self.intensity,
        }
    }
}

pub const FALLBACK_WILDCARDS: [FallbackWildcard; 6] = [
    FallbackWildcard {
        id: "1",
        name: "Fish Sauce",
        category: "Umami Boosters",
        flavor_profile: &["umami", "salty", "funky"],
        pairs_with: &["beef", "tomatoes", "caramel", "citrus"],
        description: "Southeast Asian fermented fish condiment that adds deep umami without tasting fishy",
        usage_tips: "Start with 1/2 tsp, add more to taste. Works great in non-Asian dishes like bolognese or Caesar dressing.",
        intensity: Intensity::Bold,
    },
    FallbackWildcard {
        id: "2",
        name: "Miso Paste",
        category: "Umami Boosters",
        flavor_profile: &["umami", "sweet", "salty"],
        pairs_with: &["butter", "chocolate", "caramel", "mushrooms"],
        description: "Fermented soybean paste that adds depth and complexity to both savory and sweet dishes",
        usage_tips: "White miso is milder, red miso is stronger. Try it in caramel or chocolate desserts.",
        intensity: Intensity::Medium,
    },
    FallbackWildcard {
        id: "3",
        name: "Espresso Powder",
        category: "Aromatic Additions",
        flavor_profile: &["bitter", "roasted", "complex"],
        pairs_with: &["chocolate", "beef", "chili", "vanilla"],
        description: "Concentrated coffee flavor that enhances chocolate and adds depth to savory dishes",
        usage_tips: "1/4 tsp in chili or beef stew adds complexity without coffee flavor. Perfect in brownies.",
        intensity: Intensity::Medium,
    },
    FallbackWildcard {
        id: "4",
        name: "Tahini",
        category: "Textural Elements",
        flavor_profile: &["nutty", "bitter", "creamy"],
        pairs_with: &["honey", "chocolate", "citrus", "greens"],
        description: "Sesame seed paste that adds creamy nuttiness to both savory and sweet applications",
        usage_tips: "Drizzle on salads, blend into smoothies, or swirl into brownies before baking.",
        intensity: Intensity::Medium,
    },
    FallbackWildcard {
        id: "5",
        name: "Apple Cider Vinegar",
        category: "Acidic Notes",
        flavor_profile: &["tart", "fruity", "bright"],
        pairs_with: &["pork", "beans", "greens", "berries"],
        description: "Fruity vinegar that brightens flavors and cuts through richness",
        usage_tips: "Add a splash at the end of cooking to brighten stews, soups, and braises.",
        intensity: Intensity::Subtle,
    },
    FallbackWildcard {
        id: "6",
        name: "Gochujang",
        category: "Heat & Spice",
        flavor_profile: &["spicy", "sweet", "umami"],
        pairs_with: &["mayo", "honey", "beef", "eggs"],
        description: "Korean fermented chili paste with sweet heat and deep umami notes",
        usage_tips: "Mix with mayo for spicy aioli, glaze on roasted vegetables, or stir into mac and cheese.",
        intensity: Intensity::Bold,
    },
];

pub fn fallback_catalog() -> Vec<WildcardCatalogEntry> {
    FALLBACK_WILDCARDS.iter().map(FallbackWildcard::to_entry).collect()
}

/// The backend catalog, or the built-in one when it is empty or unreachable
pub async fn catalog_or_fallback(store: &dyn RecipeStore) -> Vec<WildcardCatalogEntry> {
    match store.fetch_wildcard_catalog().await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => {
            info!("Wildcard catalog is empty, using built-in entries");
            fallback_catalog()
        }
        Err(e) => {
            warn!("Could not load wildcard catalog, using built-in entries: {}", e);
            fallback_catalog()
        }
    }
}

pub fn group_by_category(
    catalog: &[WildcardCatalogEntry],
) -> BTreeMap<String, Vec<WildcardCatalogEntry>> {
    let mut groups: BTreeMap<String, Vec<WildcardCatalogEntry>> = BTreeMap::new();
    for entry in catalog {
        groups
            .entry(entry.category.clone())
            .or_default()
            .push(entry.clone());
    }
    groups
}

/// Case-insensitive match on name or description, sorted by name
pub fn search(catalog: &[WildcardCatalogEntry], query: &str) -> Vec<WildcardCatalogEntry> {
    let needle = query.trim().to_lowercase();
    let mut hits: Vec<WildcardCatalogEntry> = catalog
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    hits.sort_by(|a, b| a.name.cmp(&b.name));
    hits
}

pub fn random_wildcard(catalog: &[WildcardCatalogEntry]) -> Option<&WildcardCatalogEntry> {
    catalog.choose(&mut rand::thread_rng())
}

/// Ask the model for one wildcard that suits `ingredients`
pub async fn suggest_wildcard(
    orchestrator: &Orchestrator,
    ingredients: &[String],
    cuisine: Option<&str>,
) -> Result<WildcardSuggestion, IngestError> {
    if ingredients.iter().all(|i| i.trim().is_empty()) {
        return Err(IngestError::InvalidInput(
            "Please add at least one ingredient to get suggestions".to_string(),
        ));
    }

    let prompt = build_wildcard_suggestion_prompt(ingredients, cuisine);
    let raw = orchestrator.provider().complete(&prompt).await?;
    let parsed = extract_json(&raw)?;
    let suggestion = parse_suggestion(&parsed)?;
    debug!("Suggested wildcard: {}", suggestion.ingredient.name);
    Ok(suggestion)
}

/// A short explanation of why `wildcard` suits the recipe
pub async fn explain_pairing(
    orchestrator: &Orchestrator,
    wildcard: &str,
    recipe_ingredients: &[String],
    recipe_title: &str,
) -> Result<String, IngestError> {
    let prompt = build_pairing_explanation_prompt(wildcard, recipe_ingredients, recipe_title);
    let text = orchestrator.provider().complete(&prompt).await?;
    Ok(text.trim().to_string())
}

pub fn parse_suggestion(value: &Value) -> Result<WildcardSuggestion, IngestError> {
    let ingredient = value
        .get("ingredient")
        .filter(|v| v.is_object())
        .ok_or_else(|| {
            IngestError::Normalization("suggestion has no ingredient object".to_string())
        })?;

    let name = text(ingredient, "name");
    if name.is_empty() {
        return Err(IngestError::Normalization(
            "suggested ingredient has no name".to_string(),
        ));
    }

    let intensity = match text(ingredient, "intensity").to_lowercase().as_str() {
        "subtle" => Intensity::Subtle,
        "bold" => Intensity::Bold,
        _ => Intensity::Medium,
    };

    Ok(WildcardSuggestion {
        ingredient: WildcardCatalogEntry {
            id: None,
            name,
            category: text(ingredient, "category"),
            flavor_profile: strings(ingredient, "flavor_profile"),
            pairs_with: strings(ingredient, "pairs_with"),
            description: text(ingredient, "description"),
            usage_tips: text(ingredient, "usage_tips"),
            intensity,
        },
        reason: text(value, "reason"),
        how_to_use: text(value, "how_to_use"),
        quantity_suggestion: text(value, "quantity_suggestion"),
    })
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn strings(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_catalog() {
        let catalog = fallback_catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0].name, "Fish Sauce");
        assert_eq!(catalog[5].name, "Gochujang");
        assert_eq!(catalog[4].intensity, Intensity::Subtle);
    }

    #[test]
    fn test_group_by_category() {
        let groups = group_by_category(&fallback_catalog());
        assert_eq!(groups.len(), 5);
        assert_eq!(groups["Umami Boosters"].len(), 2);
        assert_eq!(groups["Heat & Spice"][0].name, "Gochujang");
    }

    #[test]
    fn test_search() {
        let catalog = fallback_catalog();
        let hits = search(&catalog, "PASTE");
        let names: Vec<_> = hits.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gochujang", "Miso Paste", "Tahini"]);

        assert!(search(&catalog, "durian").is_empty());
        assert_eq!(search(&catalog, "  ").len(), 6);
    }

    #[test]
    fn test_random_wildcard() {
        let catalog = fallback_catalog();
        let pick = random_wildcard(&catalog).unwrap();
        assert!(catalog.contains(pick));
        assert!(random_wildcard(&[]).is_none());
    }

    #[test]
    fn test_parse_suggestion_defaults() {
        let value = json!({
            "ingredient": {"name": "Sumac", "category": "Acidic Notes", "intensity": "LOUD"},
            "reason": "Bright and tangy"
        });
        let suggestion = parse_suggestion(&value).unwrap();
        assert_eq!(suggestion.ingredient.name, "Sumac");
        assert_eq!(suggestion.ingredient.intensity, Intensity::Medium);
        assert!(suggestion.ingredient.flavor_profile.is_empty());
        assert_eq!(suggestion.reason, "Bright and tangy");
        assert_eq!(suggestion.how_to_use, "");
    }

    #[test]
    fn test_parse_suggestion_requires_ingredient() {
        assert!(matches!(
            parse_suggestion(&json!({"reason": "x"})),
            Err(IngestError::Normalization(_))
        ));
        assert!(matches!(
            parse_suggestion(&json!({"ingredient": {"category": "x"}})),
            Err(IngestError::Normalization(_))
        ));
    }
}
