use crate::error::IngestError;
use crate::model::{
    Difficulty, IngredientDraft, InstructionDraft, RecipeDraft, RecipeSource, UNTITLED_RECIPE,
};
use log::{debug, warn};
use serde_json::{Map, Value};

/// Shape a parsed model payload into a `RecipeDraft`.
///
/// Without `merge_into` the payload is a full recipe. With it, the payload is
/// an augmentation (`wildcard_ingredients`, `updated_instructions`,
/// `description`) applied on top of the existing draft, and the result is
/// always tagged `wildcard_modified`.
///
/// Ingredient `order_index` and instruction `step_number` are assigned from
/// list position; any values the model sent are ignored.
pub fn normalize(
    parsed: &Value,
    provenance: RecipeSource,
    merge_into: Option<&RecipeDraft>,
) -> Result<RecipeDraft, IngestError> {
    let object = parsed.as_object().ok_or_else(|| {
        IngestError::Normalization(format!("expected a JSON object, got {}", type_name(parsed)))
    })?;

    let mut draft = match merge_into {
        Some(existing) => merge_augmentation(object, existing)?,
        None => full_recipe(object, provenance)?,
    };
    draft.reindex();

    debug!(
        "Normalized '{}' ({}): {} ingredients, {} instructions",
        draft.title,
        draft.source,
        draft.ingredients.len(),
        draft.instructions.len()
    );
    Ok(draft)
}

fn full_recipe(object: &Map<String, Value>, provenance: RecipeSource) -> Result<RecipeDraft, IngestError> {
    let title = string_field(object, "title").unwrap_or_else(|| UNTITLED_RECIPE.to_string());

    let mut ingredients = ingredients(array_field(object, "ingredients")?, false);
    // Parsed text describes an existing recipe; only augmentation adds wildcards
    if provenance == RecipeSource::Imported {
        for ingredient in ingredients.iter_mut().filter(|i| i.is_wildcard) {
            debug!("Clearing wildcard flag on imported ingredient '{}'", ingredient.name);
            ingredient.is_wildcard = false;
            ingredient.wildcard_reason = None;
        }
    }

    Ok(RecipeDraft {
        title,
        description: string_field(object, "description").unwrap_or_default(),
        source: provenance,
        source_url: None,
        prep_time_minutes: count_field(object, "prep_time_minutes"),
        cook_time_minutes: count_field(object, "cook_time_minutes"),
        servings: count_field(object, "servings"),
        cuisine: string_field(object, "cuisine"),
        difficulty: string_field(object, "difficulty").and_then(|d| d.parse::<Difficulty>().ok()),
        is_public: object
            .get("is_public")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        ingredients,
        instructions: instructions(array_field(object, "instructions")?),
    })
}

fn merge_augmentation(
    object: &Map<String, Value>,
    existing: &RecipeDraft,
) -> Result<RecipeDraft, IngestError> {
    let additions = ingredients(array_field(object, "wildcard_ingredients")?, true);
    let replacement = instructions(array_field(object, "updated_instructions")?);

    let mut draft = existing.clone();
    draft.source = RecipeSource::WildcardModified;
    draft.ingredients.extend(additions);
    if !replacement.is_empty() {
        draft.instructions = replacement;
    }
    if let Some(description) = string_field(object, "description") {
        draft.description = description;
    }
    Ok(draft)
}

/// Absent or null reads as empty; any other non-array value is an error
fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], IngestError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(IngestError::Normalization(format!(
            "'{key}' should be an array, got {}",
            type_name(other)
        ))),
    }
}

fn ingredients(items: &[Value], wildcard: bool) -> Vec<IngredientDraft> {
    items
        .iter()
        .filter_map(|item| {
            let ingredient = ingredient(item, wildcard);
            if ingredient.is_none() {
                warn!("Dropping ingredient without a name: {}", item);
            }
            ingredient
        })
        .collect()
}

fn ingredient(item: &Value, wildcard: bool) -> Option<IngredientDraft> {
    let object = match item {
        Value::String(name) => {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let mut ingredient = IngredientDraft::new(name, "", "");
            ingredient.is_wildcard = wildcard;
            return Some(ingredient);
        }
        Value::Object(object) => object,
        _ => return None,
    };

    let name = string_field(object, "name")?;
    // augmentation payloads say "reason", full recipes say "wildcard_reason"
    let reason = string_field(object, "wildcard_reason").or_else(|| string_field(object, "reason"));
    let is_wildcard = wildcard || object.get("is_wildcard").and_then(Value::as_bool).unwrap_or(false);

    Some(IngredientDraft {
        name,
        quantity: quantity(object.get("quantity")),
        unit: string_field(object, "unit").unwrap_or_default(),
        is_wildcard,
        wildcard_reason: if is_wildcard { reason } else { None },
        order_index: 0,
    })
}

fn instructions(items: &[Value]) -> Vec<InstructionDraft> {
    items
        .iter()
        .filter_map(|item| {
            let content = match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Object(object) => string_field(object, "content")
                    .or_else(|| string_field(object, "text"))
                    .or_else(|| string_field(object, "step")),
                _ => None,
            }?;
            if content.is_empty() {
                return None;
            }
            Some(InstructionDraft {
                step_number: 0,
                content,
            })
        })
        .collect()
}

/// Quantities stay free text; numbers are stringified.
fn quantity(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Trimmed, non-empty string; numbers are accepted and stringified
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Accepts 15, 15.0, "15" and "15 minutes"
fn count_field(object: &Map<String, Value>, key: &str) -> Option<u32> {
    match object.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|first| first.parse::<u32>().ok()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
