//! Prompt templates for the recipe model.
//!
//! Every builder here is pure: the same request always yields the same prompt.
//! The JSON schemas the model must follow live in `prompts/*.txt` and are
//! embedded at compile time.

use crate::model::{FreeFormRequest, GenerationRequest, RecipeDraft};

/// Schema for a generated recipe, with an example wildcard line
pub const RECIPE_SCHEMA: &str = include_str!("prompts/recipe_schema.txt");

/// Schema for parsing existing recipe text; nothing is marked as a wildcard
pub const IMPORT_SCHEMA: &str = include_str!("prompts/import_schema.txt");

/// Schema for wildcard augmentation of an existing recipe
pub const AUGMENT_SCHEMA: &str = include_str!("prompts/augment_schema.txt");

/// Schema for a single standalone wildcard suggestion
pub const SUGGESTION_SCHEMA: &str = include_str!("prompts/suggestion_schema.txt");

pub const JSON_ONLY: &str = "Only respond with valid JSON, no other text.";

/// Build the model prompt for any orchestrator request
pub fn build_prompt(request: &GenerationRequest) -> String {
    match request {
        GenerationRequest::FreeForm(req) => build_generate_prompt(req),
        GenerationRequest::Import { source_text } => build_import_prompt(source_text),
        GenerationRequest::Augment { existing_recipe } => build_augment_prompt(existing_recipe),
    }
}

pub fn build_generate_prompt(req: &FreeFormRequest) -> String {
    let mut prompt = format!(
        "You are a creative chef. Generate a complete recipe based on this request: \"{}\"\n\n",
        req.prompt_text
    );

    if let Some(cuisine) = non_blank(req.cuisine.as_deref()) {
        prompt.push_str(&format!("Cuisine style: {cuisine}\n"));
    }
    if !req.dietary_restrictions.is_empty() {
        prompt.push_str(&format!(
            "Dietary restrictions: {}\n",
            req.dietary_restrictions.join(", ")
        ));
    }
    if let Some(difficulty) = req.difficulty {
        prompt.push_str(&format!("Difficulty level: {difficulty}\n"));
    }

    if req.include_wildcard {
        prompt.push_str(
            "\nIMPORTANT: Include exactly one \"wildcard\" ingredient - an uncommon but delicious \
             addition that adds a unique flavor dimension. This could be something like fish sauce \
             in non-Asian dishes, espresso in savory sauces, miso in unexpected places, or other \
             surprising but scientifically sound flavor combinations.\n\n\
             Mark the wildcard ingredient with \"is_wildcard\": true and explain why it works in \
             \"wildcard_reason\".\n",
        );
    }

    prompt.push('\n');
    prompt.push_str(RECIPE_SCHEMA);
    prompt.push('\n');
    prompt.push_str(JSON_ONLY);
    prompt.push('\n');
    prompt
}

pub fn build_import_prompt(source_text: &str) -> String {
    format!(
        "You are a recipe parser. Parse the following recipe text and extract all the information \
         into a structured format.\n\n\
         Recipe text:\n\"\"\"\n{source_text}\n\"\"\"\n\n\
         Extract the title, description, prep and cook times, servings, cuisine, difficulty, \
         ingredients and instructions. If some information is missing, make reasonable estimates \
         based on the recipe content.\n\n\
         {IMPORT_SCHEMA}\n{JSON_ONLY}\n"
    )
}

pub fn build_augment_prompt(recipe: &RecipeDraft) -> String {
    let cuisine = non_blank(recipe.cuisine.as_deref()).unwrap_or("Not specified");
    format!(
        "You are a culinary innovation expert. Given this existing recipe, suggest 1-2 \"wildcard\" \
         ingredients that would elevate it and make it unique.\n\n\
         Recipe: {title}\n\
         Description: {description}\n\
         Current ingredients: {ingredients}\n\
         Cuisine: {cuisine}\n\n\
         Suggest wildcard ingredients that are:\n\
         - Unexpected but scientifically proven to work (shared flavor compounds, complementary tastes)\n\
         - Not already in the recipe\n\
         - Something that adds a unique dimension (umami, brightness, depth, etc.)\n\n\
         Also provide updated instructions that incorporate the wildcard ingredients, and an \
         updated description mentioning the twist.\n\n\
         {AUGMENT_SCHEMA}\n{JSON_ONLY}\n",
        title = recipe.title,
        description = recipe.description,
        ingredients = recipe.ingredient_names().join(", "),
    )
}

pub fn build_wildcard_suggestion_prompt(ingredients: &[String], cuisine: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a culinary innovation expert specializing in unexpected flavor combinations that \
         are backed by food science.\n\n\
         Given these recipe ingredients: {}\n",
        ingredients.join(", ")
    );
    if let Some(cuisine) = non_blank(cuisine) {
        prompt.push_str(&format!("Cuisine style: {cuisine}\n"));
    }
    prompt.push_str(
        "\nSuggest ONE surprising \"wildcard\" ingredient that would elevate this dish. This should be:\n\
         - Unexpected but scientifically proven to work (shared flavor compounds, complementary tastes)\n\
         - Not a common ingredient for this type of dish\n\
         - Something that adds a unique dimension (umami, brightness, depth, etc.)\n\n\
         Examples of great wildcard ingredients: fish sauce, miso paste, coffee/espresso, soy sauce, \
         anchovy paste, nutritional yeast, tahini, marmite, dried mushroom powder, citrus zest, \
         apple cider vinegar, etc.\n\n",
    );
    prompt.push_str(SUGGESTION_SCHEMA);
    prompt.push('\n');
    prompt.push_str(JSON_ONLY);
    prompt.push('\n');
    prompt
}

pub fn build_pairing_explanation_prompt(
    wildcard: &str,
    recipe_ingredients: &[String],
    recipe_title: &str,
) -> String {
    format!(
        "You are a culinary expert. Explain why \"{wildcard}\" works as a unique addition to a recipe \
         called \"{recipe_title}\" that contains these ingredients: {}.\n\n\
         Keep your explanation concise (2-3 sentences) and focus on:\n\
         1. The flavor science behind why it works\n\
         2. How it enhances the dish\n\n\
         Response format: Just the explanation text, no formatting.\n",
        recipe_ingredients.join(", ")
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, IngredientDraft};

    #[test]
    fn test_schemas_are_embedded() {
        assert!(!RECIPE_SCHEMA.contains("order_index"));
        assert!(RECIPE_SCHEMA.contains("\"step_number\""));
        assert!(RECIPE_SCHEMA.contains("\"wildcard_reason\""));
        assert!(AUGMENT_SCHEMA.contains("\"wildcard_ingredients\""));
        assert!(AUGMENT_SCHEMA.contains("\"updated_instructions\""));
        assert!(SUGGESTION_SCHEMA.contains("\"quantity_suggestion\""));
        assert!(IMPORT_SCHEMA.contains("\"instructions\""));
    }

    #[test]
    fn test_import_prompt_does_not_ask_for_wildcards() {
        let prompt = build_import_prompt(&"x".repeat(60));
        assert!(prompt.contains(IMPORT_SCHEMA));
        assert!(!prompt.contains("\"is_wildcard\": true"));
        assert!(!prompt.contains("wildcard_reason"));
        assert!(!prompt.contains(RECIPE_SCHEMA));
    }

    #[test]
    fn test_generate_prompt_only_includes_present_constraints() {
        let req = FreeFormRequest::new("a cozy soup for a rainy day");
        let prompt = build_generate_prompt(&req);
        assert!(prompt.contains("\"a cozy soup for a rainy day\""));
        assert!(!prompt.contains("Cuisine style"));
        assert!(!prompt.contains("Dietary restrictions"));
        assert!(!prompt.contains("Difficulty level"));
        assert!(!prompt.contains("IMPORTANT"));
        assert!(prompt.contains(RECIPE_SCHEMA));
        assert!(prompt.trim_end().ends_with(JSON_ONLY));
    }

    #[test]
    fn test_generate_prompt_with_all_constraints() {
        let req = FreeFormRequest {
            prompt_text: "weeknight pasta".to_string(),
            cuisine: Some("Italian".to_string()),
            dietary_restrictions: vec!["Vegan".to_string(), "Nut-Free".to_string()],
            difficulty: Some(Difficulty::Easy),
            include_wildcard: true,
        };
        let prompt = build_generate_prompt(&req);
        assert!(prompt.contains("Cuisine style: Italian"));
        assert!(prompt.contains("Dietary restrictions: Vegan, Nut-Free"));
        assert!(prompt.contains("Difficulty level: easy"));
        assert!(prompt.contains("exactly one \"wildcard\" ingredient"));
        assert!(prompt.contains("wildcard_reason"));
    }

    #[test]
    fn test_blank_cuisine_is_omitted() {
        let mut req = FreeFormRequest::new("salad");
        req.cuisine = Some("   ".to_string());
        assert!(!build_generate_prompt(&req).contains("Cuisine style"));
    }

    #[test]
    fn test_import_prompt_delimits_source() {
        let prompt = build_prompt(&GenerationRequest::Import {
            source_text: "2 eggs\nfry them".to_string(),
        });
        assert!(prompt.contains("\"\"\"\n2 eggs\nfry them\n\"\"\""));
        assert!(prompt.contains("reasonable estimates"));
        assert!(prompt.contains(JSON_ONLY));
    }

    #[test]
    fn test_augment_prompt_lists_existing_ingredients() {
        let mut recipe = RecipeDraft::manual("Tomato Soup");
        recipe.description = "Smooth and warming".to_string();
        recipe.push_ingredient(IngredientDraft::new("Tomatoes", "6", ""));
        recipe.push_ingredient(IngredientDraft::new("Onion", "1", ""));

        let prompt = build_prompt(&GenerationRequest::Augment {
            existing_recipe: recipe,
        });
        assert!(prompt.contains("Recipe: Tomato Soup"));
        assert!(prompt.contains("Description: Smooth and warming"));
        assert!(prompt.contains("Current ingredients: Tomatoes, Onion"));
        assert!(prompt.contains("Cuisine: Not specified"));
        assert!(prompt.contains("1-2"));
        assert!(prompt.contains("Not already in the recipe"));
        assert!(prompt.contains(AUGMENT_SCHEMA));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let request = GenerationRequest::FreeForm(FreeFormRequest::new("tacos"));
        assert_eq!(build_prompt(&request), build_prompt(&request));
    }

    #[test]
    fn test_suggestion_and_explanation_prompts() {
        let ingredients = vec!["beef".to_string(), "tomatoes".to_string()];
        let prompt = build_wildcard_suggestion_prompt(&ingredients, Some("Mexican"));
        assert!(prompt.contains("beef, tomatoes"));
        assert!(prompt.contains("Cuisine style: Mexican"));
        assert!(prompt.contains(SUGGESTION_SCHEMA));

        let explain = build_pairing_explanation_prompt("Espresso Powder", &ingredients, "Chili");
        assert!(explain.contains("\"Espresso Powder\""));
        assert!(explain.contains("\"Chili\""));
        assert!(!explain.contains(JSON_ONLY));
    }
}
