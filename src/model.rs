use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

/// How a recipe draft came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    UserUploaded,
    AiGenerated,
    WildcardModified,
    Template,
    Imported,
}

impl RecipeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::UserUploaded => "user_uploaded",
            RecipeSource::AiGenerated => "ai_generated",
            RecipeSource::WildcardModified => "wildcard_modified",
            RecipeSource::Template => "template",
            RecipeSource::Imported => "imported",
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: String,
    /// Free text; may be non-numeric such as "to taste"
    pub quantity: String,
    pub unit: String,
    #[serde(default)]
    pub is_wildcard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard_reason: Option<String>,
    #[serde(default)]
    pub order_index: u32,
}

impl IngredientDraft {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        IngredientDraft {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            is_wildcard: false,
            wildcard_reason: None,
            order_index: 0,
        }
    }

    pub fn wildcard(mut self, reason: impl Into<String>) -> Self {
        self.is_wildcard = true;
        self.wildcard_reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionDraft {
    pub step_number: u32,
    pub content: String,
}

/// A structured recipe that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub source: RecipeSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub is_public: bool,
    pub ingredients: Vec<IngredientDraft>,
    pub instructions: Vec<InstructionDraft>,
}

impl RecipeDraft {
    /// Empty draft for manual form entry
    pub fn manual(title: impl Into<String>) -> Self {
        RecipeDraft {
            title: title.into(),
            description: String::new(),
            source: RecipeSource::UserUploaded,
            source_url: None,
            prep_time_minutes: None,
            cook_time_minutes: None,
            servings: None,
            cuisine: None,
            difficulty: None,
            is_public: true,
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    /// Re-derive `order_index` and `step_number` from list positions.
    pub fn reindex(&mut self) {
        for (index, ingredient) in self.ingredients.iter_mut().enumerate() {
            ingredient.order_index = index as u32;
        }
        for (index, instruction) in self.instructions.iter_mut().enumerate() {
            instruction.step_number = index as u32 + 1;
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.ingredients
            .iter()
            .enumerate()
            .all(|(i, ing)| ing.order_index == i as u32)
            && self
                .instructions
                .iter()
                .enumerate()
                .all(|(i, inst)| inst.step_number == i as u32 + 1)
    }

    pub fn push_ingredient(&mut self, ingredient: IngredientDraft) {
        self.ingredients.push(ingredient);
        self.reindex();
    }

    /// Insert at `index`, clamped to the end of the list
    pub fn insert_ingredient(&mut self, index: usize, ingredient: IngredientDraft) {
        let index = index.min(self.ingredients.len());
        self.ingredients.insert(index, ingredient);
        self.reindex();
    }

    pub fn replace_ingredient(&mut self, index: usize, ingredient: IngredientDraft) -> bool {
        match self.ingredients.get_mut(index) {
            Some(slot) => {
                *slot = ingredient;
                self.reindex();
                true
            }
            None => false,
        }
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<IngredientDraft> {
        if index >= self.ingredients.len() {
            return None;
        }
        let removed = self.ingredients.remove(index);
        self.reindex();
        Some(removed)
    }

    pub fn push_instruction(&mut self, content: impl Into<String>) {
        self.instructions.push(InstructionDraft {
            step_number: 0,
            content: content.into(),
        });
        self.reindex();
    }

    pub fn replace_instruction(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.instructions.get_mut(index) {
            Some(slot) => {
                slot.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_instruction(&mut self, index: usize) -> Option<InstructionDraft> {
        if index >= self.instructions.len() {
            return None;
        }
        let removed = self.instructions.remove(index);
        self.reindex();
        Some(removed)
    }

    pub fn move_instruction(&mut self, from: usize, to: usize) -> bool {
        if from >= self.instructions.len() || to >= self.instructions.len() {
            return false;
        }
        let step = self.instructions.remove(from);
        self.instructions.insert(to, step);
        self.reindex();
        true
    }

    /// Checks the draft can be handed to the backend.
    pub fn validate_savable(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Please enter a recipe title".to_string());
        }
        if self.ingredients.is_empty() {
            return Err("Please add at least one ingredient".to_string());
        }
        if self.instructions.is_empty() {
            return Err("Please add at least one instruction".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FreeFormRequest {
    pub prompt_text: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub include_wildcard: bool,
}

impl FreeFormRequest {
    pub fn new(prompt_text: impl Into<String>) -> Self {
        FreeFormRequest {
            prompt_text: prompt_text.into(),
            ..Default::default()
        }
    }
}

/// Input to one orchestrator invocation
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    FreeForm(FreeFormRequest),
    Import { source_text: String },
    Augment { existing_recipe: RecipeDraft },
}

impl GenerationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::FreeForm(_) => "generate",
            GenerationRequest::Import { .. } => "import",
            GenerationRequest::Augment { .. } => "augment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Subtle,
    Medium,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardCatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub flavor_profile: Vec<String>,
    #[serde(default)]
    pub pairs_with: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage_tips: String,
    pub intensity: Intensity,
}

/// One-off recommendation; only lands in a draft if the user accepts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardSuggestion {
    pub ingredient: WildcardCatalogEntry,
    pub reason: String,
    pub how_to_use: String,
    pub quantity_suggestion: String,
}

impl WildcardSuggestion {
    /// Turn an accepted suggestion into a wildcard ingredient line
    pub fn into_ingredient(self) -> IngredientDraft {
        IngredientDraft {
            name: self.ingredient.name,
            quantity: self.quantity_suggestion,
            unit: String::new(),
            is_wildcard: true,
            wildcard_reason: Some(self.reason),
            order_index: 0,
        }
    }
}

/// Row returned by the backend after a successful insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecipe {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: Option<RecipeSource>,
    #[serde(default)]
    pub created_at: Option<String>,
}
