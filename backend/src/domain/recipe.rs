//! Recipe data model.
//!
//! Recipes belong to exactly one user. Drafts and patches validate their
//! fields on construction so the recipe directory only handles well-formed
//! values.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::{PageWindow, Paginated};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 120;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 2_000;
/// Maximum number of ingredients per recipe.
pub const INGREDIENTS_MAX: usize = 100;
/// Maximum length of a single ingredient line.
pub const INGREDIENT_MAX: usize = 200;
/// Maximum instructions length in characters.
pub const INSTRUCTIONS_MAX: usize = 20_000;
/// Longest accepted cook time: one week.
pub const COOK_TIME_MAX_MINUTES: u32 = 10_080;

/// Validation errors raised by recipe constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("recipe id must be a valid UUID")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("at least one ingredient is required")]
    NoIngredients,
    #[error("at most {max} ingredients are allowed")]
    TooManyIngredients { max: usize },
    #[error("ingredient {index} must not be blank")]
    BlankIngredient { index: usize },
    #[error("ingredient {index} must be at most {max} characters")]
    IngredientTooLong { index: usize, max: usize },
    #[error("instructions must not be empty")]
    EmptyInstructions,
    #[error("instructions must be at most {max} characters")]
    InstructionsTooLong { max: usize },
    #[error("cook time must be between 1 and {max} minutes")]
    CookTimeOutOfRange { max: u32 },
    #[error("update must change at least one field")]
    EmptyPatch,
}

impl RecipeValidationError {
    /// Camel-case request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::NoIngredients
            | Self::TooManyIngredients { .. }
            | Self::BlankIngredient { .. }
            | Self::IngredientTooLong { .. } => "ingredients",
            Self::EmptyInstructions | Self::InstructionsTooLong { .. } => "instructions",
            Self::CookTimeOutOfRange { .. } => "cookTimeMinutes",
            Self::EmptyPatch => "body",
        }
    }
}

/// Stable recipe identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| RecipeValidationError::InvalidId)
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recipe title, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeTitle(String);

impl RecipeTitle {
    /// Trim and validate a title.
    pub fn new(title: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(RecipeValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RecipeTitle> for String {
    fn from(value: RecipeTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecipeTitle {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn validate_description(description: Option<String>) -> Result<Option<String>, RecipeValidationError> {
    match description.map(|text| text.trim().to_owned()) {
        Some(text) if text.is_empty() => Ok(None),
        Some(text) if text.chars().count() > DESCRIPTION_MAX => {
            Err(RecipeValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            })
        }
        other => Ok(other),
    }
}

fn validate_ingredients(ingredients: Vec<String>) -> Result<Vec<String>, RecipeValidationError> {
    if ingredients.is_empty() {
        return Err(RecipeValidationError::NoIngredients);
    }
    if ingredients.len() > INGREDIENTS_MAX {
        return Err(RecipeValidationError::TooManyIngredients {
            max: INGREDIENTS_MAX,
        });
    }
    ingredients
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Err(RecipeValidationError::BlankIngredient { index })
            } else if trimmed.chars().count() > INGREDIENT_MAX {
                Err(RecipeValidationError::IngredientTooLong {
                    index,
                    max: INGREDIENT_MAX,
                })
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .collect()
}

fn validate_instructions(instructions: &str) -> Result<String, RecipeValidationError> {
    let trimmed = instructions.trim();
    if trimmed.is_empty() {
        return Err(RecipeValidationError::EmptyInstructions);
    }
    if trimmed.chars().count() > INSTRUCTIONS_MAX {
        return Err(RecipeValidationError::InstructionsTooLong {
            max: INSTRUCTIONS_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

fn validate_cook_time(minutes: Option<u32>) -> Result<Option<u32>, RecipeValidationError> {
    match minutes {
        Some(value) if value == 0 || value > COOK_TIME_MAX_MINUTES => {
            Err(RecipeValidationError::CookTimeOutOfRange {
                max: COOK_TIME_MAX_MINUTES,
            })
        }
        other => Ok(other),
    }
}

/// Stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Identifier.
    pub id: RecipeId,
    /// Owning user.
    pub user_id: UserId,
    /// Title.
    pub title: RecipeTitle,
    /// Optional summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ingredient lines in display order.
    pub ingredients: Vec<String>,
    /// Preparation steps.
    pub instructions: String,
    /// Optional cook time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Validated request to create a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Owning user; must match the authenticated caller.
    pub user_id: UserId,
    /// Title.
    pub title: RecipeTitle,
    /// Optional summary.
    pub description: Option<String>,
    /// Ingredient lines.
    pub ingredients: Vec<String>,
    /// Preparation steps.
    pub instructions: String,
    /// Optional cook time in minutes.
    pub cook_time_minutes: Option<u32>,
}

/// Raw create payload fields, validated by [`RecipeDraft::try_from_parts`].
#[derive(Debug, Clone, Default)]
pub struct RecipeDraftParts {
    /// Title text.
    pub title: String,
    /// Optional summary.
    pub description: Option<String>,
    /// Ingredient lines.
    pub ingredients: Vec<String>,
    /// Preparation steps.
    pub instructions: String,
    /// Optional cook time in minutes.
    pub cook_time_minutes: Option<u32>,
}

impl RecipeDraft {
    /// Validate raw fields into a draft owned by `user_id`.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{RecipeDraft, RecipeDraftParts, UserId};
    ///
    /// let draft = RecipeDraft::try_from_parts(
    ///     UserId::random(),
    ///     RecipeDraftParts {
    ///         title: "  Pancakes ".into(),
    ///         ingredients: vec!["flour".into(), "milk".into()],
    ///         instructions: "Mix and fry.".into(),
    ///         ..RecipeDraftParts::default()
    ///     },
    /// )
    /// .expect("valid draft");
    /// assert_eq!(draft.title.as_ref(), "Pancakes");
    /// ```
    pub fn try_from_parts(
        user_id: UserId,
        parts: RecipeDraftParts,
    ) -> Result<Self, RecipeValidationError> {
        let RecipeDraftParts {
            title,
            description,
            ingredients,
            instructions,
            cook_time_minutes,
        } = parts;
        Ok(Self {
            user_id,
            title: RecipeTitle::new(title)?,
            description: validate_description(description)?,
            ingredients: validate_ingredients(ingredients)?,
            instructions: validate_instructions(&instructions)?,
            cook_time_minutes: validate_cook_time(cook_time_minutes)?,
        })
    }
}

/// Validated partial update of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    /// Replacement title.
    pub title: Option<RecipeTitle>,
    /// Replacement description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Replacement ingredient list.
    pub ingredients: Option<Vec<String>>,
    /// Replacement instructions.
    pub instructions: Option<String>,
    /// Replacement cook time.
    pub cook_time_minutes: Option<u32>,
}

/// Raw update payload fields, validated by [`RecipePatch::try_from_parts`].
#[derive(Debug, Clone, Default)]
pub struct RecipePatchParts {
    /// Title text.
    pub title: Option<String>,
    /// Description text; an empty string clears the description.
    pub description: Option<String>,
    /// Ingredient lines.
    pub ingredients: Option<Vec<String>>,
    /// Preparation steps.
    pub instructions: Option<String>,
    /// Cook time in minutes.
    pub cook_time_minutes: Option<u32>,
}

impl RecipePatch {
    /// Validate raw fields into a patch; at least one field must be present.
    pub fn try_from_parts(parts: RecipePatchParts) -> Result<Self, RecipeValidationError> {
        let RecipePatchParts {
            title,
            description,
            ingredients,
            instructions,
            cook_time_minutes,
        } = parts;
        let patch = Self {
            title: title.map(RecipeTitle::new).transpose()?,
            description: description
                .map(|text| validate_description(Some(text)))
                .transpose()?,
            ingredients: ingredients.map(validate_ingredients).transpose()?,
            instructions: instructions
                .map(|text| validate_instructions(&text))
                .transpose()?,
            cook_time_minutes: validate_cook_time(cook_time_minutes)?,
        };
        if patch.is_empty() {
            return Err(RecipeValidationError::EmptyPatch);
        }
        Ok(patch)
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.cook_time_minutes.is_none()
    }
}

/// Query accepted by the unified recipe lookup.
///
/// Precedence when several identifiers are supplied: a single recipe id wins
/// over an owner id, which wins over the unscoped listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeLookup {
    /// One recipe by id.
    ById(RecipeId),
    /// A page of recipes owned by one user.
    ByOwner {
        /// Owning user.
        user_id: UserId,
        /// Requested slice.
        window: PageWindow,
    },
    /// A page of all recipes.
    All {
        /// Requested slice.
        window: PageWindow,
    },
}

impl RecipeLookup {
    /// Resolve the lookup from optional request parameters.
    pub fn resolve(id: Option<RecipeId>, user_id: Option<UserId>, window: PageWindow) -> Self {
        match (id, user_id) {
            (Some(id), _) => Self::ById(id),
            (None, Some(user_id)) => Self::ByOwner { user_id, window },
            (None, None) => Self::All { window },
        }
    }
}

/// Result of the unified recipe lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecipeFindResult {
    /// A single recipe.
    One(Recipe),
    /// A page of recipes.
    Page(Paginated<Recipe>),
}
