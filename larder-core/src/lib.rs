pub mod allergen;
pub mod canonicalizer;
pub mod config;
pub mod error;
pub mod ingredient_parser;
pub mod llm;
pub mod localization;
pub mod normalize;
pub mod nutrition;
pub mod pipeline;
pub mod scaler;
pub mod substitution;
pub mod unit_converter;

pub use allergen::{
    decide, detect_allergens, Alert, AlertSource, AllergenOntology, DecisionResult, ModelMatch,
    OverallSafety,
};
pub use canonicalizer::{canonicalize, CanonicalIngredient};
pub use config::{ConfigError, CoreConfig};
pub use error::{Error, Result};
pub use ingredient_parser::{parse_ingredient, parse_ingredients, ParsedIngredient, Quantity, Unit};
pub use llm::{
    create_cached_provider, create_provider, CachingProvider, FakeProvider, LlmError, LlmProvider,
    RunOptions,
};
pub use localization::{localize, LlmTranslator, LocalizationResult, LocalizationSource, Translator};
pub use normalize::{normalize, normalize_line};
pub use nutrition::{
    aggregate, create_nutrient_provider, IngredientInput, LocalTableProvider, NutrientProfile,
    NutrientProvider, NutritionError, RecipeNutritionResult,
};
pub use pipeline::{analyze_recipe, AnalysisContext, RecipeAnalysis};
pub use scaler::{scale, ScaleOptions, ScaleResult};
pub use substitution::{suggest_substitutions, SubstitutionError, SubstitutionGoal, SuggestParams, Suggestion};
pub use unit_converter::{convert, ConversionResult, DensityOverrides};
