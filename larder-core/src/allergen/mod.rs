//! Allergen knowledge and decisions.
//!
//! - [`ontology`]: static ingredient to category lookup with regional synonyms
//! - [`decision`]: merges ontology and model matches into alerts and a verdict
//! - [`detect`]: builds and parses the model-side detection request

pub mod decision;
pub mod detect;
pub mod ontology;

pub use decision::{
    decide, overall_safety, Alert, AlertSource, DecisionResult, ModelMatch, OverallSafety,
    ONTOLOGY_CONFIDENCE,
};
pub use detect::{build_allergen_prompt, detect_allergens, AllergenDetection, DetectionOutcome};
pub use ontology::{AllergenCategory, AllergenOntology};
