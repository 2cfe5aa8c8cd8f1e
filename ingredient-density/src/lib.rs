//! Ingredient density heuristics for volume-to-weight conversion.
//!
//! This crate provides the fixed volume factors (milliliters per teaspoon,
//! tablespoon, cup, liter) and a small set of built-in densities (grams per
//! milliliter) keyed on substrings of an ingredient name.
//!
//! # Example
//!
//! ```
//! use ingredient_density::{builtin_density, volume_to_ml};
//!
//! let ml = volume_to_ml(1.0, "cup").unwrap();
//! let grams_per_ml = builtin_density("all-purpose flour").unwrap();
//! assert_eq!((ml * grams_per_ml).round(), 127.0);
//! ```

mod density_lookup;

pub use density_lookup::{
    builtin_density, volume_to_ml, DensityRule, BUILTIN_DENSITIES, ML_PER_CUP, ML_PER_L,
    ML_PER_TBSP, ML_PER_TSP,
};
