use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::llm::LlmError;
pub use crate::nutrition::NutritionError;
pub use crate::substitution::SubstitutionError;

/// Any failure a caller wiring the whole crate together can hit.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Nutrition(#[from] NutritionError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
