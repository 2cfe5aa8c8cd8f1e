//! Concrete nutrient providers.

mod local;
mod usda;

pub use local::LocalTableProvider;
pub use usda::UsdaProvider;

use super::{NutrientProvider, NutritionError};
use crate::config::{CoreConfig, NutritionBackend};

/// Build the provider selected by `config`. Privacy mode always yields the
/// local table.
pub fn create_nutrient_provider(
    config: &CoreConfig,
) -> Result<Box<dyn NutrientProvider>, NutritionError> {
    if config.privacy_mode {
        tracing::debug!("privacy mode on, using local nutrient table");
        return Ok(Box::new(LocalTableProvider::new()));
    }

    match config.nutrition.backend {
        NutritionBackend::Local => Ok(Box::new(LocalTableProvider::new())),
        NutritionBackend::Usda => {
            let api_key = config.nutrition.usda_api_key.clone().ok_or_else(|| {
                NutritionError::NotConfigured("USDA_API_KEY not set".to_string())
            })?;
            Ok(Box::new(UsdaProvider::new(api_key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmBackend, LlmConfig, NutritionConfig};
    use std::path::PathBuf;

    fn config(backend: NutritionBackend, key: Option<&str>, privacy_mode: bool) -> CoreConfig {
        CoreConfig {
            llm: LlmConfig {
                backend: LlmBackend::Fake,
                model: "fake-model".to_string(),
                api_key: None,
                cache_dir: PathBuf::from(".cache/llm"),
            },
            nutrition: NutritionConfig {
                backend,
                usda_api_key: key.map(str::to_string),
            },
            privacy_mode,
        }
    }

    #[test]
    fn test_provider_selection() {
        let provider = create_nutrient_provider(&config(NutritionBackend::Local, None, false)).unwrap();
        assert_eq!(provider.provider_name(), "local");

        let provider =
            create_nutrient_provider(&config(NutritionBackend::Usda, Some("demo"), false)).unwrap();
        assert_eq!(provider.provider_name(), "usda");
    }

    #[test]
    fn test_privacy_mode_forces_local() {
        let provider =
            create_nutrient_provider(&config(NutritionBackend::Usda, Some("demo"), true)).unwrap();
        assert_eq!(provider.provider_name(), "local");
    }

    #[test]
    fn test_usda_without_key() {
        let result = create_nutrient_provider(&config(NutritionBackend::Usda, None, false));
        assert!(matches!(result, Err(NutritionError::NotConfigured(_))));
    }
}
