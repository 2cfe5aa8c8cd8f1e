mod input;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use larder_core::allergen::{decide, AllergenOntology, ModelMatch};
use larder_core::canonicalizer::canonicalize;
use larder_core::config::CoreConfig;
use larder_core::ingredient_parser::parse_ingredient;
use larder_core::llm::{create_cached_provider, LlmProvider};
use larder_core::localization::{localize, LlmTranslator, Translator};
use larder_core::normalize::normalize;
use larder_core::nutrition::{create_nutrient_provider, NutrientProvider};
use larder_core::pipeline::{analyze_recipe, AnalysisContext};
use larder_core::scaler::{scale, ScaleOptions};
use larder_core::substitution::{suggest_substitutions, SubstitutionGoal, SuggestParams};
use larder_core::unit_converter::{convert, DensityOverrides};

use input::{parse_density, read_lines};

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Parse, convert and analyze recipe ingredient lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean raw ingredient lines (bullets, HTML, filler phrases)
    Normalize {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Split lines into quantity, unit and ingredient name
    Parse {
        file: Option<PathBuf>,
    },
    /// Convert lines to grams and milliliters
    Convert {
        file: Option<PathBuf>,
        /// Density override, e.g. "honey=1.42" (g per ml, or g per item for countables)
        #[arg(long = "density", value_parser = parse_density)]
        densities: Vec<(String, f64)>,
    },
    /// Strip brands and modifiers and tag categories
    Canonicalize {
        file: Option<PathBuf>,
    },
    /// Allergen alerts for canonical ingredient names, one per line
    Allergens {
        file: Option<PathBuf>,
        /// Region for synonym lookup, e.g. "us"
        #[arg(long)]
        region: Option<String>,
        /// JSON array of model matches to merge with the ontology
        #[arg(long)]
        model_matches: Option<PathBuf>,
    },
    /// Full analysis: conversions, allergens and nutrition
    Analyze {
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 1.0)]
        servings: f64,
        #[arg(long)]
        region: Option<String>,
        /// Declared allergen; enables model-backed detection
        #[arg(long = "allergen")]
        allergens: Vec<String>,
        #[arg(long = "density", value_parser = parse_density)]
        densities: Vec<(String, f64)>,
    },
    /// Rescale a recipe to a serving count or calorie target
    Scale {
        file: Option<PathBuf>,
        /// Servings the recipe currently makes
        #[arg(long)]
        servings: f64,
        /// New serving count
        #[arg(long, conflicts_with = "calories")]
        to: Option<f64>,
        /// Target calories per serving
        #[arg(long)]
        calories: Option<f64>,
    },
    /// Suggest substitutions for an ingredient
    Substitute {
        ingredient: String,
        /// One of: remove-allergen, reduce-calories, make-vegan, preserve-flavor
        #[arg(long)]
        goal: SubstitutionGoal,
        /// Allergen the suggestions must avoid
        #[arg(long = "avoid")]
        avoid: Vec<String>,
        #[arg(long)]
        cuisine: Option<String>,
    },
    /// Locale-specific name for a canonical ingredient
    Localize {
        name: String,
        #[arg(long, default_value = "en-us")]
        locale: String,
        /// Ask the configured model when the dictionary has no entry
        #[arg(long)]
        translate: bool,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Configured collaborators.
struct Services {
    nutrients: Box<dyn NutrientProvider>,
    llm: Box<dyn LlmProvider>,
}

fn services() -> larder_core::Result<Services> {
    let config = CoreConfig::from_env()?;
    let nutrients = create_nutrient_provider(&config)?;
    let llm = create_cached_provider(&config.llm)?;
    tracing::debug!(
        nutrients = nutrients.provider_name(),
        llm = llm.provider_name(),
        model = llm.model_name(),
        privacy_mode = config.privacy_mode,
        "configured services"
    );
    Ok(Services { nutrients, llm })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn density_overrides(densities: Vec<(String, f64)>) -> Option<DensityOverrides> {
    if densities.is_empty() {
        None
    } else {
        Some(densities.into_iter().collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { file } => {
            let lines = read_lines(file.as_deref())?;
            print_json(&normalize(&lines))?;
        }
        Commands::Parse { file } => {
            let lines = read_lines(file.as_deref())?;
            let parsed: Vec<_> = lines.iter().map(|line| parse_ingredient(line)).collect();
            print_json(&parsed)?;
        }
        Commands::Convert { file, densities } => {
            let lines = read_lines(file.as_deref())?;
            let overrides = density_overrides(densities);
            let converted: Vec<_> = lines
                .iter()
                .map(|line| convert(&parse_ingredient(line), overrides.as_ref()))
                .collect();
            print_json(&converted)?;
        }
        Commands::Canonicalize { file } => {
            let lines = read_lines(file.as_deref())?;
            let canonical: Vec<_> = lines.iter().map(|line| canonicalize(line)).collect();
            print_json(&canonical)?;
        }
        Commands::Allergens {
            file,
            region,
            model_matches,
        } => {
            let names = read_lines(file.as_deref())?;
            let matches: Vec<ModelMatch> = match model_matches {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str(&content)
                        .with_context(|| format!("Invalid model matches in {}", path.display()))?
                }
                None => Vec::new(),
            };
            let result = decide(
                AllergenOntology::global(),
                &names,
                &matches,
                region.as_deref(),
            );
            print_json(&result)?;
        }
        Commands::Analyze {
            file,
            servings,
            region,
            allergens,
            densities,
        } => {
            let lines = read_lines(file.as_deref())?;
            let services = services()?;
            let mut ctx = AnalysisContext::new(services.nutrients.as_ref())
                .with_user_allergens(allergens);
            if !ctx.user_allergens.is_empty() {
                ctx = ctx.with_llm(services.llm.as_ref());
            }
            if let Some(region) = region {
                ctx = ctx.with_region(region);
            }
            if let Some(overrides) = density_overrides(densities) {
                ctx = ctx.with_density_overrides(overrides);
            }
            let analysis = analyze_recipe(&lines, servings, &ctx).await?;
            print_json(&analysis)?;
        }
        Commands::Scale {
            file,
            servings,
            to,
            calories,
        } => {
            let options = match (to, calories) {
                (Some(count), _) => ScaleOptions::to_servings(count),
                (None, Some(target)) => ScaleOptions::to_calories_per_serving(target),
                (None, None) => bail!("pass --to or --calories"),
            };
            let lines = read_lines(file.as_deref())?;
            let services = services()?;
            let ctx = AnalysisContext::new(services.nutrients.as_ref());
            let analysis = analyze_recipe(&lines, servings, &ctx).await?;
            let inputs: Vec<_> = analysis
                .nutrition
                .per_ingredient
                .into_iter()
                .map(|ingredient| ingredient.input)
                .collect();
            let result = scale(services.nutrients.as_ref(), &inputs, servings, options).await;
            print_json(&result)?;
        }
        Commands::Substitute {
            ingredient,
            goal,
            avoid,
            cuisine,
        } => {
            let services = services()?;
            let params = SuggestParams {
                ingredient,
                goal,
                user_allergens: avoid,
                cuisine_context: cuisine,
            };
            let suggestions =
                suggest_substitutions(services.llm.as_ref(), AllergenOntology::global(), &params)
                    .await?;
            print_json(&suggestions)?;
        }
        Commands::Localize {
            name,
            locale,
            translate,
        } => {
            let result = if translate {
                let services = services()?;
                let translator = LlmTranslator::new(services.llm.as_ref());
                localize(&name, &locale, Some(&translator as &dyn Translator)).await
            } else {
                localize(&name, &locale, None).await
            };
            print_json(&result)?;
        }
    }

    Ok(())
}
