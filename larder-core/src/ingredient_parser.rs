//! Ingredient parsing module.
//!
//! Splits a normalized ingredient line (e.g., "1 1/2 cups all-purpose flour") into
//! a quantity, a canonical unit and the remaining ingredient name.
//!
//! Quantity recognition is an ordered list of independent [`QuantityMatcher`]s;
//! the first one that matches the leading tokens wins. Unit recognition resolves
//! the following token through a synonym table. Line-level idioms ("a pinch",
//! "to taste") run last. Parsing never fails: the worst case is
//! `{ quantity: None, unit: None, ingredient_name: <trimmed input> }`.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const GRAMS_PER_OZ: f64 = 28.349523125;
pub const GRAMS_PER_LB: f64 = 453.59237;

/// Canonical unit codes. Ounces and pounds never appear here; they are
/// converted to grams while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Kg,
    Ml,
    L,
    Tsp,
    Tbsp,
    Cup,
    Piece,
    Slice,
    Pinch,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
            Unit::Tsp => "tsp",
            Unit::Tbsp => "tbsp",
            Unit::Cup => "cup",
            Unit::Piece => "piece",
            Unit::Slice => "slice",
            Unit::Pinch => "pinch",
        }
    }

    pub fn is_weight(self) -> bool {
        matches!(self, Unit::G | Unit::Kg)
    }

    pub fn is_volume(self) -> bool {
        matches!(self, Unit::Ml | Unit::L | Unit::Tsp | Unit::Tbsp | Unit::Cup)
    }

    /// Units counted per item rather than measured.
    pub fn is_countable(self) -> bool {
        matches!(self, Unit::Piece | Unit::Slice | Unit::Pinch)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed quantity: either a number or a verbatim "<low>-<high>" range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Amount(f64),
    Range(String),
}

impl Quantity {
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Quantity::Amount(value) => Some(*value),
            Quantity::Range(_) => None,
        }
    }

    /// Low and high bounds of a range quantity.
    pub fn range_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Quantity::Amount(_) => None,
            Quantity::Range(range) => {
                let (low, high) = range.split_once('-')?;
                Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
            }
        }
    }
}

/// Parsed ingredient structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    pub quantity: Option<Quantity>,
    pub unit: Option<Unit>,
    pub ingredient_name: String,
}

impl ParsedIngredient {
    fn unparsed(name: String) -> Self {
        Self {
            quantity: None,
            unit: None,
            ingredient_name: name,
        }
    }
}

// =============================================================================
// Units
// =============================================================================

/// What a unit token resolves to before mass normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
enum UnitSynonym {
    Unit(Unit),
    Ounce,
    Pound,
}

const UNIT_SYNONYMS_RAW: &[(&str, UnitSynonym)] = &[
    ("g", UnitSynonym::Unit(Unit::G)),
    ("gram", UnitSynonym::Unit(Unit::G)),
    ("grams", UnitSynonym::Unit(Unit::G)),
    ("kg", UnitSynonym::Unit(Unit::Kg)),
    ("kilogram", UnitSynonym::Unit(Unit::Kg)),
    ("kilograms", UnitSynonym::Unit(Unit::Kg)),
    ("ml", UnitSynonym::Unit(Unit::Ml)),
    ("milliliter", UnitSynonym::Unit(Unit::Ml)),
    ("milliliters", UnitSynonym::Unit(Unit::Ml)),
    ("millilitre", UnitSynonym::Unit(Unit::Ml)),
    ("millilitres", UnitSynonym::Unit(Unit::Ml)),
    ("l", UnitSynonym::Unit(Unit::L)),
    ("liter", UnitSynonym::Unit(Unit::L)),
    ("liters", UnitSynonym::Unit(Unit::L)),
    ("litre", UnitSynonym::Unit(Unit::L)),
    ("litres", UnitSynonym::Unit(Unit::L)),
    ("t", UnitSynonym::Unit(Unit::Tsp)),
    ("tsp", UnitSynonym::Unit(Unit::Tsp)),
    ("tsps", UnitSynonym::Unit(Unit::Tsp)),
    ("teaspoon", UnitSynonym::Unit(Unit::Tsp)),
    ("teaspoons", UnitSynonym::Unit(Unit::Tsp)),
    ("tbsp", UnitSynonym::Unit(Unit::Tbsp)),
    ("tbsps", UnitSynonym::Unit(Unit::Tbsp)),
    ("tbs", UnitSynonym::Unit(Unit::Tbsp)),
    ("tablespoon", UnitSynonym::Unit(Unit::Tbsp)),
    ("tablespoons", UnitSynonym::Unit(Unit::Tbsp)),
    ("c", UnitSynonym::Unit(Unit::Cup)),
    ("cup", UnitSynonym::Unit(Unit::Cup)),
    ("cups", UnitSynonym::Unit(Unit::Cup)),
    ("pinch", UnitSynonym::Unit(Unit::Pinch)),
    ("pinches", UnitSynonym::Unit(Unit::Pinch)),
    ("slice", UnitSynonym::Unit(Unit::Slice)),
    ("slices", UnitSynonym::Unit(Unit::Slice)),
    ("piece", UnitSynonym::Unit(Unit::Piece)),
    ("pieces", UnitSynonym::Unit(Unit::Piece)),
    ("pc", UnitSynonym::Unit(Unit::Piece)),
    ("pcs", UnitSynonym::Unit(Unit::Piece)),
    ("can", UnitSynonym::Unit(Unit::Piece)),
    ("cans", UnitSynonym::Unit(Unit::Piece)),
    ("package", UnitSynonym::Unit(Unit::Piece)),
    ("packages", UnitSynonym::Unit(Unit::Piece)),
    ("pkg", UnitSynonym::Unit(Unit::Piece)),
    ("pkgs", UnitSynonym::Unit(Unit::Piece)),
    ("jar", UnitSynonym::Unit(Unit::Piece)),
    ("jars", UnitSynonym::Unit(Unit::Piece)),
    ("tin", UnitSynonym::Unit(Unit::Piece)),
    ("tins", UnitSynonym::Unit(Unit::Piece)),
    ("clove", UnitSynonym::Unit(Unit::Piece)),
    ("cloves", UnitSynonym::Unit(Unit::Piece)),
    ("oz", UnitSynonym::Ounce),
    ("ounce", UnitSynonym::Ounce),
    ("ounces", UnitSynonym::Ounce),
    ("lb", UnitSynonym::Pound),
    ("lbs", UnitSynonym::Pound),
    ("pound", UnitSynonym::Pound),
    ("pounds", UnitSynonym::Pound),
];

static UNIT_SYNONYMS: LazyLock<HashMap<&'static str, UnitSynonym>> =
    LazyLock::new(|| UNIT_SYNONYMS_RAW.iter().copied().collect());

/// Resolve a single token to a unit. Trailing "." or "," is ignored.
///
/// Lookup is case-insensitive except for the capital "T", which is the
/// conventional tablespoon abbreviation (lowercase "t" is a teaspoon).
fn resolve_unit(token: &str) -> Option<UnitSynonym> {
    let token = token.trim_end_matches(['.', ',']);
    if token == "T" {
        return Some(UnitSynonym::Unit(Unit::Tbsp));
    }
    UNIT_SYNONYMS.get(token.to_lowercase().as_str()).copied()
}

// =============================================================================
// Quantities
// =============================================================================

const UNICODE_FRACTIONS: &[(char, f64)] = &[
    ('½', 0.5),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('¼', 0.25),
    ('¾', 0.75),
    ('⅕', 0.2),
    ('⅖', 0.4),
    ('⅗', 0.6),
    ('⅘', 0.8),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 0.125),
    ('⅜', 0.375),
    ('⅝', 0.625),
    ('⅞', 0.875),
];

const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
];

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)[-–—](\d+(?:\.\d+)?)([A-Za-z]+)?\.?$").expect("valid regex")
});

static GLUED_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([A-Za-z]+)\.?$").expect("valid regex"));

/// Result of a successful quantity match.
#[derive(Debug, Clone, PartialEq)]
struct QuantityMatch {
    quantity: Quantity,
    /// Number of leading tokens consumed.
    consumed: usize,
    /// Unit glued onto the number, as in "250ml".
    glued_unit: Option<UnitSynonym>,
}

impl QuantityMatch {
    fn single(quantity: Quantity) -> Self {
        Self {
            quantity,
            consumed: 1,
            glued_unit: None,
        }
    }
}

/// One quantity idiom. Each matcher looks only at the leading tokens and either
/// declines or returns a complete match; matchers never depend on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuantityMatcher {
    /// "2-3", "500-600", "500-600g"
    Range,
    /// "1 1/2", "2 ½"
    MixedFraction,
    /// "½", "3¼"
    UnicodeFraction,
    /// "1/2"
    Fraction,
    /// "2", "0.5", "1,5", "1,000"
    Number,
    /// "250ml", "3oz"
    GluedUnit,
    /// "one" through "ten"
    NumberWord,
    /// "a", "an"
    Article,
}

/// Matchers in priority order.
const QUANTITY_MATCHERS: &[QuantityMatcher] = &[
    QuantityMatcher::Range,
    QuantityMatcher::MixedFraction,
    QuantityMatcher::UnicodeFraction,
    QuantityMatcher::Fraction,
    QuantityMatcher::Number,
    QuantityMatcher::GluedUnit,
    QuantityMatcher::NumberWord,
    QuantityMatcher::Article,
];

impl QuantityMatcher {
    fn try_match(self, tokens: &[&str]) -> Option<QuantityMatch> {
        let first = *tokens.first()?;
        match self {
            QuantityMatcher::Range => {
                let caps = RANGE_RE.captures(first)?;
                let glued_unit = match caps.get(3) {
                    Some(suffix) => Some(resolve_unit(suffix.as_str())?),
                    None => None,
                };
                Some(QuantityMatch {
                    quantity: Quantity::Range(format!("{}-{}", &caps[1], &caps[2])),
                    consumed: 1,
                    glued_unit,
                })
            }
            QuantityMatcher::MixedFraction => {
                if first.is_empty() || !first.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let whole: f64 = first.parse().ok()?;
                let second = tokens.get(1)?;
                let fraction = parse_ascii_fraction(second).or_else(|| {
                    let mut chars = second.chars();
                    match (chars.next(), chars.next()) {
                        (Some(glyph), None) => unicode_fraction_value(glyph),
                        _ => None,
                    }
                })?;
                Some(QuantityMatch {
                    quantity: Quantity::Amount(whole + fraction),
                    consumed: 2,
                    glued_unit: None,
                })
            }
            QuantityMatcher::UnicodeFraction => {
                parse_unicode_fraction(first).map(|v| QuantityMatch::single(Quantity::Amount(v)))
            }
            QuantityMatcher::Fraction => {
                parse_ascii_fraction(first).map(|v| QuantityMatch::single(Quantity::Amount(v)))
            }
            QuantityMatcher::Number => {
                parse_number(first).map(|v| QuantityMatch::single(Quantity::Amount(v)))
            }
            QuantityMatcher::GluedUnit => {
                let caps = GLUED_UNIT_RE.captures(first)?;
                let value: f64 = caps[1].parse().ok()?;
                let unit = resolve_unit(&caps[2])?;
                Some(QuantityMatch {
                    quantity: Quantity::Amount(value),
                    consumed: 1,
                    glued_unit: Some(unit),
                })
            }
            QuantityMatcher::NumberWord => {
                let word = first.to_lowercase();
                NUMBER_WORDS
                    .iter()
                    .find(|(w, _)| *w == word)
                    .map(|(_, v)| QuantityMatch::single(Quantity::Amount(*v)))
            }
            QuantityMatcher::Article => {
                let word = first.to_lowercase();
                (word == "a" || word == "an").then(|| QuantityMatch::single(Quantity::Amount(1.0)))
            }
        }
    }
}

fn unicode_fraction_value(glyph: char) -> Option<f64> {
    UNICODE_FRACTIONS
        .iter()
        .find(|(c, _)| *c == glyph)
        .map(|(_, v)| *v)
}

/// Parse "½" or a glyph glued to a whole number, as in "3¼".
fn parse_unicode_fraction(token: &str) -> Option<f64> {
    let glyph = token.chars().last()?;
    let fraction = unicode_fraction_value(glyph)?;
    let whole = &token[..token.len() - glyph.len_utf8()];
    if whole.is_empty() {
        return Some(fraction);
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: f64 = whole.parse().ok()?;
    Some(whole + fraction)
}

/// Parse "1/2" (also accepts the unicode fraction slash).
fn parse_ascii_fraction(token: &str) -> Option<f64> {
    let (num, denom) = token.split_once(['/', '⁄'])?;
    if num.is_empty()
        || denom.is_empty()
        || !num.chars().all(|c| c.is_ascii_digit())
        || !denom.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let num: f64 = num.parse().ok()?;
    let denom: f64 = denom.parse().ok()?;
    if denom == 0.0 {
        return None;
    }
    Some(num / denom)
}

/// Parse a plain number. Accepts "2", "0.5", ".5", a decimal comma ("1,5")
/// and thousands separators ("1,000").
fn parse_number(token: &str) -> Option<f64> {
    static PLAIN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(?:\d+(?:\.\d+)?|\.\d+)$").expect("valid regex"));
    static DECIMAL_COMMA: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+,\d{1,2}$").expect("valid regex"));
    static THOUSANDS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d{1,3}(?:,\d{3})+$").expect("valid regex"));

    if PLAIN.is_match(token) {
        token.parse().ok()
    } else if DECIMAL_COMMA.is_match(token) {
        token.replace(',', ".").parse().ok()
    } else if THOUSANDS.is_match(token) {
        token.replace(',', "").parse().ok()
    } else {
        None
    }
}

/// Convert an ounce/pound quantity to whole grams. Ranges convert endpoint-wise.
fn quantity_to_grams(quantity: Quantity, grams_per_unit: f64) -> Quantity {
    match quantity {
        Quantity::Amount(value) => Quantity::Amount((value * grams_per_unit).round()),
        Quantity::Range(ref range) => match quantity.range_bounds() {
            Some((low, high)) => Quantity::Range(format!(
                "{}-{}",
                (low * grams_per_unit).round(),
                (high * grams_per_unit).round()
            )),
            None => Quantity::Range(range.clone()),
        },
    }
}

// =============================================================================
// Idioms
// =============================================================================

static PINCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpinch(?:es)?\b").expect("valid regex"));

static PINCH_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:an?\s+)?pinch(?:es)?\b(?:\s+of\b)?").expect("valid regex")
});

static TO_TASTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto taste\b").expect("valid regex"));

static TO_TASTE_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),?\s*(?:\bor\s+)?\bto taste\b").expect("valid regex"));

static LEADING_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^of\s+").expect("valid regex"));

static EMPTY_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("valid regex"));

/// Line-level idioms applied after quantity and unit consumption, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Idiom {
    /// "a pinch of salt", "salt, a pinch"
    Pinch,
    /// "salt, to taste" drops quantity and unit entirely.
    ToTaste,
}

const IDIOMS: &[Idiom] = &[Idiom::Pinch, Idiom::ToTaste];

impl Idiom {
    fn apply(self, line: &str, parsed: &mut ParsedIngredient) {
        match self {
            Idiom::Pinch => {
                if parsed.unit.is_some() || !PINCH_RE.is_match(line) {
                    return;
                }
                parsed.quantity.get_or_insert(Quantity::Amount(1.0));
                parsed.unit = Some(Unit::Pinch);
                parsed.ingredient_name =
                    tidy_name(&PINCH_PHRASE_RE.replace(&parsed.ingredient_name, ""));
            }
            Idiom::ToTaste => {
                if !TO_TASTE_RE.is_match(line) {
                    return;
                }
                parsed.quantity = None;
                parsed.unit = None;
                parsed.ingredient_name =
                    tidy_name(&TO_TASTE_PHRASE_RE.replace_all(&parsed.ingredient_name, ""));
            }
        }
    }
}

/// Remove empty parentheses, collapse whitespace and trim stray commas.
fn tidy_name(name: &str) -> String {
    let name = EMPTY_PARENS_RE.replace_all(name, "");
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    name.trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

// =============================================================================
// Public API
// =============================================================================

/// Parse a single ingredient line into structured data.
///
/// This does best-effort parsing - if nothing is recognized, the trimmed line
/// comes back as the ingredient name with no quantity or unit.
pub fn parse_ingredient(line: &str) -> ParsedIngredient {
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return ParsedIngredient::unparsed(String::new());
    }
    let tokens: Vec<&str> = collapsed.split(' ').collect();

    let mut quantity = None;
    let mut unit_synonym = None;
    let mut idx = 0;

    if let Some(m) = QUANTITY_MATCHERS
        .iter()
        .find_map(|matcher| matcher.try_match(&tokens))
    {
        quantity = Some(m.quantity);
        unit_synonym = m.glued_unit;
        idx = m.consumed;
    }

    if unit_synonym.is_none() {
        if let Some(synonym) = tokens.get(idx).and_then(|token| resolve_unit(token)) {
            unit_synonym = Some(synonym);
            idx += 1;
        }
    }

    let (quantity, unit) = match unit_synonym {
        Some(UnitSynonym::Unit(unit)) => (quantity, Some(unit)),
        Some(UnitSynonym::Ounce) => (
            quantity.map(|q| quantity_to_grams(q, GRAMS_PER_OZ)),
            Some(Unit::G),
        ),
        Some(UnitSynonym::Pound) => (
            quantity.map(|q| quantity_to_grams(q, GRAMS_PER_LB)),
            Some(Unit::G),
        ),
        None => (quantity, None),
    };

    let remainder = tokens[idx..].join(" ");
    let mut parsed = ParsedIngredient {
        quantity,
        unit,
        ingredient_name: LEADING_OF_RE.replace(&remainder, "").into_owned(),
    };

    for idiom in IDIOMS {
        idiom.apply(&collapsed, &mut parsed);
    }

    parsed
}

/// Parse multiple ingredient lines (separated by newlines).
pub fn parse_ingredients(blob: &str) -> Vec<ParsedIngredient> {
    blob.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_ingredient)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(value: f64) -> Option<Quantity> {
        Some(Quantity::Amount(value))
    }

    #[test]
    fn test_mixed_fraction() {
        let result = parse_ingredient("1 1/2 cups all-purpose flour");
        assert_eq!(result.quantity, amount(1.5));
        assert_eq!(result.unit, Some(Unit::Cup));
        assert_eq!(result.ingredient_name, "all-purpose flour");
    }

    #[test]
    fn test_unicode_fractions() {
        let result = parse_ingredient("½ cup sugar");
        assert_eq!(result.quantity, amount(0.5));
        assert_eq!(result.unit, Some(Unit::Cup));

        let result = parse_ingredient("3¼ cups milk");
        assert_eq!(result.quantity, amount(3.25));
        assert_eq!(result.ingredient_name, "milk");

        let result = parse_ingredient("1 ½ tsp vanilla");
        assert_eq!(result.quantity, amount(1.5));
        assert_eq!(result.unit, Some(Unit::Tsp));
    }

    #[test]
    fn test_glued_unit() {
        let result = parse_ingredient("250ml water");
        assert_eq!(result.quantity, amount(250.0));
        assert_eq!(result.unit, Some(Unit::Ml));
        assert_eq!(result.ingredient_name, "water");
    }

    #[test]
    fn test_ounces_become_grams() {
        let result = parse_ingredient("3 oz cheddar cheese");
        assert_eq!(result.quantity, amount(85.0));
        assert_eq!(result.unit, Some(Unit::G));
        assert_eq!(result.ingredient_name, "cheddar cheese");

        let result = parse_ingredient("3oz cheddar");
        assert_eq!(result.quantity, amount(85.0));
        assert_eq!(result.unit, Some(Unit::G));
    }

    #[test]
    fn test_pounds_become_grams() {
        let result = parse_ingredient("2 lbs ground beef");
        assert_eq!(result.quantity, amount(907.0));
        assert_eq!(result.unit, Some(Unit::G));
        assert_eq!(result.ingredient_name, "ground beef");
    }

    #[test]
    fn test_ounce_range_converts_endpoints() {
        let result = parse_ingredient("6-8 oz spinach");
        assert_eq!(result.quantity, Some(Quantity::Range("170-227".to_string())));
        assert_eq!(result.unit, Some(Unit::G));
    }

    #[test]
    fn test_range_is_verbatim() {
        let result = parse_ingredient("2-3 cups chopped nuts");
        assert_eq!(result.quantity, Some(Quantity::Range("2-3".to_string())));
        assert_eq!(result.unit, Some(Unit::Cup));
        assert_eq!(result.ingredient_name, "chopped nuts");

        let result = parse_ingredient("500-600g chicken");
        assert_eq!(result.quantity, Some(Quantity::Range("500-600".to_string())));
        assert_eq!(result.unit, Some(Unit::G));
        assert_eq!(result.ingredient_name, "chicken");
    }

    #[test]
    fn test_number_words_and_articles() {
        let result = parse_ingredient("One large egg");
        assert_eq!(result.quantity, amount(1.0));
        assert_eq!(result.unit, None);
        assert_eq!(result.ingredient_name, "large egg");

        let result = parse_ingredient("an onion");
        assert_eq!(result.quantity, amount(1.0));
        assert_eq!(result.ingredient_name, "onion");
    }

    #[test]
    fn test_pinch_idiom() {
        let result = parse_ingredient("a pinch of salt");
        assert_eq!(result.quantity, amount(1.0));
        assert_eq!(result.unit, Some(Unit::Pinch));
        assert_eq!(result.ingredient_name, "salt");

        let result = parse_ingredient("salt, a pinch");
        assert_eq!(result.quantity, amount(1.0));
        assert_eq!(result.unit, Some(Unit::Pinch));
        assert_eq!(result.ingredient_name, "salt");
    }

    #[test]
    fn test_to_taste_idiom() {
        let result = parse_ingredient("Salt and freshly ground black pepper, to taste");
        assert_eq!(result.quantity, None);
        assert_eq!(result.unit, None);
        assert_eq!(result.ingredient_name, "Salt and freshly ground black pepper");

        let result = parse_ingredient("1 tsp salt, or to taste");
        assert_eq!(result.quantity, None);
        assert_eq!(result.unit, None);
        assert_eq!(result.ingredient_name, "salt");
    }

    #[test]
    fn test_countable_synonyms() {
        let result = parse_ingredient("3 cloves garlic, minced");
        assert_eq!(result.unit, Some(Unit::Piece));
        assert_eq!(result.ingredient_name, "garlic, minced");

        let result = parse_ingredient("1 can (400g) diced tomatoes");
        assert_eq!(result.quantity, amount(1.0));
        assert_eq!(result.unit, Some(Unit::Piece));
        assert_eq!(result.ingredient_name, "(400g) diced tomatoes");
    }

    #[test]
    fn test_tablespoon_case() {
        assert_eq!(parse_ingredient("1 T butter").unit, Some(Unit::Tbsp));
        assert_eq!(parse_ingredient("1 t salt").unit, Some(Unit::Tsp));
        assert_eq!(parse_ingredient("2 tbsp. olive oil").unit, Some(Unit::Tbsp));
    }

    #[test]
    fn test_locale_numbers() {
        let result = parse_ingredient("1,5 kg potatoes");
        assert_eq!(result.quantity, amount(1.5));
        assert_eq!(result.unit, Some(Unit::Kg));

        let result = parse_ingredient("1,000 g flour");
        assert_eq!(result.quantity, amount(1000.0));
    }

    #[test]
    fn test_no_unit_keeps_remainder() {
        let result = parse_ingredient("3 eggs");
        assert_eq!(result.quantity, amount(3.0));
        assert_eq!(result.unit, None);
        assert_eq!(result.ingredient_name, "eggs");
    }

    #[test]
    fn test_unit_without_quantity() {
        let result = parse_ingredient("cup of sugar");
        assert_eq!(result.quantity, None);
        assert_eq!(result.unit, Some(Unit::Cup));
        assert_eq!(result.ingredient_name, "sugar");
    }

    #[test]
    fn test_unrecognized_returns_trimmed_line() {
        let result = parse_ingredient("  fresh basil leaves  ");
        assert_eq!(result, ParsedIngredient::unparsed("fresh basil leaves".to_string()));
    }

    #[test]
    fn test_zero_denominator_is_not_a_quantity() {
        let result = parse_ingredient("1/0 cup flour");
        assert_eq!(result.quantity, None);
        assert_eq!(result.ingredient_name, "1/0 cup flour");
    }

    #[test]
    fn test_empty_line() {
        let result = parse_ingredient("   ");
        assert_eq!(result.ingredient_name, "");
        assert_eq!(result.quantity, None);
    }

    #[test]
    fn test_matchers_are_independent() {
        assert!(QuantityMatcher::Range.try_match(&["1/2"]).is_none());
        assert!(QuantityMatcher::Fraction.try_match(&["2-3"]).is_none());
        assert!(QuantityMatcher::GluedUnit.try_match(&["10inch"]).is_none());
        assert_eq!(
            QuantityMatcher::MixedFraction
                .try_match(&["2", "3/4"])
                .map(|m| m.consumed),
            Some(2)
        );
    }

    #[test]
    fn test_parse_multiple_ingredients() {
        let results = parse_ingredients("2 cups flour\n\n1 cup sugar\n3 eggs");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].ingredient_name, "flour");
        assert_eq!(results[2].ingredient_name, "eggs");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(parse_ingredient("2-3 cups nuts")).unwrap();
        assert_eq!(json["quantity"], "2-3");
        assert_eq!(json["unit"], "cup");
        assert_eq!(json["ingredientName"], "nuts");
    }
}
