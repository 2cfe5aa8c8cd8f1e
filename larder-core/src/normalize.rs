//! Cleanup of raw scraped ingredient lines.
//!
//! Removes markup, bullet glyphs, purely descriptive parentheticals and
//! trailing filler clauses, leaving text the parser can work with. Output is a
//! fixpoint: normalizing it again changes nothing.

use std::sync::LazyLock;

use regex::Regex;

/// Filler clauses removed from the end of a line, longest first.
const FILLER_PHRASES: &[&str] = &[
    "for garnish and serving",
    "for garnish",
    "for serving",
    "to taste",
    "as needed",
    "if desired",
    "optional",
    "divided",
    "or more",
    "or less",
];

/// Upper bound on cleanup passes; real input settles in one or two.
const MAX_PASSES: usize = 8;

static LEADING_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[•*\-‣·]+\s*").expect("valid regex"));

/// Bullets left mid-line by collapsed multi-line blocks. Each glyph becomes a
/// word break, so an interior middle dot splits the words it joined.
static BULLET_GLYPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[•‣·․‧∙]").expect("valid regex"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

static SPACE_BEFORE_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+,").expect("valid regex"));

static COMMA_BEFORE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\p{L})").expect("valid regex"));

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("valid regex"));

static TRAILING_FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FILLER_PHRASES.join("|");
    Regex::new(&format!(r"(?i)[,;]?\s*\b(?:{alternation})\s*[.,;]?$")).expect("valid regex")
});

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
];

/// Normalize a batch of lines, dropping any that end up empty. Order is preserved.
pub fn normalize(lines: &[impl AsRef<str>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| normalize_line(line.as_ref()))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Normalize a single line. May return an empty string.
pub fn normalize_line(line: &str) -> String {
    let mut current = line.to_string();
    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalize_pass(line: &str) -> String {
    let mut text = line.to_string();
    for (entity, replacement) in HTML_ENTITIES {
        text = text.replace(entity, replacement);
    }

    let text = LEADING_BULLET_RE.replace(&text, "");
    let text = BULLET_GLYPH_RE.replace_all(&text, " ");
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = collapse_whitespace(&text);
    let text = tidy_commas(&text);

    let text = PARENTHETICAL_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        if is_descriptive_note(&caps[1]) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let mut text = tidy_commas(&collapse_whitespace(&text));

    loop {
        let stripped = TRAILING_FILLER_RE.replace(&text, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    text.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .trim_start_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}

/// A parenthetical is dropped when it is filler or a short one-word note.
/// Anything with a digit is a quantity and always stays.
fn is_descriptive_note(inner: &str) -> bool {
    if inner.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let lower = inner.to_lowercase();
    if FILLER_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return true;
    }
    let mut tokens = inner.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (None, _) => true,
        (Some(token), None) => token.chars().count() < 12,
        _ => false,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tidy_commas(text: &str) -> String {
    let text = SPACE_BEFORE_COMMA_RE.replace_all(text, ",");
    COMMA_BEFORE_WORD_RE.replace_all(&text, ", $1").into_owned()
}
