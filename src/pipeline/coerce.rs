//! Tolerant numeric and boolean coercion for scraped text.
//!
//! Scraped values arrive as "$ 1.200.500", "2 dormitorios", "Sí" and worse.
//! Everything here is total: unparseable text degrades to a default instead
//! of failing.

use super::normalize::fold_diacritics;
use crate::models::Currency;
use regex::Regex;
use std::sync::LazyLock;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Argentine-style decimal: periods group thousands, a comma marks cents.
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d{3})+(?:,\d+)?|\d+(?:,\d+)?").unwrap());

/// Words that cancel a mention when they open its clause: "sin patio",
/// "no se aceptan mascotas".
const NEGATORS: &[&str] = &["no", "sin", "ni", "not", "without", "prohibido", "prohibidas"];

/// Words that start a new clause, so a negation before them does not reach
/// the mention: "sin expensas con patio".
const CLAUSE_BREAKS: &[&str] = &["con", "y", "pero", "with", "and", "but"];

const NEGATION_WINDOW: usize = 3;

const AFFIRMATIVE: &[&str] = &[
    "si", "yes", "true", "1", "permitido", "permitidos", "permite", "acepta", "aceptan",
    "allowed", "accepts",
];

/// First digit run after dropping currency symbols, thousands-separator
/// periods and spaces. Lossy: "1.200,50" comes back as "1200".
pub fn extract_leading_number(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '.' | ' ' | '\u{a0}'))
        .collect();
    DIGITS.find(&cleaned).map(|m| m.as_str().to_string())
}

/// Count field such as bedrooms or bathrooms.
///
/// Falls back to 1 when there is no number but the unit word appears
/// ("Dormitorio"), else 0.
pub fn to_count(text: &str, unit_word: &str) -> u32 {
    if let Some(digits) = extract_leading_number(text) {
        // digits only, so the parse can fail on overflow alone
        return digits.parse().unwrap_or(u32::MAX);
    }
    let folded = fold_diacritics(&text.to_lowercase());
    let unit = fold_diacritics(&unit_word.to_lowercase());
    if !unit.is_empty() && folded.contains(&unit) {
        1
    } else {
        0
    }
}

/// Price or surface through the lossy path, 0.0 when nothing numeric is found.
pub fn to_amount(text: &str) -> f64 {
    extract_leading_number(text)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0.0)
}

/// Decimal-aware parse for callers that need the fraction: "1.200,50" is
/// 1200.5 and "35,5 m²" is 35.5.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let found = DECIMAL.find(text)?;
    found
        .as_str()
        .replace('.', "")
        .replace(',', ".")
        .parse()
        .ok()
}

pub fn to_boolean(text: &str) -> bool {
    let token = fold_diacritics(&text.trim().to_lowercase());
    AFFIRMATIVE.contains(&token.as_str())
}

/// Case- and accent-insensitive substring search over free text.
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let folded = fold_diacritics(&text.to_lowercase());
    keywords
        .iter()
        .map(|keyword| fold_diacritics(&keyword.to_lowercase()))
        .any(|keyword| !keyword.is_empty() && folded.contains(&keyword))
}

/// Like [`mentions_any`], but a mention only counts when it is not negated:
/// "Se aceptan mascotas" affirms pets, "No se aceptan mascotas" and
/// "Mascotas: no" do not.
pub fn mentions_affirmed(text: &str, keywords: &[&str]) -> bool {
    let folded = fold_diacritics(&text.to_lowercase());
    keywords
        .iter()
        .map(|keyword| fold_diacritics(&keyword.to_lowercase()))
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| {
            folded.match_indices(keyword.as_str()).any(|(start, found)| {
                !negated_before(&folded[..start]) && !negated_after(&folded[start + found.len()..])
            })
        })
}

fn negated_before(prefix: &str) -> bool {
    let clause = prefix
        .rsplit(|c: char| matches!(c, ',' | '.' | ';' | ':' | '!' | '\n' | '-' | '/'))
        .next()
        .unwrap_or(prefix);
    clause
        .split_whitespace()
        .rev()
        .take_while(|word| !CLAUSE_BREAKS.contains(word))
        .take(NEGATION_WINDOW)
        .any(|word| NEGATORS.contains(&word))
}

fn negated_after(suffix: &str) -> bool {
    let rest = suffix
        .trim_start_matches(char::is_alphabetic)
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    rest.split(|c: char| !c.is_alphanumeric()).next() == Some("no")
}

pub fn detect_currency(text: &str) -> Currency {
    let upper = text.to_uppercase();
    if upper.contains("USD") || upper.contains("U$S") || upper.contains("US$") {
        Currency::Usd
    } else {
        Currency::Ars
    }
}
