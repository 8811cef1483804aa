use regex::Regex;
use std::sync::LazyLock;

// Street names are runs of letters and spaces, optionally led by a date
// ordinal ("9 de Julio", "3 de Febrero"). House numbers are 2-5 digits so
// postal codes and phone fragments elsewhere in the text are not picked up.

/// "Santa Fe 1200", "Santa Fe, 1200"
static STREET_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:\b\d{1,2}\s+de\s+)?[\p{L} ]+)[ ,]*(\d{2,5})").unwrap()
});

/// "Santa Fe al 1200"
static STREET_AL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:\b\d{1,2}\s+de\s+)?[\p{L} ]+?)\s+al\s+(\d{2,5})").unwrap()
});

/// Street name and, when one could be found, house number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetAddress {
    pub street: String,
    pub number: Option<u32>,
}

impl StreetAddress {
    /// Both parts, if the address was fully parsed.
    pub fn located(&self) -> Option<(&str, u32)> {
        match self.number {
            Some(number) if !self.street.is_empty() => Some((&self.street, number)),
            _ => None,
        }
    }
}

/// Splits a free-text address into street name and house number.
///
/// Returns `None` for absent or blank input. When no number can be found the
/// whole trimmed text comes back as the street with `number: None`.
pub fn parse(address: Option<&str>) -> Option<StreetAddress> {
    let text = address?.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = capture(&STREET_NUMBER, text)
        // "Segui al 3950" also fits the plain pattern with "al" glued onto the street
        .filter(|found| !ends_with_connector(&found.street))
        .or_else(|| capture(&STREET_AL_NUMBER, text));

    Some(parsed.unwrap_or_else(|| StreetAddress {
        street: text.to_string(),
        number: None,
    }))
}

fn capture(pattern: &Regex, text: &str) -> Option<StreetAddress> {
    let caps = pattern.captures(text)?;
    let street = caps.get(1)?.as_str().trim().to_string();
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some(StreetAddress {
        street,
        number: Some(number),
    })
}

fn ends_with_connector(street: &str) -> bool {
    street
        .rsplit_once(' ')
        .is_some_and(|(_, last)| last.eq_ignore_ascii_case("al"))
}
