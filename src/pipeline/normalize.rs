use regex::Regex;
use std::sync::LazyLock;

/// Address-type tokens stripped from the front of street and neighborhood
/// names: avenida, bulevar, calle, pasaje and their abbreviations.
static ADDRESS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:av\.|av|avda\.|avenida|bv\.|bv|bvar\.|bulevar|boulevard|calle|pasaje|pje\.|pje)\s+")
        .unwrap()
});

/// Maps the Spanish accented vowels and `ñ` to their plain forms.
/// Expects lower-cased input.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Squashes every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical comparison form for street and neighborhood names.
///
/// Lower-cases, folds diacritics, collapses whitespace and strips leading
/// address-type tokens ("Av. Pellegrini" and "pellegrini" compare equal).
/// Absent or blank input yields an empty string.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut name = collapse_whitespace(&fold_diacritics(&text.to_lowercase()));
    // "calle av. x" carries two tokens; keep stripping so the result is stable
    while let Some(prefix) = ADDRESS_PREFIX.find(&name) {
        name = name[prefix.end()..].to_string();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_and_folds_accents() {
        assert_eq!(normalize(Some("Oroño")), "orono");
        assert_eq!(normalize(Some("SEGUÍ")), "segui");
        assert_eq!(normalize(Some("España y Hospitales")), "espana y hospitales");
    }

    #[test]
    fn strips_address_type_prefixes() {
        assert_eq!(normalize(Some("Av. Pellegrini")), "pellegrini");
        assert_eq!(normalize(Some("Avenida Francia")), "francia");
        assert_eq!(normalize(Some("Bv. Oroño")), "orono");
        assert_eq!(normalize(Some("Bulevar Avellaneda")), "avellaneda");
        assert_eq!(normalize(Some("Calle Inventada")), "inventada");
        assert_eq!(normalize(Some("Pje. Gould")), "gould");
        assert_eq!(normalize(Some("pasaje   Gould ")), "gould");
    }

    #[test]
    fn prefix_needs_trailing_whitespace() {
        assert_eq!(normalize(Some("Avellaneda")), "avellaneda");
        assert_eq!(normalize(Some("Calle")), "calle");
        assert_eq!(normalize(Some("Bvd")), "bvd");
    }

    #[test]
    fn absent_or_blank_is_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   \t ")), "");
    }

    #[test]
    fn stacked_prefixes_are_all_removed() {
        assert_eq!(normalize(Some("Calle Av. Santa Fe")), "santa fe");
        assert_eq!(
            normalize(Some("Calle Av. Santa Fe")),
            normalize(Some(&normalize(Some("Calle Av. Santa Fe"))))
        );
    }

    #[test]
    fn collapse_whitespace_squashes_runs() {
        assert_eq!(
            collapse_whitespace("  Casa\n\tcon   patio "),
            "Casa con patio"
        );
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(text in "\\PC{0,40}") {
            let once = normalize(Some(&text));
            prop_assert_eq!(normalize(Some(&once)), once);
        }

        #[test]
        fn normalize_is_idempotent_on_street_like_input(
            prefix in prop::sample::select(vec!["", "Av. ", "av ", "Bv. ", "Calle ", "Pje. ", "Calle Av "]),
            name in "[A-Za-zÁÉÍÓÚÑáéíóúñ ]{0,20}",
        ) {
            let text = format!("{prefix}{name}");
            let once = normalize(Some(&text));
            prop_assert_eq!(normalize(Some(&once)), once);
        }
    }
}
