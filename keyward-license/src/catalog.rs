//! Display names for products and editions.

use std::collections::BTreeMap;

/// Edition codes and their display names.
pub const EDITION_NAMES: &[(&str, &str)] = &[
    ("STD", "Standard"),
    ("PRO", "Professional"),
    ("CO", "Commercial"),
    ("ED", "Educational"),
    ("PS", "Personal"),
    ("CR", "Classroom"),
    ("CAMPUS", "Campus"),
    ("SITE", "Site"),
];

/// Returns the display name of an edition code, if known.
#[must_use]
pub fn edition_name(edition: &str) -> Option<&'static str> {
    EDITION_NAMES
        .iter()
        .find(|(code, _)| *code == edition)
        .map(|(_, name)| *name)
}

/// Composes `"<product name> <edition name>"`.
///
/// Unknown product ids and edition codes are shown verbatim.
#[must_use]
pub fn display_name(
    product_names: &BTreeMap<String, String>,
    product: &str,
    edition: Option<&str>,
) -> String {
    let mut name = product_names
        .get(product)
        .cloned()
        .unwrap_or_else(|| product.to_string());

    if let Some(edition) = edition.filter(|e| !e.is_empty()) {
        name.push(' ');
        name.push_str(edition_name(edition).unwrap_or(edition));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> BTreeMap<String, String> {
        BTreeMap::from([("KEYWARD.V1".to_string(), "Keyward V1".to_string())])
    }

    #[test]
    fn known_product_and_edition() {
        assert_eq!(
            display_name(&products(), "KEYWARD.V1", Some("PRO")),
            "Keyward V1 Professional"
        );
    }

    #[test]
    fn missing_edition_shows_product_only() {
        assert_eq!(display_name(&products(), "KEYWARD.V1", None), "Keyward V1");
        assert_eq!(display_name(&products(), "KEYWARD.V1", Some("")), "Keyward V1");
    }

    #[test]
    fn unknown_codes_shown_verbatim() {
        assert_eq!(display_name(&products(), "OTHER", Some("XL")), "OTHER XL");
    }
}
