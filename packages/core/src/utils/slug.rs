//! Title → id slugs
//!
//! Ids synthesised from titles are lowercase ASCII alphanumerics separated by
//! single hyphens, with no leading or trailing hyphen.

use regex::Regex;
use std::sync::LazyLock;

/// Runs of anything that cannot appear in a slug
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"));

/// Slugify a title
///
/// ```rust
/// use carehub_core::utils::slugify;
///
/// assert_eq!(slugify("  Medicare & Medicaid!  "), "medicare-medicaid");
/// assert_eq!(slugify("---"), "");
/// ```
pub fn slugify(text: &str) -> String {
    SEPARATOR_RE
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug of `title` that is not already in `taken`
///
/// Collisions get `-2`, `-3`, … appended. An empty slug is replaced by
/// `fallback` before disambiguation.
pub fn unique_slug<'a, I>(title: &str, fallback: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let base = match slugify(title) {
        slug if slug.is_empty() => fallback.to_string(),
        slug => slug,
    };
    unique_id(&base, taken)
}

/// `base` itself, or `base` with the first free `-2`, `-3`, … suffix
pub fn unique_id<'a, I>(base: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = taken.into_iter().collect();

    if !taken.contains(&base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Page key from a display name: lowercase alphanumerics only
///
/// `"Care Recipient"` becomes `"carerecipient"`, matching the known page ids.
pub fn page_key(name: &str) -> String {
    SEPARATOR_RE.replace_all(&name.to_lowercase(), "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Financial Support"), "financial-support");
        assert_eq!(slugify("SSDI / SSI -- Benefits"), "ssdi-ssi-benefits");
        assert_eq!(slugify("-Lead and trail-"), "lead-and-trail");
        assert_eq!(slugify("Café 24/7"), "caf-24-7");
    }

    #[test]
    fn test_unique_slug_appends_suffix() {
        assert_eq!(unique_slug("Gov", "section", ["other"]), "gov");
        assert_eq!(unique_slug("Gov", "section", ["gov"]), "gov-2");
        assert_eq!(unique_slug("Gov", "section", ["gov", "gov-2"]), "gov-3");
    }

    #[test]
    fn test_unique_id_keeps_base_verbatim() {
        assert_eq!(unique_id("Item_A", ["other"]), "Item_A");
        assert_eq!(unique_id("c1", ["c1"]), "c1-2");
        assert_eq!(unique_id("c1", ["c1", "c1-2"]), "c1-3");
    }

    #[test]
    fn test_unique_slug_uses_fallback_for_empty_titles() {
        assert_eq!(unique_slug("!!!", "item", []), "item");
        assert_eq!(unique_slug("", "item", ["item"]), "item-2");
    }

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("Care Recipient"), "carerecipient");
        assert_eq!(page_key(" Caregiver "), "caregiver");
    }
}
