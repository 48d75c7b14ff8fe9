//! Static brand / item / branch catalog.
//!
//! The catalog drives the wizard menus: which brands are always offered,
//! which items each brand carries, and which branches exist. Brands parsed
//! from the reference text are offered in addition to these.

use crate::reference_parser::normalize;

/// Brands with their configured item lists. A brand with an empty item
/// list gets a single skip button at the item step.
const BRAND_ITEMS: &[(&str, &[&str])] = &[
    ("پلنت", &["پپرونی", "مارگاریتا", "مخصوص"]),
    ("پیتزا شب", &["پپرونی", "سبزیجات", "چهار پنیر"]),
    ("ریرا", &["مخصوص", "مارگاریتا"]),
    ("برج میلاد", &[]),
];

const BRANCHES: &[&str] = &["سعادت‌آباد", "ونک", "تجریش", "پونک"];

/// All catalog brands, in configuration order.
pub fn brands() -> Vec<&'static str> {
    BRAND_ITEMS.iter().map(|(brand, _)| *brand).collect()
}

/// Items configured for a brand. Empty when the brand is unknown or has no
/// item catalog.
pub fn items_for(brand: &str) -> &'static [&'static str] {
    let wanted = normalize(brand);
    BRAND_ITEMS
        .iter()
        .find(|(name, _)| normalize(name) == wanted)
        .map(|(_, items)| *items)
        .unwrap_or(&[])
}

/// All known branches.
pub fn branches() -> &'static [&'static str] {
    BRANCHES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brands_are_unique() {
        let all = brands();
        for (i, brand) in all.iter().enumerate() {
            assert!(!all[i + 1..].contains(brand), "duplicate brand {brand}");
        }
    }

    #[test]
    fn test_items_for_known_brand() {
        let items = items_for("پلنت");
        assert!(items.contains(&"پپرونی"));
    }

    #[test]
    fn test_items_for_matches_normalized_input() {
        // Arabic ya/kaf variants fold to the Persian forms before lookup.
        assert_eq!(items_for("  پلنت  "), items_for("پلنت"));
    }

    #[test]
    fn test_items_for_unknown_brand_is_empty() {
        assert!(items_for("ناشناس").is_empty());
    }

    #[test]
    fn test_brand_without_item_catalog() {
        assert!(items_for("برج میلاد").is_empty());
    }

    #[test]
    fn test_branches_not_empty() {
        assert!(!branches().is_empty());
    }
}
