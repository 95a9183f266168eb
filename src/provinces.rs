/// Province registry for the ARPAV bulletin portal.
///
/// The portal's `provincia` combo box accepts the Veneto province capitals
/// by name. This registry is the single source of truth for recognized
/// values; configuration validation references it rather than hardcoding
/// names, so a typo in a config file fails before a browser session is ever
/// opened.

/// Metadata for a single province accepted by the archive portal.
pub struct Province {
    /// Name as the portal's combo box expects it.
    pub name: &'static str,
    /// Two-letter province abbreviation.
    pub code: &'static str,
}

/// All provinces the ARPAV archive portal publishes bulletins for.
pub static PROVINCE_REGISTRY: &[Province] = &[
    Province { name: "Belluno", code: "BL" },
    Province { name: "Padova", code: "PD" },
    Province { name: "Rovigo", code: "RO" },
    Province { name: "Treviso", code: "TV" },
    Province { name: "Venezia", code: "VE" },
    Province { name: "Verona", code: "VR" },
    Province { name: "Vicenza", code: "VI" },
];

/// Looks up a province by name, case-insensitively. Returns `None` if the
/// portal does not publish bulletins for it.
pub fn find_province(name: &str) -> Option<&'static Province> {
    PROVINCE_REGISTRY
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Whether the portal recognizes `name` as a province.
pub fn is_recognized(name: &str) -> bool {
    find_province(name).is_some()
}

/// Returns all recognized province names, for error messages.
pub fn all_names() -> Vec<&'static str> {
    PROVINCE_REGISTRY.iter().map(|p| p.name).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_provinces() {
        let mut names = std::collections::HashSet::new();
        let mut codes = std::collections::HashSet::new();
        for province in PROVINCE_REGISTRY {
            assert!(
                names.insert(province.name),
                "duplicate province name '{}' in registry",
                province.name
            );
            assert!(
                codes.insert(province.code),
                "duplicate province code '{}' in registry",
                province.code
            );
        }
    }

    #[test]
    fn test_codes_are_two_uppercase_letters() {
        for province in PROVINCE_REGISTRY {
            assert_eq!(
                province.code.len(),
                2,
                "code for '{}' should be 2 letters, got '{}'",
                province.name,
                province.code
            );
            assert!(
                province.code.chars().all(|c| c.is_ascii_uppercase()),
                "code for '{}' should be uppercase, got '{}'",
                province.name,
                province.code
            );
        }
    }

    #[test]
    fn test_find_province_is_case_insensitive() {
        assert!(find_province("Belluno").is_some());
        assert!(find_province("belluno").is_some());
        assert!(find_province("BELLUNO").is_some());
    }

    #[test]
    fn test_find_province_returns_none_for_unknown_name() {
        assert!(find_province("Bologna").is_none());
        assert!(find_province("").is_none());
    }

    #[test]
    fn test_registry_contains_all_veneto_provinces() {
        for expected in ["Belluno", "Padova", "Rovigo", "Treviso", "Venezia", "Verona", "Vicenza"] {
            assert!(
                is_recognized(expected),
                "registry missing expected province '{}'",
                expected
            );
        }
        assert_eq!(PROVINCE_REGISTRY.len(), 7);
    }

    #[test]
    fn test_all_names_matches_registry_length() {
        assert_eq!(all_names().len(), PROVINCE_REGISTRY.len());
    }
}
