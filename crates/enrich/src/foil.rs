//! Foil detection from the free-text Condition field.
//!
//! Conditions are marketplace text like "Near Mint Foil" or "Lightly Played
//! Reverse Holofoil"; foil status is only ever signaled through them.

/// Product line whose rows get the holofoil sub-classification.
pub const POKEMON_PRODUCT_LINE: &str = "Pokemon";

/// Checklist marker: `"*"` when the condition mentions foil, else `""`.
pub fn foil_marker(condition: &str) -> &'static str {
    if contains_foil(condition) {
        "*"
    } else {
        ""
    }
}

/// CSV column value: `"Yes"` when the condition mentions foil, else `"No"`.
/// An absent or empty condition is not foil.
pub fn is_foil(condition: &str) -> &'static str {
    if contains_foil(condition) {
        "Yes"
    } else {
        "No"
    }
}

/// Holofoil sub-classification, Pokémon rows only: `"RH"` for reverse
/// holofoil, `"H"` for plain holofoil, `""` otherwise.
///
/// "reverse holofoil" must be tested before "holofoil": the latter is a
/// substring of the former.
pub fn pokemon_holofoil(condition: &str, product_line: &str) -> &'static str {
    if product_line.trim() != POKEMON_PRODUCT_LINE {
        return "";
    }
    let condition = condition.to_lowercase();
    if condition.contains("reverse holofoil") {
        "RH"
    } else if condition.contains("holofoil") {
        "H"
    } else {
        ""
    }
}

fn contains_foil(condition: &str) -> bool {
    condition.to_lowercase().contains("foil")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_case_insensitive() {
        assert_eq!(foil_marker("Lightly Played Foil"), "*");
        assert_eq!(foil_marker("LIGHTLY PLAYED FOIL"), "*");
        assert_eq!(foil_marker("near mint foil"), "*");
    }

    #[test]
    fn marker_empty_for_non_foil() {
        assert_eq!(foil_marker("Near Mint"), "");
        assert_eq!(foil_marker(""), "");
    }

    #[test]
    fn yes_no_mirrors_marker() {
        assert_eq!(is_foil("Near Mint Foil"), "Yes");
        assert_eq!(is_foil("Near Mint"), "No");
        assert_eq!(is_foil(""), "No");
    }

    #[test]
    fn holofoil_reverse_tested_first() {
        assert_eq!(pokemon_holofoil("Near Mint Reverse Holofoil", "Pokemon"), "RH");
        assert_eq!(pokemon_holofoil("Near Mint Holofoil", "Pokemon"), "H");
        assert_eq!(pokemon_holofoil("NEAR MINT REVERSE HOLOFOIL", "Pokemon"), "RH");
    }

    #[test]
    fn holofoil_only_for_pokemon_product_line() {
        assert_eq!(pokemon_holofoil("Reverse Holofoil", "Magic"), "");
        assert_eq!(pokemon_holofoil("Holofoil", "Magic"), "");
        assert_eq!(pokemon_holofoil("Holofoil", ""), "");
        assert_eq!(pokemon_holofoil("Holofoil", "  Pokemon  "), "H");
    }

    #[test]
    fn holofoil_empty_for_plain_conditions() {
        assert_eq!(pokemon_holofoil("Near Mint", "Pokemon"), "");
        assert_eq!(pokemon_holofoil("", "Pokemon"), "");
    }
}
