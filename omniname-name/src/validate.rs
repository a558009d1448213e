//! Name validation and normalization.
//!
//! TLD registries sell emoji and CJK names, so validation cannot assume
//! ASCII. The rules here are the cross-registry common denominator: no
//! empty labels, no control or whitespace characters, no bracketed label
//! syntax. Per-TLD registration rules (length, pricing tiers) are enforced
//! on-chain, not here.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use omniname_core::error::{OmniNameError, Result};

/// Characters that never appear in a valid name, beyond the control and
/// whitespace classes.
const DISALLOWED: &[char] = &['[', ']', '\u{FEFF}'];

/// Validates a name against the cross-registry character rules.
///
/// Accepts multi-label names ("sub.name.bnb"). The name must be non-empty
/// with no empty labels, and every character must be printable,
/// non-whitespace, and outside the disallowed set.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OmniNameError::InvalidName("name is empty".into()));
    }
    if name.split('.').any(|label| label.is_empty()) {
        return Err(OmniNameError::InvalidName(format!(
            "'{name}' contains an empty label"
        )));
    }
    for c in name.chars() {
        if c.is_control() || c.is_whitespace() || DISALLOWED.contains(&c) {
            return Err(OmniNameError::InvalidName(format!(
                "'{name}' contains disallowed character {c:?}"
            )));
        }
    }
    Ok(())
}

/// Normalizes a raw name: trims, applies Unicode NFC folding, lowercases,
/// and validates the result.
///
/// The operation is idempotent. Callers that previously displayed a
/// candidate name are expected to compare the output against it and treat a
/// mismatch as user error; no silent auto-correction happens here.
pub fn normalize(raw: &str) -> Result<String> {
    let folded: String = raw.trim().nfc().flat_map(char::to_lowercase).collect();
    validate_name(&folded)?;
    Ok(folded)
}

/// Counts user-perceived characters.
///
/// Counts Unicode scalars, folding combining marks into their base
/// character. Joiner-built emoji sequences count each component and each
/// joiner: a four-person family emoji counts as seven. A naive code-unit
/// count would misreport every non-ASCII name.
pub fn count_characters(s: &str) -> usize {
    s.chars().filter(|&c| !is_combining_mark(c)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("αβγδεζηθ", 8; "greek letters")]
    #[test_case("🥰🐤", 2; "single-scalar emoji")]
    #[test_case("âéïò", 4; "precomposed diacritics")]
    #[test_case("中文", 2; "cjk")]
    #[test_case("ěẽ", 2; "latin extended")]
    #[test_case("👩‍👩‍👧‍👧", 7; "zwj family sequence counts joiners")]
    fn test_count_characters(input: &str, expected: usize) {
        assert_eq!(count_characters(input), expected);
    }

    #[test]
    fn test_count_characters_folds_combining_marks() {
        // "e" followed by U+0301 COMBINING ACUTE ACCENT
        assert_eq!(count_characters("e\u{0301}"), 1);
    }

    #[test]
    fn test_validate_accepts_unicode_names() {
        validate_name("alice.bnb").unwrap();
        validate_name("sub.name.bnb").unwrap();
        validate_name("币安人生.four").unwrap();
        validate_name("🥰🐤.bnb").unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_and_empty_labels() {
        assert!(validate_name("").is_err());
        assert!(validate_name(".bnb").is_err());
        assert!(validate_name("alice..bnb").is_err());
        assert!(validate_name("alice.bnb.").is_err());
    }

    #[test]
    fn test_validate_rejects_disallowed_characters() {
        assert!(validate_name("ali ce.bnb").is_err());
        assert!(validate_name("alice\u{0000}.bnb").is_err());
        assert!(validate_name("[root].bnb").is_err());
        assert!(validate_name("ali\tce.bnb").is_err());
    }

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize("Alice.BNB").unwrap(), "alice.bnb");
        assert_eq!(normalize("  BOB.bnb  ").unwrap(), "bob.bnb");
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert!(normalize("").is_err());
        assert!(normalize("   ").is_err());
        assert!(normalize("ali ce.bnb").is_err());
    }

    #[test]
    fn test_normalize_is_idempotent_on_fixtures() {
        for name in ["Alice.bnb", "币安人生.four", "🥰🐤.bnb", "sub.Name.arb"] {
            let once = normalize(name).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_idempotent(name in "[a-zA-Z0-9]{1,12}\\.(bnb|arb|eth)") {
                let once = normalize(&name).unwrap();
                let twice = normalize(&once).unwrap();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn count_never_exceeds_scalar_count(s in "\\PC{0,24}") {
                prop_assert!(count_characters(&s) <= s.chars().count());
            }
        }
    }
}
