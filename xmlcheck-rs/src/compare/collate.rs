//! Locale-aware string ordering.
//!
//! Attribute names and report paths are sorted the way the Unicode root
//! collation orders them rather than by code point: whitespace, then
//! punctuation and symbols, then digits, then letters, with case and accents
//! only breaking ties. Comparison runs in levels:
//!
//! 1. primary: character class and base letter (`a` == `A` == `ä`), with
//!    `ß`, `æ` and `œ` expanded to `ss`, `ae` and `oe`
//! 2. secondary: unaccented before accented
//! 3. tertiary: lowercase before uppercase, expansions after their spelled-out form
//! 4. code point order, so that distinct strings never compare equal

use std::cmp::Ordering;

/// Punctuation and symbols in root-collation order.
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

const CLASS_WHITESPACE: u32 = 0x0000_0000;
const CLASS_PUNCTUATION: u32 = 0x0100_0000;
const CLASS_OTHER: u32 = 0x0200_0000;
const CLASS_DIGIT: u32 = 0x0300_0000;
const CLASS_LETTER: u32 = 0x0400_0000;

/// Collation weights of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Weights {
    primary: u32,
    secondary: u8,
    tertiary: u8,
}

/// Compares two strings in locale-aware order.
///
/// # Examples
/// ```rust
/// use std::cmp::Ordering;
/// use xmlcheck::compare::locale_cmp;
///
/// assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
/// assert_eq!(locale_cmp("a", "A"), Ordering::Less);
/// assert_eq!(locale_cmp("/a_b", "/a/b"), Ordering::Less);
/// ```
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let wa = collation_elements(a);
    let wb = collation_elements(b);

    compare_level(&wa, &wb, |w| w.primary)
        .then_with(|| compare_level(&wa, &wb, |w| u32::from(w.secondary)))
        .then_with(|| compare_level(&wa, &wb, |w| u32::from(w.tertiary)))
        .then_with(|| a.cmp(b))
}

fn compare_level(a: &[Weights], b: &[Weights], level: impl Fn(&Weights) -> u32) -> Ordering {
    a.iter().map(&level).cmp(b.iter().map(&level))
}

fn collation_elements(s: &str) -> Vec<Weights> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        push_weights(c, &mut out);
    }
    out
}

fn push_weights(c: char, out: &mut Vec<Weights>) {
    let upper = u8::from(c.is_uppercase());
    let expansion = match c {
        'ß' | 'ẞ' => Some(("ss", 0)),
        'æ' | 'Æ' => Some(("ae", 1)),
        'œ' | 'Œ' => Some(("oe", 1)),
        _ => None,
    };
    match expansion {
        Some((letters, secondary)) => {
            for (i, base) in letters.chars().enumerate() {
                out.push(Weights {
                    primary: CLASS_LETTER | base as u32,
                    secondary: if i == 0 { secondary } else { 0 },
                    tertiary: if i == 0 { 2 + upper } else { 0 },
                });
            }
        }
        None => out.push(weights(c)),
    }
}

fn weights(c: char) -> Weights {
    if c.is_whitespace() {
        return Weights {
            primary: CLASS_WHITESPACE | c as u32,
            secondary: 0,
            tertiary: 0,
        };
    }
    if let Some(pos) = PUNCTUATION.find(c) {
        return Weights {
            primary: CLASS_PUNCTUATION | pos as u32,
            secondary: 0,
            tertiary: 0,
        };
    }
    if let Some(digit) = c.to_digit(10) {
        return Weights {
            primary: CLASS_DIGIT | digit,
            secondary: 0,
            tertiary: 0,
        };
    }
    if c.is_alphabetic() {
        let tertiary = u8::from(c.is_uppercase());
        let lower = c.to_lowercase().next().unwrap_or(c);
        let (base, accented) = match fold_accent(lower) {
            Some(base) => (base, 1),
            None => (lower, 0),
        };
        return Weights {
            primary: CLASS_LETTER | base as u32,
            secondary: accented,
            tertiary,
        };
    }
    Weights {
        primary: CLASS_OTHER | c as u32,
        secondary: 0,
        tertiary: 0,
    }
}

/// Base letter of a lowercase accented Latin letter.
fn fold_accent(c: char) -> Option<char> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ł' => 'l',
        'đ' => 'd',
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| locale_cmp(a, b));
        items
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(
            sorted(vec!["b", "B", "a", "C", "A"]),
            vec!["a", "A", "b", "B", "C"]
        );
    }

    #[test]
    fn test_punctuation_before_digits_before_letters() {
        assert_eq!(sorted(vec!["a", "1", "_", "/"]), vec!["_", "/", "1", "a"]);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(
            sorted(vec!["/Root/A/B", "/Root/A", "/Root/AB", "/Root/A[@ID=\"1\"]"]),
            vec!["/Root/A", "/Root/A[@ID=\"1\"]", "/Root/A/B", "/Root/AB"]
        );
    }

    #[test]
    fn test_accents_are_secondary() {
        assert_eq!(sorted(vec!["Zebra", "Äpfel", "Apfel"]), vec!["Apfel", "Äpfel", "Zebra"]);
        assert_eq!(locale_cmp("ä", "b"), Ordering::Less);
    }

    #[test]
    fn test_sharp_s_sorts_as_ss() {
        assert_eq!(
            sorted(vec!["Strbe", "Straße", "Strasse", "Strase"]),
            vec!["Strase", "Strasse", "Straße", "Strbe"]
        );
        assert_eq!(locale_cmp("Maß", "Mast"), Ordering::Less);
    }

    #[test]
    fn test_ligatures_and_stroked_letters() {
        assert_eq!(sorted(vec!["af", "æ", "ad"]), vec!["ad", "æ", "af"]);
        assert_eq!(sorted(vec!["lz", "łb", "la"]), vec!["la", "łb", "lz"]);
    }

    #[test]
    fn test_equal_only_when_identical() {
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
        assert_ne!(locale_cmp("x\u{2603}", "x\u{2604}"), Ordering::Equal);
    }
}
